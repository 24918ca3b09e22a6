use crate::Node;

/// Elements that never have a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlOptions {
    /// Print empty text nodes (anchors) as `<!---->` instead of nothing.
    pub mark_anchors: bool,
}

fn escape_text(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

fn write_node(node: &Node, opts: HtmlOptions, out: &mut String) {
    if let Some(text) = node.data() {
        if text.is_empty() && opts.mark_anchors {
            out.push_str("<!---->");
        } else {
            escape_text(&text, out);
        }
        return;
    }
    let Some(tag) = node.tag_name() else {
        return;
    };
    out.push('<');
    out.push_str(&tag);
    for (k, v) in node.attributes() {
        out.push(' ');
        out.push_str(&k);
        out.push_str("=\"");
        escape_attr(&v, out);
        out.push('"');
    }
    out.push('>');
    let children = node.children();
    if is_void(&tag) && children.is_empty() {
        return;
    }
    for c in &children {
        write_node(c, opts, out);
    }
    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}

/// Serialise a sequence of sibling nodes.
pub fn to_html<'a>(nodes: impl IntoIterator<Item = &'a Node>, opts: HtmlOptions) -> String {
    let mut out = String::new();
    for n in nodes {
        write_node(n, opts, &mut out);
    }
    out
}

impl Node {
    /// Outer HTML of this node with default options.
    pub fn to_html(&self) -> String {
        to_html([self], HtmlOptions::default())
    }

    /// HTML of the children only.
    pub fn inner_html(&self) -> String {
        to_html(&self.children(), HtmlOptions::default())
    }
}
