use std::fmt::Write as _;
use std::rc::Rc;

/// Stands in for an interpolated value inside the joined template source.
pub const SLOT_MARKER: char = '\u{E000}';

/// Reserved tag of the child projection placeholder.
pub const CHILDREN_TAG: &str = "Children";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// A literal tag name, or the text itself for a static text node.
    Static(String),
    /// Decided by the argument in this node's first slot.
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Static(String),
    Dynamic,
}

/// One node of a parsed template. Shared between every component built from
/// the same template, never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    pub tag: Tag,
    pub attributes: Vec<(String, AttrValue)>,
    /// Slots consumed by this node and all of its descendants.
    pub slots: usize,
    /// Bare text: a static text node, or an interpolation in child position.
    pub is_text: bool,
    pub children: Rc<[Tree]>,
}

impl Tree {
    pub fn text(value: impl Into<String>) -> Self {
        Tree {
            tag: Tag::Static(value.into()),
            attributes: Vec::new(),
            slots: 0,
            is_text: true,
            children: Rc::from([]),
        }
    }

    /// An interpolation in child position.
    pub fn slot() -> Self {
        Tree {
            tag: Tag::Dynamic,
            attributes: Vec::new(),
            slots: 1,
            is_text: true,
            children: Rc::from([]),
        }
    }

    pub fn element(tag: Tag, attributes: Vec<(String, AttrValue)>, children: Vec<Tree>) -> Self {
        let own = usize::from(tag == Tag::Dynamic)
            + attributes
                .iter()
                .filter(|(_, v)| *v == AttrValue::Dynamic)
                .count();
        let slots = own + children.iter().map(|c| c.slots).sum::<usize>();
        Tree {
            tag,
            attributes,
            slots,
            is_text: false,
            children: children.into(),
        }
    }

    pub fn static_tag(&self) -> Option<&str> {
        match &self.tag {
            Tag::Static(t) => Some(t),
            Tag::Dynamic => None,
        }
    }

    /// `<Children/>` written literally. A dynamic tag whose argument is the
    /// text `Children` also counts, but that is decided at instantiation.
    pub fn is_children_placeholder(&self) -> bool {
        !self.is_text && self.static_tag() == Some(CHILDREN_TAG)
    }

    pub fn dynamic_attributes(&self) -> usize {
        self.attributes
            .iter()
            .filter(|(_, v)| *v == AttrValue::Dynamic)
            .count()
    }
}

/// Human readable outline of a forest with slot indices, one node per line.
pub fn outline(trees: &[Tree]) -> String {
    let mut out = String::new();
    let mut slot = 0;
    for t in trees {
        outline_node(t, 0, &mut slot, &mut out);
    }
    out
}

fn outline_node(tree: &Tree, depth: usize, slot: &mut usize, out: &mut String) {
    let pad = "  ".repeat(depth);
    if tree.is_text {
        match &tree.tag {
            Tag::Static(t) => {
                let _ = writeln!(out, "{pad}{t:?}");
            }
            Tag::Dynamic => {
                let _ = writeln!(out, "{pad}${slot}");
                *slot += 1;
            }
        }
        return;
    }
    let _ = write!(out, "{pad}<");
    match &tree.tag {
        Tag::Static(t) => out.push_str(t),
        Tag::Dynamic => {
            let _ = write!(out, "${slot}");
            *slot += 1;
        }
    }
    for (name, value) in &tree.attributes {
        match value {
            AttrValue::Static(v) if v.is_empty() => {
                let _ = write!(out, " {name}");
            }
            AttrValue::Static(v) => {
                let _ = write!(out, " {name}={v:?}");
            }
            AttrValue::Dynamic => {
                let _ = write!(out, " {name}=${slot}");
                *slot += 1;
            }
        }
    }
    out.push_str(">\n");
    for c in tree.children.iter() {
        outline_node(c, depth + 1, slot, out);
    }
}
