use std::rc::Rc;

use pest::Parser;
use pest::iterators::Pair;
use thiserror::Error;
use tracing::trace;

use crate::tree::{AttrValue, SLOT_MARKER, Tag, Tree};

#[derive(pest_derive::Parser)]
#[grammar = "template.pest"]
struct TemplateParser;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("closing tag </{found}> does not match <{expected}>")]
    MismatchedClose { expected: String, found: String },
    #[error("closing tag </{0}> has no opening tag")]
    UnexpectedClose(String),
    #[error("<{0}> is never closed")]
    Unclosed(String),
    #[error("attribute `{0}` mixes text with an interpolation")]
    PartialAttribute(String),
}

struct Open {
    tag: Tag,
    attributes: Vec<(String, AttrValue)>,
    children: Vec<Tree>,
}

impl Open {
    fn finish(self) -> Tree {
        Tree::element(self.tag, self.attributes, self.children)
    }

    fn name(&self) -> String {
        match &self.tag {
            Tag::Static(t) => t.clone(),
            Tag::Dynamic => "${...}".to_string(),
        }
    }
}

/// Parse template markup in which every interpolation has been replaced by
/// [`SLOT_MARKER`].
pub fn parse(source: &str) -> Result<Rc<[Tree]>, ParseError> {
    let mut pairs = TemplateParser::parse(Rule::document, source)
        .map_err(|e| ParseError::Syntax(e.to_string()))?;
    let document = pairs
        .next()
        .ok_or_else(|| ParseError::Syntax("empty document".to_string()))?;

    let mut stack: Vec<Open> = Vec::new();
    let mut roots: Vec<Tree> = Vec::new();

    fn push(stack: &mut [Open], roots: &mut Vec<Tree>, tree: Tree) {
        match stack.last_mut() {
            Some(open) => open.children.push(tree),
            None => roots.push(tree),
        }
    }

    for pair in document.into_inner() {
        match pair.as_rule() {
            Rule::text => {
                if let Some(text) = normalize_text(pair.as_str()) {
                    push(&mut stack, &mut roots, Tree::text(text));
                }
            }
            Rule::slot => push(&mut stack, &mut roots, Tree::slot()),
            Rule::open_tag => {
                let (open, self_closing) = open_tag(pair)?;
                let void = matches!(&open.tag, Tag::Static(t) if weave_dom::is_void(t));
                if self_closing || void {
                    push(&mut stack, &mut roots, open.finish());
                } else {
                    stack.push(open);
                }
            }
            Rule::close_tag => {
                let found = pair
                    .into_inner()
                    .next()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                let open = stack
                    .pop()
                    .ok_or_else(|| ParseError::UnexpectedClose(found.clone()))?;
                if let Tag::Static(expected) = &open.tag {
                    if *expected != found {
                        return Err(ParseError::MismatchedClose {
                            expected: expected.clone(),
                            found,
                        });
                    }
                }
                push(&mut stack, &mut roots, open.finish());
            }
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::Unclosed(open.name()));
    }
    trace!(roots = roots.len(), "parsed template");
    Ok(roots.into())
}

fn open_tag(pair: Pair<'_, Rule>) -> Result<(Open, bool), ParseError> {
    let mut open = Open {
        tag: Tag::Dynamic,
        attributes: Vec::new(),
        children: Vec::new(),
    };
    let mut self_closing = false;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::slot => open.tag = Tag::Dynamic,
            Rule::tag_name => open.tag = Tag::Static(part.as_str().to_string()),
            Rule::attribute => open.attributes.push(attribute(part)?),
            Rule::self_close => self_closing = true,
            _ => {}
        }
    }
    Ok((open, self_closing))
}

fn attribute(pair: Pair<'_, Rule>) -> Result<(String, AttrValue), ParseError> {
    let mut inner = pair.into_inner();
    let name = inner
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default();
    let Some(value) = inner.next() else {
        return Ok((name, AttrValue::Static(String::new())));
    };
    let raw = match value.as_rule() {
        Rule::slot => return Ok((name, AttrValue::Dynamic)),
        Rule::dq_string | Rule::sq_string => value
            .into_inner()
            .next()
            .map(|p| p.as_str())
            .unwrap_or_default(),
        _ => value.as_str(),
    };
    if raw.contains(SLOT_MARKER) {
        return Err(ParseError::PartialAttribute(name));
    }
    Ok((name, AttrValue::Static(decode_entities(raw))))
}

/// Drop whitespace-only text; collapse whitespace runs elsewhere.
fn normalize_text(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }
    let mut out = String::with_capacity(raw.len());
    let mut in_ws = false;
    for c in raw.chars() {
        if c.is_whitespace() {
            if !in_ws {
                out.push(' ');
            }
            in_ws = true;
        } else {
            out.push(c);
            in_ws = false;
        }
    }
    Some(decode_entities(&out))
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}
