use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::parse::{ParseError, parse};
use crate::tree::{SLOT_MARKER, Tree};

/// Join template parts with the slot marker.
pub fn join<S: AsRef<str>>(parts: &[S]) -> String {
    let mut marker = [0u8; 4];
    let marker: &str = SLOT_MARKER.encode_utf8(&mut marker);
    parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(marker)
}

/// Cache key of a template: the joined source with whitespace runs collapsed
/// to one space, whitespace-only text between tags removed and the ends
/// trimmed.
///
/// Whitespace inside text and attribute values is kept, so `<p>a b</p>` and
/// `<p>ab</p>` stay distinct templates.
pub fn signature<S: AsRef<str>>(parts: &[S]) -> String {
    join(parts)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("> <", "><")
}

/// Parsed trees keyed by template signature.
///
/// A tree is parsed the first time its signature is seen and shared by every
/// later lookup. Failed parses are not cached.
#[derive(Default)]
pub struct TreeCache {
    trees: RefCell<HashMap<String, Rc<[Tree]>>>,
}

impl TreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_parse<S: AsRef<str>>(&self, parts: &[S]) -> Result<Rc<[Tree]>, ParseError> {
        let key = signature(parts);
        if let Some(tree) = self.trees.borrow().get(&key) {
            debug!(signature = %key, "template cache hit");
            return Ok(tree.clone());
        }
        debug!(signature = %key, "template cache miss");
        let tree = parse(&join(parts))?;
        self.trees.borrow_mut().insert(key, tree.clone());
        Ok(tree)
    }

    pub fn contains<S: AsRef<str>>(&self, parts: &[S]) -> bool {
        self.trees.borrow().contains_key(&signature(parts))
    }

    pub fn len(&self) -> usize {
        self.trees.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.trees.borrow_mut().clear();
    }
}

thread_local! {
    static DEFAULT_CACHE: Rc<TreeCache> = Rc::new(TreeCache::new());
}

/// The cache used by components that were not given one explicitly.
pub fn default_cache() -> Rc<TreeCache> {
    DEFAULT_CACHE.with(Rc::clone)
}
