//! Template markup: grammar, parsed trees and the per-signature tree cache.

mod cache;
mod parse;
mod tree;

pub use cache::{TreeCache, default_cache, join, signature};
pub use parse::{ParseError, parse};
pub use tree::{AttrValue, CHILDREN_TAG, SLOT_MARKER, Tag, Tree, outline};
