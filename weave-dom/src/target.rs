use tracing::trace;

use crate::Node;

/// What part of a node a reactive value drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetRole {
    AttributeValue(String),
    TagName,
    TextNode,
}

/// A node plus the role a reactive value plays on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub root: Node,
    pub role: TargetRole,
}

impl Target {
    pub fn new(root: Node, role: TargetRole) -> Self {
        Self { root, role }
    }

    pub fn attribute(root: Node, name: impl Into<String>) -> Self {
        Self::new(root, TargetRole::AttributeValue(name.into()))
    }

    pub fn text(root: Node) -> Self {
        Self::new(root, TargetRole::TextNode)
    }

    pub fn tag_name(root: Node) -> Self {
        Self::new(root, TargetRole::TagName)
    }

    /// Write `value` into the node according to the role.
    pub fn apply(&self, value: &str) {
        trace!(role = ?self.role, value, "applying value to target");
        match &self.role {
            TargetRole::AttributeValue(name) => self.root.set_attribute(name, value),
            TargetRole::TextNode => self.root.set_text(value),
            TargetRole::TagName => {
                if self.root.is_element() {
                    self.root.retag(value);
                } else {
                    self.root.set_text(value);
                }
            }
        }
    }
}
