use std::cell::RefCell;
use std::rc::Rc;

use weave_dom::Node;

/// Handle that receives the element it is attached to.
///
/// Clones share the slot, and two refs are the same ref only if they share it.
#[derive(Clone, Default)]
pub struct NodeRef {
    inner: Rc<RefCell<Option<Node>>>,
}

impl NodeRef {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bound element, if any.
    pub fn element(&self) -> Option<Node> {
        self.inner.borrow().clone()
    }

    pub fn is_bound(&self) -> bool {
        self.inner.borrow().is_some()
    }

    pub fn bind(&self, node: Node) {
        *self.inner.borrow_mut() = Some(node);
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().take();
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }
}

impl std::fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NodeRef").field(&self.element()).finish()
    }
}
