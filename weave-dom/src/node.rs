use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{trace, warn};

use crate::event::{Event, Handler, Listener, ListenerId};

/// A live host node.
///
/// `Node` is a shared handle: clones refer to the same node, and equality is
/// identity. Parents hold their children strongly and children point back
/// weakly, so dropping a detached subtree frees it.
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeData>>);

struct NodeData {
    kind: NodeKind,
    parent: Weak<RefCell<NodeData>>,
    children: Vec<Node>,
    listeners: Vec<Listener>,
}

enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

/// Create a detached element.
pub fn create_element(tag: impl Into<String>) -> Node {
    Node::new(NodeKind::Element {
        tag: tag.into(),
        attributes: Vec::new(),
    })
}

/// Create a detached text node.
pub fn create_text(data: impl Into<String>) -> Node {
    Node::new(NodeKind::Text(data.into()))
}

/// Create an invisible insertion marker (an empty text node).
pub fn create_anchor() -> Node {
    create_text("")
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Node(Rc::new(RefCell::new(NodeData {
            kind,
            parent: Weak::new(),
            children: Vec::new(),
            listeners: Vec::new(),
        })))
    }

    pub fn is_element(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Text(_))
    }

    /// An empty text node, which is what anchors look like.
    pub fn is_anchor(&self) -> bool {
        matches!(&self.0.borrow().kind, NodeKind::Text(t) if t.is_empty())
    }

    pub fn tag_name(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    /// Data of a text node; `None` for elements.
    pub fn data(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Text(t) => Some(t.clone()),
            NodeKind::Element { .. } => None,
        }
    }

    /// Concatenated text of this node and all its descendants.
    pub fn text_content(&self) -> String {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Text(t) => t.clone(),
            NodeKind::Element { .. } => data.children.iter().map(Node::text_content).collect(),
        }
    }

    /// Text nodes get their data replaced; elements get all children replaced
    /// by a single text node.
    pub fn set_text(&self, value: &str) {
        let is_element = {
            let mut data = self.0.borrow_mut();
            match &mut data.kind {
                NodeKind::Text(t) => {
                    t.clear();
                    t.push_str(value);
                    false
                }
                NodeKind::Element { .. } => true,
            }
        };
        if is_element {
            for child in self.children() {
                child.remove();
            }
            self.append(&create_text(value));
        }
    }

    /// Rename an element in place. Attributes, children, listeners and the
    /// position in the parent are kept. Returns `false` for text nodes.
    pub fn retag(&self, tag: &str) -> bool {
        match &mut self.0.borrow_mut().kind {
            NodeKind::Element { tag: t, .. } => {
                trace!(from = %t, to = tag, "retagging element");
                t.clear();
                t.push_str(tag);
                true
            }
            NodeKind::Text(_) => false,
        }
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        match &mut self.0.borrow_mut().kind {
            NodeKind::Element { attributes, .. } => {
                match attributes.iter_mut().find(|(n, _)| n == name) {
                    Some((_, v)) => {
                        v.clear();
                        v.push_str(value);
                    }
                    None => attributes.push((name.to_string(), value.to_string())),
                }
            }
            NodeKind::Text(_) => warn!(name, "ignoring attribute on a text node"),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn remove_attribute(&self, name: &str) -> bool {
        match &mut self.0.borrow_mut().kind {
            NodeKind::Element { attributes, .. } => {
                let before = attributes.len();
                attributes.retain(|(n, _)| n != name);
                attributes.len() != before
            }
            NodeKind::Text(_) => false,
        }
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> Vec<(String, String)> {
        match &self.0.borrow().kind {
            NodeKind::Element { attributes, .. } => attributes.clone(),
            NodeKind::Text(_) => Vec::new(),
        }
    }

    pub fn classes(&self) -> Vec<String> {
        self.attribute("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, token: &str) -> bool {
        self.classes().iter().any(|c| c == token)
    }

    /// Add a class token unless it is already present.
    pub fn add_class(&self, token: &str) {
        if !self.is_element() || self.has_class(token) {
            return;
        }
        let mut classes = self.classes();
        classes.push(token.to_string());
        self.set_attribute("class", &classes.join(" "));
    }

    pub fn remove_class(&self, token: &str) {
        if !self.has_class(token) {
            return;
        }
        let classes: Vec<String> = self.classes().into_iter().filter(|c| c != token).collect();
        if classes.is_empty() {
            self.remove_attribute("class");
        } else {
            self.set_attribute("class", &classes.join(" "));
        }
    }

    pub fn add_event_listener(&self, event: &str, handler: Handler) -> ListenerId {
        let id = ListenerId::next();
        trace!(event, %id, "adding listener");
        self.0.borrow_mut().listeners.push(Listener {
            id,
            event: event.to_string(),
            handler,
        });
        id
    }

    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut data = self.0.borrow_mut();
        let before = data.listeners.len();
        data.listeners.retain(|l| l.id != id);
        let removed = data.listeners.len() != before;
        trace!(%id, removed, "removing listener");
        removed
    }

    /// Number of listeners installed for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.0
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.event == event)
            .count()
    }

    /// Invoke every listener for `event` on this node, returning how many ran.
    /// Handlers run without any borrow held, so they may mutate the tree.
    pub fn dispatch_event(&self, event: &str) -> usize {
        let handlers: Vec<Handler> = self
            .0
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.event == event)
            .map(|l| l.handler.clone())
            .collect();
        let ev = Event {
            name: event.to_string(),
            target: self.clone(),
        };
        for h in &handlers {
            h(&ev);
        }
        handlers.len()
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.borrow().parent.upgrade().map(Node)
    }

    pub fn children(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn first_child(&self) -> Option<Node> {
        self.0.borrow().children.first().cloned()
    }

    /// Append `child` as the last child, detaching it from any previous parent.
    pub fn append(&self, child: &Node) {
        child.remove();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child.clone());
    }

    pub fn append_all<'a>(&self, children: impl IntoIterator<Item = &'a Node>) {
        for child in children {
            self.append(child);
        }
    }

    /// Insert `nodes`, in order, as the next siblings of `self`.
    ///
    /// Returns `false` when `self` has no parent; the nodes are left untouched.
    pub fn insert_after(&self, nodes: &[Node]) -> bool {
        self.insert_relative(nodes, 1)
    }

    /// Insert `nodes`, in order, as the previous siblings of `self`.
    pub fn insert_before(&self, nodes: &[Node]) -> bool {
        self.insert_relative(nodes, 0)
    }

    fn insert_relative(&self, nodes: &[Node], offset: usize) -> bool {
        let Some(parent) = self.parent() else {
            warn!(count = nodes.len(), "cannot insert next to a detached node");
            return false;
        };
        for node in nodes.iter().filter(|n| *n != self) {
            node.remove();
        }
        let weak = Rc::downgrade(&parent.0);
        let mut data = parent.0.borrow_mut();
        let Some(pos) = data.children.iter().position(|c| c == self) else {
            return false;
        };
        let mut at = pos + offset;
        for node in nodes.iter().filter(|n| *n != self) {
            node.0.borrow_mut().parent = weak.clone();
            data.children.insert(at, node.clone());
            at += 1;
        }
        true
    }

    /// Detach from the parent. Removing a detached node is a no-op.
    pub fn remove(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        parent.0.borrow_mut().children.retain(|c| c != self);
        self.0.borrow_mut().parent = Weak::new();
    }

    pub fn ptr_eq(a: &Node, b: &Node) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub(crate) fn with_kind<R>(
        &self,
        element: impl FnOnce(&str, &[(String, String)], &[Node]) -> R,
        text: impl FnOnce(&str) -> R,
    ) -> R {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Element { tag, attributes } => element(tag, attributes, &data.children),
            NodeKind::Text(t) => text(t),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Node::ptr_eq(self, other)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.borrow().kind {
            NodeKind::Element { tag, .. } => write!(f, "<{tag}>"),
            NodeKind::Text(t) => write!(f, "{t:?}"),
        }
    }
}
