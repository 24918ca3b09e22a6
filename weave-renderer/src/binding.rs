use std::rc::Rc;

use tracing::trace;
use weave_core::Reactive;
use weave_dom::{ListenerId, Node, Target, TargetRole, create_anchor};
use weave_template::Tree;

use crate::component::ComponentId;
use crate::subscription::{SubscriptionHandle, Subscriptions};

/// What a slot drives in the rendered tree.
pub(crate) enum Role {
    /// A component or component list rendered after the anchors in `roots`.
    Component {
        children: Rc<[Tree]>,
        /// First slot of `children` in the table this binding lives in.
        children_slot: usize,
        children_slots: usize,
    },
    TagName,
    Text,
    Attribute {
        name: String,
    },
    Event {
        attribute: String,
        event: String,
        listeners: Vec<(Node, ListenerId)>,
    },
    Ref {
        attribute: String,
    },
    Css {
        attribute: String,
        key: String,
    },
}

/// Public summary of a slot's binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Component,
    TagName,
    Text,
    Attribute,
    Event,
    Ref,
    Css,
}

/// Where in the markup a slot sits, independent of its current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Position {
    Component,
    Tag,
    Text,
    Attribute(String),
}

impl Role {
    pub(crate) fn kind(&self) -> BindingKind {
        match self {
            Role::Component { .. } => BindingKind::Component,
            Role::TagName => BindingKind::TagName,
            Role::Text => BindingKind::Text,
            Role::Attribute { .. } => BindingKind::Attribute,
            Role::Event { .. } => BindingKind::Event,
            Role::Ref { .. } => BindingKind::Ref,
            Role::Css { .. } => BindingKind::Css,
        }
    }

    pub(crate) fn position(&self) -> Position {
        match self {
            Role::Component { .. } => Position::Component,
            Role::TagName => Position::Tag,
            Role::Text => Position::Text,
            Role::Attribute { name }
            | Role::Event {
                attribute: name, ..
            }
            | Role::Ref { attribute: name }
            | Role::Css {
                attribute: name, ..
            } => Position::Attribute(name.clone()),
        }
    }

    /// Reactive target for `root` under this role, if the role accepts one.
    pub(crate) fn target(&self, root: &Node) -> Option<Target> {
        let role = match self {
            Role::Text => TargetRole::TextNode,
            Role::TagName => TargetRole::TagName,
            Role::Attribute { name } => TargetRole::AttributeValue(name.clone()),
            _ => return None,
        };
        Some(Target::new(root.clone(), role))
    }
}

/// Bookkeeping for one slot: its role, the nodes it patches and the
/// subscriptions that keep those nodes live.
///
/// Entries recorded while projecting children into a component are tagged
/// with that component, so they can be released when it goes away while
/// the rest of the slot stays bound.
pub(crate) struct Binding {
    pub(crate) role: Role,
    /// Where the slot sits in the markup; fixed when the binding is created
    /// and kept across role changes.
    pub(crate) position: Position,
    pub(crate) roots: Vec<Node>,
    /// Parallel to `roots`.
    owners: Vec<Option<ComponentId>>,
    subs: Vec<(SubscriptionHandle, Option<ComponentId>)>,
}

impl Binding {
    pub(crate) fn new(role: Role) -> Self {
        Binding {
            position: role.position(),
            role,
            roots: Vec::new(),
            owners: Vec::new(),
            subs: Vec::new(),
        }
    }

    pub(crate) fn push_root(&mut self, node: Node, owner: Option<ComponentId>) {
        self.roots.push(node);
        self.owners.push(owner);
    }

    pub(crate) fn push_sub(&mut self, handle: SubscriptionHandle, owner: Option<ComponentId>) {
        self.subs.push((handle, owner));
    }

    /// Subscribe `reactive` to every root this role can target.
    pub(crate) fn subscribe_roots(&mut self, reactive: &Rc<dyn Reactive>, subs: &mut Subscriptions) {
        for (root, owner) in self.roots.iter().zip(&self.owners) {
            if let Some(target) = self.role.target(root) {
                let handle = subs.append(reactive.clone().subscribe(target));
                self.subs.push((handle, *owner));
            }
        }
    }

    /// Cancel subscriptions and detach listeners. Roots are kept.
    pub(crate) fn unbind(&mut self, subs: &mut Subscriptions) {
        for (handle, _) in self.subs.drain(..) {
            subs.cancel(handle);
        }
        if let Role::Event { listeners, .. } = &mut self.role {
            for (node, id) in listeners.drain(..) {
                node.remove_event_listener(id);
            }
        }
    }

    /// Drop every root, subscription and listener `owner` recorded.
    /// Returns how many roots were released.
    pub(crate) fn release_owner(&mut self, owner: ComponentId, subs: &mut Subscriptions) -> usize {
        let tag = Some(owner);
        self.subs.retain(|(handle, o)| {
            if *o == tag {
                subs.cancel(*handle);
                false
            } else {
                true
            }
        });
        let mut released = Vec::new();
        let mut kept_roots = Vec::with_capacity(self.roots.len());
        let mut kept_owners = Vec::with_capacity(self.owners.len());
        for (root, o) in self.roots.drain(..).zip(self.owners.drain(..)) {
            if o == tag {
                released.push(root);
            } else {
                kept_roots.push(root);
                kept_owners.push(o);
            }
        }
        self.roots = kept_roots;
        self.owners = kept_owners;
        if let Role::Event { listeners, .. } = &mut self.role {
            listeners.retain(|(node, id)| {
                if released.contains(node) {
                    node.remove_event_listener(*id);
                    false
                } else {
                    true
                }
            });
        }
        released.len()
    }

    /// Swap every root for an anchor in the same position.
    pub(crate) fn roots_to_anchors(&mut self) {
        for root in &mut self.roots {
            if root.is_text() {
                root.set_text("");
                continue;
            }
            let anchor = create_anchor();
            if root.insert_before(std::slice::from_ref(&anchor)) {
                root.remove();
            }
            trace!("replaced element root with an anchor");
            *root = anchor;
        }
    }
}

/// Binding table of one component, one entry per argument.
pub(crate) type Table = Vec<Option<Binding>>;

pub(crate) fn empty_table(len: usize) -> Table {
    std::iter::repeat_with(|| None).take(len).collect()
}
