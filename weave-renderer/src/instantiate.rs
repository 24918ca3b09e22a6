//! First render of a template: walks the shared tree, creates nodes and
//! fills the binding table.

use std::rc::Rc;

use tracing::{debug, trace, warn};
use weave_dom::{Node, Target, create_anchor, create_element, create_text};
use weave_template::{AttrValue, CHILDREN_TAG, Tag, Tree};

use crate::arg::{Arg, Kind};
use crate::binding::{Binding, Role};
use crate::component::{Component, ComponentId};
use crate::error::RenderError;
use crate::subscription::{SubscriptionHandle, Subscriptions};

/// Arguments of one component together with the binding table and
/// subscription list they are recorded in.
pub(crate) struct Slots<'a> {
    pub(crate) args: &'a [Arg],
    pub(crate) bindings: &'a mut [Option<Binding>],
    pub(crate) subs: &'a mut Subscriptions,
    /// Component whose children projection is being rendered, if any.
    pub(crate) owner: Option<ComponentId>,
}

impl<'a> Slots<'a> {
    pub(crate) fn reborrow(&mut self) -> Slots<'_> {
        Slots {
            args: self.args,
            bindings: &mut *self.bindings,
            subs: &mut *self.subs,
            owner: self.owner,
        }
    }

    fn arg(&self, slot: usize) -> Result<&'a Arg, RenderError> {
        self.args.get(slot).ok_or_else(|| {
            RenderError::Classification(format!(
                "slot {slot} has no argument ({} given)",
                self.args.len()
            ))
        })
    }

    /// The binding at `slot`, created with `role` if the slot is still unbound.
    fn record(
        &mut self,
        slot: usize,
        role: impl FnOnce() -> Role,
    ) -> Result<&mut Binding, RenderError> {
        let entry = self.bindings.get_mut(slot).ok_or_else(|| {
            RenderError::Classification(format!("slot {slot} is outside the binding table"))
        })?;
        Ok(entry.get_or_insert_with(|| Binding::new(role())))
    }

    /// Record `node` as a root of `slot`, with the subscription driving it.
    fn bind(
        &mut self,
        slot: usize,
        role: impl FnOnce() -> Role,
        node: &Node,
        handle: Option<SubscriptionHandle>,
    ) -> Result<&mut Binding, RenderError> {
        let owner = self.owner;
        let binding = self.record(slot, role)?;
        binding.push_root(node.clone(), owner);
        if let Some(handle) = handle {
            binding.push_sub(handle, owner);
        }
        Ok(binding)
    }
}

/// Children context handed to a component rendered from a slot: the markup
/// written between its tags and the slots of the invoking component it uses.
pub struct Projection<'a> {
    pub(crate) tree: Rc<[Tree]>,
    pub(crate) slots: Slots<'a>,
    /// Where the children's slots begin. Expansion never advances it, so
    /// several placeholders can show the same content.
    pub(crate) slot: usize,
}

/// Scope keys collected by a component and the elements that carry them.
#[derive(Default)]
pub(crate) struct StyleScope {
    pub(crate) keys: Vec<String>,
    pub(crate) elements: Vec<Node>,
}

impl StyleScope {
    pub(crate) fn adopt(&mut self, el: &Node) {
        for key in &self.keys {
            el.add_class(key);
        }
        self.elements.push(el.clone());
    }

    pub(crate) fn add_key(&mut self, key: &str) {
        if self.keys.iter().any(|k| k == key) {
            return;
        }
        for el in &self.elements {
            el.add_class(key);
        }
        self.keys.push(key.to_string());
    }

    pub(crate) fn remove_key(&mut self, key: &str) {
        self.keys.retain(|k| k != key);
        for el in &self.elements {
            el.remove_class(key);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.keys.clear();
        self.elements.clear();
    }
}

fn is_children_leaf(leaf: &Tree, arg: Option<&Arg>) -> bool {
    if leaf.is_children_placeholder() {
        return true;
    }
    !leaf.is_text
        && leaf.tag == Tag::Dynamic
        && matches!(arg, Some(Arg::Text(t)) if t == CHILDREN_TAG)
}

/// Renders trees into nodes on behalf of one component.
pub(crate) struct Instantiator<'s> {
    pub(crate) style: &'s mut StyleScope,
}

impl Instantiator<'_> {
    fn element(&mut self, tag: &str) -> Node {
        let el = create_element(tag);
        self.style.adopt(&el);
        el
    }

    /// Walk `trees` depth first, consuming slots of `table` from `slot`.
    /// Returns the top-level nodes and the slot after the last one consumed.
    pub(crate) fn instantiate(
        &mut self,
        trees: &[Tree],
        mut children: Option<&mut Projection<'_>>,
        table: &mut Slots<'_>,
        mut slot: usize,
    ) -> Result<(Vec<Node>, usize), RenderError> {
        let mut out = Vec::new();
        for leaf in trees {
            if is_children_leaf(leaf, table.args.get(slot)) {
                if !leaf.attributes.is_empty() || !leaf.children.is_empty() {
                    return Err(RenderError::Structural(format!(
                        "<{CHILDREN_TAG}/> must be a leaf without attributes ({} attributes, {} children)",
                        leaf.attributes.len(),
                        leaf.children.len()
                    )));
                }
                match children.as_deref_mut() {
                    Some(proj) => {
                        let tree = proj.tree.clone();
                        let start = proj.slot;
                        trace!(start, nodes = tree.len(), "projecting children");
                        let (nodes, _) = self.instantiate(&tree, None, &mut proj.slots, start)?;
                        out.extend(nodes);
                    }
                    None => debug!("children placeholder without children"),
                }
                if leaf.tag == Tag::Dynamic {
                    slot += 1;
                }
                continue;
            }

            match &leaf.tag {
                Tag::Static(name) if leaf.is_text => out.push(create_text(name.as_str())),
                Tag::Static(name) => {
                    let el = self.element(name);
                    slot = self.attributes(&el, leaf, table, slot)?;
                    slot = self.children(&el, leaf, children.as_deref_mut(), table, slot)?;
                    out.push(el);
                }
                Tag::Dynamic => {
                    let args = table.args;
                    let arg = table.arg(slot)?;
                    match Kind::of(arg) {
                        Kind::Component | Kind::ComponentList => {
                            let comps = arg.components(slot)?;
                            out.extend(self.component_leaf(leaf, &comps, table, slot)?);
                            slot += leaf.slots;
                        }
                        Kind::Reactive | Kind::Text => {
                            let value = args[slot].literal();
                            let node = if leaf.is_text {
                                create_text(value)
                            } else {
                                self.element(&value)
                            };
                            let role = || if leaf.is_text { Role::Text } else { Role::TagName };
                            let handle = match &args[slot] {
                                Arg::Reactive(r) => {
                                    let target = role()
                                        .target(&node)
                                        .unwrap_or_else(|| Target::text(node.clone()));
                                    Some(table.subs.append(r.clone().subscribe(target)))
                                }
                                _ => None,
                            };
                            table.bind(slot, role, &node, handle)?;
                            slot += 1;
                            if !leaf.is_text {
                                slot = self.attributes(&node, leaf, table, slot)?;
                                slot =
                                    self.children(&node, leaf, children.as_deref_mut(), table, slot)?;
                            }
                            out.push(node);
                        }
                        kind @ (Kind::Handler | Kind::Ref | Kind::Css) => {
                            return Err(RenderError::Classification(format!(
                                "slot {slot}: a {kind} cannot be used as a tag name or text"
                            )));
                        }
                    }
                }
            }
        }
        Ok((out, slot))
    }

    fn children(
        &mut self,
        el: &Node,
        leaf: &Tree,
        children: Option<&mut Projection<'_>>,
        table: &mut Slots<'_>,
        slot: usize,
    ) -> Result<usize, RenderError> {
        if leaf.children.is_empty() {
            return Ok(slot);
        }
        let (nodes, next) = self.instantiate(&leaf.children, children, table, slot)?;
        el.append_all(&nodes);
        Ok(next)
    }

    /// Render the component(s) in `slot` after a fresh anchor. The leaf's
    /// attribute slots are recorded without roots; its children are handed
    /// to the components as their projection.
    fn component_leaf(
        &mut self,
        leaf: &Tree,
        comps: &[Component],
        table: &mut Slots<'_>,
        slot: usize,
    ) -> Result<Vec<Node>, RenderError> {
        let mut next = slot + 1;
        for (name, value) in &leaf.attributes {
            if *value == AttrValue::Dynamic {
                table.record(next, || Role::Attribute { name: name.clone() })?;
                next += 1;
            }
        }
        let children_slot = next;
        let children_slots = leaf.slots - (children_slot - slot);
        let anchor = create_anchor();
        let mut out = vec![anchor.clone()];
        {
            let mut proj = Projection {
                tree: leaf.children.clone(),
                slots: table.reborrow(),
                slot: children_slot,
            };
            for c in comps {
                proj.slots.owner = Some(c.id());
                out.extend(c.render(Some(&mut proj)));
            }
        }
        debug!(slot, components = comps.len(), "rendered component slot");
        let role = || Role::Component {
            children: leaf.children.clone(),
            children_slot,
            children_slots,
        };
        table.bind(slot, role, &anchor, None)?;
        Ok(out)
    }

    fn attributes(
        &mut self,
        el: &Node,
        leaf: &Tree,
        table: &mut Slots<'_>,
        mut slot: usize,
    ) -> Result<usize, RenderError> {
        for (name, value) in &leaf.attributes {
            match value {
                AttrValue::Static(v) => el.set_attribute(name, v),
                AttrValue::Dynamic => {
                    self.attribute(el, name, table, slot)?;
                    slot += 1;
                }
            }
        }
        Ok(slot)
    }

    fn attribute(
        &mut self,
        el: &Node,
        name: &str,
        table: &mut Slots<'_>,
        slot: usize,
    ) -> Result<(), RenderError> {
        let arg = table.arg(slot)?;
        let kind = Kind::of(arg);
        trace!(slot, attribute = name, %kind, "binding attribute");
        let mut handle: Option<SubscriptionHandle> = None;
        let role = match arg {
            Arg::Reactive(r) => {
                el.set_attribute(name, &r.snapshot());
                let target = Target::attribute(el.clone(), name);
                handle = Some(table.subs.append(r.clone().subscribe(target)));
                Role::Attribute {
                    name: name.to_string(),
                }
            }
            Arg::Handler(h) => {
                let Some(event) = name.strip_prefix('@') else {
                    return Err(RenderError::Classification(format!(
                        "slot {slot}: event handler bound to `{name}`, which has no `@` prefix"
                    )));
                };
                let id = el.add_event_listener(event, h.clone());
                let role = || Role::Event {
                    attribute: name.to_string(),
                    event: event.to_string(),
                    listeners: Vec::new(),
                };
                let binding = table.bind(slot, role, el, None)?;
                if let Role::Event { listeners, .. } = &mut binding.role {
                    listeners.push((el.clone(), id));
                }
                return Ok(());
            }
            Arg::Ref(r) if kind == Kind::Ref => {
                r.bind(el.clone());
                Role::Ref {
                    attribute: name.to_string(),
                }
            }
            Arg::Css(css) => {
                self.style.add_key(css.key());
                Role::Css {
                    attribute: name.to_string(),
                    key: css.key().to_string(),
                }
            }
            Arg::Component(_) | Arg::List(_) if kind.is_component() => {
                return Err(RenderError::Classification(format!(
                    "slot {slot}: a {kind} cannot be an attribute value of `{name}`"
                )));
            }
            other => {
                el.set_attribute(name, &other.literal());
                Role::Attribute {
                    name: name.to_string(),
                }
            }
        };
        table.bind(slot, || role, el, handle)?;
        Ok(())
    }
}

/// Log a slot count mismatch between a template and its arguments.
pub(crate) fn check_arity(trees: &[Tree], args: usize) {
    let slots: usize = trees.iter().map(|t| t.slots).sum();
    if slots != args {
        warn!(slots, args, "argument count does not match the template's slots");
    }
}
