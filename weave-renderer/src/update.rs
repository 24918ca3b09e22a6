//! Patching a rendered component in place.
//!
//! An update runs in three phases. Phase one compares old and new arguments
//! slot by slot in ascending order, reconciles components and re-binds slots
//! whose category changed. Phase two writes the new values of every changed
//! non-component slot into its roots. Phase three renders the changed
//! component slots in strictly descending slot order and places their nodes
//! after the slot's last anchor.

use std::ops::Range;
use std::rc::Rc;

use tracing::{debug, trace, warn};
use weave_dom::Node;

use crate::arg::{Arg, Kind, components_in};
use crate::binding::{Binding, Position, Role};
use crate::component::ComponentId;
use crate::error::RenderError;
use crate::instantiate::{Projection, Slots, StyleScope};
use crate::subscription::Subscriptions;

pub(crate) struct Patch<'a> {
    pub(crate) args: &'a mut Vec<Arg>,
    pub(crate) bindings: &'a mut [Option<Binding>],
    pub(crate) subs: &'a mut Subscriptions,
    pub(crate) style: &'a mut StyleScope,
}

impl Patch<'_> {
    /// Apply `new_args`, returning the slots whose value changed.
    pub(crate) fn run(&mut self, new_args: Vec<Arg>) -> Result<Vec<usize>, RenderError> {
        if new_args.len() != self.args.len() {
            return Err(RenderError::Classification(format!(
                "update expects {} arguments, got {}",
                self.args.len(),
                new_args.len()
            )));
        }
        let changed = self.classify(new_args)?;
        let deferred = self.patch_nodes(&changed);
        self.patch_components(&deferred)?;
        Ok(changed)
    }

    fn classify(&mut self, new_args: Vec<Arg>) -> Result<Vec<usize>, RenderError> {
        let mut changed = Vec::new();
        for (slot, new) in new_args.into_iter().enumerate() {
            if self.args[slot].same(&new) {
                continue;
            }
            changed.push(slot);
            let old_kind = self.args[slot].kind();
            let new_kind = new.kind();
            trace!(slot, from = %old_kind, to = %new_kind, "slot changed");

            if old_kind == Kind::Component && new_kind == Kind::Component {
                let mut disposed = Vec::new();
                if let (Arg::Component(old), Arg::Component(next)) = (&mut self.args[slot], &new) {
                    if old.is_equal_to(next) {
                        old.update(next.args());
                    } else {
                        old.dispose();
                        disposed.push(old.id());
                        *old = next.clone();
                    }
                }
                self.release_disposed(slot, &disposed);
                continue;
            }
            if old_kind == Kind::ComponentList && new_kind == Kind::ComponentList {
                let mut disposed = Vec::new();
                if let (Arg::List(old), Arg::List(next)) = (&mut self.args[slot], &new) {
                    disposed = reconcile_list(slot, old, next)?;
                }
                self.release_disposed(slot, &disposed);
                continue;
            }
            self.rebind(slot, &new)?;
            self.args[slot] = new;
        }
        Ok(changed)
    }

    /// Tear down the old binding of `slot` and install one for `new`.
    fn rebind(&mut self, slot: usize, new: &Arg) -> Result<(), RenderError> {
        let Some(binding) = self.bindings.get_mut(slot).and_then(Option::as_mut) else {
            trace!(slot, "slot has no binding; storing the value");
            return Ok(());
        };
        let role = next_role(slot, &binding.position, new)?;

        binding.unbind(self.subs);
        let mut disposed = Vec::new();
        match (&binding.role, &self.args[slot]) {
            (Role::Ref { .. }, Arg::Ref(r)) => r.clear(),
            (Role::Css { key, .. }, _) => self.style.remove_key(key),
            (
                Role::Component {
                    children_slot,
                    children_slots,
                    ..
                },
                old,
            ) => {
                let range = *children_slot..*children_slot + *children_slots;
                for c in old.components(slot).unwrap_or_default() {
                    c.dispose();
                    disposed.push((range.clone(), c.id()));
                }
            }
            _ => {}
        }

        if let Some(role) = role {
            binding.role = role;
            // An attribute's element belongs to the enclosing markup; the
            // component is placed after it instead of in its stead.
            if matches!(binding.role, Role::Component { .. })
                && !matches!(binding.position, Position::Attribute(_))
            {
                binding.roots_to_anchors();
            }
        }
        if let Arg::Reactive(r) = new {
            binding.subscribe_roots(r, self.subs);
        }
        for (range, owner) in disposed {
            self.release_projected(range, owner);
        }
        Ok(())
    }

    /// Release what the projections of `disposed` recorded for the
    /// component slot `slot`.
    fn release_disposed(&mut self, slot: usize, disposed: &[ComponentId]) {
        let Some(Some(Binding {
            role:
                Role::Component {
                    children_slot,
                    children_slots,
                    ..
                },
            ..
        })) = self.bindings.get(slot)
        else {
            return;
        };
        let range = *children_slot..*children_slot + *children_slots;
        for &owner in disposed {
            self.release_projected(range.clone(), owner);
        }
    }

    fn release_projected(&mut self, range: Range<usize>, owner: ComponentId) {
        let subs = &mut *self.subs;
        let Some(projected) = self.bindings.get_mut(range) else {
            return;
        };
        let mut released = 0;
        for binding in projected.iter_mut().flatten() {
            released += binding.release_owner(owner, subs);
        }
        trace!(?owner, released, "released projected children");
    }

    fn patch_nodes(&mut self, changed: &[usize]) -> Vec<usize> {
        let mut deferred = Vec::new();
        for &slot in changed {
            let Some(binding) = self.bindings.get_mut(slot).and_then(Option::as_mut) else {
                continue;
            };
            let arg = &self.args[slot];
            let roots = &binding.roots;
            match &mut binding.role {
                Role::Component { .. } => deferred.push(slot),
                Role::Event {
                    event, listeners, ..
                } => {
                    if let Arg::Handler(h) = arg {
                        for root in roots {
                            listeners.push((root.clone(), root.add_event_listener(event, h.clone())));
                        }
                    }
                }
                Role::Attribute { name } => {
                    let value = arg.literal();
                    for root in roots {
                        root.set_attribute(name, &value);
                    }
                }
                Role::Text => {
                    let value = arg.literal();
                    for root in roots {
                        root.set_text(&value);
                    }
                }
                Role::TagName => {
                    let value = arg.literal();
                    for root in roots {
                        if !root.retag(&value) {
                            root.set_text(&value);
                        }
                    }
                }
                Role::Ref { .. } => {
                    if let (Arg::Ref(r), Some(last)) = (arg, roots.last()) {
                        r.bind(last.clone());
                    }
                }
                Role::Css { key, .. } => self.style.add_key(key),
            }
        }
        deferred
    }

    fn patch_components(&mut self, deferred: &[usize]) -> Result<(), RenderError> {
        for &slot in deferred.iter().rev() {
            let comps = self.args[slot].components(slot)?;
            let Some(Some(binding)) = self.bindings.get(slot) else {
                continue;
            };
            let Role::Component {
                children,
                children_slot,
                ..
            } = &binding.role
            else {
                continue;
            };
            let tree = Rc::clone(children);
            let start = *children_slot;
            let Some(anchor) = binding.roots.last().cloned() else {
                // Its anchors went away with a replaced host, whose fresh
                // projection renders the slot again.
                debug!(slot, "component slot has no anchor; left to its host");
                continue;
            };

            let mut proj = Projection {
                tree,
                slots: Slots {
                    args: self.args.as_slice(),
                    bindings: &mut *self.bindings,
                    subs: &mut *self.subs,
                    owner: None,
                },
                slot: start,
            };
            let mut nodes: Vec<Node> = Vec::new();
            for c in &comps {
                proj.slots.owner = Some(c.id());
                nodes.extend(c.render(Some(&mut proj)));
            }
            debug!(slot, nodes = nodes.len(), "re-rendered component slot");
            if !anchor.insert_after(&nodes) {
                warn!(slot, "component slot anchor is detached; nodes were not placed");
            }
        }
        Ok(())
    }
}

/// The role `slot` takes when its value becomes `new`, given where the slot
/// sits. `None` keeps the current role.
fn next_role(slot: usize, position: &Position, new: &Arg) -> Result<Option<Role>, RenderError> {
    let kind = new.kind();
    let role = match (kind, position) {
        (Kind::Component | Kind::ComponentList, Position::Component) => return Ok(None),
        (Kind::Component | Kind::ComponentList, _) => {
            Role::Component {
                children: Rc::from([]),
                children_slot: slot + 1,
                children_slots: 0,
            }
        }
        (Kind::Reactive | Kind::Text, Position::Text) => Role::Text,
        (Kind::Reactive | Kind::Text, Position::Tag) => Role::TagName,
        (Kind::Reactive | Kind::Text, Position::Attribute(name)) => Role::Attribute {
            name: name.clone(),
        },
        (Kind::Handler, Position::Attribute(name)) if name.starts_with('@') => Role::Event {
            attribute: name.clone(),
            event: name[1..].to_string(),
            listeners: Vec::new(),
        },
        (Kind::Ref, Position::Attribute(name)) => Role::Ref {
            attribute: name.clone(),
        },
        (Kind::Css, Position::Attribute(name)) => Role::Css {
            attribute: name.clone(),
            key: match new {
                Arg::Css(c) => c.key().to_string(),
                _ => String::new(),
            },
        },
        (kind, position) => {
            return Err(RenderError::Classification(format!(
                "slot {slot}: cannot rebind a {} slot to a {kind}",
                describe(position)
            )));
        }
    };
    Ok(Some(role))
}

fn describe(position: &Position) -> String {
    match position {
        Position::Component => "component".to_string(),
        Position::Tag => "tag name".to_string(),
        Position::Text => "text".to_string(),
        Position::Attribute(name) => format!("`{name}` attribute"),
    }
}

/// Keep old components whose template matches their replacement, replace the
/// rest, dispose the excess and append new tails unrendered. Returns the
/// components that were disposed.
fn reconcile_list(
    slot: usize,
    old: &mut Vec<Arg>,
    next: &[Arg],
) -> Result<Vec<ComponentId>, RenderError> {
    let old_comps = components_in(old, slot)?;
    let next_comps = components_in(next, slot)?;
    let shared = old_comps.len().min(next_comps.len());
    let mut disposed = Vec::new();

    for (j, (o, n)) in old_comps.iter().zip(&next_comps).enumerate() {
        if o.is_equal_to(n) {
            o.update(n.args());
        } else {
            o.dispose();
            disposed.push(o.id());
            old[j] = Arg::Component(n.clone());
        }
    }
    for o in &old_comps[shared..] {
        o.dispose();
        disposed.push(o.id());
    }
    old.truncate(shared);
    old.extend(next_comps[shared..].iter().cloned().map(Arg::Component));
    debug!(slot, kept = shared, len = old.len(), "reconciled component list");
    Ok(disposed)
}
