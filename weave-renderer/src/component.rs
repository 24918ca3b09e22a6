use std::cell::{Cell, RefCell};
use std::error::Error;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, debug_span, error, trace, warn};
use weave_core::lifecycle::{self, Hooks};
use weave_dom::{HtmlOptions, Node, to_html};
use weave_template::{ParseError, Tree, TreeCache, default_cache};

use crate::arg::Arg;
use crate::binding::{BindingKind, Role, Table, empty_table};
use crate::error::RenderError;
use crate::instantiate::{Instantiator, Projection, Slots, StyleScope, check_arity};
use crate::subscription::Subscriptions;
use crate::update::Patch;

/// An instance of a template together with its arguments.
///
/// `Component` is a shared handle; clones refer to the same instance. The
/// parsed tree is shared with every other instance of the same template, the
/// arguments, bindings and nodes are not.
#[derive(Clone)]
pub struct Component(Rc<Shared>);

/// Stable identity of one component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ComponentId(u64);

thread_local! {
    static NEXT_COMPONENT: Cell<u64> = const { Cell::new(1) };
}

impl ComponentId {
    fn next() -> Self {
        NEXT_COMPONENT.with(|n| {
            let id = n.get();
            n.set(id + 1);
            ComponentId(id)
        })
    }
}

struct Shared {
    id: ComponentId,
    tree: Result<Rc<[Tree]>, ParseError>,
    state: RefCell<State>,
    hooks: RefCell<Hooks>,
}

struct State {
    args: Vec<Arg>,
    bindings: Table,
    subs: Subscriptions,
    style: StyleScope,
    root: Option<Vec<Node>>,
    disposed: bool,
}

impl State {
    fn unbind_all(&mut self) {
        for (slot, entry) in self.bindings.iter_mut().enumerate() {
            let Some(binding) = entry.as_mut() else {
                continue;
            };
            binding.unbind(&mut self.subs);
            if let (Role::Ref { .. }, Some(Arg::Ref(r))) = (&binding.role, self.args.get(slot)) {
                r.clear();
            }
        }
    }

    /// Forget everything a failed render recorded.
    fn reset(&mut self) {
        self.unbind_all();
        for entry in &mut self.bindings {
            *entry = None;
        }
        for unsubscribe in self.subs.drain() {
            unsubscribe.call();
        }
        self.style.clear();
    }
}

fn held_components(args: &[Arg]) -> Vec<Component> {
    args.iter()
        .flat_map(|arg| match arg {
            Arg::Component(c) => vec![c.clone()],
            Arg::List(items) => items
                .iter()
                .filter_map(|item| match item {
                    Arg::Component(c) => Some(c.clone()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        })
        .collect()
}

impl Component {
    /// Build from template parts using the thread's default cache.
    ///
    /// A template that fails to parse still yields a component; it reports
    /// the parse error to its error callbacks each time it is rendered.
    pub fn new<S: AsRef<str>>(parts: &[S], args: Vec<Arg>) -> Self {
        Self::with_cache(&default_cache(), parts, args)
    }

    pub fn try_new<S: AsRef<str>>(parts: &[S], args: Vec<Arg>) -> Result<Self, ParseError> {
        let tree = default_cache().get_or_parse(parts)?;
        Ok(Self::from_tree(tree, args))
    }

    pub fn with_cache<S: AsRef<str>>(cache: &TreeCache, parts: &[S], args: Vec<Arg>) -> Self {
        match cache.get_or_parse(parts) {
            Ok(tree) => Self::from_tree(tree, args),
            Err(err) => {
                warn!(%err, "template failed to parse; the component will render nothing");
                Self::build(Err(err), args)
            }
        }
    }

    pub fn from_tree(tree: Rc<[Tree]>, args: Vec<Arg>) -> Self {
        check_arity(&tree, args.len());
        Self::build(Ok(tree), args)
    }

    fn build(tree: Result<Rc<[Tree]>, ParseError>, args: Vec<Arg>) -> Self {
        let state = State {
            bindings: empty_table(args.len()),
            args,
            subs: Subscriptions::new(),
            style: StyleScope::default(),
            root: None,
            disposed: false,
        };
        Component(Rc::new(Shared {
            id: ComponentId::next(),
            tree,
            state: RefCell::new(state),
            hooks: RefCell::new(Hooks::default()),
        }))
    }

    /// Instantiate the template on first call and return its top-level
    /// nodes; later calls return the same nodes. `children` is the markup
    /// the invoking component wrote between this component's tags.
    ///
    /// Errors are reported to the error callbacks and yield no nodes.
    pub fn render(&self, children: Option<&mut Projection<'_>>) -> Vec<Node> {
        let span = debug_span!("render", component = ?self);
        let _guard = span.enter();
        match self.instantiate(children) {
            Ok(Some(nodes)) => {
                let mounted = self.0.hooks.borrow().mounted.clone();
                for hook in mounted {
                    hook();
                }
                nodes
            }
            Ok(None) => Vec::new(),
            Err(err) => {
                self.report(&err);
                Vec::new()
            }
        }
    }

    fn instantiate(
        &self,
        children: Option<&mut Projection<'_>>,
    ) -> Result<Option<Vec<Node>>, RenderError> {
        let tree = self.0.tree.clone()?;
        let mut state = self
            .0
            .state
            .try_borrow_mut()
            .map_err(|_| RenderError::Busy)?;
        if state.disposed {
            warn!("render called on a disposed component");
            return Ok(None);
        }
        if let Some(root) = &state.root {
            trace!(nodes = root.len(), "already rendered");
            return Ok(Some(root.clone()));
        }

        let State {
            args,
            bindings,
            subs,
            style,
            ..
        } = &mut *state;
        let mut table = Slots {
            args: args.as_slice(),
            bindings: bindings.as_mut_slice(),
            subs,
            owner: None,
        };
        let result = Instantiator { style }.instantiate(&tree, children, &mut table, 0);
        match result {
            Ok((nodes, next)) => {
                if next != args.len() {
                    debug!(consumed = next, args = args.len(), "not every argument was used");
                }
                state.root = Some(nodes.clone());
                Ok(Some(nodes))
            }
            Err(err) => {
                state.reset();
                Err(err)
            }
        }
    }

    /// Patch the rendered nodes to reflect `args` and return the slots that
    /// changed. Errors are reported to the error callbacks and yield an empty
    /// change set.
    pub fn update(&self, args: Vec<Arg>) -> Vec<usize> {
        let span = debug_span!("update", component = ?self);
        let _guard = span.enter();
        match self.patch(args) {
            Ok(changed) => {
                debug!(changed = changed.len(), "update applied");
                changed
            }
            Err(err) => {
                self.report(&err);
                Vec::new()
            }
        }
    }

    fn patch(&self, new_args: Vec<Arg>) -> Result<Vec<usize>, RenderError> {
        let mut state = self
            .0
            .state
            .try_borrow_mut()
            .map_err(|_| RenderError::Busy)?;
        if state.disposed {
            warn!("update called on a disposed component");
            return Ok(Vec::new());
        }
        let State {
            args,
            bindings,
            subs,
            style,
            ..
        } = &mut *state;
        Patch {
            args,
            bindings: bindings.as_mut_slice(),
            subs,
            style,
        }
        .run(new_args)
    }

    /// Unsubscribe everything, dispose nested components, detach the root
    /// nodes and run the dispose callbacks. Later calls do nothing.
    pub fn dispose(&self) {
        let Ok(mut state) = self.0.state.try_borrow_mut() else {
            self.report(&RenderError::Busy);
            return;
        };
        if state.disposed {
            trace!("already disposed");
            return;
        }
        state.disposed = true;

        let unsubscribes = state.subs.drain();
        state.unbind_all();
        let nested = held_components(&state.args);
        let root = state.root.take().unwrap_or_default();
        for node in &root {
            node.remove();
        }
        state.style.clear();
        drop(state);

        debug!(
            subscriptions = unsubscribes.len(),
            nested = nested.len(),
            nodes = root.len(),
            "disposing component"
        );
        for unsubscribe in unsubscribes {
            unsubscribe.call();
        }
        for c in &nested {
            c.dispose();
        }
        let destroyed = self.0.hooks.borrow().destroyed.clone();
        for hook in destroyed {
            hook();
        }
    }

    pub fn on_mount(self, f: impl Fn() + 'static) -> Self {
        self.0.hooks.borrow_mut().mounted.push(Rc::new(f));
        self
    }

    pub fn on_dispose(self, f: impl Fn() + 'static) -> Self {
        self.0.hooks.borrow_mut().destroyed.push(Rc::new(f));
        self
    }

    pub fn on_error(self, f: impl Fn(&(dyn Error + 'static)) + 'static) -> Self {
        self.0.hooks.borrow_mut().errors.push(Rc::new(f));
        self
    }

    /// Add hooks collected elsewhere to this component's own.
    pub fn attach(&self, hooks: Hooks) {
        let mut own = self.0.hooks.borrow_mut();
        own.mounted.extend(hooks.mounted);
        own.destroyed.extend(hooks.destroyed);
        own.errors.extend(hooks.errors);
    }

    fn report(&self, err: &RenderError) {
        error!(%err, component = ?self, "component failed");
        let hooks = self.0.hooks.borrow().errors.clone();
        let err: &(dyn Error + 'static) = err;
        for hook in hooks {
            hook(err);
        }
    }

    /// Whether both instances were built from the same cached tree.
    pub fn is_equal_to(&self, other: &Component) -> bool {
        match (&self.0.tree, &other.0.tree) {
            (Ok(a), Ok(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn id(&self) -> ComponentId {
        self.0.id
    }

    pub fn ptr_eq(a: &Component, b: &Component) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub fn tree(&self) -> Result<Rc<[Tree]>, ParseError> {
        self.0.tree.clone()
    }

    /// Current arguments. Empty while the component is rendering or updating.
    pub fn args(&self) -> Vec<Arg> {
        match self.0.state.try_borrow() {
            Ok(state) => state.args.clone(),
            Err(_) => {
                warn!(component = ?self, "arguments requested while the component is busy");
                Vec::new()
            }
        }
    }

    pub fn root(&self) -> Option<Vec<Node>> {
        self.0.state.try_borrow().ok()?.root.clone()
    }

    /// A busy component counts as rendered.
    pub fn is_rendered(&self) -> bool {
        self.0
            .state
            .try_borrow()
            .map_or(true, |state| state.root.is_some())
    }

    pub fn is_disposed(&self) -> bool {
        self.0
            .state
            .try_borrow()
            .map_or(false, |state| state.disposed)
    }

    pub fn subscription_count(&self) -> usize {
        self.0.state.try_borrow().map_or(0, |state| state.subs.len())
    }

    /// Role of every slot, `None` for slots that were not bound.
    pub fn bindings(&self) -> Vec<Option<BindingKind>> {
        self.0.state.try_borrow().map_or_else(
            |_| Vec::new(),
            |state| {
                state
                    .bindings
                    .iter()
                    .map(|b| b.as_ref().map(|b| b.role.kind()))
                    .collect()
            },
        )
    }

    /// Serialise the rendered nodes. Empty before the first render.
    pub fn html(&self) -> String {
        self.html_with(HtmlOptions::default())
    }

    pub fn html_with(&self, opts: HtmlOptions) -> String {
        to_html(self.root().unwrap_or_default().iter(), opts)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({:p})", Rc::as_ptr(&self.0))
    }
}

/// Run `factory` and attach every hook it registered through
/// [`weave_core::lifecycle`] to the component it returns.
pub fn use_lifecycle(factory: impl FnOnce() -> Component) -> Component {
    let (component, hooks) = lifecycle::collect(factory);
    if !hooks.is_empty() {
        component.attach(hooks);
    }
    component
}
