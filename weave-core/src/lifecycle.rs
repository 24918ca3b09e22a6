// weave-core/src/lifecycle.rs
use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use tracing::warn;

pub type Hook = Rc<dyn Fn()>;
pub type ErrorHook = Rc<dyn Fn(&(dyn Error + 'static))>;

/// Hooks registered while a component factory ran.
#[derive(Default, Clone)]
pub struct Hooks {
    pub mounted: Vec<Hook>,
    pub destroyed: Vec<Hook>,
    pub errors: Vec<ErrorHook>,
}

impl Hooks {
    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty() && self.destroyed.is_empty() && self.errors.is_empty()
    }
}

thread_local! {
    static FRAMES: RefCell<Vec<Hooks>> = const { RefCell::new(Vec::new()) };
}

fn register(what: &str, f: impl FnOnce(&mut Hooks)) {
    FRAMES.with(|frames| match frames.borrow_mut().last_mut() {
        Some(frame) => f(frame),
        None => warn!(hook = what, "lifecycle hook registered outside of a component factory"),
    });
}

/// Register a hook to run every time the component renders
pub fn on_mounted(f: impl Fn() + 'static) {
    register("mounted", |h| h.mounted.push(Rc::new(f)));
}

/// Register a hook to run when the component is disposed
pub fn before_destroy(f: impl Fn() + 'static) {
    register("destroy", |h| h.destroyed.push(Rc::new(f)));
}

/// Register a hook to receive render and update errors
pub fn on_error(f: impl Fn(&(dyn Error + 'static)) + 'static) {
    register("error", |h| h.errors.push(Rc::new(f)));
}

/// Run `f`, collecting every hook it registers. Frames nest, so a factory
/// that builds child components only collects its own hooks.
pub fn collect<R>(f: impl FnOnce() -> R) -> (R, Hooks) {
    FRAMES.with(|frames| frames.borrow_mut().push(Hooks::default()));
    let out = f();
    let hooks = FRAMES.with(|frames| frames.borrow_mut().pop()).unwrap_or_default();
    (out, hooks)
}
