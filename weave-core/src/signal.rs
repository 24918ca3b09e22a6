// weave-core/src/signal.rs

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt::Display;
use std::rc::{Rc, Weak};

use tracing::trace;
use weave_dom::Target;

use crate::reactive::{Reactive, Unsubscribe};

struct EffectCell {
    func: RefCell<Box<dyn FnMut()>>,
    active: Cell<bool>,
}

type EffectRc = Rc<EffectCell>;

// Holds the currently running/collecting effect during dependency tracking.
thread_local! {
    static CURRENT_EFFECT: RefCell<Option<EffectRc>> = const { RefCell::new(None) };

    // Simple microtask-style scheduler queue and guards.
    static EFFECT_QUEUE: RefCell<Vec<EffectRc>> = const { RefCell::new(Vec::new()) };
    static QUEUED: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
    static IS_FLUSHING: Cell<bool> = const { Cell::new(false) };
}

fn ptr_id(rc: &EffectRc) -> usize {
    Rc::as_ptr(rc) as usize
}

fn enqueue_effect(eff: EffectRc) {
    EFFECT_QUEUE.with(|q| {
        QUEUED.with(|set| {
            if set.borrow_mut().insert(ptr_id(&eff)) {
                q.borrow_mut().push(eff);
            }
        });
    });
}

/// Run the effect body with `eff` as the collecting effect, restoring whatever
/// was collecting before. The body is moved out of its cell while it runs so
/// it may call `set()` and re-enqueue itself.
fn run_effect(eff: &EffectRc) {
    if !eff.active.get() {
        return;
    }
    let mut func: Box<dyn FnMut()> = std::mem::replace(&mut *eff.func.borrow_mut(), Box::new(|| {}));
    let previous = CURRENT_EFFECT.with(|cur| cur.replace(Some(eff.clone())));
    func();
    CURRENT_EFFECT.with(|cur| *cur.borrow_mut() = previous);
    *eff.func.borrow_mut() = func;
}

fn flush_queue() {
    // Effects scheduled during a flush are picked up by the outer flush.
    if IS_FLUSHING.with(|f| f.replace(true)) {
        return;
    }

    loop {
        let next = EFFECT_QUEUE.with(|q| q.borrow_mut().pop());
        let Some(eff) = next else { break };

        // Mark as not queued before running, so re-enqueues are allowed.
        QUEUED.with(|set| {
            set.borrow_mut().remove(&ptr_id(&eff));
        });
        run_effect(&eff);
    }

    IS_FLUSHING.with(|f| f.set(false));
}

struct SignalInner<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<EffectRc>>,
    targets: RefCell<Vec<(u64, Target)>>,
    next_target: Cell<u64>,
}

/// A reactive value.
///
/// `Signal` is a cheap handle: clones share one value. Reading with [`get`]
/// inside an [`effect`] subscribes that effect; [`set`] re-runs subscribed
/// effects and writes the new value into every bound node [`Target`].
///
/// [`get`]: Signal::get
/// [`set`]: Signal::set
pub struct Signal<T>(Rc<SignalInner<T>>);

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Signal(self.0.clone())
    }
}

impl<T> Signal<T>
where
    T: Clone,
{
    /// Create a new signal.
    pub fn new(initial: T) -> Self {
        Signal(Rc::new(SignalInner {
            value: RefCell::new(initial),
            subscribers: RefCell::new(Vec::new()),
            targets: RefCell::new(Vec::new()),
            next_target: Cell::new(0),
        }))
    }

    /// Read the value, and if inside an `effect`, register that effect as a subscriber.
    pub fn get(&self) -> T {
        CURRENT_EFFECT.with(|current| {
            if let Some(effect_rc) = current.borrow().as_ref() {
                let mut subs = self.0.subscribers.borrow_mut();
                if !subs.iter().any(|e| Rc::ptr_eq(e, effect_rc)) {
                    subs.push(effect_rc.clone());
                }
            }
        });
        self.peek()
    }

    /// Read the value without subscribing.
    pub fn peek(&self) -> T {
        self.0.value.borrow().clone()
    }

    /// Number of node targets currently bound to this signal.
    pub fn target_count(&self) -> usize {
        self.0.targets.borrow().len()
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl<T> Signal<T>
where
    T: Clone + Display + 'static,
{
    /// Replace the value with `f` applied to the current one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.0.value.borrow());
        self.set(next);
    }

    /// Update the value, patch bound targets, then notify effects via the scheduler.
    pub fn set(&self, new: T) {
        *self.0.value.borrow_mut() = new;
        let text = self.0.snapshot();

        // Snapshot targets and subscribers first; callbacks may subscribe or unsubscribe.
        let targets: Vec<Target> = self.0.targets.borrow().iter().map(|(_, t)| t.clone()).collect();
        trace!(targets = targets.len(), value = %text, "signal set");
        for target in &targets {
            target.apply(&text);
        }

        let subscribers = {
            let mut subs = self.0.subscribers.borrow_mut();
            subs.retain(|e| e.active.get());
            subs.clone()
        };
        for subscriber in subscribers {
            enqueue_effect(subscriber);
        }
        flush_queue();
    }

    /// Type-erased handle sharing this signal's identity.
    pub fn as_reactive(&self) -> Rc<dyn Reactive> {
        self.0.clone()
    }
}

impl<T> Reactive for SignalInner<T>
where
    T: Clone + Display + 'static,
{
    fn snapshot(&self) -> String {
        self.value.borrow().to_string()
    }

    fn subscribe(self: Rc<Self>, target: Target) -> Unsubscribe {
        let id = self.next_target.get();
        self.next_target.set(id + 1);
        self.targets.borrow_mut().push((id, target));
        let weak: Weak<Self> = Rc::downgrade(&self);
        Unsubscribe::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.targets.borrow_mut().retain(|(i, _)| *i != id);
            }
        })
    }
}

/// Handle to a registered effect.
#[derive(Clone)]
pub struct EffectHandle(EffectRc);

impl EffectHandle {
    /// Stop re-running. Signals drop stopped effects on their next `set`.
    pub fn stop(&self) {
        self.0.active.set(false);
    }

    pub fn is_active(&self) -> bool {
        self.0.active.get()
    }
}

/// Register a closure as a reactive effect:
/// - runs immediately to collect dependencies,
/// - then re-runs whenever any `Signal` it `get()`s is `set()`.
pub fn effect<F>(f: F) -> EffectHandle
where
    F: FnMut() + 'static,
{
    let eff = Rc::new(EffectCell {
        func: RefCell::new(Box::new(f)),
        active: Cell::new(true),
    });
    run_effect(&eff);
    EffectHandle(eff)
}

/// A value derived from signals, recomputed whenever one of them changes.
///
/// `compute` runs once untracked to seed the value and again under tracking
/// to collect its dependencies, so it should be free of side effects.
pub struct Effect<T> {
    state: Signal<T>,
    handle: EffectHandle,
}

impl<T> Clone for Effect<T> {
    fn clone(&self) -> Self {
        Effect {
            state: self.state.clone(),
            handle: self.handle.clone(),
        }
    }
}

impl<T> Effect<T>
where
    T: Clone + Display + 'static,
{
    pub fn new(compute: impl FnMut() -> T + 'static) -> Self {
        let compute = Rc::new(RefCell::new(compute));
        let seed = (compute.borrow_mut())();
        let state = Signal::new(seed);
        let handle = effect({
            let state = state.clone();
            move || {
                let next = (compute.borrow_mut())();
                state.set(next);
            }
        });
        Effect { state, handle }
    }

    /// Current value, tracked like [`Signal::get`].
    pub fn get(&self) -> T {
        self.state.get()
    }

    /// The signal holding the derived value.
    pub fn state(&self) -> &Signal<T> {
        &self.state
    }

    /// Stop recomputing; the last value stays readable.
    pub fn stop(&self) {
        self.handle.stop();
    }

    pub fn as_reactive(&self) -> Rc<dyn Reactive> {
        self.state.as_reactive()
    }
}
