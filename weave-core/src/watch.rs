use std::cell::RefCell;
use std::rc::Rc;

use crate::signal::{EffectHandle, effect};

/// Watch a reactive source and call `callback(new, old)` when it changes.
/// - Runs the source once to capture dependencies (no callback on first run)
/// - Triggers callback only when `new != old`
/// - Stops when the returned handle is stopped
///
/// Example:
/// watch(move || count.get(), |new, old| tracing::info!("{old} -> {new}"));
pub fn watch<T, S, F>(mut source: S, mut callback: F) -> EffectHandle
where
    T: PartialEq + Clone + 'static,
    S: FnMut() -> T + 'static,
    F: FnMut(&T, &T) + 'static,
{
    let prev: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));

    effect(move || {
        let next = source();
        // Release the borrow before user code so the callback can set signals.
        let old = prev.borrow_mut().replace(next.clone());
        if let Some(old) = old.filter(|old| *old != next) {
            callback(&next, &old);
        }
    })
}
