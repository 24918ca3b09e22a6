use std::fmt;
use std::rc::Rc;

use weave_dom::Target;

/// A value that can drive part of a node.
///
/// The renderer writes [`snapshot`](Reactive::snapshot) into the node when it
/// is created and then hands the [`Target`] over; from then on the primitive
/// patches that node by itself until the returned [`Unsubscribe`] is called.
pub trait Reactive {
    /// Current value as text.
    fn snapshot(&self) -> String;

    fn subscribe(self: Rc<Self>, target: Target) -> Unsubscribe;
}

/// Detaches one subscription. Dropping it without calling leaves the
/// subscription in place.
pub struct Unsubscribe(Box<dyn FnOnce()>);

impl Unsubscribe {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Unsubscribe(Box::new(f))
    }

    pub fn noop() -> Self {
        Unsubscribe(Box::new(|| {}))
    }

    pub fn call(self) {
        (self.0)()
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Unsubscribe")
    }
}

/// Identity of a type-erased reactive handle.
pub fn same_reactive(a: &Rc<dyn Reactive>, b: &Rc<dyn Reactive>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}
