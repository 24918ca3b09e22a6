use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::Node;

/// Callback installed on a node for one event name.
pub type Handler = Rc<dyn Fn(&Event)>;

/// An event delivered to the listeners of a single node.
#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    pub target: Node,
}

/// Identifies one installed listener so it can be removed again.
///
/// Closures cannot be compared, so removal goes through the id returned by
/// [`Node::add_event_listener`] instead of the handler itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

thread_local! {
    static NEXT_LISTENER: Cell<u64> = const { Cell::new(1) };
}

impl ListenerId {
    pub(crate) fn next() -> Self {
        NEXT_LISTENER.with(|n| {
            let id = n.get();
            n.set(id + 1);
            ListenerId(id)
        })
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) struct Listener {
    pub(crate) id: ListenerId,
    pub(crate) event: String,
    pub(crate) handler: Handler,
}

/// Wrap a closure as a [`Handler`].
pub fn handler(f: impl Fn(&Event) + 'static) -> Handler {
    Rc::new(f)
}
