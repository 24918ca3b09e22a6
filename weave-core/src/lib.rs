//! Reactive primitives: signals, effects, node refs and lifecycle hooks.

pub mod lifecycle;
pub mod node_ref;
pub mod reactive;
pub mod signal;
pub mod watch;

pub use node_ref::NodeRef;
pub use reactive::{Reactive, Unsubscribe, same_reactive};
pub use signal::{Effect, EffectHandle, Signal, effect};
pub use watch::watch;
