//! Live host nodes: elements and text with attributes, listeners and sibling
//! insertion, plus HTML serialisation and value snapshots.

mod event;
mod html;
mod node;
mod snapshot;
mod target;

pub use event::{Event, Handler, ListenerId, handler};
pub use html::{HtmlOptions, VOID_ELEMENTS, is_void, to_html};
pub use node::{Node, create_anchor, create_element, create_text};
pub use snapshot::{Snapshot, h, text};
pub use target::{Target, TargetRole};
