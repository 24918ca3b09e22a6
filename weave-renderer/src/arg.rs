use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use tracing::warn;
use weave_core::{Effect, NodeRef, Reactive, Signal, same_reactive};
use weave_dom::{Event, Handler};
use weave_style::ScopedCss;

use crate::component::Component;
use crate::error::RenderError;

/// A value interpolated into one template slot.
#[derive(Clone)]
pub enum Arg {
    Text(String),
    Reactive(Rc<dyn Reactive>),
    Component(Component),
    /// A component list when empty or when its first element is a component;
    /// otherwise literal text made of the elements' texts.
    List(Vec<Arg>),
    Handler(Handler),
    Ref(NodeRef),
    Css(ScopedCss),
}

/// Category of an argument, which decides how its slot is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Text,
    Reactive,
    Component,
    ComponentList,
    Handler,
    Ref,
    Css,
}

impl Kind {
    pub fn of(arg: &Arg) -> Kind {
        match arg {
            Arg::Text(_) => Kind::Text,
            Arg::Reactive(_) => Kind::Reactive,
            Arg::Component(_) => Kind::Component,
            Arg::List(items) => match items.first() {
                None | Some(Arg::Component(_)) => Kind::ComponentList,
                Some(_) => Kind::Text,
            },
            Arg::Handler(_) => Kind::Handler,
            // A ref that already points at an element is plain text.
            Arg::Ref(r) if r.is_bound() => Kind::Text,
            Arg::Ref(_) => Kind::Ref,
            Arg::Css(_) => Kind::Css,
        }
    }

    pub fn is_component(self) -> bool {
        matches!(self, Kind::Component | Kind::ComponentList)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Text => "text",
            Kind::Reactive => "reactive value",
            Kind::Component => "component",
            Kind::ComponentList => "component list",
            Kind::Handler => "event handler",
            Kind::Ref => "node ref",
            Kind::Css => "scoped css",
        })
    }
}

impl Arg {
    pub fn handler(f: impl Fn(&Event) + 'static) -> Self {
        Arg::Handler(Rc::new(f))
    }

    pub fn kind(&self) -> Kind {
        Kind::of(self)
    }

    /// Whether replacing `self` with `other` is a no-op.
    pub fn same(&self, other: &Arg) -> bool {
        match (self, other) {
            (Arg::Text(a), Arg::Text(b)) => a == b,
            (Arg::Reactive(a), Arg::Reactive(b)) => same_reactive(a, b),
            (Arg::Component(a), Arg::Component(b)) => Component::ptr_eq(a, b),
            (Arg::List(a), Arg::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same(y))
            }
            (Arg::Handler(a), Arg::Handler(b)) => Rc::ptr_eq(a, b),
            (Arg::Ref(a), Arg::Ref(b)) => NodeRef::ptr_eq(a, b),
            (Arg::Css(a), Arg::Css(b)) => a == b,
            _ => false,
        }
    }

    /// Text written into a node for this argument.
    pub fn literal(&self) -> String {
        match self {
            Arg::Text(s) => s.clone(),
            Arg::Reactive(r) => r.snapshot(),
            Arg::List(items) => items.iter().map(Arg::literal).collect(),
            Arg::Ref(_) => {
                warn!("node ref is already bound; rendering it as empty text");
                String::new()
            }
            Arg::Css(c) => c.key().to_string(),
            Arg::Component(_) | Arg::Handler(_) => String::new(),
        }
    }

    /// The components of a component or component list argument.
    pub(crate) fn components(&self, slot: usize) -> Result<Vec<Component>, RenderError> {
        match self {
            Arg::Component(c) => Ok(vec![c.clone()]),
            Arg::List(items) => components_in(items, slot),
            other => Err(RenderError::Classification(format!(
                "slot {slot}: expected a component, found a {}",
                other.kind()
            ))),
        }
    }
}

/// Every element of a component list, or an error naming the first element
/// that is not a component.
pub(crate) fn components_in(items: &[Arg], slot: usize) -> Result<Vec<Component>, RenderError> {
    items
        .iter()
        .map(|item| match item {
            Arg::Component(c) => Ok(c.clone()),
            other => Err(RenderError::Classification(format!(
                "slot {slot}: component list contains a {}",
                other.kind()
            ))),
        })
        .collect()
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Arg::Reactive(r) => f.debug_tuple("Reactive").field(&r.snapshot()).finish(),
            Arg::Component(c) => f.debug_tuple("Component").field(c).finish(),
            Arg::List(items) => f.debug_tuple("List").field(items).finish(),
            Arg::Handler(_) => f.write_str("Handler"),
            Arg::Ref(r) => f.debug_tuple("Ref").field(r).finish(),
            Arg::Css(c) => f.debug_tuple("Css").field(&c.key()).finish(),
        }
    }
}

macro_rules! text_arg {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Arg {
                fn from(v: $t) -> Self {
                    Arg::Text(v.to_string())
                }
            }
        )*
    };
}

text_arg!(
    &str, &String, String, Cow<'_, str>, char, bool, i8, i16, i32, i64, i128, isize, u8, u16,
    u32, u64, u128, usize, f32, f64,
);

impl<T> From<Signal<T>> for Arg
where
    T: Clone + fmt::Display + 'static,
{
    fn from(s: Signal<T>) -> Self {
        Arg::Reactive(s.as_reactive())
    }
}

impl<T> From<&Signal<T>> for Arg
where
    T: Clone + fmt::Display + 'static,
{
    fn from(s: &Signal<T>) -> Self {
        Arg::Reactive(s.as_reactive())
    }
}

impl<T> From<Effect<T>> for Arg
where
    T: Clone + fmt::Display + 'static,
{
    fn from(e: Effect<T>) -> Self {
        Arg::Reactive(e.as_reactive())
    }
}

impl<T> From<&Effect<T>> for Arg
where
    T: Clone + fmt::Display + 'static,
{
    fn from(e: &Effect<T>) -> Self {
        Arg::Reactive(e.as_reactive())
    }
}

impl From<Rc<dyn Reactive>> for Arg {
    fn from(r: Rc<dyn Reactive>) -> Self {
        Arg::Reactive(r)
    }
}

impl From<Component> for Arg {
    fn from(c: Component) -> Self {
        Arg::Component(c)
    }
}

impl From<&Component> for Arg {
    fn from(c: &Component) -> Self {
        Arg::Component(c.clone())
    }
}

impl From<Vec<Component>> for Arg {
    fn from(list: Vec<Component>) -> Self {
        Arg::List(list.into_iter().map(Arg::Component).collect())
    }
}

impl From<Vec<Arg>> for Arg {
    fn from(list: Vec<Arg>) -> Self {
        Arg::List(list)
    }
}

impl From<Handler> for Arg {
    fn from(h: Handler) -> Self {
        Arg::Handler(h)
    }
}

impl From<NodeRef> for Arg {
    fn from(r: NodeRef) -> Self {
        Arg::Ref(r)
    }
}

impl From<&NodeRef> for Arg {
    fn from(r: &NodeRef) -> Self {
        Arg::Ref(r.clone())
    }
}

impl From<ScopedCss> for Arg {
    fn from(c: ScopedCss) -> Self {
        Arg::Css(c)
    }
}

impl From<&ScopedCss> for Arg {
    fn from(c: &ScopedCss) -> Self {
        Arg::Css(c.clone())
    }
}
