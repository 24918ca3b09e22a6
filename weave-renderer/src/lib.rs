//! Component engine: instantiates cached template trees into live nodes,
//! records what every slot drives and patches exactly those nodes on update.

mod arg;
mod binding;
mod component;
mod error;
mod instantiate;
mod mount;
mod subscription;
mod update;

pub use arg::{Arg, Kind};
pub use binding::BindingKind;
pub use component::{Component, use_lifecycle};
pub use error::RenderError;
pub use instantiate::Projection;
pub use mount::mount;
pub use subscription::{SubscriptionHandle, Subscriptions};

pub use weave_core::{Effect, NodeRef, Signal, effect, watch};
pub use weave_dom::{HtmlOptions, Node, create_element};
pub use weave_style::{ScopedCss, css};
pub use weave_template::{ParseError, TreeCache};

/// Build a [`Component`] from markup literals and `{expr}` interpolations.
///
/// ```ignore
/// let count = Signal::new(0);
/// let view = html!("<p class=" {"counter"} ">" {&count} "</p>");
/// ```
///
/// Adjacent literals are concatenated; every braced expression becomes one
/// slot through `Arg::from`.
#[macro_export]
macro_rules! html {
    (@acc [$($parts:expr),*] [$($cur:literal)*] [$($args:expr),*]) => {
        $crate::Component::new(
            &[$($parts,)* concat!("" $(, $cur)*)],
            vec![$($args),*],
        )
    };
    (@acc [$($parts:expr),*] [$($cur:literal)*] [$($args:expr),*] $lit:literal $($rest:tt)*) => {
        $crate::html!(@acc [$($parts),*] [$($cur)* $lit] [$($args),*] $($rest)*)
    };
    (@acc [$($parts:expr),*] [$($cur:literal)*] [$($args:expr),*] { $e:expr } $($rest:tt)*) => {
        $crate::html!(
            @acc
            [$($parts,)* concat!("" $(, $cur)*)]
            []
            [$($args,)* $crate::Arg::from($e)]
            $($rest)*
        )
    };
    ($($t:tt)*) => {
        $crate::html!(@acc [] [] [] $($t)*)
    };
}
