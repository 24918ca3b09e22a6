use thiserror::Error;
use weave_template::ParseError;

/// Failures while instantiating or patching a component.
///
/// These never escape `render` or `update`; they are logged and handed to the
/// component's error callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The template is well formed but cannot be instantiated as written.
    #[error("structural error: {0}")]
    Structural(String),
    /// An argument does not fit the slot it was interpolated into.
    #[error("classification error: {0}")]
    Classification(String),
    #[error("template failed to parse: {0}")]
    Parse(#[from] ParseError),
    /// The component was re-entered while it was rendering or updating.
    #[error("component is busy")]
    Busy,
}
