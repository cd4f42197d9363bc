// ============================================================================
// spark-mvvm - Errors
// ============================================================================

use thiserror::Error;

/// Everything that can go wrong while wrapping data, resolving paths,
/// parsing markup or binding a template.
///
/// Only `ElementNotFound`, `InvalidSelector` and `Parse` are fatal to the
/// operation that produced them. The others are recovered where they
/// occur (logged, binding left stale) and surface to callers only through
/// the lower-level APIs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The mount selector matched nothing in the document
    #[error("no element matches selector '{selector}'")]
    ElementNotFound { selector: String },

    /// An intermediate path segment was absent or not an object
    #[error("cannot resolve '{path}': segment '{segment}' is not an object")]
    PathResolution { path: String, segment: String },

    /// Attempted to treat a leaf value as a reactive object
    #[error("value of type {kind} is not an object")]
    NotAnObject { kind: &'static str },

    /// Expression is not of the form `identifier(.identifier)*`
    #[error("invalid path expression '{path}'")]
    InvalidPath { path: String },

    /// Selector uses syntax the document does not support
    #[error("unsupported selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// Markup could not be parsed
    #[error("parse error at byte {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// A subscriber panicked while being notified
    #[error("subscriber panicked: {message}")]
    SubscriberPanicked { message: String },
}

pub type Result<T> = std::result::Result<T, BindError>;
