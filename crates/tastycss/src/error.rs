//! Rendering errors.

use thiserror::Error;

/// Error returned when a style descriptor cannot be rendered or loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The descriptor could not be canonicalized into a cache key.
    ///
    /// Rendering stops here: a key that does not faithfully describe its
    /// input would silently serve CSS for a different descriptor.
    #[error("failed to serialize style descriptor: {0}")]
    Serialization(String),

    /// A descriptor document (JSON or YAML) could not be parsed.
    #[error("invalid style descriptor: {0}")]
    Descriptor(String),

    /// An engine configuration document could not be parsed.
    #[error("invalid engine configuration: {0}")]
    Config(String),
}
