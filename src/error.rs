//! Error type for the fallible edges of the engine.
//!
//! Interactive paths (pointer, keyboard, inbound commands) never fail: a broken
//! interaction degrades to a no-op. Errors only come from configuration and
//! project parsing, engine construction, and drawing calls.

/// Error returned by configuration, serialization and rendering entry points.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// A configuration value is out of its valid range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// JSON could not be parsed or produced.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// A drawing call on the surface failed.
    #[error("surface error: {0}")]
    Surface(String),
    /// The canvas element did not provide a 2D rendering context.
    #[error("canvas has no 2d context")]
    NoContext,
}
