//! Error types for routeview.

use thiserror::Error;

/// Default result type for routeview.
pub type RouteViewResult<T> = Result<T, RouteViewError>;

/// Errors surfaced by routeview.
///
/// Rendering never returns these to the caller: the view degrades to a safe
/// default and reports the error through `tracing` (and, for configuration
/// problems, through [`crate::view::RouterView::warnings`]).
#[derive(Error, Debug)]
pub enum RouteViewError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("props in \"{path}\" is a {found}, expecting an object, function or boolean.")]
    InvalidProps { path: String, found: String },

    #[error("Cache key already present: {0}")]
    DuplicateKey(String),

    #[error("Script error: {0}")]
    Script(String),
}

impl RouteViewError {
    /// Creates a configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a navigation script error.
    pub fn script<S: Into<String>>(msg: S) -> Self {
        Self::Script(msg.into())
    }
}
