//! Error types for the nutri_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for nutri_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// A food, meal plan, workout, exercise or device that is not known
    #[error("Unknown {kind}: {name}")]
    NotFound { kind: &'static str, name: String },

    /// User input rejected before it reached session state
    #[error("{0}")]
    Validation(String),

    /// Action not allowed from the current screen
    #[error("Cannot {action} from {from} screen")]
    InvalidTransition { from: String, action: &'static str },

    /// Food detector failure (always recovered by the fallback policy)
    #[error("Detection error: {0}")]
    Detection(String),

    /// Scripted session step could not be parsed
    #[error("Invalid step '{step}': {reason}")]
    Script { step: String, reason: String },
}
