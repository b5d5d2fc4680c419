//! Error types for composekit

use thiserror::Error;

/// Result type for composekit operations
pub type Result<T> = std::result::Result<T, ComposeKitError>;

/// composekit error types
#[derive(Error, Debug)]
pub enum ComposeKitError {
    #[error("Missing variable '{name}' referenced at line {line}, column {column}")]
    MissingVariable {
        name: String,
        line: usize,
        column: usize,
    },

    #[error("Malformed template at line {line}, column {column}: {reason}")]
    MalformedTemplate {
        line: usize,
        column: usize,
        reason: String,
    },

    #[error("Unknown built-in template: {0}")]
    UnknownTemplate(String),

    #[error("Compose file parse error: {0}")]
    ComposeParse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(String),
}
