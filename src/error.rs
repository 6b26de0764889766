//! Error types for Agn.

use thiserror::Error;

/// Library-level error type for Agn operations.
#[derive(Error, Debug)]
pub enum AgnError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Mailbox error: {0}")]
    Mail(String),

    #[error("Message not found: {0}")]
    MessageNotFound(String),

    #[error("Classification failed: {0}")]
    Classifier(String),

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("Inference API error: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Agent error: {0}")]
    Agent(String),
}

/// Result type alias for Agn operations.
pub type Result<T> = std::result::Result<T, AgnError>;
