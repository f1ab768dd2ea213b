//! Error types for sb-core

use thiserror::Error;

/// Main error type for sb-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Model API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tool execution error: {0}")]
    Tool(String),

    #[error("No trading data for ticker '{0}'")]
    TickerNotFound(String),

    #[error("Unrecognized currency code '{0}'")]
    UnknownCurrency(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Conversation exceeded {0} model turns without completing")]
    TurnLimit(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sb-core
pub type Result<T> = std::result::Result<T, Error>;
