//! Error types for the extractor.

use std::path::PathBuf;

/// Errors that abort an extraction run.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid portfolio URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no Chromium or Chrome executable found (set PROVENTOS_CHROMIUM_PATH)")]
    BrowserNotFound,

    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("failed to close browser: {0}")]
    Close(String),

    #[error("page query failed: {0}")]
    Query(String),

    #[error("failed to write {}: {reason}", path.display())]
    Export { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
