//! Error types for the listing-watch service

/// Errors that can occur in the listing-watch service
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Incomplete page: {0}")]
    Validation(String),

    #[error("Failed after {attempts} attempts: {last_error}")]
    FetchExhausted { attempts: u32, last_error: String },

    #[error("Notifier error: {0}")]
    Notifier(String),

    #[error("Critical error for target '{target}': {reason}")]
    TargetCritical { target: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for listing-watch operations
pub type Result<T> = std::result::Result<T, WatchError>;
