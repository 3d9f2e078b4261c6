use thiserror::Error;

/// Core error type shared across Ordermart crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Database error or driver failure.
    #[error("database error: {0}")]
    Db(String),
    /// Invalid or missing configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Catch-all error for unexpected failures.
    #[error("other error: {0}")]
    Other(String),
}

/// Convenience alias for results returned by Ordermart crates.
pub type Result<T> = std::result::Result<T, Error>;
