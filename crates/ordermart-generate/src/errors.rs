use thiserror::Error;

/// Errors emitted by the order generator and snapshot file layer.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
