use thiserror::Error;

/// Errors emitted by the warehouse layer.
#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}
