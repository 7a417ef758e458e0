use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] crate::domain::models::DomainError),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("State lock poisoned: {0}")]
    StatePoisoned(String),
    #[error("Background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
