use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("configuration file not found in '{0}'")]
    NotFound(PathBuf),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error(transparent)]
    Cors(#[from] rocket_cors::Error),
}

/// Failures of data-layer operations.
///
/// These map onto HTTP statuses in [`crate::resp::problem`]; nothing in `data` knows about HTTP.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage worker failed: {0}")]
    Worker(String),
}

impl StoreError {
    pub fn validation(message: impl ToString) -> StoreError {
        StoreError::Validation(message.to_string())
    }

    pub fn not_found(entity: &'static str, id: i64) -> StoreError {
        StoreError::NotFound { entity, id }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
