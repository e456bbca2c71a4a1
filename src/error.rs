use thiserror::Error;

/// Errors surfaced before training starts or while importing/exporting models.
///
/// Shape mismatches inside the forward/backward hot path are programmer
/// errors and panic instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
