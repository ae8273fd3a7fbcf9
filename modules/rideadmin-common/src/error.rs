use thiserror::Error;

#[derive(Error, Debug)]
pub enum RideAdminError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
