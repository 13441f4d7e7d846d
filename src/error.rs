use thiserror::Error;

use crate::domain::http::api_error::ApiError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid simulation configuration: {0}")]
    InvalidSimulationConfig(String),

    #[error("Logger could not be initialized: {0}")]
    LoggerError(String),

    #[error("A simulation run is already active on this scheduler")]
    SchedulerAlreadyRunning,

    #[error("Request to the garage backend failed: {0}")]
    Api(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, Error>;
