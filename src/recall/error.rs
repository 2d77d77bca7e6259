use thiserror::Error;
use uuid::Uuid;

/// Failures of the interval scheduler.
///
/// Both variants are programmer-error class: with defaults applied and
/// counts maintained only by the scheduler they should never surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

#[derive(Error, Debug)]
pub enum RecallError {
    #[error("Item not found: {0}")]
    ItemNotFound(Uuid),

    #[error("Item {0} does not belong to the current user")]
    Unauthorized(Uuid),

    #[error("Item {0} was modified concurrently, retry the review")]
    Conflict(Uuid),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, RecallError>;
