use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("deadline exceeded after {elapsed_ms} ms")]
    DeadlineExceeded { elapsed_ms: u128 },

    #[error("operation cancelled")]
    Cancelled,

    #[error("owner observed {active} active workers after drain, expected 0")]
    LeakedWorker { active: usize },

    #[error("worker task failed: {0}")]
    WorkerFailed(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
