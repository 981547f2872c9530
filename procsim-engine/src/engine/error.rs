use thiserror::Error;
use tokio::task::JoinError;

use procsim_config::ConfigError;
use procsim_core::{Operation, QueueError, TimerError};
use procsim_metadata::MetadataError;
use procsim_scheduler::SchedulerError;

use crate::engine::state::ProcessState;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Operation {0} issued outside of a running process")]
    OperationBeforeProcessStart(Operation),

    #[error("Operation {0} has no input/output device")]
    NoDevice(Operation),

    #[error("Process {process}: invalid transition {from:?} -> {to:?}")]
    InvalidTransition {
        process: usize,
        from: ProcessState,
        to: ProcessState,
    },

    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Meta-data error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Log sink error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Task failed: {0}")]
    Join(String),
}

impl From<JoinError> for EngineError {
    fn from(err: JoinError) -> Self {
        EngineError::Join(err.to_string())
    }
}
