use thiserror::Error;

use crate::operation::{OpKind, OpLabel};

/// Rejections raised while building an `Operation`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("Unknown operation code '{0}'")]
    UnknownCode(char),

    #[error("Unknown operation label '{0}'")]
    UnknownLabel(String),

    #[error("Label '{label}' is not valid for {kind:?} operations")]
    InvalidLabel { kind: OpKind, label: OpLabel },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("Operation queue is closed")]
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("Timer task is not running")]
    Stopped,

    #[error("Timer task failed: {0}")]
    Join(String),
}
