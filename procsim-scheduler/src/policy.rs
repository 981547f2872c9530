//! Scheduling policy names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SchedulerError;

/// CPU scheduling code from the configuration.
///
/// The quantum that accompanies `RR`/`SRT` is accepted upstream but never
/// enforced; every policy here is a whole-process reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum SchedulingPolicy {
    Fifo,
    Ps,
    Sjf,
    Rr,
    Srt,
}

/// Direction processes are sorted in by IO-operation count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOrder {
    Ascending,
    Descending,
}

impl SchedulingPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            SchedulingPolicy::Fifo => "FIFO",
            SchedulingPolicy::Ps => "PS",
            SchedulingPolicy::Sjf => "SJF",
            SchedulingPolicy::Rr => "RR",
            SchedulingPolicy::Srt => "SRT",
        }
    }

    /// `None` keeps arrival order.
    pub fn io_order(self) -> Option<IoOrder> {
        match self {
            SchedulingPolicy::Fifo => None,
            SchedulingPolicy::Ps => Some(IoOrder::Descending),
            SchedulingPolicy::Sjf | SchedulingPolicy::Rr | SchedulingPolicy::Srt => {
                Some(IoOrder::Ascending)
            }
        }
    }
}

impl fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchedulingPolicy {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "FIFO" => Ok(SchedulingPolicy::Fifo),
            "PS" => Ok(SchedulingPolicy::Ps),
            "SJF" => Ok(SchedulingPolicy::Sjf),
            "RR" => Ok(SchedulingPolicy::Rr),
            "SRT" | "STR" => Ok(SchedulingPolicy::Srt),
            other => Err(SchedulerError::UnknownPolicy(other.to_string())),
        }
    }
}

impl TryFrom<String> for SchedulingPolicy {
    type Error = SchedulerError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}
