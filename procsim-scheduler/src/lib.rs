//! # procsim-scheduler
//!
//! Reorders a validated operation stream by process according to a
//! scheduling policy.
//!
//! - **FIFO** keeps arrival order.
//! - **PS** runs processes with more Input/Output operations first.
//! - **SJF**, **RR** and **SRT** run processes with fewer Input/Output
//!   operations first.
//!
//! Ties keep arrival order. The returned [`IdentityMap`] maps every scheduled
//! position back to the arrival ordinal that is shown in the log, so a
//! process keeps its number no matter where it ends up.

mod partition;
mod policy;

use std::cmp::Reverse;

use thiserror::Error;
use tracing::debug;

use procsim_core::Operation;

pub use partition::{Partition, ProcessBucket};
pub use policy::{IoOrder, SchedulingPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("Unknown scheduling policy '{0}'")]
    UnknownPolicy(String),
}

/// Scheduled position (0-based) to arrival ordinal (1-based).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityMap(Vec<usize>);

impl IdentityMap {
    pub fn sequential(processes: usize) -> Self {
        Self((1..=processes).collect())
    }

    /// Display ordinal of the process run at `position`.
    ///
    /// Positions past the scheduled set belong to processes that arrived
    /// while the simulation was running; they are numbered after the
    /// scheduled ones in the order they run.
    pub fn ordinal(&self, position: usize) -> usize {
        self.0.get(position).copied().unwrap_or(position + 1)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for IdentityMap {
    fn from(ordinals: Vec<usize>) -> Self {
        Self(ordinals)
    }
}

/// A reordered operation stream plus its identity map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub operations: Vec<Operation>,
    pub identity: IdentityMap,
    /// Input/Output count of each process, in scheduled order.
    pub io_counts: Vec<usize>,
}

/// Reorders `operations` by process according to `policy`.
pub fn schedule(operations: Vec<Operation>, policy: SchedulingPolicy) -> Schedule {
    let Partition {
        prefix,
        mut processes,
        suffix,
    } = Partition::split(operations);

    match policy.io_order() {
        // Stable sorts: equal counts keep arrival order.
        Some(IoOrder::Ascending) => processes.sort_by_key(ProcessBucket::io_count),
        Some(IoOrder::Descending) => processes.sort_by_key(|p| Reverse(p.io_count())),
        None => {}
    }

    let identity: Vec<usize> = processes.iter().map(|p| p.ordinal).collect();
    let io_counts: Vec<usize> = processes.iter().map(ProcessBucket::io_count).collect();
    debug!(%policy, order = ?identity, ?io_counts, "Processes scheduled");

    let mut scheduled = prefix;
    for process in processes {
        scheduled.extend(process.operations);
    }
    scheduled.extend(suffix);

    Schedule {
        operations: scheduled,
        identity: identity.into(),
        io_counts,
    }
}
