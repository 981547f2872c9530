//! ## procsim-engine::arrival
//! **Processes arriving while the simulation runs**
//!
//! An [`ArrivalFeed`] wakes on a fixed interval for a bounded number of
//! rounds, pulls a batch from its [`ArrivalSource`] and appends it to the live
//! queue. When the rounds run out, the source is exhausted or it fails, the
//! feed closes the queue so the dispatcher can drain it and finish.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use opentelemetry::KeyValue;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use procsim_core::queue::OperationQueue;
use procsim_core::Operation;
use procsim_metadata::parse_program;
use procsim_scheduler::Partition;
use procsim_telemetry::{EventLogger, MetricsRecorder};

use crate::engine::EngineError;

#[async_trait]
pub trait ArrivalSource: Send {
    /// Next batch to append, or `None` once the source has nothing left.
    async fn next_batch(&mut self) -> Result<Option<Vec<Operation>>, EngineError>;
}

/// Re-reads a meta-data file every round and hands out its processes one at
/// a time, in file order.
#[derive(Debug, Clone)]
pub struct FileArrivalSource {
    path: PathBuf,
    cursor: usize,
}

impl FileArrivalSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cursor: 0,
        }
    }
}

#[async_trait]
impl ArrivalSource for FileArrivalSource {
    async fn next_batch(&mut self) -> Result<Option<Vec<Operation>>, EngineError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let partition = Partition::split(parse_program(&text)?);
        match partition.processes.into_iter().nth(self.cursor) {
            Some(process) => {
                self.cursor += 1;
                Ok(Some(process.operations))
            }
            None => Ok(None),
        }
    }
}

/// Fixed list of batches.
#[derive(Debug, Clone, Default)]
pub struct VecArrivalSource {
    batches: VecDeque<Vec<Operation>>,
}

impl VecArrivalSource {
    pub fn new(batches: impl IntoIterator<Item = Vec<Operation>>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }
}

#[async_trait]
impl ArrivalSource for VecArrivalSource {
    async fn next_batch(&mut self) -> Result<Option<Vec<Operation>>, EngineError> {
        Ok(self.batches.pop_front())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedSummary {
    pub rounds: u32,
    pub processes: usize,
    pub exhausted: bool,
}

pub struct ArrivalFeed {
    source: Box<dyn ArrivalSource>,
    interval: Duration,
    rounds: u32,
}

impl ArrivalFeed {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);
    pub const DEFAULT_ROUNDS: u32 = 10;

    pub fn new(source: impl ArrivalSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            interval: Self::DEFAULT_INTERVAL,
            rounds: Self::DEFAULT_ROUNDS,
        }
    }

    /// Zero is raised to one millisecond.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn spawn(
        self,
        queue: Arc<OperationQueue>,
        metrics: Arc<MetricsRecorder>,
    ) -> JoinHandle<FeedSummary> {
        tokio::spawn(self.run(queue, metrics))
    }

    #[instrument(skip_all)]
    async fn run(mut self, queue: Arc<OperationQueue>, metrics: Arc<MetricsRecorder>) -> FeedSummary {
        debug!(rounds = self.rounds, interval = ?self.interval, "Arrival feed started");
        let mut summary = FeedSummary::default();
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while summary.rounds < self.rounds {
            ticker.tick().await;
            summary.rounds += 1;

            match self.source.next_batch().await {
                Ok(Some(batch)) => {
                    let processes = batch.iter().filter(|op| op.is_process_begin()).count();
                    if let Err(e) = queue.append(batch) {
                        warn!("Arrival dropped: {e}");
                        break;
                    }
                    metrics.inc_arrivals(processes as u64);
                    summary.processes += processes;
                    debug!(round = summary.rounds, processes, "Arrivals appended");
                }
                Ok(None) => {
                    summary.exhausted = true;
                    info!(round = summary.rounds, "Arrival source exhausted");
                    EventLogger::log_event(
                        "arrivals_exhausted",
                        vec![
                            KeyValue::new("round", i64::from(summary.rounds)),
                            KeyValue::new("processes", summary.processes as i64),
                        ],
                    )
                    .await;
                    break;
                }
                Err(e) => {
                    warn!("Arrival source failed: {e}");
                    EventLogger::log_event(
                        "arrival_source_failed",
                        vec![
                            KeyValue::new("round", i64::from(summary.rounds)),
                            KeyValue::new("error", e.to_string()),
                        ],
                    )
                    .await;
                    break;
                }
            }
        }

        queue.close();
        summary
    }
}
