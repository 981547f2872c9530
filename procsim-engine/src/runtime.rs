/*!
# Simulation Runtime

Glues the pieces of a run together: schedules the loaded operations, builds
the live queue, starts the arrival feed when one is given, and drives the
dispatcher until the queue is closed and drained. Frontends only need a
resolved configuration, the operations and the log sinks.
*/

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use opentelemetry::KeyValue;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use procsim_config::SimConfig;
use procsim_core::devices::HardwareProfile;
use procsim_core::queue::OperationQueue;
use procsim_core::Operation;
use procsim_scheduler::{schedule, IdentityMap, Schedule, SchedulingPolicy};
use procsim_telemetry::{EventLogger, MetricsRecorder};

use crate::arrival::ArrivalFeed;
use crate::engine::{Dispatcher, EngineError, SimLog};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    pub operations: usize,
    /// Processes started, arrivals included.
    pub processes: usize,
    pub arrived_processes: usize,
    /// Simulated time from the first to the last log line.
    pub elapsed: Duration,
    pub identity: IdentityMap,
}

pub struct SimulationRuntime {
    profile: HardwareProfile,
    policy: SchedulingPolicy,
    pub metrics: Arc<MetricsRecorder>,
}

impl SimulationRuntime {
    pub fn new(profile: HardwareProfile, policy: SchedulingPolicy) -> Result<Self, EngineError> {
        let metrics = MetricsRecorder::new().map_err(|e| EngineError::Metrics(e.to_string()))?;
        Ok(Self {
            profile,
            policy,
            metrics: Arc::new(metrics),
        })
    }

    pub fn from_config(config: &SimConfig) -> Result<Self, EngineError> {
        Self::new(config.hardware_profile()?, config.scheduling)
    }

    pub fn policy(&self) -> SchedulingPolicy {
        self.policy
    }

    pub fn schedule(&self, operations: Vec<Operation>) -> Schedule {
        schedule(operations, self.policy)
    }

    /// Runs one simulation. Without a feed the queue is closed up front.
    #[instrument(skip_all, fields(policy = %self.policy))]
    pub async fn run(
        &self,
        operations: Vec<Operation>,
        sinks: Vec<Box<dyn Write + Send>>,
        feed: Option<ArrivalFeed>,
    ) -> Result<SimulationReport, EngineError> {
        let Schedule {
            operations,
            identity,
            ..
        } = self.schedule(operations);
        info!(operations = operations.len(), processes = identity.len(), "Starting simulation");

        let start = Instant::now();
        let log = SimLog::new(start, sinks);
        let dispatcher = Dispatcher::new(&self.profile, identity.clone(), log, self.metrics.clone());

        let (queue, feed_handle) = match feed {
            Some(feed) => {
                let queue = Arc::new(OperationQueue::new(operations));
                let handle = feed.spawn(queue.clone(), self.metrics.clone());
                (queue, Some(handle))
            }
            None => (Arc::new(OperationQueue::closed(operations)), None),
        };

        let outcome = dispatcher.run(&queue).await;
        let arrived_processes = match feed_handle {
            Some(handle) if outcome.is_err() => {
                handle.abort();
                0
            }
            Some(handle) => handle.await?.processes,
            None => 0,
        };
        let summary = outcome?;
        let elapsed = Instant::now() - start;

        debug!(?summary, arrived_processes, ?elapsed, "Simulation finished");
        EventLogger::log_event(
            "simulation_complete",
            vec![
                KeyValue::new("operations", summary.operations as i64),
                KeyValue::new("processes", summary.processes as i64),
                KeyValue::new("elapsed_ms", elapsed.as_millis() as i64),
            ],
        )
        .await;

        Ok(SimulationReport {
            operations: summary.operations,
            processes: summary.processes,
            arrived_processes,
            elapsed,
            identity,
        })
    }
}
