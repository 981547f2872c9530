//! Input/Output tasks.
//!
//! Each IO operation runs on its own task. All tasks share one single-permit
//! semaphore, so device time is never simulated for two operations at once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::{sleep, Instant};
use tracing::trace;

use crate::engine::EngineError;

#[derive(Debug, Clone)]
pub struct IoSimulator {
    device_lock: Arc<Semaphore>,
}

impl Default for IoSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl IoSimulator {
    pub fn new() -> Self {
        Self {
            device_lock: Arc::new(Semaphore::new(1)),
        }
    }

    /// Spawns an IO task for `device_time`, waits for it and returns the
    /// instant the device finished.
    pub async fn perform(&self, device_time: Duration) -> Result<Instant, EngineError> {
        let lock = self.device_lock.clone();
        let task = tokio::spawn(async move {
            let _permit = lock
                .acquire_owned()
                .await
                .map_err(|e| EngineError::Join(e.to_string()))?;
            trace!(?device_time, "IO task holding device");
            sleep(device_time).await;
            Ok::<_, EngineError>(Instant::now())
        });
        task.await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn completes_after_device_time() {
        let io = IoSimulator::new();
        let start = Instant::now();
        let done = io.perform(Duration::from_millis(75)).await.unwrap();
        assert_eq!(done - start, Duration::from_millis(75));
        assert_eq!(io.device_lock.available_permits(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_tasks_are_serialised() {
        let io = IoSimulator::new();
        let start = Instant::now();
        let (a, b) = tokio::join!(
            io.perform(Duration::from_millis(20)),
            io.perform(Duration::from_millis(20))
        );
        let latest = a.unwrap().max(b.unwrap());
        assert_eq!(latest - start, Duration::from_millis(40));
    }
}
