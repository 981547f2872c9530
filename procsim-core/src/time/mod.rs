//! ## procsim-core::time
//! **Countdown timer on a dedicated task**
//!
//! The dispatcher arms the timer with a countdown; the timer task sleeps to
//! the monotonic deadline, records the completion instant, flips the
//! countdown negative and wakes the dispatcher through a watch channel. The
//! completion instant is taken by the timer task itself, so log stamps do not
//! depend on when the dispatcher gets scheduled again.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

use crate::error::TimerError;

/// Shared countdown cell.
#[derive(Debug)]
struct TimerState {
    /// Milliseconds the current countdown was armed with; `-1` once it has
    /// completed and been recorded.
    countdown_ms: i64,
    running: bool,
    completion: Option<Instant>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            countdown_ms: -1,
            running: true,
            completion: None,
        }
    }
}

pub struct Timer {
    state: Arc<Mutex<TimerState>>,
    arm_tx: mpsc::UnboundedSender<Instant>,
    done_rx: watch::Receiver<u64>,
    handle: JoinHandle<()>,
}

impl Timer {
    /// Spawns the timer task on the current runtime.
    pub fn start() -> Self {
        let state = Arc::new(Mutex::new(TimerState::default()));
        let (arm_tx, arm_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = watch::channel(0u64);
        let handle = tokio::spawn(run_timer(state.clone(), arm_rx, done_tx));
        Self {
            state,
            arm_tx,
            done_rx,
            handle,
        }
    }

    /// Counts down `duration` and returns the instant the countdown hit zero.
    pub async fn countdown(&mut self, duration: Duration) -> Result<Instant, TimerError> {
        let deadline = Instant::now() + duration;
        {
            let mut state = self.state.lock();
            if !state.running {
                return Err(TimerError::Stopped);
            }
            state.countdown_ms = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        }
        self.done_rx.mark_unchanged();
        self.arm_tx
            .send(deadline)
            .map_err(|_| TimerError::Stopped)?;
        self.done_rx
            .changed()
            .await
            .map_err(|_| TimerError::Stopped)?;
        self.state.lock().completion.ok_or(TimerError::Stopped)
    }

    /// Clears `running` and waits for the timer task to exit.
    pub async fn stop(self) -> Result<(), TimerError> {
        let Timer {
            state,
            arm_tx,
            handle,
            ..
        } = self;
        state.lock().running = false;
        drop(arm_tx);
        handle
            .await
            .map_err(|e| TimerError::Join(e.to_string()))
    }
}

async fn run_timer(
    state: Arc<Mutex<TimerState>>,
    mut arm_rx: mpsc::UnboundedReceiver<Instant>,
    done_tx: watch::Sender<u64>,
) {
    while let Some(deadline) = arm_rx.recv().await {
        if !state.lock().running {
            break;
        }
        sleep_until(deadline).await;
        let now = Instant::now();
        let armed_ms = {
            let mut state = state.lock();
            state.completion = Some(now);
            std::mem::replace(&mut state.countdown_ms, -1)
        };
        trace!(armed_ms, "Countdown completed");
        done_tx.send_modify(|generation| *generation += 1);
    }
    trace!("Timer task exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn completes_at_deadline() {
        let mut timer = Timer::start();
        let start = Instant::now();
        let done = timer.countdown(Duration::from_millis(50)).await.unwrap();
        assert_eq!(done - start, Duration::from_millis(50));
        assert_eq!(timer.state.lock().countdown_ms, -1);
        assert_eq!(timer.state.lock().completion, Some(done));
        timer.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn zero_countdown_completes_immediately() {
        let mut timer = Timer::start();
        let start = Instant::now();
        let done = timer.countdown(Duration::ZERO).await.unwrap();
        assert_eq!(done, start);
        timer.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_countdowns_accumulate() {
        let mut timer = Timer::start();
        let start = Instant::now();
        timer.countdown(Duration::from_millis(30)).await.unwrap();
        let second = timer.countdown(Duration::from_millis(20)).await.unwrap();
        assert_eq!(second - start, Duration::from_millis(50));
        timer.stop().await.unwrap();
    }

    #[tokio::test]
    async fn stop_marks_not_running() {
        let timer = Timer::start();
        let state = timer.state.clone();
        timer.stop().await.unwrap();
        assert!(!state.lock().running);
    }
}
