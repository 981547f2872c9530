//! ## procsim-core::queue
//! **Live operation queue shared by the dispatcher and the arrival feed**
//!
//! A `parking_lot::Mutex` guarded deque with a `tokio::sync::Notify` for
//! wake-ups. The dispatcher is the only consumer; the arrival feed is the only
//! producer after construction.
//!
//! A trailing System `finish` stays at the back of the queue: arrivals are
//! inserted ahead of it and it is only released once the queue is closed, so
//! the simulator never announces its end while processes can still arrive.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::QueueError;
use crate::operation::Operation;

/// Result of a non-blocking pop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    Ready(Operation),
    /// Nothing to hand out yet, but producers may still append.
    Pending,
    /// Closed and empty.
    Drained,
}

#[derive(Debug, Default)]
struct QueueState {
    ops: VecDeque<Operation>,
    closed: bool,
}

#[derive(Debug, Default)]
pub struct OperationQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl OperationQueue {
    pub fn new(ops: impl IntoIterator<Item = Operation>) -> Self {
        Self {
            state: Mutex::new(QueueState {
                ops: ops.into_iter().collect(),
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// A queue that will never receive more operations.
    pub fn closed(ops: impl IntoIterator<Item = Operation>) -> Self {
        let queue = Self::new(ops);
        queue.close();
        queue
    }

    pub fn len(&self) -> usize {
        self.state.lock().ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().ops.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Marks the end of production. Idempotent.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.notify.notify_one();
    }

    /// Appends a batch, keeping a trailing System `finish` last.
    pub fn append(&self, batch: Vec<Operation>) -> Result<(), QueueError> {
        {
            let mut state = self.state.lock();
            if state.closed {
                return Err(QueueError::Closed);
            }
            let held_back = match state.ops.back() {
                Some(op) if op.is_system_finish() => state.ops.pop_back(),
                _ => None,
            };
            state.ops.extend(batch);
            if let Some(finish) = held_back {
                state.ops.push_back(finish);
            }
        }
        self.notify.notify_one();
        Ok(())
    }

    pub fn try_next(&self) -> Next {
        let mut state = self.state.lock();
        let hold_finish = !state.closed
            && state.ops.len() == 1
            && state.ops.front().is_some_and(Operation::is_system_finish);
        if hold_finish {
            return Next::Pending;
        }
        match state.ops.pop_front() {
            Some(op) => Next::Ready(op),
            None if state.closed => Next::Drained,
            None => Next::Pending,
        }
    }

    /// Waits for the next operation. Returns `None` once closed and drained.
    ///
    /// Single consumer only: `notify_one` stores at most one wake-up permit.
    pub async fn next(&self) -> Option<Operation> {
        loop {
            match self.try_next() {
                Next::Ready(op) => return Some(op),
                Next::Drained => return None,
                Next::Pending => self.notify.notified().await,
            }
        }
    }

    /// Copy of the pending operations, front first.
    pub fn snapshot(&self) -> Vec<Operation> {
        self.state.lock().ops.iter().copied().collect()
    }
}
