//! Worker threads owned by a pool.

use std::cell::Cell;
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, trace};

use crate::pool::Shared;

thread_local! {
    static IN_WORKER: Cell<bool> = const { Cell::new(false) };
}

/// Returns true when called from a pool worker thread.
#[must_use]
pub fn is_worker_thread() -> bool {
    IN_WORKER.with(Cell::get)
}

/// A worker thread and its termination flag.
#[derive(Debug)]
pub(crate) struct ManagedThread {
    id: usize,
    handle: Option<JoinHandle<()>>,
    terminated: Arc<AtomicBool>,
}

impl ManagedThread {
    /// Starts a worker serving `shared`.
    pub(crate) fn spawn(id: usize, shared: Arc<Shared>) -> io::Result<Self> {
        let terminated = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&terminated);
        let handle = thread::Builder::new()
            .name(format!("lamina-worker-{id}"))
            .spawn(move || {
                IN_WORKER.with(|w| w.set(true));
                trace!(worker = id, "worker started");
                while execute_task(&shared) {}
                flag.store(true, Ordering::Release);
                trace!(worker = id, "worker terminated");
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
            terminated,
        })
    }

    /// Returns true once the worker has left its loop.
    pub(crate) fn has_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    /// Waits for the worker to finish.
    pub(crate) fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!(worker = self.id, "worker thread panicked outside of a task");
            } else {
                debug!(worker = self.id, "worker joined");
            }
        }
    }
}

/// Runs one task. Returns false when the worker should terminate.
///
/// While the queue is empty the worker counts itself inactive and wakes
/// `wait_for_thread` waiters. A surplus worker (`total > expected`) leaves
/// instead of waiting. Waiters re-acquire the lock only after `total` has
/// been decremented.
fn execute_task(shared: &Shared) -> bool {
    let task = {
        let mut state = shared.state.lock();
        loop {
            if let Some(task) = state.queue.pop() {
                break task;
            }

            state.active -= 1;
            shared.wait_for_thread.notify_all();

            if state.total > state.expected {
                state.total -= 1;
                return false;
            }

            shared.wait_for_task.wait(&mut state);
            state.active += 1;
        }
    };

    if catch_unwind(AssertUnwindSafe(|| task.run())).is_err() {
        error!("scheduled task panicked");
    }
    true
}
