//! The thread pool.
//!
//! # Bookkeeping
//!
//! - `total`: workers alive (spawned and not yet retired)
//! - `expected`: workers the pool should have, i.e. its size
//! - `active`: workers not blocked waiting for a task
//!
//! `0 <= active <= total`. During a shrink `total > expected` until the
//! surplus workers notice and retire.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::error::PoolError;
use crate::task::{Arguments, Task, TaskQueue};
use crate::thread::ManagedThread;

/// State guarded by the pool mutex.
#[derive(Debug, Default)]
pub(crate) struct State {
    pub(crate) total: usize,
    pub(crate) expected: usize,
    pub(crate) active: usize,
    pub(crate) queue: TaskQueue,
    threads: Vec<ManagedThread>,
    next_id: usize,
}

/// Synchronization shared between the pool handle and its workers.
#[derive(Debug, Default)]
pub(crate) struct Shared {
    pub(crate) state: Mutex<State>,
    /// Signalled when a task is queued or workers must re-check their quota.
    pub(crate) wait_for_task: Condvar,
    /// Signalled when a worker goes idle or retires.
    pub(crate) wait_for_thread: Condvar,
}

/// A resizable pool of worker threads serving a FIFO task queue.
///
/// Dropping the pool discards queued tasks, lets running tasks finish and
/// joins every worker.
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// use lamina_pool::ThreadPool;
///
/// let pool = ThreadPool::new(2).unwrap();
/// let counter = Arc::new(AtomicUsize::new(0));
/// for _ in 0..8 {
///     let counter = Arc::clone(&counter);
///     pool.schedule(move || {
///         counter.fetch_add(1, Ordering::SeqCst);
///     });
/// }
/// pool.wait();
/// assert_eq!(counter.load(Ordering::SeqCst), 8);
/// ```
#[derive(Debug)]
pub struct ThreadPool {
    shared: Arc<Shared>,
}

impl ThreadPool {
    /// Creates a pool with `n` workers.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidThreadCount`] for `n == 0` and
    /// [`PoolError::Spawn`] if a worker cannot be started.
    pub fn new(n: usize) -> Result<Self, PoolError> {
        let pool = Self {
            shared: Arc::new(Shared::default()),
        };
        pool.resize(n)?;
        Ok(pool)
    }

    /// Returns true if no task is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().queue.is_empty()
    }

    /// Number of workers the pool maintains.
    #[must_use]
    pub fn size(&self) -> usize {
        self.shared.state.lock().expected
    }

    /// Number of workers currently running or about to run a task.
    #[must_use]
    pub fn active(&self) -> usize {
        self.shared.state.lock().active
    }

    /// Number of idle workers.
    #[must_use]
    pub fn ready(&self) -> usize {
        let state = self.shared.state.lock();
        state.expected.saturating_sub(state.active)
    }

    /// Number of tasks waiting in the queue.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    /// Queues a task.
    pub fn schedule<F>(&self, func: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.push(Task::new(func));
    }

    /// Queues `func` with up to five bound arguments.
    ///
    /// ```
    /// # use lamina_pool::ThreadPool;
    /// # use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
    /// let pool = ThreadPool::new(1).unwrap();
    /// let sum = Arc::new(AtomicUsize::new(0));
    /// pool.schedule_with(
    ///     |sum: Arc<AtomicUsize>, a: usize, b: usize| {
    ///         sum.fetch_add(a + b, Ordering::SeqCst);
    ///     },
    ///     (Arc::clone(&sum), 2, 3),
    /// );
    /// pool.wait();
    /// assert_eq!(sum.load(Ordering::SeqCst), 5);
    /// ```
    pub fn schedule_with<F, A>(&self, func: F, args: A)
    where
        A: Arguments<F>,
    {
        self.push(args.bind(func));
    }

    pub(crate) fn push(&self, task: Task) {
        let mut state = self.shared.state.lock();
        state.queue.push(task);
        self.shared.wait_for_task.notify_one();
    }

    /// Changes the number of workers.
    ///
    /// Growing spawns workers immediately. Shrinking lowers the quota;
    /// surplus workers retire once they find the queue empty. Retired workers
    /// are joined here.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidThreadCount`] for `n == 0` and
    /// [`PoolError::Spawn`] if a worker cannot be started.
    pub fn resize(&self, n: usize) -> Result<(), PoolError> {
        if n == 0 {
            return Err(PoolError::InvalidThreadCount);
        }

        let retired = {
            let mut state = self.shared.state.lock();

            if n > state.expected {
                debug!(from = state.expected, to = n, "growing thread pool");
                for _ in state.expected..n {
                    self.create_thread(&mut state)?;
                }
            } else {
                debug!(from = state.expected, to = n, "shrinking thread pool");
                state.expected = n;
                self.shared.wait_for_task.notify_all();
            }

            let (retired, alive): (Vec<_>, Vec<_>) = std::mem::take(&mut state.threads)
                .into_iter()
                .partition(ManagedThread::has_terminated);
            state.threads = alive;
            retired
        };

        for thread in retired {
            thread.join();
        }
        Ok(())
    }

    fn create_thread(&self, state: &mut State) -> Result<(), PoolError> {
        let id = state.next_id;
        let thread = ManagedThread::spawn(id, Arc::clone(&self.shared))?;
        state.next_id += 1;
        state.threads.push(thread);
        state.total += 1;
        state.expected += 1;
        state.active += 1;
        Ok(())
    }

    /// Blocks until the queue is empty and no worker is running a task.
    ///
    /// Must not be called from a task running on this pool.
    pub fn wait(&self) {
        let mut state = self.shared.state.lock();
        while !state.queue.is_empty() || state.active > 0 {
            self.shared.wait_for_thread.wait(&mut state);
        }
    }

    /// Discards every queued task. Running tasks are unaffected.
    pub fn clear(&self) {
        let dropped = self.shared.state.lock().queue.take();
        drop(dropped);
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        // Running tasks may wait on captures of the discarded ones, so those
        // are released before waiting for the workers.
        self.clear();

        let threads = {
            let mut state = self.shared.state.lock();
            state.expected = 0;
            self.shared.wait_for_task.notify_all();

            while state.total != 0 {
                self.shared.wait_for_thread.wait(&mut state);
            }
            std::mem::take(&mut state.threads)
        };

        debug!(workers = threads.len(), "shutting down thread pool");
        for thread in threads {
            thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_zero_threads_rejected() {
        assert!(matches!(
            ThreadPool::new(0),
            Err(PoolError::InvalidThreadCount)
        ));
        let pool = ThreadPool::new(1).unwrap();
        assert!(matches!(pool.resize(0), Err(PoolError::InvalidThreadCount)));
        assert_eq!(pool.size(), 1);
    }

    #[test]
    fn test_initial_state() {
        let pool = ThreadPool::new(3).unwrap();
        pool.wait();
        assert_eq!(pool.size(), 3);
        assert!(pool.is_empty());
        assert_eq!(pool.active(), 0);
        assert_eq!(pool.ready(), 3);
    }

    #[test]
    fn test_many_tasks() {
        let pool = ThreadPool::new(4).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..100 {
            let counter = Arc::clone(&counter);
            pool.schedule(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.wait();
        assert_eq!(counter.load(Ordering::SeqCst), 100);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_wait_without_tasks_returns() {
        let pool = ThreadPool::new(2).unwrap();
        pool.wait();
        pool.wait();
    }

    #[test]
    fn test_grow_and_shrink() {
        let pool = ThreadPool::new(2).unwrap();
        pool.resize(5).unwrap();
        assert_eq!(pool.size(), 5);
        pool.resize(1).unwrap();
        assert_eq!(pool.size(), 1);

        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..20 {
            let counter = Arc::clone(&counter);
            pool.schedule(move || {
                thread::sleep(Duration::from_millis(1));
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.wait();
        assert_eq!(counter.load(Ordering::SeqCst), 20);

        // Retired workers are eventually swept by a later resize.
        pool.resize(1).unwrap();
        let state = pool.shared.state.lock();
        assert!(state.total >= state.expected);
        assert!(state.active <= state.total);
    }

    #[test]
    fn test_drop_releases_pending_before_joining() {
        let pool = ThreadPool::new(1).unwrap();
        let capture = Arc::new(());
        let released = Arc::new(AtomicUsize::new(0));
        let (started_tx, started_rx) = std::sync::mpsc::channel();

        let watched = Arc::downgrade(&capture);
        let seen = Arc::clone(&released);
        pool.schedule(move || {
            started_tx.send(()).unwrap();
            for _ in 0..2000 {
                if watched.strong_count() == 0 {
                    seen.store(1, Ordering::SeqCst);
                    return;
                }
                thread::sleep(Duration::from_millis(1));
            }
        });
        pool.schedule(move || drop(capture));
        started_rx.recv().unwrap();

        drop(pool);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_task_keeps_worker_alive() {
        let pool = ThreadPool::new(1).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        pool.schedule(|| panic!("task failure"));
        let c = Arc::clone(&counter);
        pool.schedule(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        pool.wait();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(pool.size(), 1);
    }
}
