//! Scoped scheduling of borrowing closures.
//!
//! [`ThreadPool::scope`] lets data-parallel kernels hand out disjoint `&mut`
//! chunks of a buffer to pool workers. The scope does not return before
//! every closure spawned in it has finished, so the closures may borrow from
//! the caller's stack.

use std::marker::PhantomData;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::pool::ThreadPool;
use crate::task::Task;
use crate::thread::is_worker_thread;

#[derive(Debug, Default)]
struct Pending {
    count: Mutex<usize>,
    done: Condvar,
    panicked: AtomicBool,
}

impl Pending {
    fn wait(&self) {
        let mut count = self.count.lock();
        while *count > 0 {
            self.done.wait(&mut count);
        }
    }

    fn finish(&self) {
        let mut count = self.count.lock();
        *count -= 1;
        if *count == 0 {
            self.done.notify_all();
        }
    }
}

/// Settles one spawned closure when dropped.
///
/// A job discarded before it ran (for example by [`ThreadPool::clear`]) still
/// releases the scope, and counts as failed.
struct JobGuard {
    pending: Arc<Pending>,
    completed: bool,
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        if !self.completed {
            self.pending.panicked.store(true, Ordering::Release);
        }
        self.pending.finish();
    }
}

/// A region in which borrowing closures can be scheduled on a pool.
///
/// Created by [`ThreadPool::scope`].
#[derive(Debug)]
pub struct Scope<'pool, 'env> {
    pool: &'pool ThreadPool,
    pending: Arc<Pending>,
    env: PhantomData<&'env mut &'env ()>,
}

impl<'env> Scope<'_, 'env> {
    /// Schedules `func` on the pool.
    ///
    /// On a pool worker the closure runs inline, so nested parallel regions
    /// cannot exhaust the workers they wait on.
    pub fn spawn<F>(&self, func: F)
    where
        F: FnOnce() + Send + 'env,
    {
        if is_worker_thread() {
            func();
            return;
        }

        *self.pending.count.lock() += 1;
        let mut guard = JobGuard {
            pending: Arc::clone(&self.pending),
            completed: false,
        };
        let job: Box<dyn FnOnce() + Send + 'env> = Box::new(move || {
            guard.completed = catch_unwind(AssertUnwindSafe(func)).is_ok();
        });

        // SAFETY: the scope waits for `pending` to reach zero before it is
        // dropped (also while unwinding). `pending` reaches zero only once
        // every job has run or been dropped, so `job` cannot outlive `'env`.
        let job: Box<dyn FnOnce() + Send + 'static> = unsafe { std::mem::transmute(job) };
        self.pool.push(Task::from_boxed(job));
    }
}

impl Drop for Scope<'_, '_> {
    fn drop(&mut self) {
        self.pending.wait();
    }
}

impl ThreadPool {
    /// Runs `f` with a scope for borrowing closures and waits for all of
    /// them.
    ///
    /// # Panics
    ///
    /// Re-raises a panic if any closure spawned in the scope panicked or was
    /// discarded from the queue before it ran.
    ///
    /// ```
    /// # use lamina_pool::ThreadPool;
    /// let pool = ThreadPool::new(2).unwrap();
    /// let mut data = vec![1, 2, 3, 4, 5, 6];
    /// pool.scope(|s| {
    ///     for chunk in data.chunks_mut(2) {
    ///         s.spawn(move || chunk.iter_mut().for_each(|v| *v *= 10));
    ///     }
    /// });
    /// assert_eq!(data, vec![10, 20, 30, 40, 50, 60]);
    /// ```
    pub fn scope<'env, F, R>(&self, f: F) -> R
    where
        F: for<'pool> FnOnce(&Scope<'pool, 'env>) -> R,
    {
        let scope = Scope {
            pool: self,
            pending: Arc::new(Pending::default()),
            env: PhantomData,
        };
        let result = f(&scope);
        scope.pending.wait();
        if scope.pending.panicked.load(Ordering::Acquire) {
            resume_unwind(Box::new("a task spawned in a pool scope panicked or was discarded"));
        }
        result
    }
}
