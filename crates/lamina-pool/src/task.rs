//! Tasks and the FIFO task queue.

use std::collections::VecDeque;
use std::fmt;

/// A unit of work scheduled on a pool.
pub struct Task {
    func: Box<dyn FnOnce() + Send + 'static>,
}

impl Task {
    /// Wraps a closure.
    pub fn new<F>(func: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            func: Box::new(func),
        }
    }

    pub(crate) fn from_boxed(func: Box<dyn FnOnce() + Send + 'static>) -> Self {
        Self { func }
    }

    /// Runs the task, consuming it.
    pub fn run(self) {
        (self.func)();
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}

/// First-in first-out queue of pending tasks.
///
/// The queue is not synchronized; the pool guards it with its mutex.
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: VecDeque<Task>,
}

impl TaskQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task at the back.
    pub fn push(&mut self, task: Task) {
        self.tasks.push_back(task);
    }

    /// Removes the task at the front.
    pub fn pop(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    /// Returns true if no task is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Removes every pending task and returns them.
    ///
    /// Callers drop the returned queue outside of any lock, since task
    /// captures may run arbitrary destructors.
    #[must_use = "dropping the drained tasks here may run destructors under a lock"]
    pub fn take(&mut self) -> TaskQueue {
        std::mem::take(self)
    }

    /// Drops every pending task.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

/// Positional arguments bound to a task function.
///
/// Implemented for tuples of zero to five elements, so
/// `pool.schedule_with(f, (a, b))` runs `f(a, b)` on a worker.
pub trait Arguments<F>: Send + 'static {
    /// Binds `self` to `func`, producing a runnable task.
    fn bind(self, func: F) -> Task;
}

macro_rules! impl_arguments {
    ($($arg:ident),*) => {
        impl<F, $($arg),*> Arguments<F> for ($($arg,)*)
        where
            F: FnOnce($($arg),*) + Send + 'static,
            $($arg: Send + 'static,)*
        {
            #[allow(non_snake_case)]
            fn bind(self, func: F) -> Task {
                let ($($arg,)*) = self;
                Task::new(move || func($($arg),*))
            }
        }
    };
}

impl_arguments!();
impl_arguments!(A1);
impl_arguments!(A1, A2);
impl_arguments!(A1, A2, A3);
impl_arguments!(A1, A2, A3, A4);
impl_arguments!(A1, A2, A3, A4, A5);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_queue_is_fifo() {
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let mut queue = TaskQueue::new();
        for i in 0..3 {
            let order = Arc::clone(&order);
            queue.push(Task::new(move || order.lock().push(i)));
        }
        assert_eq!(queue.len(), 3);
        while let Some(task) = queue.pop() {
            task.run();
        }
        assert!(queue.is_empty());
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_clear_drops_tasks() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut queue = TaskQueue::new();
        let captured = Arc::clone(&hits);
        queue.push(Task::new(move || {
            captured.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(Arc::strong_count(&hits), 2);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(Arc::strong_count(&hits), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_bind_arities() {
        let sum = Arc::new(AtomicUsize::new(0));

        let s = Arc::clone(&sum);
        ().bind(move || {
            s.fetch_add(1, Ordering::SeqCst);
        })
        .run();

        let s = Arc::clone(&sum);
        (10usize,)
            .bind(move |a: usize| {
                s.fetch_add(a, Ordering::SeqCst);
            })
            .run();

        let s = Arc::clone(&sum);
        (1usize, 2usize, 3usize, 4usize, 5usize)
            .bind(move |a: usize, b: usize, c: usize, d: usize, e: usize| {
                s.fetch_add(a + b + c + d + e, Ordering::SeqCst);
            })
            .run();

        assert_eq!(sum.load(Ordering::SeqCst), 26);
    }
}
