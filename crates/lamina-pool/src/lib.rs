//! # lamina-pool
//!
//! A resizable pool of worker threads serving a shared FIFO task queue.
//!
//! This crate provides:
//! - `ThreadPool`: schedule, wait, clear and resize operations
//! - Argument binding for tasks taking up to five parameters
//! - Scoped scheduling of borrowing closures for data-parallel kernels
//!
//! ## Worker Lifecycle
//!
//! ```text
//!   resize(n+k)                      queue empty
//!       |                                 |
//!       v                                 v
//!  +---------+   task popped   +------+  active -= 1   +-------+
//!  | spawned | --------------> | busy | ------------> | idle  |
//!  +---------+                 +------+ <------------ +-------+
//!                                          task queued    |
//!                                                         | total > expected
//!                                                         v
//!                                                   +------------+
//!                                                   | terminated |
//!                                                   +------------+
//! ```
//!
//! Every counter transition happens under the pool mutex. Tasks run outside
//! of it.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod error;
pub mod pool;
pub mod scope;
pub mod task;

mod thread;

pub use error::PoolError;
pub use pool::ThreadPool;
pub use scope::Scope;
pub use task::{Arguments, Task, TaskQueue};
pub use thread::is_worker_thread;
