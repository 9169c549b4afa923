//! Parallel execution backend for assignments.
//!
//! A target is split into at most `num_threads` contiguous chunks and each
//! chunk is handed to a closure together with its offset. The chunks run on
//! the lamina [`ThreadPool`] or on rayon's global pool, depending on
//! [`SmpConfig::backend`](lamina_core::SmpConfig).

use std::cell::Cell;
use std::sync::OnceLock;

use lamina_core::config::{smp_config, update_smp_config};
use lamina_core::{Error, Result, SmpBackend};
use lamina_pool::ThreadPool;
use rayon::prelude::*;
use tracing::{debug, error, trace};

static POOL: OnceLock<Option<ThreadPool>> = OnceLock::new();

thread_local! {
    static SERIAL_SECTION: Cell<bool> = const { Cell::new(false) };
}

/// Returns the process-wide thread pool, starting it on first use.
///
/// Returns `None` if the pool could not be started; callers then run
/// serially.
pub fn thread_pool() -> Option<&'static ThreadPool> {
    POOL.get_or_init(|| {
        let threads = smp_config().num_threads;
        match ThreadPool::new(threads) {
            Ok(pool) => {
                debug!(threads, "started global thread pool");
                Some(pool)
            }
            Err(err) => {
                error!(%err, threads, "failed to start global thread pool");
                None
            }
        }
    })
    .as_ref()
}

/// Number of threads parallel assignments split into.
#[must_use]
pub fn num_threads() -> usize {
    smp_config().num_threads
}

/// Active parallel backend.
#[must_use]
pub fn backend() -> SmpBackend {
    smp_config().backend
}

/// Changes the number of threads used by parallel assignments.
///
/// # Errors
///
/// Returns [`Error::InvalidThreadCount`] for zero, and
/// [`Error::ThreadPool`] if the running pool cannot be resized.
pub fn set_num_threads(n: usize) -> Result<()> {
    if n == 0 {
        return Err(Error::InvalidThreadCount);
    }
    if let Some(pool) = POOL.get().and_then(Option::as_ref) {
        pool.resize(n)?;
    }
    update_smp_config(|config| config.num_threads = n);
    Ok(())
}

/// Returns true while a [`serial_section`] is running on this thread.
#[must_use]
pub fn is_serial_section_active() -> bool {
    SERIAL_SECTION.with(Cell::get)
}

/// Runs `f` with parallel assignment disabled on this thread.
///
/// Sections nest; the previous state is restored on exit, also when `f`
/// panics.
pub fn serial_section<R, F: FnOnce() -> R>(f: F) -> R {
    struct Restore(bool);

    impl Drop for Restore {
        fn drop(&mut self) {
            SERIAL_SECTION.with(|flag| flag.set(self.0));
        }
    }

    let _restore = Restore(SERIAL_SECTION.with(|flag| flag.replace(true)));
    f()
}

/// Splits `out` into contiguous chunks and calls `f(chunk, offset)` on each,
/// in parallel.
///
/// Runs `f(out, 0)` on the calling thread if the backend is serial, one
/// thread is configured, or `out` is too short to split.
pub fn partition<T, F>(out: &mut [T], f: F)
where
    T: Send,
    F: Fn(&mut [T], usize) + Sync,
{
    let len = out.len();
    let chunk = len.div_ceil(num_threads().max(1)).max(1);
    run_chunks(out, chunk, |part, index| f(part, index * chunk));
}

/// Like [`partition`], but only splits between lines of `line_len`
/// elements. `f` receives the index of the first line of its chunk.
pub fn partition_lines<T, F>(data: &mut [T], line_len: usize, f: F)
where
    T: Send,
    F: Fn(&mut [T], usize) + Sync,
{
    if line_len == 0 {
        f(data, 0);
        return;
    }
    let lines = data.len() / line_len;
    let per_chunk = lines.div_ceil(num_threads().max(1)).max(1);
    run_chunks(data, per_chunk * line_len, |part, index| {
        f(part, index * per_chunk);
    });
}

fn run_chunks<T, F>(out: &mut [T], chunk: usize, f: F)
where
    T: Send,
    F: Fn(&mut [T], usize) + Sync,
{
    let backend = backend();
    if backend == SmpBackend::Serial || chunk >= out.len() {
        f(out, 0);
        return;
    }

    trace!(len = out.len(), chunk, ?backend, "running chunks");
    match backend {
        SmpBackend::Rayon => {
            out.par_chunks_mut(chunk)
                .enumerate()
                .for_each(|(index, part)| f(part, index));
        }
        SmpBackend::ThreadPool => match thread_pool() {
            Some(pool) => pool.scope(|s| {
                let f = &f;
                for (index, part) in out.chunks_mut(chunk).enumerate() {
                    s.spawn(move || f(part, index));
                }
            }),
            None => f(out, 0),
        },
        SmpBackend::Serial => f(out, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_section_nesting() {
        assert!(!is_serial_section_active());
        serial_section(|| {
            assert!(is_serial_section_active());
            serial_section(|| assert!(is_serial_section_active()));
            assert!(is_serial_section_active());
        });
        assert!(!is_serial_section_active());
    }

    #[test]
    fn test_serial_section_restored_on_panic() {
        let result = std::panic::catch_unwind(|| serial_section(|| panic!("boom")));
        assert!(result.is_err());
        assert!(!is_serial_section_active());
    }

    #[test]
    fn test_partition_covers_every_index() {
        let mut data = vec![0usize; 1001];
        partition(&mut data, |chunk, offset| {
            for (k, slot) in chunk.iter_mut().enumerate() {
                *slot = offset + k;
            }
        });
        assert!(data.iter().enumerate().all(|(i, &v)| i == v));
    }

    #[test]
    fn test_partition_lines_keeps_lines_whole() {
        let line_len = 7;
        let mut data = vec![0usize; line_len * 13];
        partition_lines(&mut data, line_len, |chunk, first| {
            assert_eq!(chunk.len() % line_len, 0);
            for (k, line) in chunk.chunks_mut(line_len).enumerate() {
                line.fill(first + k);
            }
        });
        for (i, line) in data.chunks(line_len).enumerate() {
            assert!(line.iter().all(|&v| v == i));
        }
    }

    #[test]
    fn test_rejects_zero_threads() {
        let before = num_threads();
        assert_eq!(set_num_threads(0), Err(Error::InvalidThreadCount));
        assert_eq!(num_threads(), before);
    }

    #[test]
    fn test_thread_count_follows_pool() {
        let pool = thread_pool().expect("global pool");
        let n = num_threads();
        set_num_threads(n).unwrap();
        assert_eq!(pool.size(), n);
        assert_eq!(num_threads(), n);
    }
}
