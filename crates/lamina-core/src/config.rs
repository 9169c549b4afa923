//! Runtime configuration of parallel (SMP) evaluation.
//!
//! The process-wide configuration is initialized from the environment on
//! first use and can be replaced at any time with [`set_smp_config`].

use std::str::FromStr;
use std::sync::OnceLock;
use std::thread;

use parking_lot::RwLock;
use tracing::warn;

use crate::error::{Error, Result};

/// Result size above which a sparse row vector times dense matrix product is
/// assigned in parallel.
pub const SMP_TSVEC_DMAT_MULT_THRESHOLD: usize = 38_000;

/// Element count above which a dense matrix product is evaluated in parallel.
pub const SMP_DMAT_DMAT_MULT_THRESHOLD: usize = 3_025;

/// Vector size above which a plain dense vector assignment runs in parallel.
pub const SMP_DVEC_ASSIGN_THRESHOLD: usize = 38_000;

/// Executor used for parallel assignments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SmpBackend {
    /// Never parallelize.
    Serial,
    /// The lamina thread pool.
    #[default]
    ThreadPool,
    /// The rayon global pool.
    Rayon,
}

impl FromStr for SmpBackend {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serial" | "off" | "none" => Ok(Self::Serial),
            "pool" | "threadpool" | "thread-pool" | "threads" => Ok(Self::ThreadPool),
            "rayon" => Ok(Self::Rayon),
            _ => Err(()),
        }
    }
}

/// Configuration of parallel evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmpConfig {
    /// Executor for parallel assignments.
    pub backend: SmpBackend,
    /// Number of worker threads.
    pub num_threads: usize,
    /// See [`SMP_TSVEC_DMAT_MULT_THRESHOLD`].
    pub tsvec_dmat_mult_threshold: usize,
    /// See [`SMP_DMAT_DMAT_MULT_THRESHOLD`].
    pub dmat_dmat_mult_threshold: usize,
    /// See [`SMP_DVEC_ASSIGN_THRESHOLD`].
    pub dvec_assign_threshold: usize,
}

impl Default for SmpConfig {
    fn default() -> Self {
        Self {
            backend: SmpBackend::default(),
            num_threads: available_threads(),
            tsvec_dmat_mult_threshold: SMP_TSVEC_DMAT_MULT_THRESHOLD,
            dmat_dmat_mult_threshold: SMP_DMAT_DMAT_MULT_THRESHOLD,
            dvec_assign_threshold: SMP_DVEC_ASSIGN_THRESHOLD,
        }
    }
}

impl SmpConfig {
    /// Environment variable overriding the thread count.
    pub const NUM_THREADS_VAR: &'static str = "LAMINA_NUM_THREADS";

    /// Environment variable selecting the backend.
    pub const BACKEND_VAR: &'static str = "LAMINA_SMP_BACKEND";

    /// Builds a configuration from the defaults and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if a variable is set but malformed,
    /// or asks for zero threads.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`SmpConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(Self::NUM_THREADS_VAR) {
            let parsed = value.trim().parse::<usize>();
            config.num_threads = match parsed {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(Error::InvalidConfig {
                        variable: Self::NUM_THREADS_VAR,
                        value,
                    })
                }
            };
        }

        if let Some(value) = lookup(Self::BACKEND_VAR) {
            let parsed = value.parse::<SmpBackend>();
            config.backend = parsed.map_err(|()| Error::InvalidConfig {
                variable: Self::BACKEND_VAR,
                value,
            })?;
        }

        Ok(config)
    }

    /// Returns a configuration that never parallelizes.
    #[must_use]
    pub fn serial() -> Self {
        Self {
            backend: SmpBackend::Serial,
            num_threads: 1,
            ..Self::default()
        }
    }
}

/// Number of hardware threads, at least one.
#[must_use]
pub fn available_threads() -> usize {
    thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

fn global() -> &'static RwLock<SmpConfig> {
    static CONFIG: OnceLock<RwLock<SmpConfig>> = OnceLock::new();
    CONFIG.get_or_init(|| {
        let config = SmpConfig::from_env().unwrap_or_else(|err| {
            warn!(%err, "ignoring SMP environment overrides");
            SmpConfig::default()
        });
        RwLock::new(config)
    })
}

/// Returns a snapshot of the process-wide configuration.
#[must_use]
pub fn smp_config() -> SmpConfig {
    global().read().clone()
}

/// Replaces the process-wide configuration.
pub fn set_smp_config(config: SmpConfig) {
    *global().write() = config;
}

/// Applies `f` to the process-wide configuration.
pub fn update_smp_config<F: FnOnce(&mut SmpConfig)>(f: F) {
    f(&mut global().write());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_string())
        }
    }

    #[test]
    fn test_defaults() {
        let config = SmpConfig::default();
        assert_eq!(config.backend, SmpBackend::ThreadPool);
        assert!(config.num_threads >= 1);
        assert_eq!(config.tsvec_dmat_mult_threshold, 38_000);
    }

    #[test]
    fn test_env_overrides() {
        let config = SmpConfig::from_lookup(lookup(&[
            ("LAMINA_NUM_THREADS", " 3 "),
            ("LAMINA_SMP_BACKEND", "Rayon"),
        ]))
        .unwrap();
        assert_eq!(config.num_threads, 3);
        assert_eq!(config.backend, SmpBackend::Rayon);
    }

    #[test]
    fn test_env_rejects_zero_threads() {
        let err = SmpConfig::from_lookup(lookup(&[("LAMINA_NUM_THREADS", "0")])).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfig { variable, .. } if variable == "LAMINA_NUM_THREADS"
        ));
    }

    #[test]
    fn test_env_rejects_unknown_backend() {
        let err = SmpConfig::from_lookup(lookup(&[("LAMINA_SMP_BACKEND", "gpu")])).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidConfig {
                variable: "LAMINA_SMP_BACKEND",
                value: "gpu".to_string(),
            }
        );
    }

    #[test]
    fn test_serial_config() {
        let config = SmpConfig::serial();
        assert_eq!(config.backend, SmpBackend::Serial);
        assert_eq!(config.num_threads, 1);
    }
}
