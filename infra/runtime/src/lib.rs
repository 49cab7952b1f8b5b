//! # Runtime
//!
//! Builds the multi-threaded [Tokio](https://tokio.rs) runtime the Initium
//! binaries run on, from a small set of named profiles.
//!
//! ```rust,ignore
//! #[initium_runtime::main(server)]
//! async fn main() -> anyhow::Result<()> {
//!     Ok(())
//! }
//! ```

pub use anyhow::Result;
pub use initium_derive::main;

use anyhow::Context;
use std::{num::NonZero, thread::available_parallelism, time::Duration};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

const FALLBACK_WORKER_THREADS: usize = 4;
const MAX_WORKER_THREADS: usize = 1024;
const MIN_STACK_SIZE: usize = 1024 * 1024;
const MAX_STACK_SIZE: usize = 16 * 1024 * 1024;
const DEFAULT_THREAD_NAME: &str = "initium-worker";

/// Named runtime presets selectable from `#[initium_runtime::main(...)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeProfile {
    /// Every core, larger stacks and long keep-alive for the HTTP server.
    Server,
    /// Half the cores and small stacks for tools and tests.
    Compact,
    #[default]
    Default,
}

/// Configuration for the Tokio runtime. Values are clamped when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub worker_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub thread_keep_alive: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::for_profile(RuntimeProfile::Default)
    }
}

impl RuntimeConfig {
    #[must_use]
    pub fn for_profile(profile: RuntimeProfile) -> Self {
        let cores = detected_worker_threads();
        let (worker_threads, stack_size, keep_alive, name) = match profile {
            RuntimeProfile::Server => (cores, 4 * 1024 * 1024, 300, "initium-server"),
            RuntimeProfile::Compact => ((cores / 2).max(1), 2 * 1024 * 1024, 30, "initium-compact"),
            RuntimeProfile::Default => (cores, 3 * 1024 * 1024, 60, DEFAULT_THREAD_NAME),
        };

        Self {
            worker_threads,
            stack_size,
            thread_name: name.to_owned(),
            thread_keep_alive: Duration::from_secs(keep_alive),
        }
    }

    #[must_use]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.clamp(1, MAX_WORKER_THREADS);
        self
    }

    #[must_use]
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE);
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.thread_name = if name.trim().is_empty() { DEFAULT_THREAD_NAME.to_owned() } else { name };
        self
    }
}

/// `TOKIO_WORKER_THREADS` when valid, otherwise the available parallelism.
fn detected_worker_threads() -> usize {
    std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0 && n <= MAX_WORKER_THREADS)
        .unwrap_or_else(|| {
            available_parallelism().map(NonZero::get).unwrap_or(FALLBACK_WORKER_THREADS)
        })
}

/// Builds a multi-threaded runtime with every driver enabled.
pub fn build_runtime(config: &RuntimeConfig) -> Result<Runtime> {
    let config = config
        .clone()
        .with_worker_threads(config.worker_threads)
        .with_stack_size(config.stack_size)
        .with_thread_name(config.thread_name.clone());
    debug!(config = ?config, "Building tokio runtime");

    Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .thread_name(&config.thread_name)
        .thread_stack_size(config.stack_size)
        .thread_keep_alive(config.thread_keep_alive)
        .enable_all()
        .build()
        .context("Failed to initialize runtime")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_threads_are_clamped() {
        assert_eq!(RuntimeConfig::default().with_worker_threads(0).worker_threads, 1);
        assert_eq!(RuntimeConfig::default().with_worker_threads(5000).worker_threads, MAX_WORKER_THREADS);
    }

    #[test]
    fn stack_size_is_clamped() {
        assert_eq!(RuntimeConfig::default().with_stack_size(100).stack_size, MIN_STACK_SIZE);
        assert_eq!(RuntimeConfig::default().with_stack_size(usize::MAX).stack_size, MAX_STACK_SIZE);
    }

    #[test]
    fn blank_thread_name_falls_back() {
        assert_eq!(RuntimeConfig::default().with_thread_name(" ").thread_name, DEFAULT_THREAD_NAME);
    }

    #[test]
    fn compact_profile_uses_fewer_workers_than_server() {
        let server = RuntimeConfig::for_profile(RuntimeProfile::Server);
        let compact = RuntimeConfig::for_profile(RuntimeProfile::Compact);
        assert!(compact.worker_threads <= server.worker_threads);
        assert!(compact.stack_size < server.stack_size);
        assert!(compact.worker_threads >= 1);
    }

    #[test]
    fn built_runtime_executes_futures() -> Result<()> {
        let runtime = build_runtime(&RuntimeConfig::for_profile(RuntimeProfile::Compact))?;
        let value = runtime.block_on(async { tokio::task::spawn(async { 21 * 2 }).await })?;
        assert_eq!(value, 42);
        Ok(())
    }
}
