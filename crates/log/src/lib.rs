//! # Keystone Log
//!
//! Subscriber setup for keystone binaries and tests. Libraries only emit
//! `tracing` events; whoever runs a synthesis pass picks the output here.
//!
//! ```no_run
//! let _guard = keystone_log::init_with(keystone_log::Config::from_env())?;
//! tracing::info!(scope = "sandbox", "Synthesis starting");
//! # Ok::<(), keystone_log::LogError>(())
//! ```
//!
//! Environment: `KEYSTONE_LOG` (falls back to `RUST_LOG`) sets the filter,
//! `KEYSTONE_LOG_FORMAT` picks `pretty`, `compact` or `json`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;

pub use builder::{LoggerBuilder, LoggerGuard};
pub use config::{Config, DisplayConfig, FORMAT_ENV, Format, LOG_ENV};
pub use error::{LogError, LogResult};

/// Initialize with default configuration plus environment overrides
pub fn init() -> LogResult<LoggerGuard> {
    init_with(Config::from_env())
}

/// Initialize with custom configuration
pub fn init_with(config: Config) -> LogResult<LoggerGuard> {
    LoggerBuilder::from_config(config).build()
}

/// Initialize for tests; a no-op when a subscriber is already installed
pub fn init_test() -> LogResult<LoggerGuard> {
    if tracing::dispatcher::has_been_set() {
        return Ok(LoggerGuard::noop());
    }
    match init_with(Config::test()) {
        Err(LogError::AlreadyInitialized(_)) => Ok(LoggerGuard::noop()),
        other => other,
    }
}
