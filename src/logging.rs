// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Log output for driver binaries.
//!
//! The library itself only emits `tracing` events. Binaries that embed it can
//! call [`init`] once at startup to print them to stderr.
//!
//! # Environment Variables
//!
//! - `UC_LOG_LEVEL`: level or filter directive (default `debug`)
//! - `RUST_LOG`: used when `UC_LOG_LEVEL` is not set

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Variable holding the log level.
pub const LOG_LEVEL_ENV: &str = "UC_LOG_LEVEL";

/// Level used when no variable is set.
pub const DEFAULT_LEVEL: &str = "debug";

/// Logging setup error.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// A global subscriber was already installed.
    #[error("failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Installs a compact stderr subscriber filtered by `UC_LOG_LEVEL`.
///
/// # Errors
///
/// Returns `LoggingError::TracingInit` if a subscriber is already set.
pub fn init() -> Result<(), LoggingError> {
    let filter = env_filter(
        std::env::var(LOG_LEVEL_ENV).ok(),
        std::env::var("RUST_LOG").ok(),
    );

    Registry::default()
        .with(fmt::layer().with_target(true).compact())
        .with(filter)
        .try_init()
        .map_err(|e| LoggingError::TracingInit(e.to_string()))
}

/// Returns `true` once a global subscriber is installed.
#[must_use]
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

fn env_filter(level: Option<String>, rust_log: Option<String>) -> EnvFilter {
    let directive = level
        .or(rust_log)
        .map(|d| d.trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string());
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}
