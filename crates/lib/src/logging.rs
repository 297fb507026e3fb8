//! Tracing subscriber setup for recipe binaries.

use tracing_subscriber::EnvFilter;

use crate::consts::{DEFAULT_LOG_FILTER, LOG_ENV};

/// Install a fmt subscriber filtered by `FAKTORY_LOG` (default `info`).
///
/// Returns `false` if a global subscriber was already installed.
pub fn init() -> bool {
  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .without_time()
    .try_init()
    .is_ok()
}

