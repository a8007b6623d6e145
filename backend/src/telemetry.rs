//! Tracing bootstrap for embedding applications.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialise JSON tracing with the environment filter.
///
/// Safe to call more than once; a second initialisation logs a warning and
/// keeps the first subscriber.
pub fn init() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}
