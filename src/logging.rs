//! Tracing subscriber setup for binaries and long-running training jobs.

use tracing_subscriber::EnvFilter;

use crate::error::{DqnError, Result};

/// Install a formatted `tracing` subscriber for the whole process.
///
/// `RUST_LOG` takes precedence; `default_directive` (e.g. `"deepq=info"`)
/// is used when it is unset or unparsable. Calling this a second time
/// returns an error instead of replacing the first subscriber.
pub fn init_tracing(default_directive: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .map_err(|e| DqnError::Logging(format!("invalid filter '{}': {}", default_directive, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| DqnError::Logging(e.to_string()))
}
