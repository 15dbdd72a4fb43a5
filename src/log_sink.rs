// Purpose: route diagnostic logging to stderr so stdout stays the report channel

use tracing::Level;

use crate::errors::{TrajSafeError, TrajSafeResult};

/// Resolve the effective level: `--verbose` forces debug, otherwise the configured one.
pub fn resolve_level(configured: &str, verbose: bool) -> TrajSafeResult<Level> {
    if verbose {
        return Ok(Level::DEBUG);
    }
    configured
        .parse::<Level>()
        .map_err(|_| TrajSafeError::config(format!("unknown log_level '{configured}'")))
}

/// Install the global fmt subscriber. A second call is a no-op.
pub fn init_tracing(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
