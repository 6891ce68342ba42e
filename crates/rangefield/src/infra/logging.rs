//! Tracing subscriber setup.

use std::io;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use tracing_subscriber::filter::LevelFilter;

/// Parse a level name such as `warn` or `debug`.
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(level.trim()).map_err(|_| anyhow!("unknown log level '{level}'"))
}

/// Install the global fmt subscriber. Output goes to stderr so stdout stays reserved for
/// results.
pub fn init(level: &str) -> Result<()> {
    let filter = parse_level(level)?;
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}
