//! Infrastructure adapters for configuration, catalogs, and logging.

pub mod catalog;
pub mod config;
pub mod logging;
