//! Collection of reusable TUI components.

pub mod summary;
pub mod wheel;
