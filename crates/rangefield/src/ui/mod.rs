//! Terminal presentation layer for range fields.

pub mod app;
pub mod components;
