//! Application layer: fields, forms, and the presentation contracts around them.

pub mod field;
pub mod form;
pub mod picker;
pub mod range_field;
