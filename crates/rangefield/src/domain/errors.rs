//! Domain-specific errors.

use thiserror::Error;

/// Failures raised by range sections and the fields built on them.
///
/// Every variant describes caller misuse; none of them leave a section or field in a
/// different state than before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid range section `{section}`: {reason}")]
    InvalidSection { section: String, reason: String },
    #[error("unknown choice `{key}` in range section `{section}`")]
    UnknownChoice { section: String, key: String },
    #[error("index {index} out of range for section `{section}` with {len} choices")]
    IndexOutOfRange {
        section: String,
        index: usize,
        len: usize,
    },
    #[error("no {axis} range configured")]
    MissingRange { axis: crate::domain::model::Axis },
}

/// Failures raised when addressing fields through a form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("duplicate field `{0}`")]
    DuplicateField(String),
    #[error("field `{0}` is not a range field")]
    NotARangeField(String),
    #[error("field `{0}` is not a text field")]
    NotATextField(String),
    #[error(transparent)]
    Range(#[from] RangeError),
}
