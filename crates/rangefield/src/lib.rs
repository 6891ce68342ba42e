pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;
pub mod ui;

pub use app::field::{Field, FieldValue, TextField, ValidationError};
pub use app::form::Form;
pub use app::range_field::{InputView, RangeField, SelectionState};
pub use domain::errors::{FormError, RangeError};
pub use domain::model::{Axis, RangeSection};

/// Install logging at `level` (e.g. `warn`, `debug`).
pub fn init(level: &str) -> anyhow::Result<()> {
    infra::logging::init(level)
}
