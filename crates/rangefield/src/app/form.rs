//! Form container tracking field values, dirty state, and validation.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::app::field::{Field, FieldChange, FieldValue, ValidationError};
use crate::app::range_field::RangeField;
use crate::domain::errors::FormError;
use crate::domain::model::{Axis, RangeSection};

/// Ordered set of fields making up one form.
///
/// Dirty tracking is fed exclusively by the change notifications fields emit, so writes that go
/// straight to a field (for example from an attached picker) are tracked the same way as writes
/// made through the form.
#[derive(Default)]
pub struct Form {
    fields: Vec<Box<dyn Field>>,
    dirty: Rc<Cell<bool>>,
    changed: Rc<RefCell<BTreeSet<String>>>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, rejecting keys already in use.
    pub fn add_field(&mut self, mut field: Box<dyn Field>) -> Result<(), FormError> {
        if self.field(field.key()).is_some() {
            return Err(FormError::DuplicateField(field.key().to_string()));
        }

        let dirty = Rc::clone(&self.dirty);
        let changed = Rc::clone(&self.changed);
        field.subscribe(Box::new(move |change: &FieldChange| {
            dirty.set(true);
            changed.borrow_mut().insert(change.field.clone());
        }));

        debug!(field = field.key(), "field added to form");
        self.fields.push(field);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|field| field.key())
    }

    pub fn fields(&self) -> impl Iterator<Item = &dyn Field> + '_ {
        self.fields.iter().map(|field| field.as_ref())
    }

    pub fn field(&self, key: &str) -> Option<&dyn Field> {
        self.fields
            .iter()
            .find(|field| field.key() == key)
            .map(|field| field.as_ref())
    }

    fn field_mut(&mut self, key: &str) -> Result<&mut Box<dyn Field>, FormError> {
        self.fields
            .iter_mut()
            .find(|field| field.key() == key)
            .ok_or_else(|| FormError::UnknownField(key.to_string()))
    }

    pub fn range_field(&self, key: &str) -> Result<&RangeField, FormError> {
        self.field(key)
            .ok_or_else(|| FormError::UnknownField(key.to_string()))?
            .as_range()
            .ok_or_else(|| FormError::NotARangeField(key.to_string()))
    }

    pub fn range_field_mut(&mut self, key: &str) -> Result<&mut RangeField, FormError> {
        self.field_mut(key)?
            .as_range_mut()
            .ok_or_else(|| FormError::NotARangeField(key.to_string()))
    }

    /// Select `choice` on `axis` of the range field `key`.
    pub fn set_selection(&mut self, key: &str, axis: Axis, choice: &str) -> Result<(), FormError> {
        self.range_field_mut(key)?.set_selection(axis, choice)?;
        Ok(())
    }

    /// Clear both selections of the range field `key`.
    pub fn reset_field(&mut self, key: &str) -> Result<(), FormError> {
        self.range_field_mut(key)?.reset();
        Ok(())
    }

    /// Swap the section on `axis` of the range field `key`.
    pub fn reconfigure(
        &mut self,
        key: &str,
        axis: Axis,
        section: Option<RangeSection>,
    ) -> Result<(), FormError> {
        self.range_field_mut(key)?.set_range(axis, section);
        Ok(())
    }

    pub fn set_text(&mut self, key: &str, text: &str) -> Result<(), FormError> {
        self.field_mut(key)?
            .as_text_mut()
            .ok_or_else(|| FormError::NotATextField(key.to_string()))?
            .set_text(text);
        Ok(())
    }

    pub fn display_value(&self, key: &str) -> Option<String> {
        self.field(key).map(|field| field.display_value())
    }

    /// `(key, display value)` pairs in insertion order.
    pub fn display_values(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|field| (field.key().to_string(), field.display_value()))
            .collect()
    }

    /// Submission values keyed by field.
    pub fn values(&self) -> BTreeMap<String, FieldValue> {
        self.fields
            .iter()
            .map(|field| (field.key().to_string(), field.value()))
            .collect()
    }

    /// Run every field's validation hook, collecting the failures.
    pub fn validate(&self) -> Vec<ValidationError> {
        self.fields
            .iter()
            .filter_map(|field| field.validate().err())
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Keys of fields changed since the last [`Form::mark_clean`].
    pub fn changed_fields(&self) -> Vec<String> {
        self.changed.borrow().iter().cloned().collect()
    }

    pub fn mark_clean(&mut self) {
        self.dirty.set(false);
        self.changed.borrow_mut().clear();
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("fields", &self.keys().collect::<Vec<_>>())
            .field("dirty", &self.dirty.get())
            .finish()
    }
}
