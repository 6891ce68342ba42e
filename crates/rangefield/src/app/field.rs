//! Generic field capability shared by every field a form can hold.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::app::range_field::RangeField;

/// Callback invoked after a field's stored value changes.
pub type ChangeListener = Box<dyn FnMut(&FieldChange)>;

/// Custom validation hook run against a field's stored value.
pub type Validator = Box<dyn Fn(&FieldValue) -> Result<(), String>>;

/// The value a form validates and submits. Range fields submit their selected keys, never the
/// labels they display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Range {
        lower: Option<String>,
        upper: Option<String>,
    },
}

/// Notification payload describing a single value change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: String,
    pub previous: FieldValue,
    pub current: FieldValue,
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Capability every form field provides to its owning form.
pub trait Field {
    /// Key identifying the field within its form.
    fn key(&self) -> &str;

    /// Human-readable rendering of the current value.
    fn display_value(&self) -> String;

    /// Stored value seen by validation and submission.
    fn value(&self) -> FieldValue;

    /// Run the field's validation hook.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Register a listener for value changes.
    fn subscribe(&mut self, listener: ChangeListener);

    fn as_range(&self) -> Option<&RangeField> {
        None
    }

    fn as_range_mut(&mut self) -> Option<&mut RangeField> {
        None
    }

    fn as_text_mut(&mut self) -> Option<&mut TextField> {
        None
    }
}

/// Fan-out of change notifications to registered listeners.
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Vec<ChangeListener>,
}

impl ChangeNotifier {
    pub fn subscribe(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    pub fn notify(&mut self, change: &FieldChange) {
        for listener in self.listeners.iter_mut() {
            listener(change);
        }
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Validation settings shared by all field kinds.
#[derive(Default)]
pub struct FieldRules {
    pub required: bool,
    pub validator: Option<Validator>,
}

impl FieldRules {
    /// Check `value`; `complete` tells whether the field holds everything a required field needs.
    pub fn check(&self, field: &str, value: &FieldValue, complete: bool) -> Result<(), ValidationError> {
        if self.required && !complete {
            return Err(ValidationError::new(field, "a value is required"));
        }
        match &self.validator {
            Some(validator) => validator(value).map_err(|message| ValidationError::new(field, message)),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for FieldRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRules")
            .field("required", &self.required)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// Plain free-text field.
#[derive(Debug)]
pub struct TextField {
    key: String,
    text: String,
    rules: FieldRules,
    notifier: ChangeNotifier,
}

impl TextField {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: String::new(),
            rules: FieldRules::default(),
            notifier: ChangeNotifier::default(),
        }
    }

    /// Require non-blank text for the field to validate.
    pub fn required(mut self, required: bool) -> Self {
        self.rules.required = required;
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.rules.validator = Some(validator);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text, notifying listeners when it actually changed.
    pub fn set_text<S: Into<String>>(&mut self, text: S) {
        let text = text.into();
        if text == self.text {
            return;
        }
        let previous = self.value();
        self.text = text;
        tracing::debug!(field = %self.key, "text field updated");
        let change = FieldChange {
            field: self.key.clone(),
            previous,
            current: self.value(),
        };
        self.notifier.notify(&change);
    }
}

impl Field for TextField {
    fn key(&self) -> &str {
        &self.key
    }

    fn display_value(&self) -> String {
        self.text.clone()
    }

    fn value(&self) -> FieldValue {
        FieldValue::Text(self.text.clone())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.rules
            .check(&self.key, &self.value(), !self.text.trim().is_empty())
    }

    fn subscribe(&mut self, listener: ChangeListener) {
        self.notifier.subscribe(listener);
    }

    fn as_text_mut(&mut self) -> Option<&mut TextField> {
        Some(self)
    }
}
