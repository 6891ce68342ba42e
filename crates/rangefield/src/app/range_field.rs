//! A form field whose value is picked from a lower and an upper range section.

use std::cell::RefCell;
use std::rc::Weak;

use tracing::{debug, trace, warn};

use crate::app::field::{
    ChangeListener, ChangeNotifier, Field, FieldChange, FieldRules, FieldValue, ValidationError,
    Validator,
};
use crate::domain::errors::RangeError;
use crate::domain::model::{Axis, RangeSection};

/// Joins the lower and upper labels in the display value.
pub const DISPLAY_SEPARATOR: &str = " ";

/// Presentation surface driven by a range field, such as a dual-wheel picker.
///
/// Fields only hold a weak handle to the view; the view's owner controls its lifetime.
pub trait InputView {
    /// The choices available on `axis` changed, or were removed when `section` is `None`.
    fn render_choices(&mut self, axis: Axis, section: Option<&RangeSection>);

    /// The selected key on `axis` changed, or was cleared when `key` is `None`.
    fn report_selection(&mut self, axis: Axis, key: Option<&str>);
}

/// Non-owning handle to an [`InputView`].
pub type InputViewHandle = Weak<RefCell<dyn InputView>>;

/// How much of a range field has been picked.
///
/// A field with a single configured range moves straight from `Unselected` to `FullySelected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Unselected,
    PartiallySelected,
    FullySelected,
}

#[derive(Debug)]
pub struct RangeField {
    key: String,
    lower: Option<RangeSection>,
    upper: Option<RangeSection>,
    selected_lower: Option<String>,
    selected_upper: Option<String>,
    rules: FieldRules,
    notifier: ChangeNotifier,
    input_view: Option<InputViewHandle>,
}

impl RangeField {
    /// Create a field with no ranges configured.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            lower: None,
            upper: None,
            selected_lower: None,
            selected_upper: None,
            rules: FieldRules::default(),
            notifier: ChangeNotifier::default(),
            input_view: None,
        }
    }

    pub fn with_lower(mut self, section: RangeSection) -> Self {
        self.lower = Some(section);
        self
    }

    pub fn with_upper(mut self, section: RangeSection) -> Self {
        self.upper = Some(section);
        self
    }

    /// Require every configured range to be selected for the field to validate.
    pub fn required(mut self, required: bool) -> Self {
        self.rules.required = required;
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.rules.validator = Some(validator);
        self
    }

    pub fn range(&self, axis: Axis) -> Option<&RangeSection> {
        match axis {
            Axis::Lower => self.lower.as_ref(),
            Axis::Upper => self.upper.as_ref(),
        }
    }

    /// Selected choice key on `axis`.
    pub fn selection(&self, axis: Axis) -> Option<&str> {
        match axis {
            Axis::Lower => self.selected_lower.as_deref(),
            Axis::Upper => self.selected_upper.as_deref(),
        }
    }

    /// Label of the selected choice on `axis`.
    pub fn selected_label(&self, axis: Axis) -> Option<&str> {
        let key = self.selection(axis)?;
        self.range(axis)?.label_for_key(key).ok()
    }

    pub fn state(&self) -> SelectionState {
        let configured = Axis::ALL
            .iter()
            .filter(|axis| self.range(**axis).is_some())
            .count();
        let selected = Axis::ALL
            .iter()
            .filter(|axis| self.selection(**axis).is_some())
            .count();
        match selected {
            0 => SelectionState::Unselected,
            n if n == configured => SelectionState::FullySelected,
            _ => SelectionState::PartiallySelected,
        }
    }

    /// Select `choice` on `axis`.
    ///
    /// Fails without touching the current selection when the axis has no range or the range has
    /// no such choice. Re-selecting the current key is a no-op.
    pub fn set_selection(&mut self, axis: Axis, choice: &str) -> Result<(), RangeError> {
        let section = self.range(axis).ok_or(RangeError::MissingRange { axis })?;
        if !section.contains_key(choice) {
            return Err(RangeError::UnknownChoice {
                section: section.key().to_string(),
                key: choice.to_string(),
            });
        }
        if self.selection(axis) == Some(choice) {
            return Ok(());
        }

        let previous = self.value();
        *self.slot_mut(axis) = Some(choice.to_string());
        debug!(field = %self.key, %axis, choice, "range selection updated");

        self.with_view(|view| view.report_selection(axis, Some(choice)));
        self.emit(previous);
        Ok(())
    }

    /// Select the choice presented at row `index` on `axis`.
    pub fn set_selection_index(&mut self, axis: Axis, index: usize) -> Result<(), RangeError> {
        let section = self.range(axis).ok_or(RangeError::MissingRange { axis })?;
        let choice = section.key_at_index(index)?.to_string();
        self.set_selection(axis, &choice)
    }

    /// Clear both selections, returning the field to `Unselected`.
    pub fn reset(&mut self) {
        if self.selected_lower.is_none() && self.selected_upper.is_none() {
            return;
        }
        let previous = self.value();
        self.selected_lower = None;
        self.selected_upper = None;
        debug!(field = %self.key, "range selections reset");

        self.with_view(|view| {
            for axis in Axis::ALL {
                view.report_selection(axis, None);
            }
        });
        self.emit(previous);
    }

    /// Replace the section on `axis`.
    ///
    /// A selection whose key is absent from the new section is cleared; a key that is still
    /// offered stays selected.
    pub fn set_range(&mut self, axis: Axis, section: Option<RangeSection>) {
        let previous = self.value();
        let stale = match (self.selection(axis), section.as_ref()) {
            (Some(choice), Some(next)) => !next.contains_key(choice),
            (Some(_), None) => true,
            (None, _) => false,
        };

        match axis {
            Axis::Lower => self.lower = section,
            Axis::Upper => self.upper = section,
        }
        if stale {
            *self.slot_mut(axis) = None;
        }
        debug!(field = %self.key, %axis, cleared = stale, "range reconfigured");

        self.sync_axis(axis);
        if stale {
            self.emit(previous);
        }
    }

    /// Wire up a presentation surface. Both axes are rendered into it immediately.
    pub fn attach_input_view(&mut self, view: InputViewHandle) {
        self.input_view = Some(view);
        for axis in Axis::ALL {
            self.sync_axis(axis);
        }
    }

    pub fn detach_input_view(&mut self) {
        self.input_view = None;
    }

    pub fn has_input_view(&self) -> bool {
        self.input_view
            .as_ref()
            .is_some_and(|view| view.strong_count() > 0)
    }

    fn slot_mut(&mut self, axis: Axis) -> &mut Option<String> {
        match axis {
            Axis::Lower => &mut self.selected_lower,
            Axis::Upper => &mut self.selected_upper,
        }
    }

    fn sync_axis(&mut self, axis: Axis) {
        let Some(handle) = self.live_view() else {
            return;
        };
        let section = self.range(axis);
        let choice = self.selection(axis);
        match handle.try_borrow_mut() {
            Ok(mut view) => {
                view.render_choices(axis, section);
                view.report_selection(axis, choice);
            }
            Err(_) => trace!(field = %self.key, %axis, "input view busy, skipping render"),
        };
    }

    fn with_view(&mut self, forward: impl FnOnce(&mut dyn InputView)) {
        let Some(handle) = self.live_view() else {
            return;
        };
        match handle.try_borrow_mut() {
            Ok(mut view) => forward(&mut *view),
            Err(_) => trace!(field = %self.key, "input view busy, skipping forward"),
        };
    }

    fn live_view(&mut self) -> Option<std::rc::Rc<RefCell<dyn InputView>>> {
        let handle = self.input_view.as_ref()?.upgrade();
        if handle.is_none() {
            warn!(field = %self.key, "input view was torn down, detaching");
            self.input_view = None;
        }
        handle
    }

    fn emit(&mut self, previous: FieldValue) {
        let change = FieldChange {
            field: self.key.clone(),
            previous,
            current: self.value(),
        };
        self.notifier.notify(&change);
    }
}

impl Field for RangeField {
    fn key(&self) -> &str {
        &self.key
    }

    /// Labels of the selected choices joined by [`DISPLAY_SEPARATOR`], or an empty string while
    /// any configured range is unselected.
    fn display_value(&self) -> String {
        let mut labels = Vec::with_capacity(2);
        for axis in Axis::ALL {
            if self.range(axis).is_none() {
                continue;
            }
            match self.selected_label(axis) {
                Some(label) => labels.push(label),
                None => return String::new(),
            }
        }
        labels.join(DISPLAY_SEPARATOR)
    }

    fn value(&self) -> FieldValue {
        FieldValue::Range {
            lower: self.selected_lower.clone(),
            upper: self.selected_upper.clone(),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let complete = self.state() == SelectionState::FullySelected;
        self.rules.check(&self.key, &self.value(), complete)
    }

    fn subscribe(&mut self, listener: ChangeListener) {
        self.notifier.subscribe(listener);
    }

    fn as_range(&self) -> Option<&RangeField> {
        Some(self)
    }

    fn as_range_mut(&mut self) -> Option<&mut RangeField> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::rc::Rc;

    fn fruit() -> RangeSection {
        RangeSection::new("lower", [("a", "Apple"), ("b", "Banana")], ["a", "b"]).unwrap()
    }

    fn units() -> RangeSection {
        RangeSection::new("upper", [("x", "Kg"), ("y", "Lb")], ["x", "y"]).unwrap()
    }

    fn dual() -> RangeField {
        RangeField::new("weight").with_lower(fruit()).with_upper(units())
    }

    #[derive(Default)]
    struct RecordingView {
        rendered: Vec<(Axis, Option<usize>)>,
        reported: Vec<(Axis, Option<String>)>,
    }

    impl InputView for RecordingView {
        fn render_choices(&mut self, axis: Axis, section: Option<&RangeSection>) {
            self.rendered.push((axis, section.map(RangeSection::len)));
        }

        fn report_selection(&mut self, axis: Axis, key: Option<&str>) {
            self.reported.push((axis, key.map(str::to_string)));
        }
    }

    #[test]
    fn display_value_is_empty_until_selected() {
        let mut field = dual();
        assert_eq!(field.display_value(), "");
        assert_eq!(field.state(), SelectionState::Unselected);

        field.set_selection(Axis::Lower, "b").unwrap();
        assert_eq!(field.display_value(), "");
        assert_eq!(field.state(), SelectionState::PartiallySelected);
    }

    #[test]
    fn joins_lower_and_upper_labels() {
        let mut field = dual();
        field.set_selection(Axis::Lower, "b").unwrap();
        field.set_selection(Axis::Upper, "x").unwrap();

        assert_eq!(field.display_value(), "Banana Kg");
        assert_eq!(field.display_value(), field.display_value());
        assert_eq!(field.state(), SelectionState::FullySelected);
        assert_eq!(
            field.value(),
            FieldValue::Range {
                lower: Some("b".into()),
                upper: Some("x".into()),
            }
        );
    }

    #[test]
    fn single_range_shows_label_alone() {
        let mut field = RangeField::new("fruit").with_lower(fruit());
        field.set_selection(Axis::Lower, "b").unwrap();
        assert_eq!(field.display_value(), "Banana");
        assert_eq!(field.state(), SelectionState::FullySelected);
    }

    #[test]
    fn unknown_choice_keeps_previous_selection() {
        let mut field = dual();
        field.set_selection(Axis::Lower, "a").unwrap();

        let err = field.set_selection(Axis::Lower, "z").unwrap_err();
        assert_eq!(
            err,
            RangeError::UnknownChoice {
                section: "lower".into(),
                key: "z".into(),
            }
        );
        assert_eq!(field.selection(Axis::Lower), Some("a"));
    }

    #[test]
    fn selecting_on_missing_range_fails() {
        let mut field = RangeField::new("fruit").with_lower(fruit());
        assert_eq!(
            field.set_selection(Axis::Upper, "x").unwrap_err(),
            RangeError::MissingRange { axis: Axis::Upper }
        );
    }

    #[test]
    fn selects_by_index() {
        let mut field = dual();
        field.set_selection_index(Axis::Upper, 1).unwrap();
        assert_eq!(field.selection(Axis::Upper), Some("y"));
        assert!(matches!(
            field.set_selection_index(Axis::Upper, 2),
            Err(RangeError::IndexOutOfRange { index: 2, len: 2, .. })
        ));
        assert_eq!(field.selection(Axis::Upper), Some("y"));
    }

    #[test]
    fn reconfigure_clears_stale_selection() {
        let mut field = dual();
        field.set_selection(Axis::Lower, "b").unwrap();
        field.set_selection(Axis::Upper, "x").unwrap();

        let citrus = RangeSection::new("lower", [("c", "Cherry")], ["c"]).unwrap();
        field.set_range(Axis::Lower, Some(citrus));

        assert_eq!(field.selection(Axis::Lower), None);
        assert_eq!(field.selection(Axis::Upper), Some("x"));
        assert_eq!(field.display_value(), "");
        assert_eq!(field.state(), SelectionState::PartiallySelected);
    }

    #[test]
    fn reconfigure_keeps_selection_still_offered() {
        let mut field = dual();
        field.set_selection(Axis::Lower, "b").unwrap();

        let wider = RangeSection::from_ordered_pairs("lower", [("b", "Blueberry"), ("c", "Cherry")])
            .unwrap();
        field.set_range(Axis::Lower, Some(wider));

        assert_eq!(field.selection(Axis::Lower), Some("b"));
        assert_eq!(field.selected_label(Axis::Lower), Some("Blueberry"));
    }

    #[test]
    fn removing_a_range_collapses_display() {
        let mut field = dual();
        field.set_selection(Axis::Lower, "a").unwrap();
        field.set_selection(Axis::Upper, "y").unwrap();

        field.set_range(Axis::Upper, None);
        assert_eq!(field.selection(Axis::Upper), None);
        assert_eq!(field.display_value(), "Apple");
    }

    #[test]
    fn reset_returns_to_unselected_and_notifies_once() {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let mut field = dual();
        let sink = Rc::clone(&changes);
        field.subscribe(Box::new(move |change: &FieldChange| sink.borrow_mut().push(change.clone())));

        field.set_selection(Axis::Lower, "a").unwrap();
        field.set_selection(Axis::Lower, "a").unwrap();
        field.reset();
        field.reset();

        assert_eq!(field.state(), SelectionState::Unselected);
        let changes = changes.borrow();
        assert_eq!(changes.len(), 2);
        assert_eq!(
            changes[1].current,
            FieldValue::Range {
                lower: None,
                upper: None,
            }
        );
    }

    #[test]
    fn required_field_needs_every_range() {
        let mut field = dual().required(true);
        field.set_selection(Axis::Lower, "a").unwrap();
        assert!(field.validate().is_err());
        field.set_selection(Axis::Upper, "x").unwrap();
        assert!(field.validate().is_ok());
    }

    #[test]
    fn forwards_to_attached_view() {
        let view = Rc::new(RefCell::new(RecordingView::default()));
        let handle: Rc<RefCell<dyn InputView>> = view.clone();
        let mut field = dual();
        field.set_selection(Axis::Upper, "y").unwrap();

        field.attach_input_view(Rc::downgrade(&handle));
        field.set_selection(Axis::Lower, "b").unwrap();

        let view = view.borrow();
        assert_eq!(
            view.rendered,
            vec![(Axis::Lower, Some(2)), (Axis::Upper, Some(2))]
        );
        assert_eq!(
            view.reported,
            vec![
                (Axis::Lower, None),
                (Axis::Upper, Some("y".into())),
                (Axis::Lower, Some("b".into())),
            ]
        );
    }

    #[test]
    fn tolerates_torn_down_view() {
        let mut field = dual();
        {
            let view: Rc<RefCell<dyn InputView>> = Rc::new(RefCell::new(RecordingView::default()));
            field.attach_input_view(Rc::downgrade(&view));
            assert!(field.has_input_view());
        }

        assert!(!field.has_input_view());
        field.set_selection(Axis::Lower, "a").unwrap();
        field.reset();
        field.set_range(Axis::Upper, None);
        assert_eq!(field.display_value(), "");
    }
}
