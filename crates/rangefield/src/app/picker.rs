//! Presentation-side state for choosing range values: a dual-wheel picker and a choice list.

use std::cell::RefCell;

use tracing::trace;

use crate::app::form::Form;
use crate::app::range_field::{InputView, RangeField};
use crate::domain::errors::{FormError, RangeError};
use crate::domain::model::{Axis, RangeSection};

/// Rows and cursor for one wheel of a [`WheelPicker`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wheel {
    title: Option<String>,
    rows: Vec<(String, String)>,
    highlighted: usize,
    selected: Option<usize>,
}

impl Wheel {
    /// Section key the wheel was rendered from, `None` while the axis has no range.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn is_configured(&self) -> bool {
        self.title.is_some()
    }

    /// `(key, label)` rows in presentation order.
    pub fn rows(&self) -> &[(String, String)] {
        &self.rows
    }

    pub fn highlighted(&self) -> Option<usize> {
        (!self.rows.is_empty()).then_some(self.highlighted)
    }

    /// Row holding the field's committed selection.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    fn step(&mut self, forward: bool, wrap: bool) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        self.highlighted = match (forward, wrap) {
            (true, _) if self.highlighted + 1 < len => self.highlighted + 1,
            (true, true) => 0,
            (true, false) => len - 1,
            (false, _) if self.highlighted > 0 => self.highlighted - 1,
            (false, true) => len - 1,
            (false, false) => 0,
        };
    }
}

/// Dual-wheel picker state. Attach it to a [`RangeField`] as its input view to keep the wheels in
/// step with the field's sections and selections.
#[derive(Debug, Clone, Default)]
pub struct WheelPicker {
    lower: Wheel,
    upper: Wheel,
    focus: Option<Axis>,
    wrap: bool,
}

impl WheelPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let wheels wrap from the last row to the first and back.
    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn wheel(&self, axis: Axis) -> &Wheel {
        match axis {
            Axis::Lower => &self.lower,
            Axis::Upper => &self.upper,
        }
    }

    fn wheel_mut(&mut self, axis: Axis) -> &mut Wheel {
        match axis {
            Axis::Lower => &mut self.lower,
            Axis::Upper => &mut self.upper,
        }
    }

    /// Axis receiving movement, defaulting to the first configured wheel.
    pub fn focus(&self) -> Option<Axis> {
        self.focus
            .filter(|axis| self.wheel(*axis).is_configured())
            .or_else(|| {
                Axis::ALL
                    .into_iter()
                    .find(|axis| self.wheel(*axis).is_configured())
            })
    }

    pub fn set_focus(&mut self, axis: Axis) {
        if self.wheel(axis).is_configured() {
            self.focus = Some(axis);
        }
    }

    pub fn toggle_focus(&mut self) {
        if let Some(current) = self.focus() {
            self.set_focus(current.other());
        }
    }

    pub fn move_down(&mut self) {
        self.step(true);
    }

    pub fn move_up(&mut self) {
        self.step(false);
    }

    fn step(&mut self, forward: bool) {
        let wrap = self.wrap;
        if let Some(axis) = self.focus() {
            self.wheel_mut(axis).step(forward, wrap);
        }
    }

    /// Highlighted key on `axis`.
    pub fn highlighted_key(&self, axis: Axis) -> Option<&str> {
        let wheel = self.wheel(axis);
        let index = wheel.highlighted()?;
        wheel.rows.get(index).map(|(key, _)| key.as_str())
    }

    /// Highlighted row of every configured wheel.
    pub fn pending(&self) -> Vec<(Axis, usize)> {
        Axis::ALL
            .into_iter()
            .filter_map(|axis| self.wheel(axis).highlighted().map(|index| (axis, index)))
            .collect()
    }
}

impl InputView for WheelPicker {
    fn render_choices(&mut self, axis: Axis, section: Option<&RangeSection>) {
        trace!(%axis, rows = ?section.map(RangeSection::len), "rendering wheel");
        let wheel = self.wheel_mut(axis);
        *wheel = match section {
            Some(section) => Wheel {
                title: Some(section.key().to_string()),
                rows: section
                    .iter()
                    .map(|(key, label)| (key.to_string(), label.to_string()))
                    .collect(),
                highlighted: 0,
                selected: None,
            },
            None => Wheel::default(),
        };
    }

    fn report_selection(&mut self, axis: Axis, key: Option<&str>) {
        let wheel = self.wheel_mut(axis);
        let selected = key.and_then(|key| wheel.rows.iter().position(|(row, _)| row == key));
        wheel.selected = selected;
        if let Some(index) = wheel.selected {
            wheel.highlighted = index;
        }
    }
}

/// Write the picker's highlighted rows into `field`.
///
/// The picker borrow is released before the field is touched so the field can report the new
/// selections back into the same picker.
pub fn commit(picker: &RefCell<WheelPicker>, field: &mut RangeField) -> Result<(), RangeError> {
    let pending = picker.borrow().pending();
    for (axis, index) in pending {
        field.set_selection_index(axis, index)?;
    }
    Ok(())
}

/// One row of a [`ChoiceList`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceRow<'a> {
    pub key: &'a str,
    pub label: &'a str,
    pub selected: bool,
}

/// Table-style list of the choices on one axis of one range field.
///
/// The list only stores which field it edits; rows are read from the form on demand, and
/// dismissing the list is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceList {
    field: String,
    axis: Axis,
    cursor: usize,
}

impl ChoiceList {
    /// Open a list over `axis` of the range field `field`, placing the cursor on the current
    /// selection.
    pub fn new(form: &Form, field: impl Into<String>, axis: Axis) -> Result<Self, FormError> {
        let field = field.into();
        let range_field = form.range_field(&field)?;
        let section = range_field
            .range(axis)
            .ok_or(RangeError::MissingRange { axis })?;
        let cursor = match range_field.selection(axis) {
            Some(choice) => section.index_of_key(choice)?,
            None => 0,
        };
        Ok(Self {
            field,
            axis,
            cursor,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn section<'f>(&self, form: &'f Form) -> Result<&'f RangeSection, FormError> {
        let section = form
            .range_field(&self.field)?
            .range(self.axis)
            .ok_or(RangeError::MissingRange { axis: self.axis })?;
        Ok(section)
    }

    pub fn rows<'f>(&self, form: &'f Form) -> Result<Vec<ChoiceRow<'f>>, FormError> {
        let range_field = form.range_field(&self.field)?;
        let section = self.section(form)?;
        let current = range_field.selection(self.axis);
        Ok(section
            .iter()
            .map(|(key, label)| ChoiceRow {
                key,
                label,
                selected: current == Some(key),
            })
            .collect())
    }

    pub fn move_down(&mut self, form: &Form) -> Result<(), FormError> {
        let len = self.section(form)?.len();
        self.clamp(len);
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
        Ok(())
    }

    pub fn move_up(&mut self, form: &Form) -> Result<(), FormError> {
        let len = self.section(form)?.len();
        self.clamp(len);
        self.cursor = self.cursor.saturating_sub(1);
        Ok(())
    }

    // The section may have been reconfigured to fewer rows since the cursor last moved.
    fn clamp(&mut self, len: usize) {
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    /// Select the row under the cursor, returning its key.
    pub fn confirm(&self, form: &mut Form) -> Result<String, FormError> {
        let choice = self.section(form)?.key_at_index(self.cursor)?.to_string();
        form.set_selection(&self.field, self.axis, &choice)?;
        Ok(choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::rc::Rc;

    use crate::app::field::Field;

    fn field() -> RangeField {
        RangeField::new("weight")
            .with_lower(
                RangeSection::from_ordered_pairs("amount", [("1", "One"), ("2", "Two"), ("3", "Three")])
                    .unwrap(),
            )
            .with_upper(RangeSection::from_ordered_pairs("unit", [("kg", "Kg"), ("lb", "Lb")]).unwrap())
    }

    fn attached(field: &mut RangeField, picker: WheelPicker) -> Rc<RefCell<WheelPicker>> {
        let picker = Rc::new(RefCell::new(picker));
        let view: Rc<RefCell<dyn InputView>> = picker.clone();
        field.attach_input_view(Rc::downgrade(&view));
        picker
    }

    #[test]
    fn attaching_renders_both_wheels() {
        let mut field = field();
        field.set_selection(Axis::Upper, "lb").unwrap();
        let picker = attached(&mut field, WheelPicker::new());

        let picker = picker.borrow();
        assert_eq!(picker.wheel(Axis::Lower).rows().len(), 3);
        assert_eq!(picker.wheel(Axis::Lower).title(), Some("amount"));
        assert_eq!(picker.wheel(Axis::Upper).selected(), Some(1));
        assert_eq!(picker.highlighted_key(Axis::Upper), Some("lb"));
        assert_eq!(picker.focus(), Some(Axis::Lower));
    }

    #[test]
    fn commit_writes_highlighted_rows_back() {
        let mut field = field();
        let picker = attached(&mut field, WheelPicker::new());

        {
            let mut picker = picker.borrow_mut();
            picker.move_down();
            picker.move_down();
            picker.toggle_focus();
            picker.move_down();
        }
        commit(&picker, &mut field).unwrap();

        assert_eq!(field.display_value(), "Three Lb");
        let picker = picker.borrow();
        assert_eq!(picker.wheel(Axis::Lower).selected(), Some(2));
        assert_eq!(picker.wheel(Axis::Upper).selected(), Some(1));
    }

    #[test]
    fn wheels_clamp_or_wrap() {
        let mut field = field();
        let clamped = attached(&mut field, WheelPicker::new());
        clamped.borrow_mut().move_up();
        assert_eq!(clamped.borrow().highlighted_key(Axis::Lower), Some("1"));

        let mut other = self::field();
        let wrapping = attached(&mut other, WheelPicker::new().with_wrap(true));
        wrapping.borrow_mut().move_up();
        assert_eq!(wrapping.borrow().highlighted_key(Axis::Lower), Some("3"));
    }

    #[test]
    fn reconfigure_rerenders_wheel() {
        let mut field = field();
        field.set_selection(Axis::Lower, "2").unwrap();
        let picker = attached(&mut field, WheelPicker::new());

        field.set_range(
            Axis::Lower,
            Some(RangeSection::from_ordered_pairs("amount", [("9", "Nine")]).unwrap()),
        );

        let picker = picker.borrow();
        assert_eq!(picker.wheel(Axis::Lower).rows().len(), 1);
        assert_eq!(picker.wheel(Axis::Lower).selected(), None);
    }

    fn form() -> Form {
        let mut form = Form::new();
        form.add_field(Box::new(field())).unwrap();
        form
    }

    #[test]
    fn choice_list_confirms_through_form() {
        let mut form = form();
        let mut list = ChoiceList::new(&form, "weight", Axis::Upper).unwrap();
        list.move_down(&form).unwrap();
        list.move_down(&form).unwrap();
        assert_eq!(list.cursor(), 1);

        assert_eq!(list.confirm(&mut form).unwrap(), "lb");
        assert!(form.is_dirty());

        let rows = list.rows(&form).unwrap();
        assert_eq!(
            rows[1],
            ChoiceRow {
                key: "lb",
                label: "Lb",
                selected: true,
            }
        );
    }

    #[test]
    fn choice_list_starts_on_current_selection() {
        let mut form = form();
        form.set_selection("weight", Axis::Lower, "3").unwrap();
        let list = ChoiceList::new(&form, "weight", Axis::Lower).unwrap();
        assert_eq!(list.cursor(), 2);
    }

    #[test]
    fn choice_list_cursor_follows_shrunk_section() {
        let mut form = form();
        form.set_selection("weight", Axis::Lower, "3").unwrap();
        let mut list = ChoiceList::new(&form, "weight", Axis::Lower).unwrap();
        assert_eq!(list.cursor(), 2);

        form.reconfigure(
            "weight",
            Axis::Lower,
            Some(RangeSection::from_ordered_pairs("amount", [("1", "One")]).unwrap()),
        )
        .unwrap();
        list.move_up(&form).unwrap();
        assert_eq!(list.cursor(), 0);
        assert_eq!(list.confirm(&mut form).unwrap(), "1");

        list.move_down(&form).unwrap();
        assert_eq!(list.cursor(), 0);
    }

    #[test]
    fn choice_list_requires_a_range() {
        let mut form = Form::new();
        form.add_field(Box::new(
            RangeField::new("fruit")
                .with_lower(RangeSection::from_ordered_pairs("lower", [("a", "Apple")]).unwrap()),
        ))
        .unwrap();
        assert_eq!(
            ChoiceList::new(&form, "fruit", Axis::Upper).unwrap_err(),
            FormError::Range(RangeError::MissingRange { axis: Axis::Upper })
        );
    }
}
