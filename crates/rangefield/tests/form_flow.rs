use std::cell::RefCell;
use std::rc::Rc;

use rangefield::app::picker::{self, ChoiceList, WheelPicker};
use rangefield::{
    Axis, Field, FieldValue, Form, FormError, InputView, RangeError, RangeField, RangeSection,
    SelectionState,
};

fn lower() -> RangeSection {
    RangeSection::new("lower", [("a", "Apple"), ("b", "Banana")], ["a", "b"]).unwrap()
}

fn upper() -> RangeSection {
    RangeSection::new("upper", [("x", "Kg"), ("y", "Lb")], ["x", "y"]).unwrap()
}

fn form_with(field: RangeField) -> Form {
    let mut form = Form::new();
    form.add_field(Box::new(field)).unwrap();
    form
}

#[test]
fn resolves_value_and_unit() {
    let mut form = form_with(RangeField::new("weight").with_lower(lower()).with_upper(upper()));
    assert_eq!(form.display_value("weight").as_deref(), Some(""));

    form.set_selection("weight", Axis::Lower, "b").unwrap();
    form.set_selection("weight", Axis::Upper, "x").unwrap();

    assert_eq!(form.display_value("weight").as_deref(), Some("Banana Kg"));
    assert_eq!(
        form.values()["weight"],
        FieldValue::Range {
            lower: Some("b".into()),
            upper: Some("x".into()),
        }
    );
}

#[test]
fn single_range_has_no_separator() {
    let mut form = form_with(RangeField::new("fruit").with_lower(lower()));
    form.set_selection("fruit", Axis::Lower, "b").unwrap();
    assert_eq!(form.display_value("fruit").as_deref(), Some("Banana"));
}

#[test]
fn rejected_selection_changes_nothing() {
    let mut form = form_with(RangeField::new("weight").with_lower(lower()).with_upper(upper()));
    form.set_selection("weight", Axis::Upper, "y").unwrap();
    form.mark_clean();

    let err = form.set_selection("weight", Axis::Upper, "stone").unwrap_err();
    assert_eq!(
        err,
        FormError::Range(RangeError::UnknownChoice {
            section: "upper".into(),
            key: "stone".into(),
        })
    );
    let field = form.range_field("weight").unwrap();
    assert_eq!(field.selection(Axis::Upper), Some("y"));
    assert_eq!(field.state(), SelectionState::PartiallySelected);
    assert!(!form.is_dirty());
}

#[test]
fn reconfiguring_drops_foreign_selection() {
    let mut form = form_with(RangeField::new("weight").with_lower(lower()).with_upper(upper()));
    form.set_selection("weight", Axis::Lower, "a").unwrap();
    form.set_selection("weight", Axis::Upper, "x").unwrap();

    let berries = RangeSection::from_ordered_pairs("lower", [("r", "Raspberry")]).unwrap();
    form.reconfigure("weight", Axis::Lower, Some(berries)).unwrap();

    let field = form.range_field("weight").unwrap();
    assert_eq!(field.selection(Axis::Lower), None);
    assert_eq!(field.display_value(), "");
    assert!(form.set_selection("weight", Axis::Lower, "a").is_err());
    form.set_selection("weight", Axis::Lower, "r").unwrap();
    assert_eq!(form.display_value("weight").as_deref(), Some("Raspberry Kg"));
}

#[test]
fn reset_is_the_only_way_back_to_unselected() {
    let mut form = form_with(RangeField::new("weight").with_lower(lower()).with_upper(upper()));
    form.set_selection("weight", Axis::Lower, "a").unwrap();
    form.set_selection("weight", Axis::Upper, "x").unwrap();
    form.set_selection("weight", Axis::Upper, "y").unwrap();
    assert_eq!(
        form.range_field("weight").unwrap().state(),
        SelectionState::FullySelected
    );

    form.reset_field("weight").unwrap();
    assert_eq!(
        form.range_field("weight").unwrap().state(),
        SelectionState::Unselected
    );
}

#[test]
fn picker_and_choice_list_share_the_field() {
    let mut form = form_with(RangeField::new("weight").with_lower(lower()).with_upper(upper()));

    let wheels = Rc::new(RefCell::new(WheelPicker::new()));
    let view: Rc<RefCell<dyn InputView>> = wheels.clone();
    form.range_field_mut("weight")
        .unwrap()
        .attach_input_view(Rc::downgrade(&view));

    let mut list = ChoiceList::new(&form, "weight", Axis::Lower).unwrap();
    list.move_down(&form).unwrap();
    list.confirm(&mut form).unwrap();
    assert_eq!(wheels.borrow().wheel(Axis::Lower).selected(), Some(1));

    wheels.borrow_mut().set_focus(Axis::Upper);
    wheels.borrow_mut().move_down();
    picker::commit(&wheels, form.range_field_mut("weight").unwrap()).unwrap();
    assert_eq!(form.display_value("weight").as_deref(), Some("Banana Lb"));

    drop(view);
    drop(wheels);
    form.reset_field("weight").unwrap();
    assert!(!form.range_field("weight").unwrap().has_input_view());
}
