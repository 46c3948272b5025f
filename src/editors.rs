//! Parameter editor registry: which widget edits a parameter kind, and how the
//! kind is labelled on the invoke button.

use std::borrow::Cow;

use crate::model::{ParamKind, ParamValue, Quat};
use crate::registry::Parameter;
use crate::ui::Widgets;

/// Draws one value and returns the edited value.
pub type EditorFn = fn(&mut dyn Widgets, &Parameter, ParamValue) -> ParamValue;

/// Editor for a kind. Object references of any type share the reference
/// picker; unsupported kinds have no editor.
pub fn editor_for(kind: &ParamKind) -> Option<EditorFn> {
    let editor: EditorFn = match kind {
        ParamKind::Object { .. } => edit_object,
        ParamKind::Float => edit_float,
        ParamKind::Int => edit_int,
        ParamKind::Bool => edit_bool,
        ParamKind::Text => edit_text,
        ParamKind::Color => edit_color,
        ParamKind::Vector2 => edit_vector2,
        ParamKind::Vector3 => edit_vector3,
        ParamKind::Rotation => edit_rotation,
        ParamKind::Unsupported { .. } => return None,
    };
    Some(editor)
}

/// Label used in `name(type param,...)`.
pub fn label_for(kind: &ParamKind) -> Cow<'_, str> {
    let label = match kind {
        ParamKind::Float => "float",
        ParamKind::Int => "int",
        ParamKind::Bool => "bool",
        ParamKind::Text => "string",
        ParamKind::Color => "Color",
        ParamKind::Vector2 => "Vector2",
        ParamKind::Vector3 => "Vector3",
        ParamKind::Rotation => "Quaternion",
        ParamKind::Object { type_name } | ParamKind::Unsupported { type_name } => {
            return Cow::Borrowed(type_name.as_str())
        }
    };
    Cow::Borrowed(label)
}

/// A value the editor cannot represent is shown as text and passed through.
fn show_incompatible(ui: &mut dyn Widgets, value: ParamValue) -> ParamValue {
    ui.label(&format!("<{}: {value}>", value.type_name()));
    value
}

fn edit_float(ui: &mut dyn Widgets, _: &Parameter, value: ParamValue) -> ParamValue {
    // An int here is a widened default (`amount: f32 = 10`).
    match value.as_float() {
        Some(v) => ParamValue::Float(ui.float_field(v)),
        None => show_incompatible(ui, value),
    }
}

fn edit_int(ui: &mut dyn Widgets, _: &Parameter, value: ParamValue) -> ParamValue {
    match value.as_int() {
        Some(v) => ParamValue::Int(ui.int_field(v)),
        None => show_incompatible(ui, value),
    }
}

fn edit_bool(ui: &mut dyn Widgets, _: &Parameter, value: ParamValue) -> ParamValue {
    match value.as_bool() {
        Some(v) => ParamValue::Bool(ui.toggle(v)),
        None => show_incompatible(ui, value),
    }
}

fn edit_text(ui: &mut dyn Widgets, _: &Parameter, value: ParamValue) -> ParamValue {
    match value.as_text() {
        Some(v) => ParamValue::Text(ui.text_field(v)),
        None => show_incompatible(ui, value),
    }
}

fn edit_color(ui: &mut dyn Widgets, _: &Parameter, value: ParamValue) -> ParamValue {
    match value.as_color() {
        Some(v) => ParamValue::Color(ui.color_field(v)),
        None => show_incompatible(ui, value),
    }
}

fn edit_vector2(ui: &mut dyn Widgets, _: &Parameter, value: ParamValue) -> ParamValue {
    match value.as_vector2() {
        Some(v) => ParamValue::Vector2(ui.vector2_field(v)),
        None => show_incompatible(ui, value),
    }
}

fn edit_vector3(ui: &mut dyn Widgets, _: &Parameter, value: ParamValue) -> ParamValue {
    match value.as_vector3() {
        Some(v) => ParamValue::Vector3(ui.vector3_field(v)),
        None => show_incompatible(ui, value),
    }
}

/// Rotations are edited as Euler degrees. An untouched field hands back the
/// original quaternion so redraws do not accumulate round-off.
fn edit_rotation(ui: &mut dyn Widgets, _: &Parameter, value: ParamValue) -> ParamValue {
    match value.as_rotation() {
        Some(q) => {
            let angles = q.to_euler();
            let edited = ui.vector3_field(angles);
            if edited == angles {
                ParamValue::Rotation(q)
            } else {
                ParamValue::Rotation(Quat::from_euler(edited))
            }
        }
        None => show_incompatible(ui, value),
    }
}

fn edit_object(ui: &mut dyn Widgets, param: &Parameter, value: ParamValue) -> ParamValue {
    let type_name = param.kind.type_name();
    match value {
        ParamValue::Null => ui
            .object_field(None, type_name)
            .map_or(ParamValue::Null, ParamValue::Object),
        ParamValue::Object(current) => ui
            .object_field(Some(&current), type_name)
            .map_or(ParamValue::Null, ParamValue::Object),
        other => show_incompatible(ui, other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::{Color, ObjectRef, Vec3};
    use crate::ui::text::TextUi;

    fn run(kind: ParamKind, value: ParamValue, ui: &mut TextUi) -> ParamValue {
        let param = Parameter::new("p", kind.clone());
        ui.begin_row();
        ui.label("p");
        let out = editor_for(&kind).expect("editor")(&mut *ui, &param, value);
        ui.end_row();
        out
    }

    #[test]
    fn every_supported_kind_has_an_editor() {
        for kind in [
            ParamKind::Float,
            ParamKind::Int,
            ParamKind::Bool,
            ParamKind::Text,
            ParamKind::Color,
            ParamKind::Vector2,
            ParamKind::Vector3,
            ParamKind::Rotation,
            ParamKind::object("Transform"),
            ParamKind::object("Light"),
        ] {
            assert!(editor_for(&kind).is_some(), "{kind:?}");
        }
        assert!(editor_for(&ParamKind::unsupported("Dictionary")).is_none());
    }

    #[test]
    fn labels_fall_back_to_type_name() {
        assert_eq!(label_for(&ParamKind::Float), "float");
        assert_eq!(label_for(&ParamKind::Text), "string");
        assert_eq!(label_for(&ParamKind::Rotation), "Quaternion");
        assert_eq!(label_for(&ParamKind::object("Transform")), "Transform");
        assert_eq!(label_for(&ParamKind::unsupported("List<int>")), "List<int>");
    }

    #[test]
    fn float_editor_widens_int_default() {
        let mut ui = TextUi::new();
        let out = run(ParamKind::Float, ParamValue::Int(10), &mut ui);
        assert_eq!(out, ParamValue::Float(10.0));
    }

    #[test]
    fn untouched_values_pass_through() {
        let mut ui = TextUi::new();
        for (kind, value) in [
            (ParamKind::Int, ParamValue::Int(3)),
            (ParamKind::Bool, ParamValue::Bool(true)),
            (ParamKind::Text, ParamValue::Text("x".into())),
            (ParamKind::Color, ParamValue::Color(Color::rgb(1, 2, 3))),
            (ParamKind::Vector3, ParamValue::Vector3(Vec3::new(1.0, 2.0, 3.0))),
            (ParamKind::object("Light"), ParamValue::Null),
        ] {
            assert_eq!(run(kind, value.clone(), &mut ui), value);
        }
    }

    #[test]
    fn rotation_edits_through_euler_angles() {
        let mut ui = TextUi::new();
        let original = Quat::from_euler(Vec3::new(10.0, 20.0, 30.0));
        assert_eq!(
            run(ParamKind::Rotation, ParamValue::Rotation(original), &mut ui),
            ParamValue::Rotation(original)
        );

        ui.edit("", "p", ParamValue::Vector3(Vec3::new(0.0, 90.0, 0.0)));
        let edited = run(ParamKind::Rotation, ParamValue::Rotation(original), &mut ui);
        let angles = edited.as_rotation().unwrap().to_euler();
        assert!((angles.y - 90.0).abs() < 1e-2, "{angles}");
    }

    #[test]
    fn object_picker_accepts_any_reference_type() {
        let mut ui = TextUi::new();
        let lamp = ObjectRef { id: 7, type_name: "Light".into(), name: "Lamp".into() };
        ui.edit("", "p", ParamValue::Object(lamp.clone()));
        assert_eq!(
            run(ParamKind::object("Light"), ParamValue::Null, &mut ui),
            ParamValue::Object(lamp)
        );
    }

    #[test]
    fn incompatible_value_is_left_alone() {
        let mut ui = TextUi::new();
        let out = run(ParamKind::Float, ParamValue::Text("abc".into()), &mut ui);
        assert_eq!(out, ParamValue::Text("abc".into()));
    }
}
