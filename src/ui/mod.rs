//! The rendering capability the panel draws through.
//!
//! Immediate-mode: every call draws one widget for the current pass and
//! returns its (possibly edited) value.

pub mod text;

use crate::model::{Color, ObjectRef, Vec2, Vec3};

pub trait Widgets {
    fn begin_row(&mut self);
    fn end_row(&mut self);

    /// Shift subsequent rows by `delta` indentation levels.
    fn indent(&mut self, delta: i32);

    /// Disabled widgets are drawn but ignore edits.
    fn set_enabled(&mut self, enabled: bool);

    fn label(&mut self, text: &str);

    /// Collapse/expand toggle. `id` names the row it belongs to.
    fn foldout(&mut self, open: bool, id: &str) -> bool;

    /// Returns true on the pass the button was activated.
    fn button(&mut self, text: &str) -> bool;

    fn float_field(&mut self, value: f32) -> f32;
    fn int_field(&mut self, value: i32) -> i32;
    fn toggle(&mut self, value: bool) -> bool;
    fn text_field(&mut self, value: &str) -> String;
    fn color_field(&mut self, value: Color) -> Color;
    fn vector2_field(&mut self, value: Vec2) -> Vec2;
    fn vector3_field(&mut self, value: Vec3) -> Vec3;

    /// Pick a host object of `type_name`. `None` is a null reference.
    fn object_field(&mut self, value: Option<&ObjectRef>, type_name: &str) -> Option<ObjectRef>;
}
