//! Headless widget host. Renders a pass to plain text lines and replays
//! scripted input (clicks, foldout toggles, field edits) on the next pass.

use std::collections::{HashMap, HashSet};

use crate::model::{Color, ObjectRef, ParamValue, Vec2, Vec3};

use super::Widgets;

const INDENT: &str = "    ";

#[derive(Debug)]
pub struct TextUi {
    lines: Vec<String>,
    row: Vec<String>,
    row_disabled: bool,
    depth: usize,
    enabled: bool,
    /// Id of the last foldout drawn; edits are addressed by (scope, label).
    scope: String,
    current_label: String,
    clicks: HashSet<String>,
    toggles: HashSet<String>,
    edits: HashMap<(String, String), ParamValue>,
}

impl TextUi {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            row: Vec::new(),
            row_disabled: false,
            depth: 0,
            enabled: true,
            scope: String::new(),
            current_label: String::new(),
            clicks: HashSet::new(),
            toggles: HashSet::new(),
            edits: HashMap::new(),
        }
    }

    /// Activate the button with this text on the next pass.
    pub fn click(&mut self, button: &str) {
        self.clicks.insert(button.to_string());
    }

    /// Flip the foldout with this id on the next pass.
    pub fn toggle_foldout(&mut self, id: &str) {
        self.toggles.insert(id.to_string());
    }

    /// Replace the value of the field labelled `label` under foldout `scope`.
    pub fn edit(&mut self, scope: &str, label: &str, value: ParamValue) {
        self.edits
            .insert((scope.to_string(), label.to_string()), value);
    }

    /// True while scripted input is still waiting to be consumed.
    pub fn has_pending_input(&self) -> bool {
        !(self.clicks.is_empty() && self.toggles.is_empty() && self.edits.is_empty())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }

    /// Forget the drawn output, keeping pending input.
    pub fn clear_output(&mut self) {
        self.lines.clear();
        self.row.clear();
        self.depth = 0;
        self.scope.clear();
    }

    fn take_edit(&mut self) -> Option<ParamValue> {
        if !self.enabled {
            return None;
        }
        self.edits
            .remove(&(self.scope.clone(), self.current_label.clone()))
    }

    fn push(&mut self, text: String) {
        if !self.enabled {
            self.row_disabled = true;
        }
        self.row.push(text);
    }
}

impl Default for TextUi {
    fn default() -> Self {
        Self::new()
    }
}

impl Widgets for TextUi {
    fn begin_row(&mut self) {
        self.row.clear();
        self.row_disabled = false;
    }

    fn end_row(&mut self) {
        let mut line = INDENT.repeat(self.depth);
        if self.row_disabled {
            line.push_str("# ");
        }
        line.push_str(&self.row.join(" "));
        self.lines.push(line);
        self.row.clear();
        self.row_disabled = false;
    }

    fn indent(&mut self, delta: i32) {
        let steps = usize::try_from(delta.unsigned_abs()).unwrap_or(0);
        self.depth = if delta >= 0 {
            self.depth + steps
        } else {
            self.depth.saturating_sub(steps)
        };
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn label(&mut self, text: &str) {
        self.current_label = text.to_string();
        self.push(text.to_string());
    }

    fn foldout(&mut self, open: bool, id: &str) -> bool {
        self.scope = id.to_string();
        let open = if self.enabled && self.toggles.remove(id) {
            !open
        } else {
            open
        };
        self.push(if open { "[-]" } else { "[+]" }.to_string());
        open
    }

    fn button(&mut self, text: &str) -> bool {
        self.push(format!("<{text}>"));
        self.enabled && self.clicks.remove(text)
    }

    fn float_field(&mut self, value: f32) -> f32 {
        let out = self.take_edit().and_then(|v| v.as_float()).unwrap_or(value);
        self.push(format!("[{out}]"));
        out
    }

    fn int_field(&mut self, value: i32) -> i32 {
        let out = self.take_edit().and_then(|v| v.as_int()).unwrap_or(value);
        self.push(format!("[{out}]"));
        out
    }

    fn toggle(&mut self, value: bool) -> bool {
        let out = self.take_edit().and_then(|v| v.as_bool()).unwrap_or(value);
        self.push(format!("[{}]", if out { "x" } else { " " }));
        out
    }

    fn text_field(&mut self, value: &str) -> String {
        let out = self
            .take_edit()
            .and_then(|v| v.as_text().map(str::to_string))
            .unwrap_or_else(|| value.to_string());
        self.push(format!("[\"{out}\"]"));
        out
    }

    fn color_field(&mut self, value: Color) -> Color {
        let out = self.take_edit().and_then(|v| v.as_color()).unwrap_or(value);
        self.push(format!("[{out}]"));
        out
    }

    fn vector2_field(&mut self, value: Vec2) -> Vec2 {
        let out = self.take_edit().and_then(|v| v.as_vector2()).unwrap_or(value);
        self.push(format!("[{out}]"));
        out
    }

    fn vector3_field(&mut self, value: Vec3) -> Vec3 {
        let out = self.take_edit().and_then(|v| v.as_vector3()).unwrap_or(value);
        self.push(format!("[{out}]"));
        out
    }

    fn object_field(&mut self, value: Option<&ObjectRef>, type_name: &str) -> Option<ObjectRef> {
        let out = match self.take_edit() {
            Some(ParamValue::Object(picked)) => Some(picked),
            Some(ParamValue::Null) => None,
            _ => value.cloned(),
        };
        let shown = out.as_ref().map_or("None", |o| o.name.as_str());
        self.push(format!("[{shown} : {type_name}]"));
        out
    }
}
