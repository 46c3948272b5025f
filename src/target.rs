//! The capability a host object implements to be driven by a command panel.

use serde::Serialize;

use crate::error::PanelError;
use crate::executor::DeferredSequence;
use crate::model::{Color, ObjectRef, ParamValue, Quat, Vec2, Vec3};
use crate::registry::{CommandSignature, OperationDescriptor};

/// Result of one operation call.
#[derive(Debug)]
pub enum Outcome {
    /// The operation returns nothing.
    Empty,
    /// A plain value, reported to the log sink.
    Value(serde_json::Value),
    /// A lazily produced sequence, handed to the target's deferred executor.
    Deferred(DeferredSequence),
}

impl Outcome {
    /// Wrap any serialisable value. Values that fail to serialise are reported
    /// by their error text.
    pub fn value(value: impl Serialize) -> Self {
        Outcome::Value(
            serde_json::to_value(value)
                .unwrap_or_else(|e| serde_json::Value::String(format!("<unserializable: {e}>"))),
        )
    }
}

/// A field shown read-only above the commands.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub name: String,
    pub value: ParamValue,
}

impl FieldView {
    pub fn new(name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An object whose tagged operations can be listed and invoked.
///
/// `operations` must return the same list, in the same order, for every
/// instance of a type: the panel treats it as type-level metadata.
pub trait Invocable {
    /// Name of the concrete type. Selections are grouped by this.
    fn type_name(&self) -> &str;

    /// Identity used in logs ("Goblin #2"). Defaults to the type name.
    fn label(&self) -> String {
        self.type_name().to_string()
    }

    fn operations(&self) -> Vec<OperationDescriptor>;

    /// Call the operation identified by `signature`. `args` holds one value per
    /// declared parameter, already converted to the declared kinds.
    fn invoke(&mut self, signature: &CommandSignature, args: Args<'_>) -> Result<Outcome, PanelError>;

    /// Take ownership of a deferred result and run it on this target's
    /// executor.
    fn start_deferred(&mut self, sequence: DeferredSequence);

    fn read_only_fields(&self) -> Vec<FieldView> {
        Vec::new()
    }
}

/// Typed positional access to invocation arguments.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    values: &'a [ParamValue],
}

impl<'a> Args<'a> {
    pub fn new(values: &'a [ParamValue]) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&'a ParamValue, PanelError> {
        self.values
            .get(index)
            .ok_or(PanelError::MissingArgument { index })
    }

    fn typed<T>(
        &self,
        index: usize,
        expected: &str,
        read: impl FnOnce(&'a ParamValue) -> Option<T>,
    ) -> Result<T, PanelError> {
        let value = self.get(index)?;
        read(value).ok_or_else(|| PanelError::Conversion {
            parameter: format!("#{index}"),
            expected: expected.to_string(),
            found: value.type_name().to_string(),
        })
    }

    pub fn float(&self, index: usize) -> Result<f32, PanelError> {
        self.typed(index, "float", ParamValue::as_float)
    }

    pub fn int(&self, index: usize) -> Result<i32, PanelError> {
        self.typed(index, "int", ParamValue::as_int)
    }

    pub fn bool(&self, index: usize) -> Result<bool, PanelError> {
        self.typed(index, "bool", ParamValue::as_bool)
    }

    pub fn text(&self, index: usize) -> Result<&'a str, PanelError> {
        self.typed(index, "string", ParamValue::as_text)
    }

    pub fn color(&self, index: usize) -> Result<Color, PanelError> {
        self.typed(index, "Color", ParamValue::as_color)
    }

    pub fn vector2(&self, index: usize) -> Result<Vec2, PanelError> {
        self.typed(index, "Vector2", ParamValue::as_vector2)
    }

    pub fn vector3(&self, index: usize) -> Result<Vec3, PanelError> {
        self.typed(index, "Vector3", ParamValue::as_vector3)
    }

    pub fn rotation(&self, index: usize) -> Result<Quat, PanelError> {
        self.typed(index, "Quaternion", ParamValue::as_rotation)
    }

    /// `None` when the slot holds a null reference.
    pub fn object(&self, index: usize) -> Result<Option<&'a ObjectRef>, PanelError> {
        match self.get(index)? {
            ParamValue::Null => Ok(None),
            _ => self.typed(index, "object", ParamValue::as_object).map(Some),
        }
    }
}
