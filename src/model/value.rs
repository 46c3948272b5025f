use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::color::Color;
use super::math::{Quat, Vec2, Vec3};
use crate::error::PanelError;

/// Declared type of an operation parameter. Drives editor selection and the
/// display label, and is part of a command's identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum ParamKind {
    Float,
    Int,
    Bool,
    Text,
    Color,
    Vector2,
    Vector3,
    Rotation,
    /// Handle to a host-native object. Any concrete `type_name` gets the
    /// reference picker.
    Object { type_name: String },
    /// A type the panel has no editor for.
    Unsupported { type_name: String },
}

impl ParamKind {
    pub fn object(type_name: impl Into<String>) -> Self {
        ParamKind::Object {
            type_name: type_name.into(),
        }
    }

    pub fn unsupported(type_name: impl Into<String>) -> Self {
        ParamKind::Unsupported {
            type_name: type_name.into(),
        }
    }

    /// The type's own textual name, used when no label is registered.
    pub fn type_name(&self) -> &str {
        match self {
            ParamKind::Float => "Float",
            ParamKind::Int => "Int",
            ParamKind::Bool => "Bool",
            ParamKind::Text => "Text",
            ParamKind::Color => "Color",
            ParamKind::Vector2 => "Vector2",
            ParamKind::Vector3 => "Vector3",
            ParamKind::Rotation => "Rotation",
            ParamKind::Object { type_name } | ParamKind::Unsupported { type_name } => {
                type_name.as_str()
            }
        }
    }

    /// Zero value for value-typed kinds; `Null` for references and unknown types.
    pub fn zero_value(&self) -> ParamValue {
        match self {
            ParamKind::Float => ParamValue::Float(0.0),
            ParamKind::Int => ParamValue::Int(0),
            ParamKind::Bool => ParamValue::Bool(false),
            ParamKind::Text => ParamValue::Text(String::new()),
            ParamKind::Color => ParamValue::Color(Color::default()),
            ParamKind::Vector2 => ParamValue::Vector2(Vec2::ZERO),
            ParamKind::Vector3 => ParamValue::Vector3(Vec3::ZERO),
            ParamKind::Rotation => ParamValue::Rotation(Quat::IDENTITY),
            ParamKind::Object { .. } | ParamKind::Unsupported { .. } => ParamValue::Null,
        }
    }
}

/// Reference to an object owned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
pub struct ObjectRef {
    pub id: u64,
    pub type_name: String,
    pub name: String,
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}#{})", self.name, self.type_name, self.id)
    }
}

/// A parameter value as held in a command's buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(tag = "type", content = "value")]
#[ts(export)]
pub enum ParamValue {
    Null,
    Float(f32),
    Int(i32),
    Bool(bool),
    Text(String),
    Color(Color),
    Vector2(Vec2),
    Vector3(Vec3),
    Rotation(Quat),
    Object(ObjectRef),
}

impl ParamValue {
    /// Name of the runtime representation, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Null => "null",
            ParamValue::Float(_) => "float",
            ParamValue::Int(_) => "int",
            ParamValue::Bool(_) => "bool",
            ParamValue::Text(_) => "string",
            ParamValue::Color(_) => "Color",
            ParamValue::Vector2(_) => "Vector2",
            ParamValue::Vector3(_) => "Vector3",
            ParamValue::Rotation(_) => "Quaternion",
            ParamValue::Object(_) => "object",
        }
    }

    /// Kind this value naturally belongs to. `None` for `Null`, which fits
    /// any reference kind.
    pub fn kind(&self) -> Option<ParamKind> {
        Some(match self {
            ParamValue::Null => return None,
            ParamValue::Float(_) => ParamKind::Float,
            ParamValue::Int(_) => ParamKind::Int,
            ParamValue::Bool(_) => ParamKind::Bool,
            ParamValue::Text(_) => ParamKind::Text,
            ParamValue::Color(_) => ParamKind::Color,
            ParamValue::Vector2(_) => ParamKind::Vector2,
            ParamValue::Vector3(_) => ParamKind::Vector3,
            ParamValue::Rotation(_) => ParamKind::Rotation,
            ParamValue::Object(r) => ParamKind::object(r.type_name.clone()),
        })
    }

    /// Float view. Integers widen.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f32> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            ParamValue::Color(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector2(&self) -> Option<Vec2> {
        match self {
            ParamValue::Vector2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector3(&self) -> Option<Vec3> {
        match self {
            ParamValue::Vector3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_rotation(&self) -> Option<Quat> {
        match self {
            ParamValue::Rotation(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            ParamValue::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Whether `coerce` would succeed for `kind`.
    pub fn fits(&self, kind: &ParamKind) -> bool {
        match kind {
            ParamKind::Float => self.as_float().is_some(),
            ParamKind::Int => matches!(self, ParamValue::Int(_)),
            ParamKind::Bool => matches!(self, ParamValue::Bool(_)),
            ParamKind::Text => matches!(self, ParamValue::Text(_)),
            ParamKind::Color => matches!(self, ParamValue::Color(_)),
            ParamKind::Vector2 => matches!(self, ParamValue::Vector2(_)),
            ParamKind::Vector3 => matches!(self, ParamValue::Vector3(_)),
            ParamKind::Rotation => matches!(self, ParamValue::Rotation(_)),
            ParamKind::Object { .. } => matches!(self, ParamValue::Object(_) | ParamValue::Null),
            ParamKind::Unsupported { .. } => true,
        }
    }

    /// Convert to the declared kind. Only widening conversions are performed;
    /// anything else is a `Conversion` error naming `parameter`.
    pub fn coerce(self, kind: &ParamKind, parameter: &str) -> Result<ParamValue, PanelError> {
        if !self.fits(kind) {
            return Err(PanelError::Conversion {
                parameter: parameter.to_string(),
                expected: kind.type_name().to_string(),
                found: self.type_name().to_string(),
            });
        }
        Ok(match (kind, self) {
            (ParamKind::Float, value) => ParamValue::Float(value.as_float().unwrap_or_default()),
            (_, value) => value,
        })
    }

    /// Parse a textual value for `kind`. Vectors and rotations take
    /// comma-separated components (rotations as Euler degrees), colors take hex.
    /// Object references can only be parsed as `none`.
    pub fn parse(kind: &ParamKind, text: &str) -> Result<ParamValue, PanelError> {
        let text = text.trim();
        let invalid = || PanelError::InvalidValue {
            message: format!("'{text}' is not a valid {}", kind.type_name()),
        };
        let components = |n: usize| -> Result<Vec<f32>, PanelError> {
            let parts: Vec<f32> = text
                .trim_start_matches('(')
                .trim_end_matches(')')
                .split(',')
                .map(|p| p.trim().parse::<f32>())
                .collect::<Result<_, _>>()
                .map_err(|_| invalid())?;
            if parts.len() == n {
                Ok(parts)
            } else {
                Err(invalid())
            }
        };
        match kind {
            ParamKind::Float => text.parse().map(ParamValue::Float).map_err(|_| invalid()),
            ParamKind::Int => text.parse().map(ParamValue::Int).map_err(|_| invalid()),
            ParamKind::Bool => text.parse().map(ParamValue::Bool).map_err(|_| invalid()),
            ParamKind::Text => Ok(ParamValue::Text(text.to_string())),
            ParamKind::Color => Color::from_hex(text).map(ParamValue::Color).ok_or_else(invalid),
            ParamKind::Vector2 => match components(2)?.as_slice() {
                [x, y] => Ok(ParamValue::Vector2(Vec2::new(*x, *y))),
                _ => Err(invalid()),
            },
            ParamKind::Vector3 | ParamKind::Rotation => match components(3)?.as_slice() {
                [x, y, z] if *kind == ParamKind::Rotation => {
                    Ok(ParamValue::Rotation(Quat::from_euler(Vec3::new(*x, *y, *z))))
                }
                [x, y, z] => Ok(ParamValue::Vector3(Vec3::new(*x, *y, *z))),
                _ => Err(invalid()),
            },
            ParamKind::Object { .. } | ParamKind::Unsupported { .. } => {
                if text.eq_ignore_ascii_case("none") || text.eq_ignore_ascii_case("null") {
                    Ok(ParamValue::Null)
                } else {
                    Err(invalid())
                }
            }
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Null => write!(f, "None"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Text(v) => write!(f, "{v}"),
            ParamValue::Color(v) => write!(f, "{v}"),
            ParamValue::Vector2(v) => write!(f, "{v}"),
            ParamValue::Vector3(v) => write!(f, "{v}"),
            ParamValue::Rotation(v) => write!(f, "{v}"),
            ParamValue::Object(v) => write!(f, "{v}"),
        }
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl From<Color> for ParamValue {
    fn from(v: Color) -> Self {
        ParamValue::Color(v)
    }
}

impl From<Vec2> for ParamValue {
    fn from(v: Vec2) -> Self {
        ParamValue::Vector2(v)
    }
}

impl From<Vec3> for ParamValue {
    fn from(v: Vec3) -> Self {
        ParamValue::Vector3(v)
    }
}

impl From<Quat> for ParamValue {
    fn from(v: Quat) -> Self {
        ParamValue::Rotation(v)
    }
}

impl From<ObjectRef> for ParamValue {
    fn from(v: ObjectRef) -> Self {
        ParamValue::Object(v)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn int_widens_to_float() {
        let v = ParamValue::Int(10).coerce(&ParamKind::Float, "amount").unwrap();
        assert_eq!(v, ParamValue::Float(10.0));
    }

    #[test]
    fn float_does_not_narrow_to_int() {
        let err = ParamValue::Float(1.5).coerce(&ParamKind::Int, "count").unwrap_err();
        assert!(matches!(err, PanelError::Conversion { ref parameter, .. } if parameter == "count"));
    }

    #[test]
    fn null_is_a_valid_object_reference() {
        let kind = ParamKind::object("Transform");
        assert_eq!(ParamValue::Null.coerce(&kind, "target").unwrap(), ParamValue::Null);
        assert!(ParamValue::Int(3).coerce(&kind, "target").is_err());
    }

    #[test]
    fn zero_values_match_their_kind() {
        for kind in [
            ParamKind::Float,
            ParamKind::Int,
            ParamKind::Bool,
            ParamKind::Text,
            ParamKind::Color,
            ParamKind::Vector2,
            ParamKind::Vector3,
            ParamKind::Rotation,
            ParamKind::object("Light"),
        ] {
            assert!(kind.zero_value().fits(&kind), "{kind:?}");
        }
        assert_eq!(ParamKind::object("Light").zero_value(), ParamValue::Null);
        assert_eq!(ParamKind::Vector2.zero_value().kind(), Some(ParamKind::Vector2));
        assert_eq!(ParamValue::Null.kind(), None);
    }

    #[test]
    fn parse_per_kind() {
        assert_eq!(ParamValue::parse(&ParamKind::Float, "2.5").unwrap(), ParamValue::Float(2.5));
        assert_eq!(ParamValue::parse(&ParamKind::Int, " 7 ").unwrap(), ParamValue::Int(7));
        assert_eq!(ParamValue::parse(&ParamKind::Bool, "true").unwrap(), ParamValue::Bool(true));
        assert_eq!(
            ParamValue::parse(&ParamKind::Vector3, "(1, 2, 3)").unwrap(),
            ParamValue::Vector3(Vec3::new(1.0, 2.0, 3.0))
        );
        assert_eq!(
            ParamValue::parse(&ParamKind::Color, "#00ff00").unwrap(),
            ParamValue::Color(Color::rgb(0, 255, 0))
        );
        assert!(matches!(
            ParamValue::parse(&ParamKind::Rotation, "0,90,0").unwrap(),
            ParamValue::Rotation(_)
        ));
        assert_eq!(ParamValue::parse(&ParamKind::object("Light"), "none").unwrap(), ParamValue::Null);
    }

    #[test]
    fn parse_rejects_wrong_arity_and_garbage() {
        assert!(ParamValue::parse(&ParamKind::Vector2, "1,2,3").is_err());
        assert!(ParamValue::parse(&ParamKind::Int, "1.5").is_err());
        assert!(ParamValue::parse(&ParamKind::object("Light"), "lamp").is_err());
    }
}
