use schemars::schema_for;
use serde::Serialize;
use serde_json::Value;

use crate::model::{Color, ObjectRef, ParamKind, Quat, Vec2, Vec3};

use super::{Command, Parameter};

/// A catalog entry: command metadata + JSON schema for its parameters.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub display_name: String,
    pub signature: String,
    pub description: Option<String>,
    pub params: Vec<Parameter>,
    pub param_schema: Value,
}

fn empty_object_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

fn schema_value<T: schemars::JsonSchema>() -> Value {
    let root = schema_for!(T);
    serde_json::to_value(root).unwrap_or(empty_object_schema())
}

/// Schema of a single parameter kind.
pub fn kind_schema(kind: &ParamKind) -> Value {
    match kind {
        ParamKind::Float => schema_value::<f32>(),
        ParamKind::Int => schema_value::<i32>(),
        ParamKind::Bool => schema_value::<bool>(),
        ParamKind::Text => schema_value::<String>(),
        ParamKind::Color => schema_value::<Color>(),
        ParamKind::Vector2 => schema_value::<Vec2>(),
        ParamKind::Vector3 => schema_value::<Vec3>(),
        ParamKind::Rotation => schema_value::<Quat>(),
        ParamKind::Object { type_name } => {
            let mut schema = schema_value::<Option<ObjectRef>>();
            if let Some(obj) = schema.as_object_mut() {
                obj.insert("x-object-type".into(), Value::String(type_name.clone()));
            }
            schema
        }
        ParamKind::Unsupported { type_name } => serde_json::json!({
            "description": format!("{type_name} (no editor)"),
        }),
    }
}

/// Object schema over all parameters. Parameters without an explicit default
/// are required.
fn param_schema(params: &[Parameter]) -> Value {
    if params.is_empty() {
        return empty_object_schema();
    }
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();
    for param in params {
        let mut schema = kind_schema(&param.kind);
        match (&param.default, schema.as_object_mut()) {
            (Some(default), Some(obj)) => {
                obj.insert(
                    "default".into(),
                    serde_json::to_value(default).unwrap_or(Value::Null),
                );
            }
            _ => required.push(Value::String(param.name.clone())),
        }
        properties.insert(param.name.clone(), schema);
    }
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Catalog of a discovered command list, in panel order.
pub fn command_catalog(commands: &[Command]) -> Vec<CatalogEntry> {
    commands
        .iter()
        .map(|c| CatalogEntry {
            name: c.name().to_string(),
            display_name: c.display_name.clone(),
            signature: c.signature.to_string(),
            description: c.description.clone(),
            params: c.params.clone(),
            param_schema: param_schema(&c.params),
        })
        .collect()
}

/// Help text. No topic → command list, otherwise the full schema of the
/// command whose name, signature or display name matches.
pub fn help_text(entries: &[CatalogEntry], topic: Option<&str>) -> String {
    match topic {
        None => {
            let mut lines = vec![format!("Available commands ({}):", entries.len())];
            for entry in entries {
                match &entry.description {
                    Some(desc) => lines.push(format!("  {} - {desc}", entry.display_name)),
                    None => lines.push(format!("  {}", entry.display_name)),
                }
            }
            lines.join("\n")
        }
        Some(topic) => {
            let matching: Vec<&CatalogEntry> = entries
                .iter()
                .filter(|e| e.name == topic || e.signature == topic || e.display_name == topic)
                .collect();
            if matching.is_empty() {
                return format!("Unknown command: \"{topic}\".");
            }
            let mut lines = Vec::new();
            for entry in matching {
                let schema_str = serde_json::to_string_pretty(&entry.param_schema)
                    .unwrap_or_else(|_| "{}".to_string());
                lines.push(format!(
                    "{}: {}\n\nParameters:\n{schema_str}",
                    entry.display_name,
                    entry.description.as_deref().unwrap_or("(no description)"),
                ));
            }
            lines.join("\n\n")
        }
    }
}
