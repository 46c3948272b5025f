pub mod catalog;
pub mod discovery;
pub mod validation;

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::editors;
use crate::model::{ParamKind, ParamValue};

pub use discovery::{discover, discover_common};

// ── Parameter metadata ──────────────────────────────────────────

/// One declared parameter of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Parameter {
    pub name: String,
    pub kind: ParamKind,
    /// Explicit declared default. May use a convertible representation
    /// (an `Int` default on a `Float` parameter).
    pub default: Option<ParamValue>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<ParamValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Value used when the buffer slot is empty: the explicit default, else the
    /// kind's zero value (`Null` for references).
    pub fn resolve_default(&self) -> ParamValue {
        self.default
            .clone()
            .unwrap_or_else(|| self.kind.zero_value())
    }
}

// ── Operation descriptors ───────────────────────────────────────

/// What a target declares about one invocable operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OperationDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub params: Vec<Parameter>,
}

impl OperationDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            params: Vec::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    pub fn signature(&self) -> CommandSignature {
        CommandSignature {
            name: self.name.clone(),
            params: self.params.iter().map(|p| p.kind.clone()).collect(),
        }
    }
}

// ── Commands ────────────────────────────────────────────────────

/// Stable identity of a command: operation name plus ordered parameter kinds.
/// Overloads with different parameter lists are distinct commands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommandSignature {
    pub name: String,
    pub params: Vec<ParamKind>,
}

impl CommandSignature {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// True when this signature is `name` with exactly these kinds.
    pub fn matches(&self, name: &str, kinds: &[ParamKind]) -> bool {
        self.name == name && self.params == kinds
    }
}

impl fmt::Display for CommandSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<String> = self
            .params
            .iter()
            .map(|k| editors::label_for(k).into_owned())
            .collect();
        write!(f, "{}({})", self.name, kinds.join(","))
    }
}

/// A discovered, validated operation ready for the panel.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct Command {
    pub signature: CommandSignature,
    pub params: Vec<Parameter>,
    pub description: Option<String>,
    /// `name(type1 p1,type2 p2)`, shown on the invoke button.
    pub display_name: String,
}

impl Command {
    pub fn from_descriptor(op: OperationDescriptor) -> Self {
        let signature = op.signature();
        let display_name = display_name(&op.name, &op.params);
        Self {
            signature,
            params: op.params,
            description: op.description,
            display_name,
        }
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }
}

/// Button label: `name(type1 p1,type2 p2,...)` using the editor registry's
/// labels, falling back to the kind's own type name.
pub fn display_name(name: &str, params: &[Parameter]) -> String {
    let parts: Vec<String> = params
        .iter()
        .map(|p| format!("{} {}", editors::label_for(&p.kind), p.name))
        .collect();
    format!("{name}({})", parts.join(","))
}
