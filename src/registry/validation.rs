//! Metadata checks run during discovery.
//!
//! A target that declares malformed operations gets an empty panel rather than
//! a half-built one, so every check here returns a `Discovery` error.

use std::collections::HashSet;

use crate::error::PanelError;

use super::OperationDescriptor;

fn malformed(message: String) -> PanelError {
    PanelError::Discovery { message }
}

/// Operation and parameter names must be identifiers: non-empty, ASCII
/// alphanumerics or `_`, not starting with a digit.
pub fn validate_identifier(name: &str, what: &str) -> Result<(), PanelError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(malformed(format!("{what} name is empty")));
    };
    if first.is_ascii_digit() {
        return Err(malformed(format!("{what} name '{name}' starts with a digit")));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(malformed(format!("{what} name '{name}' is not an identifier")));
    }
    Ok(())
}

/// Validate one descriptor: names, parameter uniqueness and default types.
pub fn validate_descriptor(op: &OperationDescriptor) -> Result<(), PanelError> {
    validate_identifier(&op.name, "Operation")?;

    let mut seen = HashSet::new();
    for param in &op.params {
        validate_identifier(&param.name, "Parameter")?;
        if !seen.insert(param.name.as_str()) {
            return Err(malformed(format!(
                "Operation '{}' declares parameter '{}' twice",
                op.name, param.name
            )));
        }
        if let Some(default) = &param.default {
            if !default.fits(&param.kind) {
                return Err(malformed(format!(
                    "Default for '{}.{}' is {} but the parameter is {}",
                    op.name,
                    param.name,
                    default.type_name(),
                    param.kind.type_name()
                )));
            }
        }
    }
    Ok(())
}

/// Validate a full operation list, including signature uniqueness.
pub fn validate_operations(ops: &[OperationDescriptor]) -> Result<(), PanelError> {
    let mut signatures = HashSet::new();
    for op in ops {
        validate_descriptor(op)?;
        let signature = op.signature();
        if !signatures.insert(signature.clone()) {
            return Err(malformed(format!("Operation {signature} is declared twice")));
        }
    }
    Ok(())
}
