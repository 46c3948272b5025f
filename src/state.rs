use indexmap::IndexMap;
use serde::Serialize;
use ts_rs::TS;

use crate::model::ParamValue;
use crate::registry::{Command, CommandSignature, Parameter};

// ── Per-command state ──────────────────────────────────────────────

/// Editing state of one command: whether its parameter rows are shown, and
/// one buffer slot per parameter. An empty slot means "use the default".
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct CommandState {
    pub expanded: bool,
    values: Vec<Option<ParamValue>>,
}

impl CommandState {
    pub fn new(param_count: usize, expanded: bool) -> Self {
        Self {
            expanded,
            values: vec![None; param_count],
        }
    }

    /// Buffer slots, one per parameter.
    pub fn values(&self) -> &[Option<ParamValue>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Write a slot. Out-of-range indices are ignored so the buffer length
    /// never changes.
    pub fn set(&mut self, index: usize, value: ParamValue) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = Some(value);
        }
    }

    /// Empty a slot, reverting it to the default.
    pub fn clear(&mut self, index: usize) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = None;
        }
    }

    /// Value for `param` at `index`: the buffered value if any, otherwise the
    /// parameter's default.
    pub fn resolved(&self, index: usize, param: &Parameter) -> ParamValue {
        self.values
            .get(index)
            .and_then(Clone::clone)
            .unwrap_or_else(|| param.resolve_default())
    }

    /// Resolved values for every parameter, in declaration order.
    pub fn resolved_values(&self, params: &[Parameter]) -> Vec<ParamValue> {
        params
            .iter()
            .enumerate()
            .map(|(i, p)| self.resolved(i, p))
            .collect()
    }
}

// ── Store ─────────────────────────────────────────────────────────

/// All command states of one panel, keyed by signature so they survive
/// reordering of a target's operations.
#[derive(Debug, Default)]
pub struct StateStore {
    states: IndexMap<CommandSignature, CommandState>,
    expanded_by_default: bool,
}

impl StateStore {
    pub fn new(expanded_by_default: bool) -> Self {
        Self {
            states: IndexMap::new(),
            expanded_by_default,
        }
    }

    /// State for `command`, created on first access.
    pub fn state_for(&mut self, command: &Command) -> &mut CommandState {
        let expanded = self.expanded_by_default;
        let param_count = command.params.len();
        self.states
            .entry(command.signature.clone())
            .or_insert_with(|| CommandState::new(param_count, expanded))
    }

    pub fn get(&self, signature: &CommandSignature) -> Option<&CommandState> {
        self.states.get(signature)
    }

    /// Drop states of commands that are no longer discovered.
    pub fn retain_discovered(&mut self, commands: &[Command]) {
        let before = self.states.len();
        self.states
            .retain(|sig, _| commands.iter().any(|c| &c.signature == sig));
        let dropped = before - self.states.len();
        if dropped > 0 {
            tracing::debug!(dropped, "discarded stale command state");
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
