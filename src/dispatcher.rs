use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use ts_rs::TS;

use crate::error::PanelError;
use crate::log_sink::{LogSink, Severity};
use crate::model::ParamValue;
use crate::registry::{Command, CommandSignature};
use crate::state::CommandState;
use crate::target::{Args, Invocable, Outcome};

pub const DEFAULT_RESULT_PREFIX: &str = "Method call result -> ";

// ── Reports ────────────────────────────────────────────────────────

/// What happened on one target.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
#[ts(export)]
pub enum TargetOutcome {
    /// Returned nothing.
    Completed,
    /// Returned a value; holds the text that was logged.
    Value(String),
    /// Returned a deferred sequence, now owned by the target's executor.
    Deferred,
    Failed(PanelError),
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct TargetReport {
    pub target: String,
    pub outcome: TargetOutcome,
}

/// Result of invoking one command on a selection, one entry per target in
/// selection order.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct InvokeReport {
    pub command: String,
    pub signature: CommandSignature,
    pub targets: Vec<TargetReport>,
}

impl InvokeReport {
    pub fn failures(&self) -> impl Iterator<Item = &TargetReport> {
        self.targets
            .iter()
            .filter(|t| matches!(t.outcome, TargetOutcome::Failed(_)))
    }

    /// Number of targets that handed a sequence to their executor.
    pub fn deferred(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.outcome == TargetOutcome::Deferred)
            .count()
    }

    pub fn succeeded(&self) -> bool {
        self.failures().next().is_none()
    }
}

// ── Dispatcher ───────────────────────────────────────────────────

/// Resolves a command's arguments from its state, calls it on every selected
/// target and routes each outcome.
pub struct Dispatcher {
    sink: Arc<dyn LogSink>,
    result_prefix: String,
}

impl Dispatcher {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            result_prefix: DEFAULT_RESULT_PREFIX.to_string(),
        }
    }

    pub fn with_result_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.result_prefix = prefix.into();
        self
    }

    pub fn sink(&self) -> &Arc<dyn LogSink> {
        &self.sink
    }

    /// Invoke `command` on each target in order. A failing target does not
    /// stop the others. If an argument cannot be converted, nothing is called.
    pub fn invoke(
        &self,
        command: &Command,
        state: &CommandState,
        targets: &mut [&mut dyn Invocable],
    ) -> InvokeReport {
        let mut report = InvokeReport {
            command: command.display_name.clone(),
            signature: command.signature.clone(),
            targets: Vec::with_capacity(targets.len()),
        };

        let args = match prepare_args(command, state) {
            Ok(args) => args,
            Err(e) => {
                self.sink
                    .emit(Severity::Error, &format!("{}: {e}", command.display_name));
                report.targets = targets
                    .iter()
                    .map(|t| TargetReport {
                        target: t.label(),
                        outcome: TargetOutcome::Failed(e.clone()),
                    })
                    .collect();
                return report;
            }
        };

        for target in targets.iter_mut() {
            let outcome = self.invoke_one(command, &args, &mut **target);
            report.targets.push(TargetReport {
                target: target.label(),
                outcome,
            });
        }
        report
    }

    fn invoke_one(
        &self,
        command: &Command,
        args: &[ParamValue],
        target: &mut dyn Invocable,
    ) -> TargetOutcome {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            target.invoke(&command.signature, Args::new(args))
        }))
        .unwrap_or_else(|payload| Err(PanelError::invocation(panic_message(payload.as_ref()))));

        match result {
            Ok(Outcome::Empty) => TargetOutcome::Completed,
            Ok(Outcome::Deferred(sequence)) => {
                target.start_deferred(sequence);
                TargetOutcome::Deferred
            }
            Ok(Outcome::Value(value)) => {
                let text = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                self.sink
                    .emit(Severity::Info, &format!("{}{text}", self.result_prefix));
                TargetOutcome::Value(text)
            }
            Err(e) => {
                self.sink.emit(
                    Severity::Error,
                    &format!("{} failed on {}: {e}", command.name(), target.label()),
                );
                TargetOutcome::Failed(e)
            }
        }
    }
}

/// Resolve every parameter and convert it to its declared kind.
fn prepare_args(command: &Command, state: &CommandState) -> Result<Vec<ParamValue>, PanelError> {
    command
        .params
        .iter()
        .enumerate()
        .map(|(i, p)| state.resolved(i, p).coerce(&p.kind, &p.name))
        .collect()
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("operation panicked: {detail}")
}
