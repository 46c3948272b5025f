use crate::dispatcher::{InvokeReport, TargetOutcome};
use crate::editors;
use crate::registry::Command;
use crate::state::StateStore;

/// Human-readable listing of a panel's commands: each command with its
/// parameters, current values and where each value comes from.
pub fn describe_commands(commands: &[Command], store: &StateStore) -> String {
    if commands.is_empty() {
        return "No commands.".to_string();
    }
    let mut lines = vec![format!("Commands ({})", commands.len())];
    for command in commands {
        let state = store.get(&command.signature);
        let marker = if state.is_some_and(|s| s.expanded) { "-" } else { "+" };
        lines.push(format!("  [{marker}] {}", command.display_name));
        if let Some(desc) = &command.description {
            lines.push(format!("        {desc}"));
        }
        for (i, param) in command.params.iter().enumerate() {
            if editors::editor_for(&param.kind).is_none() {
                lines.push(format!("      {} (not editable)", param.name));
                continue;
            }
            let buffered = state.and_then(|s| s.values().get(i).cloned().flatten());
            let (value, source) = match buffered {
                Some(v) => (v, "set"),
                None if param.has_default() => (param.resolve_default(), "default"),
                None => (param.resolve_default(), "zero"),
            };
            lines.push(format!("      {} = {value} ({source})", param.name));
        }
    }
    lines.join("\n")
}

/// One line per target, then a summary.
pub fn describe_report(report: &InvokeReport) -> String {
    let mut lines = vec![format!("{} on {} target(s)", report.command, report.targets.len())];
    for t in &report.targets {
        let outcome = match &t.outcome {
            TargetOutcome::Completed => "ok".to_string(),
            TargetOutcome::Value(v) => format!("returned {v}"),
            TargetOutcome::Deferred => "started deferred job".to_string(),
            TargetOutcome::Failed(e) => format!("FAILED: {e}"),
        };
        lines.push(format!("  - {}: {outcome}", t.target));
    }
    let failed = report.failures().count();
    if failed > 0 {
        lines.push(format!("{failed} of {} failed", report.targets.len()));
    }
    lines.join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::dispatcher::TargetReport;
    use crate::error::PanelError;
    use crate::model::{ParamKind, ParamValue};
    use crate::registry::{OperationDescriptor, Parameter};

    #[test]
    fn lists_values_with_their_source() {
        let command = Command::from_descriptor(
            OperationDescriptor::new("stash")
                .describe("Put things away")
                .param(Parameter::new("amount", ParamKind::Float).with_default(10))
                .param(Parameter::new("label", ParamKind::Text))
                .param(Parameter::new("count", ParamKind::Int))
                .param(Parameter::new("items", ParamKind::unsupported("List<Item>"))),
        );
        let mut store = StateStore::new(false);
        store.state_for(&command).set(2, ParamValue::Int(3));

        let text = describe_commands(std::slice::from_ref(&command), &store);
        assert!(text.contains("[+] stash(float amount,string label,int count,List<Item> items)"));
        assert!(text.contains("Put things away"));
        assert!(text.contains("amount = 10 (default)"));
        assert!(text.contains("label =  (zero)"));
        assert!(text.contains("count = 3 (set)"));
        assert!(text.contains("items (not editable)"));
    }

    #[test]
    fn report_summary_counts_failures() {
        let report = InvokeReport {
            command: "heal(float amount)".into(),
            signature: Command::from_descriptor(OperationDescriptor::new("heal")).signature,
            targets: vec![
                TargetReport { target: "a".into(), outcome: TargetOutcome::Completed },
                TargetReport {
                    target: "b".into(),
                    outcome: TargetOutcome::Failed(PanelError::invocation("nope")),
                },
            ],
        };
        let text = describe_report(&report);
        assert!(text.contains("  - a: ok"));
        assert!(text.contains("  - b: FAILED: nope"));
        assert!(text.ends_with("1 of 2 failed"));
    }
}
