use std::collections::HashSet;

use crate::error::PanelError;
use crate::target::Invocable;

use super::validation::validate_operations;
use super::{Command, CommandSignature};

/// List the commands a target exposes, in declaration order.
///
/// Pure metadata: nothing on the target is invoked. A target with no
/// operations yields an empty list.
pub fn discover(target: &dyn Invocable) -> Result<Vec<Command>, PanelError> {
    let ops = target.operations();
    validate_operations(&ops)?;
    let commands: Vec<Command> = ops.into_iter().map(Command::from_descriptor).collect();
    tracing::debug!(
        target_type = target.type_name(),
        count = commands.len(),
        "discovered commands"
    );
    Ok(commands)
}

/// Commands shared by every distinct type in a selection.
///
/// Order follows the first target's declaration order. A command survives only
/// if every other selected type declares the same signature.
pub fn discover_common(targets: &[&dyn Invocable]) -> Result<Vec<Command>, PanelError> {
    let Some((first, rest)) = targets.split_first() else {
        return Ok(Vec::new());
    };
    let mut commands = discover(*first)?;

    let mut seen_types: HashSet<&str> = HashSet::from([first.type_name()]);
    for target in rest {
        if !seen_types.insert(target.type_name()) {
            continue;
        }
        let shared: HashSet<CommandSignature> =
            discover(*target)?.into_iter().map(|c| c.signature).collect();
        commands.retain(|c| shared.contains(&c.signature));
    }
    Ok(commands)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::executor::DeferredSequence;
    use crate::model::ParamKind;
    use crate::registry::{OperationDescriptor, Parameter};
    use crate::target::{Args, Outcome};

    struct Fixture {
        type_name: &'static str,
        ops: Vec<OperationDescriptor>,
        calls: usize,
    }

    impl Invocable for Fixture {
        fn type_name(&self) -> &str {
            self.type_name
        }

        fn operations(&self) -> Vec<OperationDescriptor> {
            self.ops.clone()
        }

        fn invoke(&mut self, _: &CommandSignature, _: Args<'_>) -> Result<Outcome, PanelError> {
            self.calls += 1;
            Ok(Outcome::Empty)
        }

        fn start_deferred(&mut self, _: DeferredSequence) {}
    }

    fn op(name: &str, kinds: &[ParamKind]) -> OperationDescriptor {
        kinds.iter().enumerate().fold(OperationDescriptor::new(name), |op, (i, k)| {
            op.param(Parameter::new(format!("p{i}"), k.clone()))
        })
    }

    #[test]
    fn discovery_is_deterministic_and_does_not_invoke() {
        let target = Fixture {
            type_name: "Door",
            ops: vec![
                op("open", &[]),
                op("close", &[ParamKind::Float]),
                op("lock", &[ParamKind::Text]),
            ],
            calls: 0,
        };
        let first = discover(&target).unwrap();
        let second = discover(&target).unwrap();
        assert_eq!(first, second);
        let names: Vec<&str> = first.iter().map(Command::name).collect();
        assert_eq!(names, ["open", "close", "lock"]);
        assert_eq!(target.calls, 0);
    }

    #[test]
    fn no_operations_is_not_an_error() {
        let target = Fixture { type_name: "Rock", ops: Vec::new(), calls: 0 };
        assert!(discover(&target).unwrap().is_empty());
    }

    #[test]
    fn malformed_metadata_fails_discovery() {
        let target = Fixture {
            type_name: "Broken",
            ops: vec![op("fine", &[]), op("bad name", &[])],
            calls: 0,
        };
        assert!(matches!(discover(&target), Err(PanelError::Discovery { .. })));
    }

    #[test]
    fn common_commands_across_types() {
        let door = Fixture {
            type_name: "Door",
            ops: vec![op("open", &[]), op("paint", &[ParamKind::Color]), op("lock", &[])],
            calls: 0,
        };
        let gate = Fixture {
            type_name: "Gate",
            ops: vec![op("lock", &[]), op("open", &[]), op("paint", &[ParamKind::Text])],
            calls: 0,
        };
        let commands = discover_common(&[&door, &gate]).unwrap();
        let names: Vec<&str> = commands.iter().map(Command::name).collect();
        assert_eq!(names, ["open", "lock"]);
    }

    #[test]
    fn same_type_selection_keeps_everything() {
        let a = Fixture { type_name: "Door", ops: vec![op("open", &[]), op("lock", &[])], calls: 0 };
        let b = Fixture { type_name: "Door", ops: vec![op("open", &[]), op("lock", &[])], calls: 0 };
        assert_eq!(discover_common(&[&a, &b]).unwrap().len(), 2);
        assert!(discover_common(&[]).unwrap().is_empty());
    }
}
