//! The command panel: discovers a selection's commands, draws a foldout,
//! invoke button and parameter rows for each, and dispatches clicks.

use std::sync::Arc;

use crate::dispatcher::{Dispatcher, InvokeReport};
use crate::editors;
use crate::error::PanelError;
use crate::log_sink::LogSink;
use crate::model::ParamValue;
use crate::registry::{self, Command, CommandSignature, Parameter};
use crate::settings::PanelSettings;
use crate::state::{CommandState, StateStore};
use crate::target::Invocable;
use crate::ui::Widgets;

const NOT_EDITABLE: &str = "(not editable)";

pub struct CommandPanel {
    commands: Vec<Command>,
    store: StateStore,
    /// Distinct type names of the selection the commands were discovered for.
    type_set: Option<Vec<String>>,
    settings: PanelSettings,
    dispatcher: Dispatcher,
}

impl CommandPanel {
    pub fn new(settings: PanelSettings, sink: Arc<dyn LogSink>) -> Self {
        let dispatcher = Dispatcher::new(sink).with_result_prefix(settings.result_prefix.clone());
        Self {
            commands: Vec::new(),
            store: StateStore::new(settings.expanded_by_default),
            type_set: None,
            settings,
            dispatcher,
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn settings(&self) -> &PanelSettings {
        &self.settings
    }

    pub fn state(&self, signature: &CommandSignature) -> Option<&CommandState> {
        self.store.get(signature)
    }

    /// Re-run discovery if the selection's set of types changed. Returns true
    /// when the command list was rebuilt.
    pub fn refresh(&mut self, targets: &[&mut dyn Invocable]) -> bool {
        let mut types: Vec<String> = Vec::new();
        for t in targets {
            if !types.iter().any(|n| n == t.type_name()) {
                types.push(t.type_name().to_string());
            }
        }
        if self.type_set.as_ref() == Some(&types) {
            return false;
        }

        let views: Vec<&dyn Invocable> = targets.iter().map(|t| &**t).collect();
        self.commands = registry::discover_common(&views).unwrap_or_else(|e| {
            tracing::warn!(types = ?types, error = %e, "command discovery failed");
            Vec::new()
        });
        self.store.retain_discovered(&self.commands);
        self.type_set = Some(types);
        true
    }

    /// Draw one pass. Clicked commands are invoked after every row has been
    /// drawn, so edits made in the same pass are included.
    pub fn draw(
        &mut self,
        ui: &mut dyn Widgets,
        targets: &mut [&mut dyn Invocable],
    ) -> Vec<InvokeReport> {
        self.refresh(targets);

        if self.settings.show_read_only_fields {
            if let Some(first) = targets.first() {
                draw_read_only_fields(ui, &**first);
            }
        }

        let mut clicked = Vec::new();
        for command in &self.commands {
            let state = self.store.state_for(command);

            ui.begin_row();
            state.expanded = ui.foldout(state.expanded, &command.display_name);
            if ui.button(&command.display_name) {
                clicked.push(command.signature.clone());
            }
            ui.end_row();

            if state.expanded {
                ui.indent(1);
                for (index, param) in command.params.iter().enumerate() {
                    draw_param_row(ui, command, state, index, param, self.settings.log_missing_editors);
                }
                ui.indent(-1);
            }
        }

        let mut reports = Vec::with_capacity(clicked.len());
        for signature in &clicked {
            match self.invoke(signature, &mut *targets) {
                Ok(report) => reports.push(report),
                Err(e) => tracing::warn!(command = %signature, error = %e, "clicked command not invoked"),
            }
        }
        reports
    }

    /// Invoke a command on the selection without a click.
    pub fn invoke(
        &mut self,
        signature: &CommandSignature,
        targets: &mut [&mut dyn Invocable],
    ) -> Result<InvokeReport, PanelError> {
        self.refresh(targets);
        let command = self
            .commands
            .iter()
            .find(|c| &c.signature == signature)
            .ok_or_else(|| PanelError::UnknownCommand {
                name: signature.to_string(),
            })?;
        let state = self.store.state_for(command);
        Ok(self.dispatcher.invoke(command, state, targets))
    }

    /// Look a command up by display name, signature text (`heal(float)`) or
    /// operation name when that name is not overloaded.
    pub fn find(&self, query: &str) -> Option<&Command> {
        let query = query.trim();
        if let Some(c) = self
            .commands
            .iter()
            .find(|c| c.display_name == query || c.signature.to_string() == query)
        {
            return Some(c);
        }
        let mut by_name = self.commands.iter().filter(|c| c.name() == query);
        match (by_name.next(), by_name.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    /// Write a buffer slot directly. The value must fit the parameter's kind.
    pub fn set_value(
        &mut self,
        signature: &CommandSignature,
        index: usize,
        value: ParamValue,
    ) -> Result<(), PanelError> {
        let command = self
            .commands
            .iter()
            .find(|c| &c.signature == signature)
            .ok_or_else(|| PanelError::UnknownCommand {
                name: signature.to_string(),
            })?;
        let param = command
            .params
            .get(index)
            .ok_or(PanelError::MissingArgument { index })?;
        let value = value.coerce(&param.kind, &param.name)?;
        self.store.state_for(command).set(index, value);
        Ok(())
    }

    /// Open or close every command's parameter rows.
    pub fn expand_all(&mut self, expanded: bool) {
        for command in &self.commands {
            self.store.state_for(command).expanded = expanded;
        }
    }
}

fn draw_param_row(
    ui: &mut dyn Widgets,
    command: &Command,
    state: &mut CommandState,
    index: usize,
    param: &Parameter,
    log_missing: bool,
) {
    ui.begin_row();
    ui.label(&param.name);
    match editors::editor_for(&param.kind) {
        Some(editor) => {
            let current = state.resolved(index, param);
            let edited = editor(&mut *ui, param, current.clone());
            if edited != current {
                state.set(index, edited);
            }
        }
        None => {
            ui.label(NOT_EDITABLE);
            if log_missing {
                tracing::info!(
                    command = %command.display_name,
                    parameter = %param.name,
                    kind = param.kind.type_name(),
                    "no editor for parameter"
                );
            }
        }
    }
    ui.end_row();
}

fn draw_read_only_fields(ui: &mut dyn Widgets, target: &dyn Invocable) {
    let fields = target.read_only_fields();
    if fields.is_empty() {
        return;
    }
    ui.set_enabled(false);
    for field in fields {
        ui.begin_row();
        ui.label(&field.name);
        let editor = field.value.kind().and_then(|kind| {
            editors::editor_for(&kind).map(|editor| (editor, Parameter::new(field.name.clone(), kind)))
        });
        match editor {
            Some((editor, param)) => {
                editor(&mut *ui, &param, field.value);
            }
            None => ui.label(&field.value.to_string()),
        }
        ui.end_row();
    }
    ui.set_enabled(true);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::executor::DeferredSequence;
    use crate::log_sink::{MemorySink, Severity};
    use crate::model::{Color, ParamKind, Quat, Vec2, Vec3};
    use crate::registry::OperationDescriptor;
    use crate::target::{Args, FieldView, Outcome};
    use crate::ui::text::TextUi;

    struct Unit {
        health: f32,
        ops: Vec<OperationDescriptor>,
    }

    impl Unit {
        fn new() -> Self {
            Self {
                health: 50.0,
                ops: vec![
                    OperationDescriptor::new("heal")
                        .param(Parameter::new("amount", ParamKind::Float).with_default(10)),
                    OperationDescriptor::new("stash")
                        .param(Parameter::new("items", ParamKind::unsupported("List<Item>")))
                        .param(Parameter::new("count", ParamKind::Int)),
                ],
            }
        }
    }

    impl Invocable for Unit {
        fn type_name(&self) -> &str {
            "Unit"
        }

        fn operations(&self) -> Vec<OperationDescriptor> {
            self.ops.clone()
        }

        fn invoke(&mut self, signature: &CommandSignature, args: Args<'_>) -> Result<Outcome, PanelError> {
            match signature.name() {
                "heal" => {
                    self.health += args.float(0)?;
                    Ok(Outcome::Empty)
                }
                "stash" => Ok(Outcome::value(args.int(1)?)),
                other => Err(PanelError::UnknownCommand { name: other.to_string() }),
            }
        }

        fn start_deferred(&mut self, _: DeferredSequence) {}

        fn read_only_fields(&self) -> Vec<FieldView> {
            vec![FieldView::new("health", self.health)]
        }
    }

    /// Declares one operation with a default for every editable kind and
    /// records the arguments it receives.
    struct Recorder {
        received: Vec<ParamValue>,
    }

    fn defaults() -> Vec<(&'static str, ParamKind, ParamValue)> {
        vec![
            ("f", ParamKind::Float, ParamValue::Float(2.5)),
            ("i", ParamKind::Int, ParamValue::Int(7)),
            ("b", ParamKind::Bool, ParamValue::Bool(true)),
            ("s", ParamKind::Text, ParamValue::Text("hi".into())),
            ("c", ParamKind::Color, ParamValue::Color(Color::rgb(1, 2, 3))),
            ("v2", ParamKind::Vector2, ParamValue::Vector2(Vec2::new(1.0, 2.0))),
            ("v3", ParamKind::Vector3, ParamValue::Vector3(Vec3::new(1.0, 2.0, 3.0))),
            (
                "r",
                ParamKind::Rotation,
                ParamValue::Rotation(Quat::from_euler(Vec3::new(10.0, 20.0, 30.0))),
            ),
        ]
    }

    impl Invocable for Recorder {
        fn type_name(&self) -> &str {
            "Recorder"
        }

        fn operations(&self) -> Vec<OperationDescriptor> {
            let op = defaults().into_iter().fold(OperationDescriptor::new("record"), |op, (name, kind, value)| {
                op.param(Parameter::new(name, kind).with_default(value))
            });
            vec![op]
        }

        fn invoke(&mut self, _: &CommandSignature, args: Args<'_>) -> Result<Outcome, PanelError> {
            self.received = (0..args.len())
                .map(|i| args.get(i).cloned())
                .collect::<Result<_, _>>()?;
            Ok(Outcome::Empty)
        }

        fn start_deferred(&mut self, _: DeferredSequence) {}
    }

    fn panel() -> (CommandPanel, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (CommandPanel::new(PanelSettings::default(), sink.clone()), sink)
    }

    #[test]
    fn heal_with_default_amount() {
        let (mut panel, sink) = panel();
        let mut unit = Unit::new();
        let mut ui = TextUi::new();

        panel.draw(&mut ui, &mut [&mut unit]);
        assert_eq!(ui.lines()[1], "[+] <heal(float amount)>");

        // Expand, then check the row shows the widened default.
        ui.clear_output();
        ui.toggle_foldout("heal(float amount)");
        panel.draw(&mut ui, &mut [&mut unit]);
        assert_eq!(ui.lines()[2], "    amount [10]");

        ui.clear_output();
        ui.click("heal(float amount)");
        let reports = panel.draw(&mut ui, &mut [&mut unit]);
        assert_eq!(reports.len(), 1);
        assert!(reports[0].succeeded());
        assert_eq!(unit.health, 60.0);
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn untouched_defaults_reach_the_target_for_every_kind() {
        let (mut panel, sink) = panel();
        let mut recorder = Recorder { received: Vec::new() };
        let mut ui = TextUi::new();
        panel.draw(&mut ui, &mut [&mut recorder]);
        panel.expand_all(true);

        let command = panel.commands()[0].clone();
        ui.clear_output();
        ui.click(&command.display_name);
        let reports = panel.draw(&mut ui, &mut [&mut recorder]);

        assert_eq!(reports.len(), 1);
        assert!(reports[0].succeeded());
        assert!(sink.entries().is_empty());
        let expected: Vec<ParamValue> = defaults().into_iter().map(|(_, _, v)| v).collect();
        assert_eq!(recorder.received, expected);
        assert!(panel.state(&command.signature).unwrap().values().iter().all(Option::is_none));
        assert!(ui.render().contains("    i [7]"));
        assert!(ui.render().contains("    s [\"hi\"]"));
    }

    #[test]
    fn edits_in_the_same_pass_are_used() {
        let (mut panel, _) = panel();
        let mut unit = Unit::new();
        let mut ui = TextUi::new();
        panel.draw(&mut ui, &mut [&mut unit]);
        panel.expand_all(true);

        ui.edit("heal(float amount)", "amount", ParamValue::Float(2.5));
        ui.click("heal(float amount)");
        panel.draw(&mut ui, &mut [&mut unit]);
        assert_eq!(unit.health, 52.5);
    }

    #[test]
    fn buffers_keep_their_length_across_passes() {
        let (mut panel, _) = panel();
        let mut unit = Unit::new();
        let mut ui = TextUi::new();
        panel.draw(&mut ui, &mut [&mut unit]);
        panel.expand_all(true);
        for _ in 0..3 {
            panel.draw(&mut ui, &mut [&mut unit]);
            for command in panel.commands() {
                assert_eq!(panel.state(&command.signature).unwrap().len(), command.params.len());
            }
        }
    }

    #[test]
    fn parameter_without_editor_is_left_alone() {
        let (mut panel, sink) = panel();
        let mut unit = Unit::new();
        let mut ui = TextUi::new();
        panel.draw(&mut ui, &mut [&mut unit]);
        panel.expand_all(true);
        ui.clear_output();
        panel.draw(&mut ui, &mut [&mut unit]);
        assert!(ui.render().contains("items (not editable)"));

        let stash = panel.find("stash").unwrap().signature.clone();
        panel.set_value(&stash, 1, ParamValue::Int(4)).unwrap();
        assert_eq!(panel.state(&stash).unwrap().values()[0], None);

        let report = panel.invoke(&stash, &mut [&mut unit]).unwrap();
        assert!(report.succeeded());
        assert_eq!(sink.entries()[0].message, "Method call result -> 4");
        assert_eq!(sink.count(Severity::Error), 0);
    }

    #[test]
    fn read_only_fields_are_drawn_disabled() {
        let (mut panel, _) = panel();
        let mut unit = Unit::new();
        let mut ui = TextUi::new();
        ui.edit("", "health", ParamValue::Float(0.0));
        panel.draw(&mut ui, &mut [&mut unit]);
        assert_eq!(ui.lines()[0], "# health [50]");
        assert_eq!(unit.health, 50.0);
    }

    #[test]
    fn find_by_display_name_signature_or_unique_name() {
        let (mut panel, _) = panel();
        panel.refresh(&[&mut Unit::new()]);
        assert!(panel.find("heal(float amount)").is_some());
        assert!(panel.find("heal(float)").is_some());
        assert!(panel.find("heal").is_some());
        assert!(panel.find("explode").is_none());
    }

    #[test]
    fn set_value_rejects_wrong_kind() {
        let (mut panel, _) = panel();
        panel.refresh(&[&mut Unit::new()]);
        let heal = panel.find("heal").unwrap().signature.clone();
        assert!(matches!(
            panel.set_value(&heal, 0, ParamValue::Bool(true)),
            Err(PanelError::Conversion { .. })
        ));
        assert!(matches!(
            panel.set_value(&heal, 3, ParamValue::Float(1.0)),
            Err(PanelError::MissingArgument { index: 3 })
        ));
        panel.set_value(&heal, 0, ParamValue::Int(3)).unwrap();
        assert_eq!(panel.state(&heal).unwrap().values()[0], Some(ParamValue::Float(3.0)));
    }

    #[test]
    fn malformed_metadata_renders_an_empty_panel() {
        let (mut panel, _) = panel();
        let mut unit = Unit::new();
        unit.ops.push(OperationDescriptor::new("heal").param(Parameter::new("hp", ParamKind::Float)));
        let mut ui = TextUi::new();
        let reports = panel.draw(&mut ui, &mut [&mut unit]);
        assert!(panel.commands().is_empty());
        assert!(reports.is_empty());
        assert_eq!(ui.lines().len(), 1);
    }

    #[test]
    fn unknown_signature_is_an_error() {
        let (mut panel, _) = panel();
        let sig = CommandSignature { name: "fly".into(), params: vec![] };
        assert!(matches!(
            panel.invoke(&sig, &mut [&mut Unit::new()]),
            Err(PanelError::UnknownCommand { .. })
        ));
    }
}
