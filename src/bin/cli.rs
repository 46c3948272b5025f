use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use command_panel::demo::{self, Beacon};
use command_panel::describe::{describe_commands, describe_report};
use command_panel::dispatcher::InvokeReport;
use command_panel::error::PanelError;
use command_panel::executor::{DeferredExecutor, TokioExecutor};
use command_panel::log_sink::{LogSink, MemorySink, TracingSink};
use command_panel::model::ParamValue;
use command_panel::panel::CommandPanel;
use command_panel::registry::catalog::{command_catalog, help_text};
use command_panel::settings;
use command_panel::target::Invocable;
use command_panel::ui::text::TextUi;

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(name = "command-panel-cli", about = "Headless command panel over demo creatures", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (JSON)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Number of demo creatures in the selection
    #[arg(long, global = true, default_value = "3")]
    targets: usize,

    /// Add a beacon to the selection (only shared commands remain)
    #[arg(long, global = true)]
    beacon: bool,

    /// Output raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List commands with their current parameter values
    List,
    /// Draw one panel pass as text
    Render {
        #[arg(long)]
        expand_all: bool,
    },
    /// Parameter schemas; optionally for a single command
    Schema { command: Option<String> },
    /// Invoke a command on the selection
    Invoke {
        /// Name, signature (`heal(float)`) or display name
        command: String,
        /// One value per parameter, in order; missing values use defaults
        values: Vec<String>,
        /// Stun the creature at this index so its call fails
        #[arg(long)]
        fail_on: Option<usize>,
    },
    /// Show effective settings; with --save, write them to --settings
    Settings {
        #[arg(long)]
        save: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn fail(error: &PanelError) -> ! {
    eprintln!("Error: {error}");
    process::exit(1);
}

fn print_json<T: serde::Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Parse positional values into the command's buffer.
fn apply_values(
    panel: &mut CommandPanel,
    query: &str,
    values: &[String],
) -> Result<command_panel::registry::CommandSignature, PanelError> {
    let command = panel
        .find(query)
        .cloned()
        .ok_or_else(|| PanelError::UnknownCommand {
            name: query.to_string(),
        })?;
    if values.len() > command.params.len() {
        return Err(PanelError::InvalidValue {
            message: format!(
                "{} takes {} value(s), got {}",
                command.display_name,
                command.params.len(),
                values.len()
            ),
        });
    }
    for (index, (param, text)) in command.params.iter().zip(values).enumerate() {
        let value = ParamValue::parse(&param.kind, text)?;
        panel.set_value(&command.signature, index, value)?;
    }
    Ok(command.signature)
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let loaded = cli.settings.as_deref().and_then(settings::load_settings);
    let panel_settings = loaded.unwrap_or_default();

    if let Commands::Settings { save } = &cli.command {
        if *save {
            let Some(path) = cli.settings.as_deref() else {
                fail(&PanelError::SettingsError {
                    message: "--save requires --settings <PATH>".to_string(),
                });
            };
            if let Err(e) = settings::save_settings(path, &panel_settings) {
                fail(&e);
            }
            eprintln!("Saved settings to {}", path.display());
        }
        print_json(&panel_settings);
        return;
    }

    let executor = TokioExecutor::current();
    let shared: Arc<dyn DeferredExecutor> = Arc::new(executor.clone());
    let stunned = match &cli.command {
        Commands::Invoke { fail_on, .. } => *fail_on,
        _ => None,
    };
    let mut creatures = demo::create_demo_creatures(cli.targets.max(1), stunned, &shared);
    let mut beacon = Beacon::new("Beacon");

    let memory = Arc::new(MemorySink::new());
    let sink: Arc<dyn LogSink> = if cli.json {
        memory.clone()
    } else {
        Arc::new(TracingSink)
    };
    let mut panel = CommandPanel::new(panel_settings, sink);

    let mut targets: Vec<&mut dyn Invocable> =
        creatures.iter_mut().map(|c| c as &mut dyn Invocable).collect();
    if cli.beacon {
        targets.push(&mut beacon);
    }
    panel.refresh(&targets);

    match &cli.command {
        Commands::List => {
            if cli.json {
                print_json(&panel.commands());
            } else {
                println!("{}", describe_commands(panel.commands(), panel.store()));
            }
        }
        Commands::Render { expand_all } => {
            if *expand_all {
                panel.expand_all(true);
            }
            let mut ui = TextUi::new();
            panel.draw(&mut ui, &mut targets);
            println!("{}", ui.render());
        }
        Commands::Schema { command } => {
            let entries = command_catalog(panel.commands());
            if cli.json {
                print_json(&entries);
            } else {
                println!("{}", help_text(&entries, command.as_deref()));
            }
        }
        Commands::Invoke { command, values, .. } => {
            let signature = apply_values(&mut panel, command, values).unwrap_or_else(|e| fail(&e));
            let report: InvokeReport = panel
                .invoke(&signature, &mut targets)
                .unwrap_or_else(|e| fail(&e));
            drop(targets);

            if report.deferred() > 0 {
                eprintln!("Waiting for {} deferred job(s)...", report.deferred());
                executor.wait_idle().await;
            }

            if cli.json {
                print_json(&serde_json::json!({
                    "report": report,
                    "log": memory.drain(),
                }));
            } else {
                println!("{}", describe_report(&report));
                for c in &creatures {
                    println!("  {}: health {:.1}, position {}", c.label(), c.health(), c.position());
                }
            }
            if !report.succeeded() {
                process::exit(1);
            }
        }
        Commands::Settings { .. } => {}
    }
}
