use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tagbridge_cli::logging::init_logging;
use tagbridge_cli::Scenario;
use tagbridge_commands::HostAction;
use tagbridge_host::{BridgeConfig, ConfigLoadError, Dispatcher};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(
    name = "tagbridge",
    version,
    about = "Run tag-driven trigger scripts against a simulated host",
    long_about = None
)]
struct Cli {
    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    /// Config file to use instead of the platform default
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fire the events and commands described in a scenario file
    Run {
        /// Scenario TOML file
        scenario: PathBuf,
    },
    /// Load the configured scripts and report any errors
    Check,
    /// List registered events and commands
    List,
    /// Write an example config file if none exists
    InitConfig,
}

fn load_config(path: Option<&PathBuf>) -> Result<BridgeConfig> {
    let loaded = match path {
        Some(path) => BridgeConfig::load_from(path),
        None => BridgeConfig::load(),
    };
    match loaded {
        Ok(config) => Ok(config),
        Err(ConfigLoadError::NotFound(path)) => {
            eprintln!(
                "No config at {}, using defaults. Run `tagbridge init-config` to create one.",
                path.display()
            );
            Ok(BridgeConfig::default())
        }
        Err(e) => Err(e).context("Failed to load config"),
    }
}

fn init_config(path: Option<&PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path.clone(),
        None => BridgeConfig::config_path().context("Failed to locate config directory")?,
    };
    if path.exists() {
        bail!("Config already exists at {}", path.display());
    }
    BridgeConfig::example()
        .save_to(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Created example config at {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::InitConfig = cli.command {
        return init_config(cli.config.as_ref());
    }

    let config = load_config(cli.config.as_ref())?;
    let _log_guard = init_logging("tagbridge", config.logging.file, cli.debug > 0)
        .context("Failed to initialize logging")?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<HostAction>();
    let consumer = tokio::spawn(async move {
        while let Some(action) = action_rx.recv().await {
            match action {
                HostAction::Speak {
                    talker,
                    targets,
                    message,
                    range,
                } => {
                    info!(
                        target: "host",
                        "e@{} says to {:?} (range {}): {}",
                        talker,
                        targets,
                        range,
                        message
                    );
                }
                HostAction::Narrate { targets, message } => {
                    info!(target: "host", "narrate to {:?}: {}", targets, message);
                }
            }
        }
    });

    let (mut dispatcher, report) =
        Dispatcher::from_config(&config, action_tx).context("Failed to register commands")?;

    match cli.command {
        Commands::Check => {
            for err in &report.errors {
                error!("{}", err);
            }
            println!(
                "{} script(s) loaded, {} error(s)",
                report.loaded,
                report.errors.len()
            );
            if !report.errors.is_empty() {
                bail!("Script errors found");
            }
        }
        Commands::List => {
            println!("Events:");
            for name in dispatcher.events().names() {
                println!("  {}", name);
            }
            println!("Commands:");
            for name in dispatcher.commands().names() {
                if let Some(command) = dispatcher.commands().get(name) {
                    println!("  {}", command.registration().syntax());
                }
            }
            println!("Scripts:");
            for script in dispatcher.scripts() {
                println!("  {} ({})", script.name(), script.declaration().raw());
            }
        }
        Commands::Run { scenario } => {
            let scenario = Scenario::load(&scenario)?;
            let extra = scenario.scripting(&Default::default());
            let extra_report = dispatcher.load_config_scripts(&extra);
            if !extra_report.errors.is_empty() {
                warn!("{} scenario script(s) failed to load", extra_report.errors.len());
            }

            let summary = scenario.run(&mut dispatcher, &config.scripting);
            info!(
                "Scenario finished: {} event(s), {} script match(es), {} command(s), {} failure(s)",
                summary.events_fired,
                summary.scripts_matched,
                summary.commands_executed,
                summary.failures
            );
        }
        // handled before the config is loaded
        Commands::InitConfig => {}
    }

    // Closing the channel lets the consumer drain and exit
    drop(dispatcher);
    consumer.await.context("Action consumer panicked")?;
    Ok(())
}
