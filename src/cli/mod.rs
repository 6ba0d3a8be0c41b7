//! Non-interactive command-line front end over the household snapshot.

pub mod args;
pub mod commands;
pub mod output;
pub mod system_clock;
pub mod table;

use std::io::IsTerminal;

use clap::Parser;
use tracing::debug;

use hearth_config::{Config, ConfigManager};
use hearth_core::{time::FixedClock, Clock, PlainFormatter};
use hearth_storage_json::JsonHouseholdStore;

use crate::{errors::CliError, utils::AppPaths};

pub use args::Cli;
pub use system_clock::SystemClock;

/// Everything a command needs, resolved once from flags, environment and config.
pub struct CliContext {
    pub paths: AppPaths,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub store: JsonHouseholdStore,
    pub clock: Box<dyn Clock>,
    pub formatter: PlainFormatter,
    pub json: bool,
}

impl CliContext {
    pub fn from_cli(cli: &Cli, paths: AppPaths) -> Result<Self, CliError> {
        let config_manager = paths.config_manager()?;
        let config = config_manager.load()?;
        let snapshot_path = paths.snapshot_path(&config, cli.snapshot.clone());
        debug!(snapshot = %snapshot_path.display(), "opening household snapshot");
        let store = JsonHouseholdStore::new(snapshot_path, paths.snapshot_backups.clone())?;
        let clock: Box<dyn Clock> = match cli.today {
            Some(today) => Box::new(FixedClock::new(today)),
            None => Box::new(SystemClock),
        };
        let formatter = PlainFormatter {
            precision: usize::from(config.currency_precision),
        };
        Ok(Self {
            paths,
            config_manager,
            config,
            store,
            clock,
            formatter,
            json: cli.json,
        })
    }
}

/// Parses process arguments, runs the command and prints its output.
pub fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    let output = execute(cli, AppPaths::from_env())?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

/// Runs one parsed command against `paths`, returning what it would print.
pub fn execute(cli: Cli, paths: AppPaths) -> Result<String, CliError> {
    let context = CliContext::from_cli(&cli, paths)?;
    output::set_color_enabled(
        context.config.ui_color_enabled && !context.json && std::io::stdout().is_terminal(),
    );
    commands::dispatch(&cli, &context)
}
