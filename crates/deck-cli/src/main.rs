//! deck - run actions from a menu file.
//!
//! Loads the engine configuration and a menu file, resolves the addressed
//! entry and runs it against local shell sessions.

mod error;
mod host;
mod menu;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use deck_core::{config_path, EngineConfig};
use deck_engine::{ActionExecutor, ActionResolver, ExecutionMode, ExecutionOptions, HostServices};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;
use crate::host::LocalHost;
use crate::menu::MenuFile;

#[derive(Debug, Parser)]
#[command(name = "deck", version, about = "Run actions from a menu file")]
struct Cli {
    /// Menu file (defaults to menu.toml in the deck config directory).
    #[arg(long, global = true)]
    menu: Option<PathBuf>,

    /// Engine config file (defaults to config.toml in the deck config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the menu tree.
    List,

    /// Run the entry at a `/`-separated label path, e.g. "Build/Release".
    Run {
        path: String,

        /// Keep going after a failed step.
        #[arg(long)]
        continue_on_error: bool,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,deck=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `--config` if given, else the default location; defaults if neither exists.
fn load_config(explicit: Option<&Path>) -> Result<EngineConfig, CliError> {
    let path = explicit.map(Path::to_path_buf).or_else(config_path);
    if path.is_none() {
        tracing::debug!("No config directory, using default engine config");
    }
    Ok(EngineConfig::load_optional(path.as_deref())?)
}

async fn run_entry(
    menu: MenuFile,
    config: EngineConfig,
    label_path: &str,
    continue_on_error: bool,
) -> Result<bool, CliError> {
    let entry = menu
        .find(label_path)
        .ok_or_else(|| CliError::EntryNotFound(label_path.to_string()))?;
    if entry.is_category() {
        return Err(CliError::Category(entry.label.clone()));
    }

    let resolution = ActionResolver::from_config(&config).resolve(entry, &menu.commands)?;
    for diagnostic in &resolution.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }
    if resolution.mode == ExecutionMode::None {
        return Err(CliError::NothingToRun(entry.label.clone()));
    }

    let host = Arc::new(LocalHost::new(menu.tasks.clone()));
    let executor = ActionExecutor::new(HostServices::from_host(host.clone()), config);

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Cancelling at the next step");
                cancel.cancel();
            }
        })
    };

    let options = ExecutionOptions::new()
        .continue_on_error(continue_on_error)
        .with_cancellation(cancel)
        .with_progress(|completed, total, action| {
            tracing::info!("[{}/{}] {}", completed, total, action.label());
        });

    tracing::info!("Running '{}'", entry.label);
    let result = executor.run(&resolution, options).await;
    println!("{}", result.summary());

    executor.dispose().await;
    host.shutdown().await;
    ctrl_c.abort();

    Ok(result.success)
}

async fn run(cli: Cli) -> Result<bool, CliError> {
    let menu_path = MenuFile::resolve_path(cli.menu)?;
    let menu = MenuFile::load(&menu_path)?;

    match cli.command {
        Commands::List => {
            print!("{}", menu.render_tree());
            Ok(true)
        }
        Commands::Run {
            path,
            continue_on_error,
        } => {
            let config = load_config(cli.config.as_deref())?;
            run_entry(menu, config, &path, continue_on_error).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
