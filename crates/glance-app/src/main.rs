use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use glance_config::Config;
use glance_types::SettingsCommand;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod controller;
mod events;
mod io;
mod state;

#[cfg(test)]
mod tests;

use self::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "glance", version, about = "Dictionary ingestion, lookup and live preview")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest a dictionary source file
    Ingest {
        path: PathBuf,
        /// Shift-JIS, UTF-8, UTF-16LE, UTF-16BE or EUC-JP
        #[arg(long)]
        encoding: Option<String>,
        /// EIJIRO, TSV, PDIC_LINE or JSON
        #[arg(long)]
        format: Option<String>,
    },
    /// Load the bundled dictionary if nothing has been loaded yet
    Bootstrap,
    /// Remove every dictionary entry
    Clear,
    /// Storage used by the dictionary
    Usage,
    /// Look up text and print the rendered preview
    Lookup { text: String },
    /// Show or edit the saved settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Edit settings interactively from stdin, printing each regenerated preview
    Preview,
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    Show,
    Set {
        name: String,
        value: String,
    },
    AddRule,
    SetRule {
        index: usize,
        /// search or replace
        field: String,
        value: String,
    },
    MoveRule {
        index: usize,
        #[arg(allow_hyphen_values = true)]
        offset: isize,
    },
    RemoveRule {
        index: usize,
    },
    Reset,
}

/// Log to stderr, filtered by `RUST_LOG` or else `default_filter`
fn subscriber(default_filter: &str) -> impl tracing::Subscriber + Send + Sync + 'static {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::new();
    subscriber(&config.log_filter).init();

    let state = Arc::new(AppState::open(config).await?);

    match cli.command {
        Command::Ingest {
            path,
            encoding,
            format,
        } => commands::ingest(&state, &path, encoding, format).await,
        Command::Bootstrap => commands::bootstrap(&state).await,
        Command::Clear => commands::clear(&state).await,
        Command::Usage => commands::usage(&state).await,
        Command::Lookup { text } => commands::lookup(&state, &text).await,
        Command::Settings { action } => match action {
            SettingsAction::Show => commands::show_settings(&state).await,
            SettingsAction::Set { name, value } => commands::set_option(&state, &name, &value).await,
            SettingsAction::AddRule => {
                commands::update_settings(&state, SettingsCommand::AddRule).await
            }
            SettingsAction::SetRule {
                index,
                field,
                value,
            } => commands::set_rule(&state, index, &field, &value).await,
            SettingsAction::MoveRule { index, offset } => {
                commands::update_settings(&state, SettingsCommand::MoveRule { index, offset }).await
            }
            SettingsAction::RemoveRule { index } => {
                commands::update_settings(&state, SettingsCommand::RemoveRule { index }).await
            }
            SettingsAction::Reset => {
                commands::update_settings(&state, SettingsCommand::ResetToDefaults).await
            }
        },
        Command::Preview => commands::preview(state).await,
    }
}
