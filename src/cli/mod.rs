//! CLI adapter for pagesplit
//!
//! Provides the command-line interface over the revision controller.
//! Depends on `core/`; nothing in `core/` depends on it.
//!
//! # Architecture
//!
//! ```text
//!              +------------------+
//!              |     core/        |
//!              |  (domain logic)  |
//!              +--------+---------+
//!                       |
//!                       v
//!              +------------------+
//!              |      cli/        |
//!              | (clap adapter)   |
//!              +------------------+
//! ```

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// pagesplit - Page-aware document segmentation
///
/// Create editing sessions from extracted pages, edit the marker-delimited
/// text, re-chunk under different strategies and annotate chunks.
#[derive(Parser, Debug)]
#[command(name = "pagesplit")]
#[command(version)]
#[command(about = "Page-aware document segmentation with revision control", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a session from a JSON page file
    #[command(name = "create-session")]
    CreateSession(commands::session::CreateArgs),

    /// List all sessions
    #[command(name = "list-sessions")]
    ListSessions(commands::session::ListArgs),

    /// Show a session's page map and chunks
    #[command(name = "get-session")]
    GetSession(commands::session::GetArgs),

    /// Replace a session's marker-delimited text
    #[command(name = "update-text", disable_version_flag = true)]
    UpdateText(commands::edit::UpdateTextArgs),

    /// Re-chunk a session under a new strategy
    #[command(name = "update-strategy", disable_version_flag = true)]
    UpdateStrategy(commands::edit::UpdateStrategyArgs),

    /// Show one chunk with its exact text and metadata
    #[command(name = "get-chunk")]
    GetChunk(commands::chunk::GetChunkArgs),

    /// Annotate a chunk
    #[command(name = "set-chunk-metadata")]
    SetChunkMetadata(commands::chunk::SetMetadataArgs),

    /// Delete a session
    #[command(name = "delete-session")]
    DeleteSession(commands::session::DeleteArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  pagesplit completions bash > ~/.local/share/bash-completion/completions/pagesplit
    ///   zsh:   pagesplit completions zsh > ~/.zfunc/_pagesplit
    ///   fish:  pagesplit completions fish > ~/.config/fish/completions/pagesplit.fish
    Completions(commands::CompletionsArgs),
}

/// Run the CLI with the provided arguments
pub fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;
    use crate::core::services::Services;
    use crate::core::xdg::XdgDirs;
    use std::sync::Arc;

    // Completions need no services
    if let Commands::Completions(args) = cli.command {
        return commands::completions::execute(args);
    }

    let xdg = XdgDirs::new();
    xdg.log_paths();
    xdg.ensure_dirs_exist()?;

    let config = Config::load_with_xdg(&xdg)?;
    config.log_config();

    let services = Arc::new(Services::new(config));
    let format = cli.format;

    match cli.command {
        Commands::CreateSession(args) => commands::session::execute_create(args, &services, format),
        Commands::ListSessions(args) => commands::session::execute_list(args, &services, format),
        Commands::GetSession(args) => commands::session::execute_get(args, &services, format),
        Commands::UpdateText(args) => commands::edit::execute_update_text(args, &services, format),
        Commands::UpdateStrategy(args) => {
            commands::edit::execute_update_strategy(args, &services, format)
        }
        Commands::GetChunk(args) => commands::chunk::execute_get_chunk(args, &services, format),
        Commands::SetChunkMetadata(args) => {
            commands::chunk::execute_set_metadata(args, &services, format)
        }
        Commands::DeleteSession(args) => commands::session::execute_delete(args, &services, format),
        Commands::ShowConfig(args) => commands::config::execute(args, &services, format),
        Commands::Completions(_) => unreachable!(), // Handled above
    }
}
