//! Edit commands - replace a session's text or strategy
//!
//! Both commands require the version the edit was based on and
//! fail with a conflict if the session has moved on since.

use crate::cli::commands::{read_input, with_hint, StrategyArgs};
use crate::cli::output::{colors, print_output, print_warning};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use crate::core::types::{ChildChunk, ChunkStrategy};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for update-text
#[derive(Args, Debug)]
pub struct UpdateTextArgs {
    /// Session ID
    pub session: String,

    /// Version the edited text was based on
    #[arg(long)]
    pub version: u64,

    /// File with the full marker-delimited text (`-` for stdin)
    pub input: PathBuf,
}

/// Arguments for update-strategy
#[derive(Args, Debug)]
pub struct UpdateStrategyArgs {
    /// Session ID
    pub session: String,

    /// Version the change is based on
    #[arg(long)]
    pub version: u64,

    #[command(flatten)]
    pub strategy: StrategyArgs,
}

/// Response for both edit commands
#[derive(Debug, Serialize)]
pub struct EditResponse {
    pub session_id: String,
    pub version: u64,
    pub chunk_strategy: ChunkStrategy,
    pub pages: usize,
    pub chunks: Vec<ChildChunk>,
    pub orphaned_metadata: Vec<String>,
}

/// Execute update-text command
pub fn execute_update_text(
    args: UpdateTextArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_input(&args.input)
        .map_err(|e| format!("Failed to read {}: {e}", args.input.display()))?;

    let revision = services
        .revisions
        .replace_text(&args.session, args.version, &text)
        .map_err(with_hint)?;

    let strategy = services
        .revisions
        .session(&args.session)?
        .chunk_strategy
        .clone();

    let response = EditResponse {
        session_id: args.session,
        version: revision.version,
        chunk_strategy: strategy,
        pages: revision.page_map.len(),
        chunks: revision.chunks,
        orphaned_metadata: revision.orphaned_metadata,
    };

    print_edit(&response, format, "Updated text of")
}

/// Execute update-strategy command
pub fn execute_update_strategy(
    args: UpdateStrategyArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.strategy.is_empty() {
        return Err("No strategy changes. Specify at least one of --chunk-size, --overlap, \
             --split-mode, --normalize or --no-normalize."
            .into());
    }

    let current = services
        .revisions
        .session(&args.session)
        .map_err(with_hint)?;
    let strategy = args.strategy.apply(current.chunk_strategy.clone());

    let revision = services
        .revisions
        .replace_strategy(&args.session, args.version, strategy)
        .map_err(with_hint)?;

    let response = EditResponse {
        session_id: args.session,
        version: revision.version,
        chunk_strategy: revision.chunk_strategy,
        pages: revision.page_map.len(),
        chunks: revision.chunks,
        orphaned_metadata: revision.orphaned_metadata,
    };

    print_edit(&response, format, "Re-chunked")
}

fn print_edit(
    response: &EditResponse,
    format: OutputFormat,
    verb: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    print_output(response, format, |r| {
        println!(
            "{} session {} (now version {})",
            colors::success(verb),
            colors::session_id(&r.session_id),
            colors::version(&r.version.to_string())
        );
        println!(
            "  {} pages, {} chunks ({} mode, size {}, overlap {})",
            colors::number(&r.pages.to_string()),
            colors::number(&r.chunks.len().to_string()),
            r.chunk_strategy.split_mode,
            r.chunk_strategy.chunk_size,
            r.chunk_strategy.overlap
        );
        if !r.orphaned_metadata.is_empty() {
            print_warning(&format!(
                "dropped metadata for chunks that no longer exist: {}",
                r.orphaned_metadata.join(", ")
            ));
        }
    })?;

    Ok(())
}
