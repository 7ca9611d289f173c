//! CLI command implementations
//!
//! Each command module handles argument parsing and execution for a specific CLI command.

pub mod chunk;
pub mod completions;
pub mod config;
pub mod edit;
pub mod session;

use crate::core::error::PagesplitError;
use crate::core::types::{ChunkStrategy, SplitMode};
use clap::Args;
use std::io::{self, Read};
use std::path::Path;

// Re-export argument types for use in mod.rs
pub use completions::CompletionsArgs;
pub use config::ConfigArgs;

/// Strategy overrides shared by create-session and update-strategy
#[derive(Args, Debug, Clone, Default)]
pub struct StrategyArgs {
    /// Target chunk size in characters
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Overlap between chunks in characters
    #[arg(long)]
    pub overlap: Option<usize>,

    /// Boundary mode: chars, paragraph or heading
    #[arg(long)]
    pub split_mode: Option<SplitMode>,

    /// Normalize line endings and blank lines (true/false)
    #[arg(long, conflicts_with = "no_normalize")]
    pub normalize: Option<bool>,

    /// Keep page text exactly as extracted
    #[arg(long)]
    pub no_normalize: bool,
}

impl StrategyArgs {
    /// Apply the given overrides on top of `base`
    pub fn apply(&self, base: ChunkStrategy) -> ChunkStrategy {
        let normalize = if self.no_normalize {
            false
        } else {
            self.normalize.unwrap_or(base.normalize)
        };

        ChunkStrategy {
            chunk_size: self.chunk_size.unwrap_or(base.chunk_size),
            overlap: self.overlap.unwrap_or(base.overlap),
            split_mode: self.split_mode.unwrap_or(base.split_mode),
            normalize,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chunk_size.is_none()
            && self.overlap.is_none()
            && self.split_mode.is_none()
            && self.normalize.is_none()
            && !self.no_normalize
    }
}

/// Read a file, or stdin when `path` is `-`
pub fn read_input(path: &Path) -> io::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
    }
}

/// Add a pointer to `list-sessions` when a session is missing
pub fn with_hint(err: PagesplitError) -> Box<dyn std::error::Error> {
    match err {
        PagesplitError::SessionNotFound(id) => format!(
            "Session '{id}' not found. Run 'pagesplit list-sessions' to see available sessions."
        )
        .into(),
        PagesplitError::VersionConflict { expected, actual } => format!(
            "Version conflict: expected {expected}, but the session is at version {actual}. \
             Run 'pagesplit get-session' to fetch the latest revision."
        )
        .into(),
        other => other.into(),
    }
}
