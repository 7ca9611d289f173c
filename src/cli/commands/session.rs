//! Session commands - create, list, get and delete sessions
//!
//! - `create-session`: build a session from a page file
//! - `list-sessions`: list all sessions
//! - `get-session`: show page map and chunks
//! - `delete-session`: delete a session

use crate::cli::commands::{read_input, with_hint, StrategyArgs};
use crate::cli::output::{
    colors, format_relative_time, format_warnings, preview, print_output, print_success,
};
use crate::cli::OutputFormat;
use crate::core::segment::CharIndex;
use crate::core::services::Services;
use crate::core::types::{ChildChunk, ChunkStrategy, DocumentInput, PageSpan, SessionSummary};
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for create-session
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// JSON page file (`-` for stdin)
    pub input: PathBuf,

    /// Document ID (defaults to the input's doc_id, then the file name)
    #[arg(long)]
    pub doc_id: Option<String>,

    #[command(flatten)]
    pub strategy: StrategyArgs,
}

/// Arguments for list-sessions
#[derive(Args, Debug)]
pub struct ListArgs {}

/// Arguments for get-session
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Session ID
    pub session: String,

    /// Include the full marker-delimited text
    #[arg(long)]
    pub text: bool,
}

/// Arguments for delete-session
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Session ID
    pub session: String,

    /// Skip confirmation prompt
    #[arg(long, short = 'f')]
    pub force: bool,
}

/// Response for create-session
#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub session_id: String,
    pub doc_id: String,
    pub version: u64,
    pub pages: usize,
    pub chunks: usize,
    pub chunk_strategy: ChunkStrategy,
}

/// Session list response
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub count: usize,
    pub sessions: Vec<SessionSummary>,
}

/// Detailed session view
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub doc_id: String,
    pub version: u64,
    pub extractor: String,
    pub chunk_strategy: ChunkStrategy,
    pub page_map: Vec<PageSpan>,
    pub chunks: Vec<ChildChunk>,
    pub annotated_chunks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_text: Option<String>,
    pub updated_at: String,
}

/// Execute create-session command
pub fn execute_create(
    args: CreateArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = read_input(&args.input)
        .map_err(|e| format!("Failed to read {}: {e}", args.input.display()))?;
    let (input_doc_id, extract_meta, pages) = DocumentInput::from_json(&raw)?.into_parts();

    let doc_id = args
        .doc_id
        .or(input_doc_id)
        .or_else(|| {
            args.input
                .file_stem()
                .and_then(|stem| stem.to_str())
                .filter(|stem| *stem != "-")
                .map(str::to_string)
        })
        .unwrap_or_else(|| "document".to_string());

    let strategy = args.strategy.apply(services.default_strategy());
    let session = services
        .revisions
        .create_session(doc_id, extract_meta, pages, strategy)?;

    let response = CreateResponse {
        session_id: session.session_id.clone(),
        doc_id: session.doc_id.clone(),
        version: session.version,
        pages: session.page_map.len(),
        chunks: session.chunks.len(),
        chunk_strategy: session.chunk_strategy.clone(),
    };

    print_output(&response, format, |r| {
        println!(
            "{} session {} for '{}'",
            colors::success("Created"),
            colors::session_id(&r.session_id),
            r.doc_id
        );
        println!(
            "  {} pages, {} chunks ({} mode, size {}, overlap {})",
            colors::number(&r.pages.to_string()),
            colors::number(&r.chunks.to_string()),
            r.chunk_strategy.split_mode,
            r.chunk_strategy.chunk_size,
            r.chunk_strategy.overlap
        );
        println!("  version {}", colors::version(&r.version.to_string()));
    })?;

    Ok(())
}

/// Execute list-sessions command
pub fn execute_list(
    _args: ListArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let sessions = services.revisions.list_sessions()?;

    let response = SessionListResponse {
        count: sessions.len(),
        sessions,
    };

    print_output(&response, format, |r| {
        if r.sessions.is_empty() {
            println!(
                "No sessions found. Run '{}' to create one.",
                colors::label("pagesplit create-session <pages.json>")
            );
            return;
        }

        println!(
            "{} ({}):",
            colors::label("Sessions"),
            colors::number(&r.count.to_string())
        );
        for s in &r.sessions {
            println!(
                "  {}  {:<24} v{:<4} {:>5} pages {:>6} chunks  {}",
                colors::session_id(&s.session_id),
                s.doc_id,
                colors::version(&s.version.to_string()),
                colors::number(&s.page_count.to_string()),
                colors::number(&s.chunk_count.to_string()),
                colors::dim(&format_relative_time(&s.updated_at))
            );
        }
    })?;

    Ok(())
}

/// Execute get-session command
pub fn execute_get(
    args: GetArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = services
        .revisions
        .session(&args.session)
        .map_err(with_hint)?;

    let response = SessionResponse {
        session_id: session.session_id.clone(),
        doc_id: session.doc_id.clone(),
        version: session.version,
        extractor: format!(
            "{} {}",
            session.extract_meta.extractor_name, session.extract_meta.extractor_version
        ),
        chunk_strategy: session.chunk_strategy.clone(),
        page_map: session.page_map.clone(),
        chunks: session.chunks.clone(),
        annotated_chunks: session.chunk_metadata.len(),
        current_text: args.text.then(|| session.current_text.clone()),
        updated_at: session.updated_at.to_rfc3339(),
    };

    print_output(&response, format, |r| {
        println!(
            "{}: {} ({})",
            colors::label("Session"),
            colors::session_id(&r.session_id),
            r.doc_id
        );
        println!(
            "  {}: {}",
            colors::label("Version"),
            colors::version(&r.version.to_string())
        );
        println!("  {}: {}", colors::label("Extractor"), r.extractor);
        println!(
            "  {}: {} mode, size {}, overlap {}, normalize {}",
            colors::label("Strategy"),
            r.chunk_strategy.split_mode,
            r.chunk_strategy.chunk_size,
            r.chunk_strategy.overlap,
            r.chunk_strategy.normalize
        );
        println!(
            "  {}: {}",
            colors::label("Annotated chunks"),
            colors::number(&r.annotated_chunks.to_string())
        );

        println!("  {}:", colors::label("Pages"));
        for span in &r.page_map {
            println!(
                "    {:>4}  [{}, {})  {} chars  {}",
                span.page_no,
                span.start,
                span.end,
                colors::number(&span.char_len.to_string()),
                colors::dim(&span.hash[..12.min(span.hash.len())])
            );
        }

        let index = CharIndex::new(&session.current_text);
        println!("  {}:", colors::label("Chunks"));
        for chunk in &r.chunks {
            let warnings = format_warnings(&chunk.warnings);
            println!(
                "    {}  [{}, {})  {} chars  {}  {}",
                colors::chunk_id(&chunk.chunk_id),
                chunk.start,
                chunk.end,
                colors::number(&chunk.char_len.to_string()),
                colors::dim(&preview(index.slice(chunk.start, chunk.end), 48)),
                colors::warning(&warnings)
            );
        }

        if let Some(text) = &r.current_text {
            println!();
            println!("{text}");
        }
    })?;

    Ok(())
}

/// Execute delete-session command
pub fn execute_delete(
    args: DeleteArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    // Fail before prompting if the session does not exist
    services
        .revisions
        .session(&args.session)
        .map_err(with_hint)?;

    if !args.force {
        print!(
            "Delete session '{}'? [y/N] ",
            colors::session_id(&args.session)
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{}", colors::dim("Cancelled."));
            return Ok(());
        }
    }

    services
        .revisions
        .delete_session(&args.session)
        .map_err(with_hint)?;

    let response = serde_json::json!({
        "deleted": true,
        "session_id": &args.session
    });

    print_output(&response, format, |_| {
        print_success(&format!("Deleted session '{}'", args.session));
    })?;

    Ok(())
}
