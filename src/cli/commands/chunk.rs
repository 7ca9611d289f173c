//! Chunk commands - inspect and annotate single chunks

use crate::cli::commands::with_hint;
use crate::cli::output::{colors, format_warnings, print_output};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use crate::core::types::{ChunkMetadata, ContentType, QualityFlag};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for get-chunk
#[derive(Args, Debug)]
pub struct GetChunkArgs {
    /// Session ID
    pub session: String,

    /// Chunk ID (e.g. P001-C002)
    pub chunk: String,
}

/// Arguments for set-chunk-metadata
///
/// Fields not given keep their current value.
#[derive(Args, Debug, Default)]
pub struct SetMetadataArgs {
    /// Session ID
    pub session: String,

    /// Chunk ID (e.g. P001-C002)
    pub chunk: String,

    /// body, table, bullets, caption or other
    #[arg(long)]
    pub content_type: Option<ContentType>,

    /// Section path, e.g. "2 Methods > 2.1 Sampling"
    #[arg(long)]
    pub heading_path: Option<String>,

    #[arg(long)]
    pub note: Option<String>,

    /// good, suspect or broken
    #[arg(long)]
    pub quality_flag: Option<QualityFlag>,

    /// Custom fields as a JSON object, merged into existing ones
    #[arg(long)]
    pub custom: Option<String>,
}

/// Response for set-chunk-metadata
#[derive(Debug, Serialize)]
pub struct MetadataResponse {
    pub session_id: String,
    pub chunk_id: String,
    pub metadata: ChunkMetadata,
}

/// Execute get-chunk command
pub fn execute_get_chunk(
    args: GetChunkArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let detail = services
        .revisions
        .chunk_detail(&args.session, &args.chunk)
        .map_err(with_hint)?;

    print_output(&detail, format, |d| {
        println!(
            "{}: {} (page {}, session {} v{})",
            colors::label("Chunk"),
            colors::chunk_id(&d.chunk_id),
            d.page_no,
            colors::session_id(&d.session_id),
            colors::version(&d.version.to_string())
        );
        println!(
            "  {}: [{}, {})  {} chars",
            colors::label("Range"),
            d.start,
            d.end,
            colors::number(&d.char_len.to_string())
        );
        println!("  {}: {}", colors::label("Hash"), colors::dim(&d.hash));
        if !d.warnings.is_empty() {
            println!(
                "  {}: {}",
                colors::label("Warnings"),
                colors::warning(&format_warnings(&d.warnings))
            );
        }
        println!(
            "  {}: {:?} / {:?}",
            colors::label("Metadata"),
            d.metadata.content_type,
            d.metadata.quality_flag
        );
        if !d.metadata.heading_path.is_empty() {
            println!("  {}: {}", colors::label("Heading"), d.metadata.heading_path);
        }
        if !d.metadata.note.is_empty() {
            println!("  {}: {}", colors::label("Note"), d.metadata.note);
        }
        println!();
        println!("{}", d.text);
    })?;

    Ok(())
}

/// Execute set-chunk-metadata command
pub fn execute_set_metadata(
    args: SetMetadataArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = services
        .revisions
        .session(&args.session)
        .map_err(with_hint)?;

    let mut metadata = session
        .chunk_metadata
        .get(&args.chunk)
        .cloned()
        .unwrap_or_default();

    if let Some(content_type) = args.content_type {
        metadata.content_type = content_type;
    }
    if let Some(heading_path) = args.heading_path {
        metadata.heading_path = heading_path;
    }
    if let Some(note) = args.note {
        metadata.note = note;
    }
    if let Some(quality_flag) = args.quality_flag {
        metadata.quality_flag = quality_flag;
    }
    if let Some(custom) = args.custom {
        let fields: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&custom)
            .map_err(|e| format!("--custom must be a JSON object: {e}"))?;
        metadata.custom.extend(fields);
    }

    let metadata = services
        .revisions
        .set_chunk_metadata(&args.session, &args.chunk, metadata)
        .map_err(with_hint)?;

    let response = MetadataResponse {
        session_id: args.session,
        chunk_id: args.chunk,
        metadata,
    };

    print_output(&response, format, |r| {
        println!(
            "{} metadata for {} in session {}",
            colors::success("Updated"),
            colors::chunk_id(&r.chunk_id),
            colors::session_id(&r.session_id)
        );
    })?;

    Ok(())
}
