//! Core data types for pagesplit.
//!
//! This module defines the domain model shared by the
//! segmentation pipeline, the revision controller, storage and
//! the CLI: pages, strategies, page spans, chunks, chunk
//! metadata, sessions and the revision responses.
//!
//! All offsets and lengths are measured in characters (Unicode
//! scalar values) into the session's canonical text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::core::error::{PagesplitError, Result};

/// A single extracted page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPage {
    /// 1-based page number
    pub page_no: u32,

    /// Extracted text content
    pub text: String,
}

impl RawPage {
    pub fn new(page_no: u32, text: impl Into<String>) -> Self {
        Self {
            page_no,
            text: text.into(),
        }
    }
}

/// Metadata about the extraction that produced the pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractMeta {
    pub extractor_name: String,
    pub extractor_version: String,

    /// Authoritative page count; edits are decoded against it
    pub page_count: u32,

    #[serde(default)]
    pub warnings: Vec<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ExtractMeta {
    pub fn new(
        extractor_name: impl Into<String>,
        extractor_version: impl Into<String>,
        page_count: u32,
    ) -> Self {
        Self {
            extractor_name: extractor_name.into(),
            extractor_version: extractor_version.into(),
            page_count,
            warnings: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// How page content is split into chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// Fixed-width character windows
    Chars,
    /// Windows snapped to newline runs
    #[default]
    Paragraph,
    /// Windows snapped to heading lines, falling back to newlines
    Heading,
}

impl SplitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitMode::Chars => "chars",
            SplitMode::Paragraph => "paragraph",
            SplitMode::Heading => "heading",
        }
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chars" => Ok(SplitMode::Chars),
            "paragraph" => Ok(SplitMode::Paragraph),
            "heading" => Ok(SplitMode::Heading),
            other => Err(format!(
                "unknown split mode '{other}' (expected chars, paragraph or heading)"
            )),
        }
    }
}

/// Chunking configuration for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkStrategy {
    /// Target chunk size in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    pub overlap: usize,

    pub split_mode: SplitMode,

    /// Normalize page text before encoding
    pub normalize: bool,
}

impl Default for ChunkStrategy {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            overlap: 100,
            split_mode: SplitMode::Paragraph,
            normalize: true,
        }
    }
}

impl ChunkStrategy {
    pub fn new(chunk_size: usize, overlap: usize, split_mode: SplitMode, normalize: bool) -> Self {
        Self {
            chunk_size,
            overlap,
            split_mode,
            normalize,
        }
    }

    /// Window advance between chunk starts, never zero
    pub fn step(&self) -> usize {
        self.chunk_size.saturating_sub(self.overlap).max(1)
    }

    /// Check the structural constraints every strategy must meet
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(PagesplitError::InvalidStrategy(
                "chunk_size must be non-zero".to_string(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(PagesplitError::InvalidStrategy(format!(
                "overlap ({}) must be less than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Offset span of one page in the canonical text (blue boundary)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpan {
    pub page_no: u32,

    /// Offset of the page marker
    pub start: usize,

    /// Offset of the next marker, or the text length
    pub end: usize,

    /// Content length, excluding the marker and its newline
    pub char_len: usize,

    pub hash: String,
}

/// Warnings attached to individual chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChunkWarning {
    /// Trimmed chunk text is shorter than the minimum useful length
    ChunkTooShort,
}

impl fmt::Display for ChunkWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkWarning::ChunkTooShort => f.write_str("CHUNK_TOO_SHORT"),
        }
    }
}

/// One retrieval unit inside a page (red boundary)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildChunk {
    /// `P###-C###`
    pub chunk_id: String,
    pub page_no: u32,
    pub start: usize,
    pub end: usize,
    pub char_len: usize,
    pub hash: String,
    #[serde(default)]
    pub warnings: Vec<ChunkWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Body,
    Table,
    Bullets,
    Caption,
    Other,
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "body" => Ok(ContentType::Body),
            "table" => Ok(ContentType::Table),
            "bullets" => Ok(ContentType::Bullets),
            "caption" => Ok(ContentType::Caption),
            "other" => Ok(ContentType::Other),
            other => Err(format!("unknown content type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityFlag {
    #[default]
    Good,
    Suspect,
    Broken,
}

impl FromStr for QualityFlag {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "good" => Ok(QualityFlag::Good),
            "suspect" => Ok(QualityFlag::Suspect),
            "broken" => Ok(QualityFlag::Broken),
            other => Err(format!("unknown quality flag '{other}'")),
        }
    }
}

/// Editable per-chunk annotation, keyed by chunk ID
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkMetadata {
    pub content_type: ContentType,
    pub heading_path: String,
    pub note: String,
    pub quality_flag: QualityFlag,
    pub custom: serde_json::Map<String, serde_json::Value>,
}

/// Editing session over one extracted document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub doc_id: String,
    pub extract_meta: ExtractMeta,

    /// Extracted pages; never modified after creation
    pub base_pages: Vec<RawPage>,

    pub current_pages: Vec<RawPage>,
    pub current_text: String,
    pub page_map: Vec<PageSpan>,
    pub chunk_strategy: ChunkStrategy,
    pub chunks: Vec<ChildChunk>,
    #[serde(default)]
    pub chunk_metadata: BTreeMap<String, ChunkMetadata>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Look up a chunk by ID
    pub fn chunk(&self, chunk_id: &str) -> Option<&ChildChunk> {
        self.chunks.iter().find(|c| c.chunk_id == chunk_id)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id.clone(),
            doc_id: self.doc_id.clone(),
            page_count: self.extract_meta.page_count,
            chunk_count: self.chunks.len(),
            version: self.version,
            split_mode: self.chunk_strategy.split_mode,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Lightweight listing entry for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub doc_id: String,
    pub page_count: u32,
    pub chunk_count: usize,
    pub version: u64,
    pub split_mode: SplitMode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a committed text edit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRevision {
    pub version: u64,
    pub current_text: String,
    pub page_map: Vec<PageSpan>,
    pub chunks: Vec<ChildChunk>,

    /// Metadata keys dropped because their chunk no longer exists
    #[serde(default)]
    pub orphaned_metadata: Vec<String>,
}

/// Result of a committed strategy change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyRevision {
    pub version: u64,
    pub chunk_strategy: ChunkStrategy,
    pub page_map: Vec<PageSpan>,
    pub chunks: Vec<ChildChunk>,
    #[serde(default)]
    pub orphaned_metadata: Vec<String>,
}

/// Everything known about a single chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkDetail {
    pub doc_id: String,
    pub session_id: String,
    pub chunk_id: String,
    pub page_no: u32,
    pub start: usize,
    pub end: usize,
    pub char_len: usize,
    pub text: String,
    pub extractor_version: String,
    pub chunk_strategy: ChunkStrategy,
    pub hash: String,
    pub warnings: Vec<ChunkWarning>,
    pub metadata: ChunkMetadata,
    pub version: u64,
}

/// Page input accepted when creating a session.
///
/// Either a bare JSON array of pages or a document object carrying
/// an optional doc ID and extraction metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DocumentInput {
    Pages(Vec<RawPage>),
    Document {
        #[serde(default)]
        doc_id: Option<String>,
        #[serde(default)]
        extract_meta: Option<ExtractMeta>,
        pages: Vec<RawPage>,
    },
}

impl DocumentInput {
    /// Parse page input from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Split into (doc_id, extract_meta, pages), filling in defaults
    pub fn into_parts(self) -> (Option<String>, ExtractMeta, Vec<RawPage>) {
        match self {
            DocumentInput::Pages(pages) => {
                let meta = ExtractMeta::new("external", "unknown", pages.len() as u32);
                (None, meta, pages)
            }
            DocumentInput::Document {
                doc_id,
                extract_meta,
                pages,
            } => {
                let meta = extract_meta
                    .unwrap_or_else(|| ExtractMeta::new("external", "unknown", pages.len() as u32));
                (doc_id, meta, pages)
            }
        }
    }
}
