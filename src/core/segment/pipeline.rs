//! Segmentation pipeline orchestration.
//!
//! Coordinates the full recompute for a page list:
//! 1. Normalize page text (if the strategy asks for it)
//! 2. Encode pages into marker-delimited text
//! 3. Build the page map
//! 4. Assemble child chunks

use std::time::Instant;

use crate::core::error::Result;
use crate::core::segment::assembler::chunk_pages;
use crate::core::segment::marker::encode;
use crate::core::segment::normalize::normalize_pages;
use crate::core::segment::page_map::build_page_map;
use crate::core::types::{ChildChunk, ChunkStrategy, PageSpan, RawPage};

/// Output of one full segmentation run
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    /// Pages as stored (normalized if the strategy asked for it)
    pub pages: Vec<RawPage>,
    pub text: String,
    pub page_map: Vec<PageSpan>,
    pub chunks: Vec<ChildChunk>,
}

/// Run the pipeline over `pages`.
///
/// Deterministic: identical pages, strategy and doc ID always
/// produce an identical [`Segmentation`].
pub fn segment(pages: &[RawPage], strategy: &ChunkStrategy, doc_id: &str) -> Result<Segmentation> {
    let start = Instant::now();

    let pages = if strategy.normalize {
        normalize_pages(pages)
    } else {
        pages.to_vec()
    };

    let text = encode(&pages);
    let page_map = build_page_map(&text, &pages, doc_id)?;
    let chunks = chunk_pages(&text, &page_map, strategy, doc_id);

    tracing::debug!(
        "Segmented {} pages into {} chunks in {}us",
        page_map.len(),
        chunks.len(),
        start.elapsed().as_micros()
    );

    Ok(Segmentation {
        pages,
        text,
        page_map,
        chunks,
    })
}
