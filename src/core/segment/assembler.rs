//! Child chunk assembly.
//!
//! Runs the boundary engine over each page's content and turns the
//! local windows into globally addressed [`ChildChunk`]s with
//! stable IDs and identity hashes.

use crate::core::segment::boundary::compute_windows;
use crate::core::segment::hashing::hash_chunk;
use crate::core::segment::marker::marker_positions;
use crate::core::segment::text_index::CharIndex;
use crate::core::types::{ChildChunk, ChunkStrategy, ChunkWarning, PageSpan};

/// Trimmed length below which a chunk is flagged as too short
pub const MIN_CHUNK_CHARS: usize = 10;

/// Chunk ID for the `chunk_no`-th chunk (1-based) on a page
pub fn chunk_id(page_no: u32, chunk_no: usize) -> String {
    format!("P{page_no:03}-C{chunk_no:03}")
}

/// Produce all child chunks for `text` under `strategy`.
///
/// Chunks are ordered by page, then by start offset. A page whose
/// content is empty contributes no chunks. Chunks never cross a
/// page boundary and never include marker characters.
pub fn chunk_pages(
    text: &str,
    page_map: &[PageSpan],
    strategy: &ChunkStrategy,
    doc_id: &str,
) -> Vec<ChildChunk> {
    let index = CharIndex::new(text);
    let markers = marker_positions(text);
    let mut chunks = Vec::new();

    for span in page_map {
        let content_start = markers
            .iter()
            .find(|m| m.start == span.start)
            .map_or(span.start, |m| m.content_start)
            .min(span.end);

        let content = index.slice(content_start, span.end);
        let page_index = CharIndex::new(content);

        for (chunk_no, (local_start, local_end)) in
            compute_windows(content, strategy).into_iter().enumerate()
        {
            let id = chunk_id(span.page_no, chunk_no + 1);
            let chunk_text = page_index.slice(local_start, local_end);

            let mut warnings = Vec::new();
            if chunk_text.trim().chars().count() < MIN_CHUNK_CHARS {
                warnings.push(ChunkWarning::ChunkTooShort);
            }

            chunks.push(ChildChunk {
                hash: hash_chunk(doc_id, &id, chunk_text),
                chunk_id: id,
                page_no: span.page_no,
                start: content_start + local_start,
                end: content_start + local_end,
                char_len: local_end - local_start,
                warnings,
            });
        }
    }

    tracing::debug!(
        chunks = chunks.len(),
        pages = page_map.len(),
        split_mode = %strategy.split_mode,
        "Assembled chunks"
    );

    chunks
}
