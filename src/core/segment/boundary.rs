//! Chunk boundary detection within a single page.
//!
//! Computes local `(start, end)` character windows over one
//! page's content under the selected [`SplitMode`]:
//!
//! - **chars**: fixed windows of `chunk_size`, advanced by
//!   `chunk_size - overlap`
//! - **paragraph**: window ends snap to the nearest newline run
//!   within [`SNAP_TOLERANCE`] characters
//! - **heading**: like paragraph, but heading lines (numbered
//!   outlines, markdown `#`, short all-caps lines) are boundary
//!   candidates too
//!
//! All windows are measured in characters, never bytes, so
//! multi-byte text can not split a character.
//!
//! # Guarantees
//!
//! For non-empty content the windows start at 0, have strictly
//! increasing starts, never leave a gap (each start is at most
//! the previous end) and the last window ends at the content
//! length. Empty content yields no windows.
//!
//! # Example
//!
//! ```
//! use pagesplit::core::segment::boundary::compute_windows;
//! use pagesplit::core::types::{ChunkStrategy, SplitMode};
//!
//! let strategy = ChunkStrategy::new(10, 2, SplitMode::Chars, false);
//! let windows = compute_windows("0123456789ABCDEFGHIJ", &strategy);
//! assert_eq!(windows, vec![(0, 10), (8, 18), (16, 20)]);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::segment::text_index::CharIndex;
use crate::core::types::{ChunkStrategy, SplitMode};

/// Maximum distance (in characters) a window edge may move to
/// reach a boundary candidate
pub const SNAP_TOLERANCE: usize = 100;

/// Line starts that look like headings
static HEADING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^(?:\d+(?:\.\d+)*\.?\s|#{1,6}\s|[A-Z][A-Z \t]{1,50}$)",
    )
    .expect("heading pattern is valid")
});

/// Compute local chunk windows for one page's content.
pub fn compute_windows(content: &str, strategy: &ChunkStrategy) -> Vec<(usize, usize)> {
    let index = CharIndex::new(content);
    if index.is_empty() {
        return Vec::new();
    }

    match strategy.split_mode {
        SplitMode::Chars => fixed_windows(index.len(), strategy.chunk_size, strategy.step()),
        SplitMode::Paragraph => {
            let boundaries = paragraph_boundaries(&index);
            snapped_windows(index.len(), &boundaries, strategy)
        }
        SplitMode::Heading => {
            let boundaries = heading_boundaries(&index);
            snapped_windows(index.len(), &boundaries, strategy)
        }
    }
}

/// Fixed-width windows; the last one may be shorter.
fn fixed_windows(len: usize, chunk_size: usize, step: usize) -> Vec<(usize, usize)> {
    let mut windows = Vec::new();
    let mut pos = 0;

    while pos < len {
        let end = (pos + chunk_size).min(len);
        windows.push((pos, end));

        if end >= len {
            break;
        }
        pos += step;
    }

    windows
}

/// Windows whose edges snap to the nearest boundary candidate.
fn snapped_windows(
    len: usize,
    boundaries: &[usize],
    strategy: &ChunkStrategy,
) -> Vec<(usize, usize)> {
    let step = strategy.step();
    let mut windows = Vec::new();
    let mut pos = 0;

    while pos < len {
        let raw_end = (pos + strategy.chunk_size).min(len);
        let end = snap_to_boundary(raw_end, boundaries, pos + 1, len).unwrap_or(raw_end);
        windows.push((pos, end));

        if end >= len {
            break;
        }

        // Next start snaps into the overlap region (end - overlap, end]
        let tentative = pos + step;
        let overlap_floor = end.saturating_sub(strategy.overlap) + 1;
        let mut next = snap_to_boundary(tentative, boundaries, overlap_floor, end)
            .unwrap_or(tentative)
            .min(end);
        if next <= pos {
            next = (pos + step).min(end);
        }

        pos = next;
    }

    windows
}

/// Nearest candidate to `target` within `[lo, hi]` and within
/// [`SNAP_TOLERANCE`]. `boundaries` must be sorted ascending;
/// on equal distance the earlier candidate wins.
pub fn snap_to_boundary(target: usize, boundaries: &[usize], lo: usize, hi: usize) -> Option<usize> {
    let lo = lo.max(target.saturating_sub(SNAP_TOLERANCE));
    let hi = hi.min(target.saturating_add(SNAP_TOLERANCE));
    if lo > hi {
        return None;
    }

    let first = boundaries.partition_point(|&b| b < lo);
    let mut best: Option<(usize, usize)> = None;

    for &candidate in boundaries[first..].iter().take_while(|&&b| b <= hi) {
        let distance = candidate.abs_diff(target);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((candidate, distance)),
        }
    }

    best.map(|(candidate, _)| candidate)
}

/// Offsets just past every newline, sorted ascending.
pub fn paragraph_boundaries(index: &CharIndex<'_>) -> Vec<usize> {
    index
        .as_str()
        .chars()
        .enumerate()
        .filter(|(_, ch)| *ch == '\n')
        .map(|(pos, _)| pos + 1)
        .collect()
}

/// Heading line starts unioned with paragraph boundaries.
pub fn heading_boundaries(index: &CharIndex<'_>) -> Vec<usize> {
    let mut boundaries: Vec<usize> = HEADING_LINE
        .find_iter(index.as_str())
        .map(|m| index.char_offset(m.start()))
        .collect();

    boundaries.extend(paragraph_boundaries(index));
    boundaries.sort_unstable();
    boundaries.dedup();
    boundaries
}
