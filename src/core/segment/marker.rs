//! Page marker codec.
//!
//! Encodes a page list into one marker-delimited text and
//! decodes it back:
//!
//! ```text
//! <<<PAGE:1>>>
//! ...page 1 content...
//! <<<PAGE:2>>>
//! ...page 2 content...
//! ```
//!
//! Decoding validates the marker structure strictly; an edited
//! text that lost, duplicated or reordered a marker is rejected
//! with a [`MarkerError`] naming the problem.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::core::error::MarkerError;
use crate::core::types::RawPage;

pub static PAGE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<<<PAGE:(\d+)>>>").expect("page marker pattern is valid"));

/// Render the marker token for a page
pub fn marker_token(page_no: u32) -> String {
    format!("<<<PAGE:{page_no}>>>")
}

/// One marker found in a text. Offsets are in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerPosition {
    pub page_no: u32,

    /// Offset of the first `<`
    pub start: usize,

    /// Offset just past the closing `>>>`
    pub end: usize,

    /// `end`, plus one if a newline follows the marker
    pub content_start: usize,
}

/// Marker with byte offsets, used for slicing during decode
#[derive(Debug, Clone, Copy)]
struct ByteMarker {
    page_no: u32,
    start: usize,
    end: usize,
}

fn scan_bytes(text: &str) -> Vec<ByteMarker> {
    PAGE_MARKER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            // Numbers too large for a page number are not markers
            let page_no = caps.get(1)?.as_str().parse::<u32>().ok()?;
            Some(ByteMarker {
                page_no,
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Locate every marker in `text`, in position order.
pub fn marker_positions(text: &str) -> Vec<MarkerPosition> {
    let mut positions = Vec::new();
    let mut byte_cursor = 0;
    let mut char_cursor = 0;

    for marker in scan_bytes(text) {
        char_cursor += text[byte_cursor..marker.start].chars().count();
        let start = char_cursor;
        // Marker tokens are pure ASCII
        let end = start + (marker.end - marker.start);
        let content_start = if text[marker.end..].starts_with('\n') {
            end + 1
        } else {
            end
        };

        positions.push(MarkerPosition {
            page_no: marker.page_no,
            start,
            end,
            content_start,
        });

        byte_cursor = marker.end;
        char_cursor = end;
    }

    positions
}

/// Encode pages into marker-delimited text.
///
/// Pages are emitted in ascending `page_no` order regardless of
/// input order.
pub fn encode(pages: &[RawPage]) -> String {
    let mut ordered: Vec<&RawPage> = pages.iter().collect();
    ordered.sort_by_key(|p| p.page_no);

    let mut text = String::with_capacity(pages.iter().map(|p| p.text.len() + 16).sum());
    for (idx, page) in ordered.iter().enumerate() {
        if idx > 0 {
            text.push('\n');
        }
        text.push_str(&marker_token(page.page_no));
        text.push('\n');
        text.push_str(&page.text);
    }
    text
}

/// Decode marker-delimited text back into pages.
///
/// `expected_page_count` is the authoritative number of pages;
/// the markers found must be exactly `1..=expected_page_count`,
/// each once, in increasing order.
pub fn decode(text: &str, expected_page_count: u32) -> Result<Vec<RawPage>, MarkerError> {
    if expected_page_count == 0 {
        if !text.trim().is_empty() {
            return Err(MarkerError::UnexpectedContent {
                text_len: text.chars().count(),
            });
        }
        return Ok(Vec::new());
    }

    let markers = scan_bytes(text);
    if markers.is_empty() {
        return Err(MarkerError::NoMarkers {
            expected: expected_page_count,
        });
    }

    let found: Vec<u32> = markers.iter().map(|m| m.page_no).collect();

    let mut seen = BTreeSet::new();
    let duplicates: BTreeSet<u32> = found
        .iter()
        .copied()
        .filter(|page_no| !seen.insert(*page_no))
        .collect();
    if !duplicates.is_empty() {
        return Err(MarkerError::DuplicateMarkers(
            duplicates.into_iter().collect(),
        ));
    }

    let expected: BTreeSet<u32> = (1..=expected_page_count).collect();
    let missing: Vec<u32> = expected.difference(&seen).copied().collect();
    let extra: Vec<u32> = seen.difference(&expected).copied().collect();
    if !missing.is_empty() {
        return Err(MarkerError::MissingPages { missing, extra });
    }
    if !extra.is_empty() {
        return Err(MarkerError::ExtraPages(extra));
    }

    if let Some(position) = found.windows(2).position(|w| w[0] >= w[1]) {
        return Err(MarkerError::OutOfOrder {
            position,
            found_order: found,
        });
    }

    let mut pages = Vec::with_capacity(markers.len());
    for (idx, marker) in markers.iter().enumerate() {
        let mut content_start = marker.end;
        if text[content_start..].starts_with('\n') {
            content_start += 1;
        }

        let content_end = match markers.get(idx + 1) {
            Some(next) => {
                let mut end = next.start;
                if text[..end].ends_with('\n') {
                    end -= 1;
                }
                end.max(content_start)
            }
            None => text.len(),
        };

        pages.push(RawPage::new(
            marker.page_no,
            &text[content_start..content_end],
        ));
    }

    Ok(pages)
}
