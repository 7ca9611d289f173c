//! Page map (blue boundary) construction.
//!
//! Each span starts at its page marker and runs to the next
//! marker or the end of the text, so consecutive spans tile the
//! canonical text from the first marker onward.

use std::collections::{BTreeSet, HashMap};

use crate::core::error::{PagesplitError, Result};
use crate::core::segment::hashing::hash_page;
use crate::core::segment::marker::marker_positions;
use crate::core::segment::text_index::char_len;
use crate::core::types::{PageSpan, RawPage};

/// Build the page map for `text`.
///
/// Every marker must correspond to exactly one entry in `pages`
/// and every page must have a marker; any mismatch fails with
/// [`PagesplitError::PageMapMismatch`].
pub fn build_page_map(text: &str, pages: &[RawPage], doc_id: &str) -> Result<Vec<PageSpan>> {
    if pages.is_empty() && text.is_empty() {
        return Ok(Vec::new());
    }

    let by_number: HashMap<u32, &RawPage> = pages.iter().map(|p| (p.page_no, p)).collect();
    let markers = marker_positions(text);
    let text_len = char_len(text);

    let mut seen = BTreeSet::new();
    let mut spans = Vec::with_capacity(markers.len());

    for (idx, marker) in markers.iter().enumerate() {
        let page = by_number.get(&marker.page_no).ok_or_else(|| {
            PagesplitError::PageMapMismatch(format!(
                "marker for page {} has no page entry",
                marker.page_no
            ))
        })?;

        if !seen.insert(marker.page_no) {
            return Err(PagesplitError::PageMapMismatch(format!(
                "page {} has more than one marker",
                marker.page_no
            )));
        }

        let end = markers.get(idx + 1).map_or(text_len, |next| next.start);

        spans.push(PageSpan {
            page_no: marker.page_no,
            start: marker.start,
            end,
            char_len: end.saturating_sub(marker.content_start),
            hash: hash_page(doc_id, marker.page_no, &page.text),
        });
    }

    if let Some(unmarked) = by_number.keys().find(|page_no| !seen.contains(*page_no)) {
        return Err(PagesplitError::PageMapMismatch(format!(
            "page {unmarked} has no marker in the text"
        )));
    }

    tracing::debug!(pages = spans.len(), text_len, "Built page map");

    Ok(spans)
}
