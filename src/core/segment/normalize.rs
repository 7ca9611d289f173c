//! Light text normalization for extracted pages.
//!
//! Only line endings and runs of blank lines are touched.
//! Intra-line whitespace is preserved so that tabular layout
//! produced by extractors survives.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::types::RawPage;

/// Four or more newlines, with whitespace-only lines in between
static EXCESS_BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n\s*\n(\s*\n)+").expect("blank line pattern is valid"));

/// Normalize one text.
///
/// - `\r\n` becomes `\n`
/// - runs of three or more blank lines collapse to two
pub fn normalize_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    EXCESS_BLANK_LINES.replace_all(&text, "\n\n\n").into_owned()
}

pub fn normalize_page(page: &RawPage) -> RawPage {
    RawPage {
        page_no: page.page_no,
        text: normalize_text(&page.text),
    }
}

pub fn normalize_pages(pages: &[RawPage]) -> Vec<RawPage> {
    pages.iter().map(normalize_page).collect()
}
