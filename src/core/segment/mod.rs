//! Document segmentation module.
//!
//! Turns a list of extracted pages into the canonical
//! marker-delimited text, its page map (blue boundaries) and its
//! child chunks (red boundaries). Key features:
//!
//! - Lossless page marker encoding with strict decoding
//! - Character-based offsets throughout
//! - Paragraph and heading aware chunk boundaries
//! - Content-addressed page and chunk hashes
//!
//! # Safety
//!
//! Slicing goes through [`text_index::CharIndex`], which maps
//! character offsets to byte offsets, so multi-byte text never
//! splits inside a character.

pub mod assembler;
pub mod boundary;
pub mod hashing;
pub mod marker;
pub mod normalize;
pub mod page_map;
pub mod pipeline;
pub mod text_index;

pub use assembler::chunk_pages;
pub use boundary::compute_windows;
pub use marker::{decode, encode};
pub use page_map::build_page_map;
pub use pipeline::{segment, Segmentation};
pub use text_index::CharIndex;
