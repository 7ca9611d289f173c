//! Content-addressed identity hashes for pages and chunks.
//!
//! The hash covers the document ID, the unit kind, the unit's
//! declared ID and its exact text, so re-committing unchanged
//! content yields the same identity downstream.

use sha2::{Digest, Sha256};
use std::fmt;

/// Kind of unit being hashed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashKind {
    Page,
    Chunk,
}

impl HashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashKind::Page => "page",
            HashKind::Chunk => "chunk",
        }
    }
}

impl fmt::Display for HashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase hex SHA-256 of `{doc_id}:{kind}:{id}:{text}`
pub fn identity_hash(doc_id: &str, kind: HashKind, id: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(doc_id.as_bytes());
    hasher.update(b":");
    hasher.update(kind.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(id.as_bytes());
    hasher.update(b":");
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn hash_page(doc_id: &str, page_no: u32, page_text: &str) -> String {
    identity_hash(doc_id, HashKind::Page, &page_no.to_string(), page_text)
}

pub fn hash_chunk(doc_id: &str, chunk_id: &str, chunk_text: &str) -> String {
    identity_hash(doc_id, HashKind::Chunk, chunk_id, chunk_text)
}
