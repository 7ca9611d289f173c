//! pagesplit - Page-aware document segmentation with revision control
//!
//! Turns extracted document pages into a single editable text with
//! page markers, splits each page into retrieval-sized chunks and
//! keeps every edit behind an optimistic version check.
//!
//! # Architecture
//!
//! - **core**: Domain logic
//!   - config, error, types, xdg
//!   - segment (marker codec, page map, chunk boundaries, hashing)
//!   - revision (versioned sessions)
//!   - storage (session files)
//!   - services (unified service container)
//!
//! - **cli**: Command-line adapter (depends on core)
//!
//! # Key Features
//!
//! - Lossless `<<<PAGE:N>>>` marker round-trip with strict validation
//! - Character-based offsets (never splits a multi-byte character)
//! - Paragraph and heading aware chunking inside page boundaries
//! - Content-addressed SHA-256 page and chunk hashes
//! - Stale edits rejected with a version conflict

// Core domain logic
pub mod core;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::error::{PagesplitError, Result};
pub use core::revision::RevisionController;
pub use core::services::Services;
pub use core::types::*;
