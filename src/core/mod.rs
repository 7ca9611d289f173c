//! Core domain logic (adapter-agnostic)
//!
//! This module contains all logic that is independent of the
//! command-line surface.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Domain data structures
//! - **xdg**: XDG directory handling
//! - **segment**: Marker codec, page map and chunking pipeline
//! - **revision**: Versioned session edits
//! - **storage**: Session persistence
//! - **services**: Unified service container

pub mod config;
pub mod error;
pub mod revision;
pub mod segment;
pub mod services;
pub mod storage;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{PagesplitError, Result};
pub use revision::RevisionController;
pub use services::Services;
