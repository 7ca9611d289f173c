//! Error types and error handling for pagesplit.
//!
//! This module defines the error types used throughout the
//! crate. Every error carries a stable machine-readable code
//! (see [`PagesplitError::code`]) so adapters can map failures
//! without matching on display strings.

use thiserror::Error;

/// Result type alias for pagesplit operations
pub type Result<T> = std::result::Result<T, PagesplitError>;

/// Structural reasons a marker-delimited text fails to decode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    #[error("expected 0 pages but text is not empty ({text_len} chars)")]
    UnexpectedContent { text_len: usize },

    #[error("no page markers found (expected {expected} pages)")]
    NoMarkers { expected: u32 },

    #[error("duplicate page markers: {0:?}")]
    DuplicateMarkers(Vec<u32>),

    #[error("missing page markers: {missing:?} (unexpected: {extra:?})")]
    MissingPages { missing: Vec<u32>, extra: Vec<u32> },

    #[error("unexpected page markers: {0:?}")]
    ExtraPages(Vec<u32>),

    #[error("page markers are not in sequential order at position {position}: {found_order:?}")]
    OutOfOrder {
        position: usize,
        found_order: Vec<u32>,
    },
}

/// Main error type for pagesplit
#[derive(Error, Debug)]
pub enum PagesplitError {
    #[error("Page marker validation failed: {0}")]
    PageMarkerInvalid(#[from] MarkerError),

    #[error("Version conflict: expected {expected}, but current version is {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("Page map mismatch: {0}")]
    PageMapMismatch(String),

    #[error("Invalid pages: {0}")]
    InvalidPages(String),

    #[error("Invalid chunk strategy: {0}")]
    InvalidStrategy(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session already exists: {0}")]
    SessionAlreadyExists(String),

    #[error("Chunk not found: {chunk_id} in session {session_id}")]
    ChunkNotFound {
        session_id: String,
        chunk_id: String,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl PagesplitError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Stable error code for adapters and logs
    pub fn code(&self) -> &'static str {
        match self {
            PagesplitError::PageMarkerInvalid(_) => "PAGE_MARKER_INVALID",
            PagesplitError::VersionConflict { .. } => "VERSION_CONFLICT",
            PagesplitError::PageMapMismatch(_) => "PAGE_MAP_MISMATCH",
            PagesplitError::InvalidPages(_) | PagesplitError::InvalidStrategy(_) => {
                "VALIDATION_ERROR"
            }
            PagesplitError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            PagesplitError::SessionAlreadyExists(_) => "SESSION_EXISTS",
            PagesplitError::ChunkNotFound { .. } => "CHUNK_NOT_FOUND",
            PagesplitError::ConfigError(_) | PagesplitError::TomlError(_) => "CONFIG_ERROR",
            PagesplitError::StorageError(_)
            | PagesplitError::IoError(_)
            | PagesplitError::SerdeError(_) => "STORAGE_ERROR",
        }
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PagesplitError::SessionNotFound(_) | PagesplitError::ChunkNotFound { .. }
        )
    }

    /// Check if this is a conflict error (stale version or duplicate session)
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            PagesplitError::VersionConflict { .. } | PagesplitError::SessionAlreadyExists(_)
        )
    }

    /// Check if this is a bad request error (invalid input)
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            PagesplitError::PageMarkerInvalid(_)
                | PagesplitError::InvalidPages(_)
                | PagesplitError::InvalidStrategy(_)
                | PagesplitError::ConfigError(_)
        )
    }
}
