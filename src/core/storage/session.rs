//! File-backed session persistence.
//!
//! Each session is one pretty-printed JSON document. Writes go to
//! a temporary sibling first and are renamed into place, so a
//! crash mid-write leaves the previous revision intact.
//!
//! Processes sharing a data directory coordinate through an
//! advisory lock on `{sessions_dir}/.lock` (see [`SessionStore::lock`]).

use crate::core::error::{PagesplitError, Result};
use crate::core::types::Session;
use fs4::fs_std::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = ".lock";

/// Exclusive hold on a store's lock file, released on drop
#[derive(Debug)]
pub struct StoreLock {
    _file: File,
}

/// Session store rooted at `{data_dir}/sessions`
#[derive(Debug, Clone)]
pub struct SessionStore {
    /// Root directory for all session files
    sessions_dir: PathBuf,
}

impl SessionStore {
    /// Create a store under `data_dir`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            sessions_dir: data_dir.as_ref().join("sessions"),
        }
    }

    /// Directory holding the session files
    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    /// Block until this process holds the store's exclusive lock.
    ///
    /// Load, version check and save of a commit all happen under
    /// this lock, making the write a compare-and-swap across processes.
    pub fn lock(&self) -> Result<StoreLock> {
        fs::create_dir_all(&self.sessions_dir)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.sessions_dir.join(LOCK_FILE))?;
        file.lock_exclusive()?;
        Ok(StoreLock { _file: file })
    }

    /// Get session file path
    fn session_path(&self, session_id: &str) -> Result<PathBuf> {
        validate_session_id(session_id)?;
        Ok(self.sessions_dir.join(format!("{session_id}.json")))
    }

    /// Check if a session exists
    pub fn exists(&self, session_id: &str) -> bool {
        self.session_path(session_id)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Load a session
    pub fn load(&self, session_id: &str) -> Result<Session> {
        let path = self.session_path(session_id)?;

        if !path.is_file() {
            return Err(PagesplitError::SessionNotFound(session_id.to_string()));
        }

        let contents = fs::read_to_string(&path)?;
        let session: Session = serde_json::from_str(&contents)?;

        Ok(session)
    }

    /// Write a session, replacing any previous revision
    pub fn save(&self, session: &Session) -> Result<()> {
        let path = self.session_path(&session.session_id)?;
        fs::create_dir_all(&self.sessions_dir)?;

        let json = serde_json::to_string_pretty(session)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &path)?;

        tracing::debug!(
            "Saved session {} (version {}) to {:?}",
            session.session_id,
            session.version,
            path
        );

        Ok(())
    }

    /// Delete a session
    pub fn delete(&self, session_id: &str) -> Result<()> {
        let path = self.session_path(session_id)?;

        if !path.is_file() {
            return Err(PagesplitError::SessionNotFound(session_id.to_string()));
        }

        fs::remove_file(path)?;
        Ok(())
    }

    /// List all stored sessions, most recently updated first.
    ///
    /// Files that fail to parse are skipped with a warning.
    pub fn list(&self) -> Result<Vec<Session>> {
        if !self.sessions_dir.exists() {
            return Ok(Vec::new());
        }

        let mut sessions = Vec::new();

        for entry in fs::read_dir(&self.sessions_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let Some(session_id) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            match self.load(session_id) {
                Ok(session) => sessions.push(session),
                Err(e) => tracing::warn!("Skipping unreadable session file {:?}: {}", path, e),
            }
        }

        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }
}

/// Reject IDs that could escape the sessions directory
fn validate_session_id(session_id: &str) -> Result<()> {
    let valid = !session_id.is_empty()
        && session_id.len() <= 128
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !session_id.starts_with('.');

    if valid {
        Ok(())
    } else {
        Err(PagesplitError::StorageError(format!(
            "invalid session id '{session_id}'"
        )))
    }
}
