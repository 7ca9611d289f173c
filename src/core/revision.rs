//! Versioned editing sessions.
//!
//! [`RevisionController`] owns every session and is the only way
//! to mutate one. Each mutating operation follows the same
//! optimistic protocol:
//!
//! 1. Take an `Arc<Session>` snapshot and check `expected_version`
//! 2. Run the segmentation pipeline without holding any lock
//! 3. Under the write lock, re-check the version, persist, and
//!    swap in the new snapshot
//!
//! With a [`SessionStore`] attached, the stored file is the source
//! of truth: step 3 also holds the store's file lock and re-reads
//! the session from disk, so writers in separate processes race
//! on the same version.
//!
//! A writer that loses the race gets
//! [`PagesplitError::VersionConflict`] and the session is left
//! exactly as the winner committed it. Readers holding an older
//! `Arc<Session>` keep a consistent pre-edit view.

use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::core::config::LimitsConfig;
use crate::core::error::{PagesplitError, Result};
use crate::core::segment::marker::{decode, PAGE_MARKER};
use crate::core::segment::{segment, CharIndex, Segmentation};
use crate::core::storage::SessionStore;
use crate::core::types::{
    ChildChunk, ChunkDetail, ChunkMetadata, ChunkStrategy, ExtractMeta, RawPage, Session,
    SessionSummary, StrategyRevision, TextRevision,
};

/// Version assigned to newly created sessions
pub const INITIAL_VERSION: u64 = 1;

/// Session registry with optimistic version control
pub struct RevisionController {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    store: Option<SessionStore>,
    limits: LimitsConfig,
}

impl RevisionController {
    /// In-memory controller; sessions are lost when it is dropped
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            store: None,
            limits,
        }
    }

    /// Controller that persists every commit to `store`
    pub fn with_store(store: SessionStore, limits: LimitsConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            store: Some(store),
            limits,
        }
    }

    /// Create a session at version 1.
    ///
    /// Pages may arrive in any order but must be numbered densely
    /// `1..=N`, with `N` equal to `extract_meta.page_count`.
    pub fn create_session(
        &self,
        doc_id: impl Into<String>,
        extract_meta: ExtractMeta,
        pages: Vec<RawPage>,
        strategy: ChunkStrategy,
    ) -> Result<Arc<Session>> {
        let doc_id = doc_id.into();
        self.limits.check_strategy(&strategy)?;
        let base_pages = self.validate_pages(pages, &extract_meta)?;

        let Segmentation {
            pages: current_pages,
            text,
            page_map,
            chunks,
        } = segment(&base_pages, &strategy, &doc_id)?;

        let now = Utc::now();
        let session = Session {
            session_id: Uuid::new_v4().to_string(),
            doc_id,
            extract_meta,
            base_pages,
            current_pages,
            current_text: text,
            page_map,
            chunk_strategy: strategy,
            chunks,
            chunk_metadata: BTreeMap::new(),
            version: INITIAL_VERSION,
            created_at: now,
            updated_at: now,
        };

        let mut sessions = self.write_sessions()?;
        if sessions.contains_key(&session.session_id) {
            return Err(PagesplitError::SessionAlreadyExists(
                session.session_id.clone(),
            ));
        }
        if let Some(store) = &self.store {
            store.save(&session)?;
        }

        tracing::info!(
            "Created session {} for '{}' ({} pages, {} chunks)",
            session.session_id,
            session.doc_id,
            session.page_map.len(),
            session.chunks.len()
        );

        let session = Arc::new(session);
        sessions.insert(session.session_id.clone(), Arc::clone(&session));
        Ok(session)
    }

    /// Current snapshot of a session.
    ///
    /// With a store attached the session is read from disk, since
    /// another process may have committed since it was cached.
    pub fn session(&self, session_id: &str) -> Result<Arc<Session>> {
        let Some(store) = &self.store else {
            return self
                .read_sessions()?
                .get(session_id)
                .cloned()
                .ok_or_else(|| PagesplitError::SessionNotFound(session_id.to_string()));
        };

        let stored = match store.load(session_id) {
            Ok(stored) => stored,
            Err(e) => {
                if matches!(e, PagesplitError::SessionNotFound(_)) {
                    self.write_sessions()?.remove(session_id);
                }
                return Err(e);
            }
        };

        let mut sessions = self.write_sessions()?;
        if let Some(cached) = sessions.get(session_id) {
            if **cached == stored || cached.version > stored.version {
                return Ok(Arc::clone(cached));
            }
        }

        let session = Arc::new(stored);
        sessions.insert(session_id.to_string(), Arc::clone(&session));
        Ok(session)
    }

    /// Replace the full marker-delimited text.
    ///
    /// The text must decode to exactly the session's extracted page
    /// count. On any failure the session is unchanged.
    pub fn replace_text(
        &self,
        session_id: &str,
        expected_version: u64,
        new_text: &str,
    ) -> Result<TextRevision> {
        let snapshot = self.session(session_id)?;
        check_version(&snapshot, expected_version)?;

        let pages = decode(new_text, snapshot.extract_meta.page_count)?;
        let result = segment(&pages, &snapshot.chunk_strategy, &snapshot.doc_id)?;

        self.commit(session_id, Some(expected_version), move |current| {
            let (metadata, orphaned) = retain_metadata(&current.chunk_metadata, &result.chunks);
            let mut next = current.clone();
            next.current_pages = result.pages;
            next.current_text = result.text;
            next.page_map = result.page_map;
            next.chunks = result.chunks;
            next.chunk_metadata = metadata;
            next.version += 1;
            next.updated_at = Utc::now();

            let revision = TextRevision {
                version: next.version,
                current_text: next.current_text.clone(),
                page_map: next.page_map.clone(),
                chunks: next.chunks.clone(),
                orphaned_metadata: orphaned,
            };
            Ok((next, revision))
        })
        .inspect(|revision| {
            tracing::info!(
                "Committed text edit to session {} (version {}, {} chunks)",
                session_id,
                revision.version,
                revision.chunks.len()
            );
            log_orphans(session_id, &revision.orphaned_metadata);
        })
    }

    /// Rebuild the session from its base pages under a new strategy.
    pub fn replace_strategy(
        &self,
        session_id: &str,
        expected_version: u64,
        strategy: ChunkStrategy,
    ) -> Result<StrategyRevision> {
        self.limits.check_strategy(&strategy)?;

        let snapshot = self.session(session_id)?;
        check_version(&snapshot, expected_version)?;

        let result = segment(&snapshot.base_pages, &strategy, &snapshot.doc_id)?;

        self.commit(session_id, Some(expected_version), move |current| {
            let (metadata, orphaned) = retain_metadata(&current.chunk_metadata, &result.chunks);
            let mut next = current.clone();
            next.current_pages = result.pages;
            next.current_text = result.text;
            next.page_map = result.page_map;
            next.chunks = result.chunks;
            next.chunk_strategy = strategy;
            next.chunk_metadata = metadata;
            next.version += 1;
            next.updated_at = Utc::now();

            let revision = StrategyRevision {
                version: next.version,
                chunk_strategy: next.chunk_strategy.clone(),
                page_map: next.page_map.clone(),
                chunks: next.chunks.clone(),
                orphaned_metadata: orphaned,
            };
            Ok((next, revision))
        })
        .inspect(|revision| {
            tracing::info!(
                "Committed strategy change to session {} (version {}, split mode {}, {} chunks)",
                session_id,
                revision.version,
                revision.chunk_strategy.split_mode,
                revision.chunks.len()
            );
            log_orphans(session_id, &revision.orphaned_metadata);
        })
    }

    /// Everything known about one chunk, including its exact text
    pub fn chunk_detail(&self, session_id: &str, chunk_id: &str) -> Result<ChunkDetail> {
        let session = self.session(session_id)?;
        let chunk = find_chunk(&session, chunk_id)?;
        let text = CharIndex::new(&session.current_text).slice(chunk.start, chunk.end);

        Ok(ChunkDetail {
            doc_id: session.doc_id.clone(),
            session_id: session.session_id.clone(),
            chunk_id: chunk.chunk_id.clone(),
            page_no: chunk.page_no,
            start: chunk.start,
            end: chunk.end,
            char_len: chunk.char_len,
            text: text.to_string(),
            extractor_version: session.extract_meta.extractor_version.clone(),
            chunk_strategy: session.chunk_strategy.clone(),
            hash: chunk.hash.clone(),
            warnings: chunk.warnings.clone(),
            metadata: session
                .chunk_metadata
                .get(chunk_id)
                .cloned()
                .unwrap_or_default(),
            version: session.version,
        })
    }

    /// Attach metadata to an existing chunk. Does not change the version.
    pub fn set_chunk_metadata(
        &self,
        session_id: &str,
        chunk_id: &str,
        metadata: ChunkMetadata,
    ) -> Result<ChunkMetadata> {
        self.commit(session_id, None, |current| {
            find_chunk(current, chunk_id)?;

            let mut next = current.clone();
            next.chunk_metadata
                .insert(chunk_id.to_string(), metadata.clone());
            next.updated_at = Utc::now();
            Ok((next, metadata))
        })
        .inspect(|_| tracing::debug!("Updated metadata for {} in session {}", chunk_id, session_id))
    }

    /// Summaries of all sessions, most recently updated first
    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        if let Some(store) = &self.store {
            return Ok(store.list()?.iter().map(Session::summary).collect());
        }

        let mut summaries: Vec<SessionSummary> = self
            .read_sessions()?
            .values()
            .map(|session| session.summary())
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    /// Remove a session from memory and from the store
    pub fn delete_session(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.write_sessions()?;
        let mut removed = sessions.remove(session_id).is_some();

        if let Some(store) = &self.store {
            let _lock = store.lock()?;
            if store.exists(session_id) {
                store.delete(session_id)?;
                removed = true;
            }
        }

        if !removed {
            return Err(PagesplitError::SessionNotFound(session_id.to_string()));
        }

        tracing::info!("Deleted session {}", session_id);
        Ok(())
    }

    /// Apply `apply` to the current session under the write lock.
    ///
    /// With a store, the current session is the one on disk, read
    /// while holding the store lock. With `expected_version` set, the
    /// version is re-checked first, so a writer that lost a race never
    /// overwrites the winner.
    fn commit<T>(
        &self,
        session_id: &str,
        expected_version: Option<u64>,
        apply: impl FnOnce(&Session) -> Result<(Session, T)>,
    ) -> Result<T> {
        let mut sessions = self.write_sessions()?;
        let _lock = self.store.as_ref().map(SessionStore::lock).transpose()?;

        let current = match &self.store {
            Some(store) => match store.load(session_id) {
                Ok(stored) => Arc::new(stored),
                Err(e) => {
                    if matches!(e, PagesplitError::SessionNotFound(_)) {
                        sessions.remove(session_id);
                    }
                    return Err(e);
                }
            },
            None => sessions
                .get(session_id)
                .cloned()
                .ok_or_else(|| PagesplitError::SessionNotFound(session_id.to_string()))?,
        };

        if let Some(expected) = expected_version {
            check_version(&current, expected)?;
        }

        let (next, output) = apply(current.as_ref())?;
        if let Some(store) = &self.store {
            store.save(&next)?;
        }

        sessions.insert(session_id.to_string(), Arc::new(next));
        Ok(output)
    }

    /// Check page numbering and content, returning pages sorted by number
    fn validate_pages(&self, mut pages: Vec<RawPage>, meta: &ExtractMeta) -> Result<Vec<RawPage>> {
        if pages.len() != meta.page_count as usize {
            return Err(PagesplitError::InvalidPages(format!(
                "declared page count {} does not match {} supplied pages",
                meta.page_count,
                pages.len()
            )));
        }

        if pages.len() > self.limits.max_pages {
            return Err(PagesplitError::InvalidPages(format!(
                "{} pages exceeds the maximum of {}",
                pages.len(),
                self.limits.max_pages
            )));
        }

        pages.sort_by_key(|p| p.page_no);
        for (idx, page) in pages.iter().enumerate() {
            let expected = idx as u32 + 1;
            if page.page_no != expected {
                return Err(PagesplitError::InvalidPages(format!(
                    "page numbers must be unique and run 1..={} (found {} where {} was expected)",
                    pages.len(),
                    page.page_no,
                    expected
                )));
            }
            if PAGE_MARKER.is_match(&page.text) {
                return Err(PagesplitError::InvalidPages(format!(
                    "page {} contains a page marker token",
                    page.page_no
                )));
            }
        }

        Ok(pages)
    }

    fn read_sessions(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Arc<Session>>>> {
        self.sessions
            .read()
            .map_err(|_| PagesplitError::StorageError("session registry lock poisoned".to_string()))
    }

    fn write_sessions(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Arc<Session>>>> {
        self.sessions
            .write()
            .map_err(|_| PagesplitError::StorageError("session registry lock poisoned".to_string()))
    }
}

fn check_version(session: &Session, expected: u64) -> Result<()> {
    if session.version != expected {
        tracing::warn!(
            "Version conflict on session {}: expected {}, current {}",
            session.session_id,
            expected,
            session.version
        );
        return Err(PagesplitError::VersionConflict {
            expected,
            actual: session.version,
        });
    }
    Ok(())
}

fn find_chunk<'a>(session: &'a Session, chunk_id: &str) -> Result<&'a ChildChunk> {
    session
        .chunk(chunk_id)
        .ok_or_else(|| PagesplitError::ChunkNotFound {
            session_id: session.session_id.clone(),
            chunk_id: chunk_id.to_string(),
        })
}

/// Keep metadata whose chunk still exists; return the dropped IDs
fn retain_metadata(
    metadata: &BTreeMap<String, ChunkMetadata>,
    chunks: &[ChildChunk],
) -> (BTreeMap<String, ChunkMetadata>, Vec<String>) {
    let live: BTreeSet<&str> = chunks.iter().map(|c| c.chunk_id.as_str()).collect();
    let mut kept = BTreeMap::new();
    let mut orphaned = Vec::new();

    for (chunk_id, meta) in metadata {
        if live.contains(chunk_id.as_str()) {
            kept.insert(chunk_id.clone(), meta.clone());
        } else {
            orphaned.push(chunk_id.clone());
        }
    }

    (kept, orphaned)
}

fn log_orphans(session_id: &str, orphaned: &[String]) {
    if !orphaned.is_empty() {
        tracing::warn!(
            "Dropped metadata for {} chunks no longer present in session {}: {:?}",
            orphaned.len(),
            session_id,
            orphaned
        );
    }
}
