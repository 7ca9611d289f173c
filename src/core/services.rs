//! Unified service container for pagesplit
//!
//! Provides shared access to all core services.

use crate::core::config::Config;
use crate::core::revision::RevisionController;
use crate::core::storage::SessionStore;
use crate::core::types::ChunkStrategy;
use std::sync::Arc;

/// Unified services container
///
/// All adapters use this same struct for service access.
#[derive(Clone)]
pub struct Services {
    /// Session registry and revision control
    pub revisions: Arc<RevisionController>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    /// Create services from configuration, persisting under
    /// `config.storage.data_dir`
    pub fn new(config: Config) -> Self {
        let store = SessionStore::new(&config.storage.data_dir);
        let revisions = Arc::new(RevisionController::with_store(
            store,
            config.limits.clone(),
        ));

        Self {
            revisions,
            config: Arc::new(config),
        }
    }

    /// Services without persistence
    pub fn in_memory(config: Config) -> Self {
        Self {
            revisions: Arc::new(RevisionController::new(config.limits.clone())),
            config: Arc::new(config),
        }
    }

    /// Strategy applied to new sessions when none is given
    pub fn default_strategy(&self) -> ChunkStrategy {
        self.config.chunking.clone()
    }
}
