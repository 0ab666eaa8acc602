//! In-memory reference store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use crate::error::StoreError;
use crate::session::SessionList;
use crate::store::SessionStore;

/// A [`SessionStore`] backed by a process-local map.
///
/// Every call is atomic; read-then-write pairs are not. Useful for tests and
/// single-process deployments. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    lists: Arc<RwLock<HashMap<String, SessionList>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys with a stored list.
    pub async fn len(&self) -> usize {
        self.lists.read().await.len()
    }

    /// Whether no key has a stored list.
    pub async fn is_empty(&self) -> bool {
        self.lists.read().await.is_empty()
    }

    /// Whether a list is stored for `key`, expired sessions included.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.lists.read().await.contains_key(key)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<SessionList, StoreError> {
        let lists = self.lists.read().await;
        Ok(lists.get(key).cloned().unwrap_or_default())
    }

    async fn write(&self, key: &str, sessions: &SessionList) -> Result<(), StoreError> {
        trace!(key, count = sessions.len(), "Writing session list");
        let mut lists = self.lists.write().await;
        lists.insert(key.to_string(), sessions.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        trace!(key, "Deleting session list");
        let mut lists = self.lists.write().await;
        lists.remove(key);
        Ok(())
    }
}
