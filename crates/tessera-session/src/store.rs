//! The storage contract for session lists.
//!
//! The manager depends only on this trait, so backends (in-memory, key-value,
//! relational) can be swapped without touching the authentication logic.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::session::SessionList;

/// Persists, per session key, the ordered list of sessions for that key.
///
/// Each call is expected to be durable and atomic on its own. No atomicity
/// is assumed across a `read` followed by a `write`: the manager performs
/// unsynchronized read-modify-write cycles and concurrent writers for the
/// same key are last-writer-wins.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Load the list for `key`. Unknown keys yield an empty list.
    async fn read(&self, key: &str) -> Result<SessionList, StoreError>;

    /// Replace the whole list stored for `key`.
    async fn write(&self, key: &str, sessions: &SessionList) -> Result<(), StoreError>;

    /// Remove the list stored for `key`. Removing an unknown key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
