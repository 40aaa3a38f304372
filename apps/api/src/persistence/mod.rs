//! Local persistence — a small synchronous key-value store standing in for
//! browser-local storage, plus the draft and theme adapters built on it.
//!
//! Every write replaces the whole value for a key. Draft volume is small and
//! single-device, so there is no incremental update path.

pub mod drafts;
pub mod file_store;
#[cfg(test)]
pub mod memory_store;
pub mod theme;

use std::sync::Arc;

use thiserror::Error;

pub use drafts::DraftShelf;
pub use file_store::FileStore;

/// Global key holding the theme preference.
pub const THEME_KEY: &str = "theme";

/// Per-user key holding that user's draft list (JSON array, newest first).
pub fn drafts_key(user_id: &str) -> String {
    format!("drafts_{user_id}")
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage directory unavailable: {0}")]
    Directory(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage task failed: {0}")]
    Task(String),
}

/// Whole-value key-value storage, namespaced by key string.
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Read-modify-write of one key, atomic with respect to other writers of
    /// the same store. `apply` receives the current value and returns the
    /// replacement, or `None` to leave the key untouched.
    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<String>) -> Result<Option<String>, StorageError>,
    ) -> Result<(), StorageError>;
}

/// Runs a store operation on the blocking pool so disk I/O never stalls the
/// async executor.
pub async fn run_blocking<T, F>(store: &Arc<dyn KeyValueStore>, op: F) -> Result<T, StorageError>
where
    T: Send + 'static,
    F: FnOnce(&dyn KeyValueStore) -> Result<T, StorageError> + Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
}
