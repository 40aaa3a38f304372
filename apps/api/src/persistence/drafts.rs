//! Draft persistence — the in-memory draft list for one session and its
//! write-through path to the signed-in user's storage key.
//!
//! Invariant: after every operation the in-memory list equals the persisted
//! list of the currently signed-in user (or is empty when nobody is signed in).
//! Saves and deletes are applied to the stored list, not the cached one, so a
//! user signed in on several sessions never loses drafts written elsewhere.

use std::sync::Arc;

use tracing::{info, warn};

use super::{drafts_key, run_blocking, KeyValueStore, StorageError};
use crate::models::{Draft, User};

pub struct DraftShelf {
    store: Arc<dyn KeyValueStore>,
    drafts: Vec<Draft>,
}

impl DraftShelf {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            drafts: Vec::new(),
        }
    }

    /// Drafts, newest first.
    pub fn drafts(&self) -> &[Draft] {
        &self.drafts
    }

    pub fn find(&self, draft_id: &str) -> Option<&Draft> {
        self.drafts.iter().find(|d| d.id == draft_id)
    }

    /// Saves a new draft at the front of the user's list.
    ///
    /// Returns `Ok(None)` without touching storage when nobody is signed in or
    /// the letter is empty. Memory is only updated after the write succeeds.
    pub async fn save_draft(
        &mut self,
        user: Option<&User>,
        company_name: &str,
        cover_letter: &str,
    ) -> Result<Option<Draft>, StorageError> {
        let Some(user) = user else {
            return Ok(None);
        };
        if cover_letter.is_empty() {
            return Ok(None);
        }

        let draft = Draft::new(company_name, cover_letter);
        let key = drafts_key(&user.id);
        let new = draft.clone();

        self.drafts = run_blocking(&self.store, move |store| {
            let mut updated = Vec::new();
            store.update(&key, &mut |current| {
                let mut list = vec![new.clone()];
                list.extend(parse_drafts(&key, current.as_deref()));
                let json = serde_json::to_string(&list)?;
                updated = list;
                Ok(Some(json))
            })?;
            Ok(updated)
        })
        .await?;

        info!(
            "Saved draft {} ({}) for user {}",
            draft.id, draft.company_name, user.id
        );
        Ok(Some(draft))
    }

    /// Removes a draft by id. Returns whether anything was removed.
    ///
    /// No user or an unknown id is a silent no-op that writes nothing.
    pub async fn delete_draft(
        &mut self,
        user: Option<&User>,
        draft_id: &str,
    ) -> Result<bool, StorageError> {
        let Some(user) = user else {
            return Ok(false);
        };

        let key = drafts_key(&user.id);
        let id = draft_id.to_string();

        let (remaining, removed) = run_blocking(&self.store, move |store| {
            let mut remaining = Vec::new();
            let mut removed = false;
            store.update(&key, &mut |current| {
                let list = parse_drafts(&key, current.as_deref());
                let before = list.len();
                remaining = list.into_iter().filter(|d| d.id != id).collect();
                removed = remaining.len() != before;
                if !removed {
                    return Ok(None);
                }
                Ok(Some(serde_json::to_string(&remaining)?))
            })?;
            Ok((remaining, removed))
        })
        .await?;

        self.drafts = remaining;
        if removed {
            info!("Deleted draft {draft_id} for user {}", user.id);
        }
        Ok(removed)
    }

    /// Replaces the in-memory list with the user's persisted drafts, or
    /// clears it when `user` is `None`. Storage is never modified here.
    ///
    /// Absent, unreadable or malformed data loads as an empty list.
    pub async fn load_drafts_for_user(&mut self, user: Option<&User>) {
        let Some(user) = user else {
            self.clear();
            return;
        };

        let key = drafts_key(&user.id);
        let read_key = key.clone();
        self.drafts = match run_blocking(&self.store, move |store| store.get(&read_key)).await {
            Ok(raw) => parse_drafts(&key, raw.as_deref()),
            Err(e) => {
                warn!("Failed to read drafts under '{key}', starting empty: {e}");
                Vec::new()
            }
        };

        info!("Loaded {} drafts for user {}", self.drafts.len(), user.id);
    }

    /// Forgets the cached list. Storage is untouched.
    pub fn clear(&mut self) {
        self.drafts.clear();
    }
}

fn parse_drafts(key: &str, raw: Option<&str>) -> Vec<Draft> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Stored drafts under '{key}' are malformed, starting empty: {e}");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::thread::{self, ThreadId};

    use super::*;
    use crate::persistence::memory_store::MemoryStore;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            name: "Jane Doe".to_string(),
            image_url: None,
        }
    }

    fn shelf() -> (Arc<MemoryStore>, DraftShelf) {
        let store = Arc::new(MemoryStore::new());
        let shelf = DraftShelf::new(store.clone());
        (store, shelf)
    }

    fn persisted(store: &MemoryStore, user_id: &str) -> Vec<Draft> {
        serde_json::from_str(&store.raw(&drafts_key(user_id)).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_save_without_user_is_noop() {
        let (store, mut shelf) = shelf();
        let saved = shelf.save_draft(None, "Acme", "Dear Acme").await.unwrap();
        assert!(saved.is_none());
        assert!(shelf.drafts().is_empty());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_save_with_empty_letter_is_noop() {
        let (store, mut shelf) = shelf();
        let u = user("u1");
        let saved = shelf.save_draft(Some(&u), "Acme", "").await.unwrap();
        assert!(saved.is_none());
        assert!(shelf.drafts().is_empty());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_drafts_are_newest_first() {
        let (_store, mut shelf) = shelf();
        let u = user("u1");
        for name in ["A", "B", "C"] {
            shelf.save_draft(Some(&u), name, "letter").await.unwrap();
        }
        let names: Vec<&str> = shelf
            .drafts()
            .iter()
            .map(|d| d.company_name.as_str())
            .collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn test_reload_round_trips_order() {
        let (store, mut shelf) = shelf();
        let u = user("u1");
        for name in ["A", "B", "C", "D"] {
            shelf.save_draft(Some(&u), name, "letter").await.unwrap();
        }
        let before = shelf.drafts().to_vec();

        let mut reloaded = DraftShelf::new(store);
        reloaded.load_drafts_for_user(Some(&u)).await;
        assert_eq!(reloaded.drafts(), before.as_slice());
    }

    #[tokio::test]
    async fn test_delete_removes_and_persists() {
        let (store, mut shelf) = shelf();
        let u = user("u1");
        let a = shelf
            .save_draft(Some(&u), "A", "letter a")
            .await
            .unwrap()
            .unwrap();
        shelf.save_draft(Some(&u), "B", "letter b").await.unwrap();

        assert!(shelf.delete_draft(Some(&u), &a.id).await.unwrap());
        assert_eq!(shelf.drafts().len(), 1);
        assert_eq!(persisted(&store, "u1"), shelf.drafts());
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_silent_noop() {
        let (store, mut shelf) = shelf();
        let u = user("u1");
        shelf.save_draft(Some(&u), "A", "letter").await.unwrap();
        let writes = store.write_count();

        assert!(!shelf.delete_draft(Some(&u), "missing").await.unwrap());
        assert_eq!(shelf.drafts().len(), 1);
        assert_eq!(store.write_count(), writes);
    }

    #[tokio::test]
    async fn test_delete_without_user_is_noop() {
        let (_store, mut shelf) = shelf();
        let u = user("u1");
        let a = shelf
            .save_draft(Some(&u), "A", "letter")
            .await
            .unwrap()
            .unwrap();
        assert!(!shelf.delete_draft(None, &a.id).await.unwrap());
        assert_eq!(shelf.drafts().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_storage_loads_empty() {
        let (store, mut shelf) = shelf();
        store.seed(&drafts_key("u1"), "{not json");
        shelf.load_drafts_for_user(Some(&user("u1"))).await;
        assert!(shelf.drafts().is_empty());
    }

    #[tokio::test]
    async fn test_clearing_keeps_storage() {
        let (store, mut shelf) = shelf();
        let u = user("u1");
        shelf.save_draft(Some(&u), "A", "letter").await.unwrap();

        shelf.load_drafts_for_user(None).await;
        assert!(shelf.drafts().is_empty());
        assert!(store.raw(&drafts_key("u1")).is_some());

        shelf.load_drafts_for_user(Some(&u)).await;
        assert_eq!(shelf.drafts().len(), 1);
    }

    #[tokio::test]
    async fn test_users_are_namespaced() {
        let (store, mut shelf) = shelf();
        shelf
            .save_draft(Some(&user("u1")), "A", "letter")
            .await
            .unwrap();

        let mut other = DraftShelf::new(store);
        other.load_drafts_for_user(Some(&user("u2"))).await;
        assert!(other.drafts().is_empty());
    }

    #[tokio::test]
    async fn test_two_shelves_for_one_user_keep_each_others_drafts() {
        let store = Arc::new(MemoryStore::new());
        let u = user("u1");
        let mut first = DraftShelf::new(store.clone());
        let mut second = DraftShelf::new(store.clone());
        first.load_drafts_for_user(Some(&u)).await;
        second.load_drafts_for_user(Some(&u)).await;

        first.save_draft(Some(&u), "A", "letter a").await.unwrap();
        second.save_draft(Some(&u), "B", "letter b").await.unwrap();

        let names: Vec<String> = persisted(&store, "u1")
            .into_iter()
            .map(|d| d.company_name)
            .collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(second.drafts(), persisted(&store, "u1").as_slice());

        // A delete on the stale shelf still sees the other session's draft.
        let b_id = second.drafts()[0].id.clone();
        assert!(first.delete_draft(Some(&u), &b_id).await.unwrap());
        let remaining: Vec<String> = first.drafts().iter().map(|d| d.company_name.clone()).collect();
        assert_eq!(remaining, vec!["A"]);
    }

    /// Records which thread performed each write.
    #[derive(Default)]
    struct ThreadRecordingStore {
        inner: MemoryStore,
        writers: Mutex<Vec<ThreadId>>,
    }

    impl KeyValueStore for ThreadRecordingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.writers.lock().unwrap().push(thread::current().id());
            self.inner.set(key, value)
        }

        fn update(
            &self,
            key: &str,
            apply: &mut dyn FnMut(Option<String>) -> Result<Option<String>, StorageError>,
        ) -> Result<(), StorageError> {
            self.writers.lock().unwrap().push(thread::current().id());
            self.inner.update(key, apply)
        }
    }

    #[tokio::test]
    async fn test_writes_run_off_the_async_thread() {
        let store = Arc::new(ThreadRecordingStore::default());
        let mut shelf = DraftShelf::new(store.clone());
        let u = user("u1");

        shelf.save_draft(Some(&u), "A", "letter").await.unwrap();
        let id = shelf.drafts()[0].id.clone();
        shelf.delete_draft(Some(&u), &id).await.unwrap();

        let writers = store.writers.lock().unwrap().clone();
        assert_eq!(writers.len(), 2);
        assert!(writers.iter().all(|w| *w != thread::current().id()));
    }
}
