use std::collections::HashMap;
use std::sync::Mutex;

use super::{KeyValueStore, StorageError};

/// In-memory store for tests. Counts writes so tests can assert storage was untouched.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    /// Seeds a raw value without counting it as a write.
    pub fn seed(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        *self.writes.lock().unwrap() += 1;
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<String>) -> Result<Option<String>, StorageError>,
    ) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap();
        if let Some(next) = apply(values.get(key).cloned())? {
            *self.writes.lock().unwrap() += 1;
            values.insert(key.to_string(), next);
        }
        Ok(())
    }
}
