use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tempfile::NamedTempFile;
use tracing::debug;

use super::{KeyValueStore, StorageError};

/// File-backed store: one file per key under a data directory.
///
/// Writes go to a temp file in the same directory which is then persisted
/// over the target, so a reader never observes a half-written value.
/// Writers within the process are serialised by `write_lock`.
pub struct FileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens (and creates if missing) the data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        ensure_dir(&self.dir)?;

        let target = self.path_for(key);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| StorageError::Io(e.error))?;

        debug!("Wrote {} bytes to {:?}", value.len(), target);
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.read(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock_writes();
        self.write(key, value)
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<String>) -> Result<Option<String>, StorageError>,
    ) -> Result<(), StorageError> {
        let _guard = self.lock_writes();
        match apply(self.read(key)?)? {
            Some(next) => self.write(key, &next),
            None => Ok(()),
        }
    }
}

fn ensure_dir(dir: &Path) -> Result<(), StorageError> {
    if dir.exists() {
        if !dir.is_dir() {
            return Err(StorageError::Directory(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| StorageError::Directory(e.to_string()))
}

/// Maps a key onto a file stem. `[A-Za-z0-9-]` pass through; every other byte,
/// `_` included, becomes `_XX` (uppercase hex). Distinct keys never share a file.
fn encode_key(key: &str) -> String {
    if key.is_empty() {
        return "_".to_string();
    }
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' {
            out.push(b as char);
        } else {
            out.push_str(&format!("_{b:02X}"));
        }
    }
    out
}
