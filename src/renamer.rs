//! Renaming of persisted runs.
//!
//! A rename is a read-modify-write of a single record: the duplicate check
//! runs first and touches no storage, then the record is read and parsed, its
//! `pretty_name` replaced, and the whole record written back.
//!
//! Two renames of the same key race unless the renamer was built with
//! [`RunRenamer::serialized`]; without it the last write wins. A serialized
//! renamer takes an in-process mutex per key plus the store's record lock,
//! so with a [`FileStore`](crate::storage::FileStore) renames from separate
//! processes wait for each other too.

use crate::error::RenameError;
use crate::record::RunRecord;
use crate::storage::RecordStore;
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Outcome of a successful rename, handed back so the caller can update
/// whatever in-memory list it shows without re-reading storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renamed {
    pub file_key: String,
    pub previous_name: String,
    pub pretty_name: String,
}

pub struct RunRenamer<S> {
    store: S,
    locks: Option<KeyLocks>,
}

impl<S: RecordStore> RunRenamer<S> {
    pub fn new(store: S) -> Self {
        Self { store, locks: None }
    }

    /// A renamer that serializes renames targeting the same key.
    pub fn serialized(store: S) -> Self {
        Self {
            store,
            locks: Some(KeyLocks::default()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_serialized(&self) -> bool {
        self.locks.is_some()
    }

    /// Rename the run stored under `file_key` to `new_name`.
    ///
    /// `existing_names` holds the names of all other runs. Comparison is exact:
    /// no trimming, no case folding.
    pub fn rename(
        &self,
        new_name: &str,
        file_key: &str,
        existing_names: &HashSet<String>,
    ) -> Result<Renamed, RenameError> {
        if existing_names.contains(new_name) {
            warn!(file_key, new_name, "rename rejected: name already in use");
            return Err(RenameError::DuplicateName(new_name.to_string()));
        }

        let Some(locks) = &self.locks else {
            return self.rewrite_name(new_name, file_key);
        };

        let key_lock = locks.lock_for(file_key);
        let result = {
            let _guard = key_lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.rewrite_name_locked(new_name, file_key)
        };
        locks.release(file_key, key_lock);
        result
    }

    /// Holds the store's record lock, which other processes sharing the
    /// storage directory also take, around the read-modify-write.
    fn rewrite_name_locked(
        &self,
        new_name: &str,
        file_key: &str,
    ) -> Result<Renamed, RenameError> {
        let _record_lock = self
            .store
            .lock(file_key)
            .map_err(|source| RenameError::StorageUnavailable {
                key: file_key.to_string(),
                source,
            })?;
        self.rewrite_name(new_name, file_key)
    }

    fn rewrite_name(&self, new_name: &str, file_key: &str) -> Result<Renamed, RenameError> {
        let bytes = self
            .store
            .read(file_key)
            .map_err(|source| RenameError::StorageUnavailable {
                key: file_key.to_string(),
                source,
            })?;
        debug!(file_key, bytes = bytes.len(), "read run record");

        let mut record = RunRecord::parse(&bytes).map_err(|e| RenameError::MalformedRecord {
            key: file_key.to_string(),
            reason: e.to_string(),
        })?;

        let previous_name = record.set_pretty_name(new_name);
        let updated = record.to_json_bytes().map_err(|e| RenameError::WriteFailed {
            key: file_key.to_string(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;

        self.store
            .write(file_key, &updated)
            .map_err(|source| RenameError::WriteFailed {
                key: file_key.to_string(),
                source,
            })?;
        debug!(file_key, previous_name = %previous_name, new_name, "renamed run");

        Ok(Renamed {
            file_key: file_key.to_string(),
            previous_name,
            pretty_name: new_name.to_string(),
        })
    }

    /// Same as [`rename`](Self::rename), then calls `on_renamed(new_name, file_key)`
    /// once if the rename succeeded.
    pub fn rename_with<F>(
        &self,
        new_name: &str,
        file_key: &str,
        existing_names: &HashSet<String>,
        on_renamed: F,
    ) -> Result<Renamed, RenameError>
    where
        F: FnOnce(&str, &str),
    {
        let renamed = self.rename(new_name, file_key, existing_names)?;
        on_renamed(&renamed.pretty_name, &renamed.file_key);
        Ok(renamed)
    }
}

/// One mutex per file key, alive only while some rename of that key is in flight.
#[derive(Default)]
struct KeyLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(map.entry(key.to_string()).or_default())
    }

    /// Give back a handle from `lock_for`, dropping the entry once no other
    /// rename holds or waits on it. Handles are only cloned under the map
    /// mutex, so the count checked here cannot grow concurrently.
    fn release(&self, key: &str, lock: Arc<Mutex<()>>) {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        drop(lock);
        if map.get(key).is_some_and(|l| Arc::strong_count(l) == 1) {
            map.remove(key);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
