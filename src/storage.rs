//! Byte-oriented storage for run records, keyed by file key.
//!
//! `FileStore` keeps one `<key>.json` file per run inside a single directory.
//! By default that directory sits next to the running executable.

use crate::config::Config;
use crate::error::Result;
use std::env;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

const RECORD_EXTENSION: &str = "json";
const DEFAULT_RUNS_DIR: &str = "runs";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Whole-record storage keyed by a stable file key.
pub trait RecordStore {
    /// Read the full contents stored under `key`.
    fn read(&self, key: &str) -> io::Result<Vec<u8>>;

    /// Replace the full contents stored under `key`.
    fn write(&self, key: &str, bytes: &[u8]) -> io::Result<()>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> io::Result<Vec<String>>;

    /// Block until this caller holds the exclusive lock for `key`.
    ///
    /// Stores without a shared lock return `None`; callers then rely on their
    /// own in-process coordination.
    fn lock(&self, _key: &str) -> io::Result<Option<RecordLock>> {
        Ok(None)
    }
}

/// An exclusive advisory lock on a record, released on drop.
#[derive(Debug)]
pub struct RecordLock {
    file: File,
}

impl Drop for RecordLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    atomic_writes: bool,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            atomic_writes: true,
        }
    }

    /// `<directory of the running executable>/runs`
    pub fn adjacent_to_executable() -> Result<Self> {
        Ok(Self::new(default_storage_dir()?))
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let store = match &config.storage_dir {
            Some(dir) => Self::new(dir.clone()),
            None => Self::adjacent_to_executable()?,
        };
        Ok(store.atomic_writes(config.atomic_writes))
    }

    /// When enabled, writes go to a temporary sibling file that is then
    /// renamed over the record, so readers never observe a half-written file.
    pub fn atomic_writes(mut self, enabled: bool) -> Self {
        self.atomic_writes = enabled;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.{}", key, RECORD_EXTENSION)))
    }

    /// `.<key>.json.lock`, hidden so it never shows up in `keys()`.
    pub fn lock_path_for(&self, key: &str) -> io::Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!(".{}.{}.lock", key, RECORD_EXTENSION)))
    }

    /// Unique per write so concurrent writers never share a temp file.
    fn temp_path_for(&self, key: &str) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(
            ".{}.{}.{}-{}.tmp",
            key,
            RECORD_EXTENSION,
            process::id(),
            n
        ))
    }
}

impl RecordStore for FileStore {
    fn read(&self, key: &str) -> io::Result<Vec<u8>> {
        fs::read(self.path_for(key)?)
    }

    fn write(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        if !self.atomic_writes {
            return fs::write(&path, bytes);
        }

        let temp_path = self.temp_path_for(key);
        fs::write(&temp_path, bytes)?;
        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        Ok(())
    }

    /// Takes an OS file lock on the record's lock file, so every process
    /// sharing this directory is serialized. The lock file is left in place:
    /// removing it would let a waiter lock an unlinked inode.
    fn lock(&self, key: &str) -> io::Result<Option<RecordLock>> {
        let path = self.lock_path_for(key)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;
        file.lock()?;
        Ok(Some(RecordLock { file }))
    }

    fn keys(&self) -> io::Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() || !path.extension().is_some_and(|e| e == RECORD_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                // Hidden files are temp leftovers, never records
                if !stem.starts_with('.') {
                    keys.push(stem.to_string());
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

/// Get the default storage directory (`<exe dir>/runs`).
///
/// Does not create the directory.
pub fn default_storage_dir() -> Result<PathBuf> {
    let exe = env::current_exe()?;
    let parent = exe.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "executable path has no parent directory",
        )
    })?;
    Ok(parent.join(DEFAULT_RUNS_DIR))
}

/// Keys map straight onto file names, so anything that could escape the
/// storage directory is refused.
fn validate_key(key: &str) -> io::Result<()> {
    let invalid = key.is_empty()
        || key == "."
        || key == ".."
        || key.starts_with('.')
        || key.contains(['/', '\\', '\0']);
    if invalid {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid run key: {:?}", key),
        ));
    }
    Ok(())
}
