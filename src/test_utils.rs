//! Test utilities shared across modules.
//!
//! `SpyStore` is an in-memory [`RecordStore`] that counts every read and
//! write, so tests can assert exactly how much I/O an operation performed.

use crate::storage::RecordStore;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct SpyStore {
    records: Mutex<BTreeMap<String, Vec<u8>>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl SpyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record without counting it as a write.
    pub fn insert(&self, key: &str, bytes: Vec<u8>) {
        self.records.lock().unwrap().insert(key.to_string(), bytes);
    }

    /// Peek at a record without counting it as a read.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.records.lock().unwrap().get(key).cloned()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl RecordStore for SpyStore {
    fn read(&self, key: &str) -> io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.get(key).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no record {}", key))
        })
    }

    fn write(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::other("disk full"));
        }
        self.insert(key, bytes.to_vec());
        Ok(())
    }

    fn keys(&self) -> io::Result<Vec<String>> {
        Ok(self.records.lock().unwrap().keys().cloned().collect())
    }
}

/// Build a name set from string literals.
pub fn names(list: &[&str]) -> HashSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spy_counts_reads_and_writes() {
        let spy = SpyStore::new();
        spy.insert("a", b"1".to_vec());

        assert_eq!(spy.read("a").unwrap(), b"1");
        assert!(spy.read("missing").is_err());
        spy.write("b", b"2").unwrap();

        assert_eq!(spy.reads(), 2);
        assert_eq!(spy.writes(), 1);
        assert_eq!(spy.keys().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_spy_failing_writes_leave_records_untouched() {
        let spy = SpyStore::new();
        spy.insert("a", b"1".to_vec());
        spy.fail_writes(true);

        assert!(spy.write("a", b"2").is_err());
        assert_eq!(spy.get("a").unwrap(), b"1");
        assert_eq!(spy.writes(), 1);
    }
}
