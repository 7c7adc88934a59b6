//! Read-side helpers over a [`RecordStore`]: listing records and collecting
//! the names a rename must not collide with.

use crate::error::{Result, RunlogError};
use crate::record::RunRecord;
use crate::storage::RecordStore;
use std::collections::HashSet;
use std::io;
use tracing::warn;

/// Load every parsable record in the store, in key order.
///
/// Records that cannot be read or parsed are skipped with a warning.
pub fn load_records<S: RecordStore + ?Sized>(store: &S) -> Result<Vec<(String, RunRecord)>> {
    let mut records = Vec::new();
    for key in store.keys()? {
        let bytes = match store.read(&key) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key = %key, error = %e, "skipping unreadable run record");
                continue;
            }
        };
        match RunRecord::parse(&bytes) {
            Ok(record) => records.push((key, record)),
            Err(e) => warn!(key = %key, error = %e, "skipping malformed run record"),
        }
    }
    Ok(records)
}

/// Load a single record by key.
pub fn load_record<S: RecordStore + ?Sized>(store: &S, key: &str) -> Result<RunRecord> {
    let bytes = store.read(key).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => RunlogError::RecordNotFound(key.to_string()),
        _ => RunlogError::Io(e),
    })?;
    RunRecord::parse(&bytes).map_err(|source| RunlogError::InvalidRecord {
        key: key.to_string(),
        source,
    })
}

/// Names of every run except `except_key`: the set a rename of `except_key`
/// must not collide with.
pub fn names_in_use<S: RecordStore + ?Sized>(
    store: &S,
    except_key: &str,
) -> Result<HashSet<String>> {
    Ok(load_records(store)?
        .into_iter()
        .filter(|(key, _)| key != except_key)
        .map(|(_, record)| record.pretty_name().to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{names, SpyStore};

    fn seeded() -> SpyStore {
        let spy = SpyStore::new();
        spy.insert("run_001", br#"{"pretty_name":"Run A"}"#.to_vec());
        spy.insert("run_002", br#"{"pretty_name":"Run B","duration_ms":9}"#.to_vec());
        spy.insert("run_003", b"corrupted".to_vec());
        spy
    }

    #[test]
    fn test_load_records_skips_malformed() {
        let records = load_records(&seeded()).unwrap();
        let keys: Vec<&str> = records.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["run_001", "run_002"]);
        assert_eq!(records[1].1.pretty_name(), "Run B");
    }

    #[test]
    fn test_names_in_use_excludes_target_key() {
        let spy = seeded();
        assert_eq!(names_in_use(&spy, "run_001").unwrap(), names(&["Run B"]));
        assert_eq!(
            names_in_use(&spy, "run_999").unwrap(),
            names(&["Run A", "Run B"])
        );
    }

    #[test]
    fn test_load_record_missing_is_record_not_found() {
        let err = load_record(&seeded(), "run_404").unwrap_err();
        assert!(matches!(err, RunlogError::RecordNotFound(ref k) if k == "run_404"));
    }

    #[test]
    fn test_load_record_corrupted_is_invalid_record() {
        let err = load_record(&seeded(), "run_003").unwrap_err();
        assert!(matches!(err, RunlogError::InvalidRecord { ref key, .. } if key == "run_003"));
    }
}
