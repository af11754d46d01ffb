//! The incremental handler's content-fingerprint baseline (spec §4.5):
//! records, per UINFO, what an artifact record looked like as of the most
//! recently computed chunk, so the next run can diff against it.
//!
//! This is bookkeeping private to the incremental handler, distinct from
//! the descriptor properties file (spec §6) that clients actually read.

use idx_core::IndexingContext;
use idx_model::Record;
use idx_util::errors::IndexerError;
use idx_util::fs::atomic_write;
use idx_util::hash::sha1_bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const BASELINE_FILENAME: &str = "incremental-baseline.json";

/// `uinfo -> content fingerprint`, as of the last chunk computed from
/// this baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    pub fingerprints: BTreeMap<String, String>,
}

impl Baseline {
    /// A stable content fingerprint for a record: SHA-1 over its fields
    /// sorted by name, so field insertion order never registers as a
    /// change.
    pub fn fingerprint(record: &Record) -> String {
        let mut fields: Vec<_> = record.fields().iter().collect();
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        let mut buf = String::new();
        for field in fields {
            buf.push_str(&field.name);
            buf.push('=');
            buf.push_str(&field.value);
            buf.push(';');
        }
        sha1_bytes(buf.as_bytes())
    }

    /// Read the baseline from `dir`, or an empty one if it has never been
    /// written (first publication, or just after a chain reset).
    pub fn load(dir: &Path) -> Result<Self, IndexerError> {
        let path = dir.join(BASELINE_FILENAME);
        match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| IndexerError::IndexCorruption {
                message: format!("malformed incremental baseline at {}: {e}", path.display()),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn write_to(&self, dir: &Path) -> Result<(), IndexerError> {
        let path = dir.join(BASELINE_FILENAME);
        let text = serde_json::to_string(self).map_err(|e| IndexerError::Generic {
            message: format!("failed to serialize incremental baseline: {e}"),
        })?;
        atomic_write(&path, text.as_bytes())?;
        Ok(())
    }

    /// Build a baseline from a context's current live records directly,
    /// bypassing a diff. Used to (re)seed the baseline on a cycle that
    /// didn't compute an incremental chunk, so the next cycle that does
    /// request one still diffs against an accurate prior state.
    pub fn from_live_records(context: &IndexingContext) -> Result<Self, IndexerError> {
        let mut baseline = Self::default();
        for record in context.live_records()? {
            if let Some(uinfo) = record.uinfo() {
                baseline
                    .fingerprints
                    .insert(uinfo.to_string(), Self::fingerprint(&record));
            }
        }
        Ok(baseline)
    }

    /// Remove a persisted baseline, if any (used on a chain reset so a
    /// stale baseline never survives into the new chain).
    pub fn reset(dir: &Path) -> Result<(), IndexerError> {
        let path = dir.join(BASELINE_FILENAME);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idx_model::record::FieldFlags;
    use tempfile::TempDir;

    #[test]
    fn fingerprint_is_stable_under_field_reordering() {
        let mut a = Record::new();
        a.set("uinfo", "org.ex|a|1.0|NA|jar", FieldFlags::STORED_INDEXED);
        a.set("fileSize", "4", FieldFlags::STORED_ONLY);

        let mut b = Record::new();
        b.set("fileSize", "4", FieldFlags::STORED_ONLY);
        b.set("uinfo", "org.ex|a|1.0|NA|jar", FieldFlags::STORED_INDEXED);

        assert_eq!(Baseline::fingerprint(&a), Baseline::fingerprint(&b));
    }

    #[test]
    fn fingerprint_changes_with_value() {
        let mut a = Record::new();
        a.set("fileSize", "4", FieldFlags::STORED_ONLY);
        let mut b = Record::new();
        b.set("fileSize", "5", FieldFlags::STORED_ONLY);
        assert_ne!(Baseline::fingerprint(&a), Baseline::fingerprint(&b));
    }

    #[test]
    fn load_missing_file_returns_empty_baseline() {
        let dir = TempDir::new().unwrap();
        let baseline = Baseline::load(dir.path()).unwrap();
        assert!(baseline.fingerprints.is_empty());
    }

    #[test]
    fn round_trips_through_json() {
        let dir = TempDir::new().unwrap();
        let mut baseline = Baseline::default();
        baseline
            .fingerprints
            .insert("org.ex|a|1.0|NA|jar".to_string(), "abc123".to_string());
        baseline.write_to(dir.path()).unwrap();

        let read_back = Baseline::load(dir.path()).unwrap();
        assert_eq!(read_back, baseline);
    }

    #[test]
    fn reset_removes_file_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        Baseline::default().write_to(dir.path()).unwrap();
        Baseline::reset(dir.path()).unwrap();
        assert!(!dir.path().join(BASELINE_FILENAME).exists());
        Baseline::reset(dir.path()).unwrap(); // missing file is not an error
    }
}
