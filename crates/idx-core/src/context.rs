//! The durable indexing context (spec §4.3): a tantivy-backed document
//! store with upsert-by-UINFO semantics, atomic timestamp publication,
//! and a single-writer/many-readers concurrency contract (spec §5).

use crate::lock::WriteLock;
use crate::schema::IndexSchema;
use idx_contrib::{ArtifactContext, ContributorRegistry};
use idx_model::record::{FieldFlags, FIELD_LAST_MODIFIED, FIELD_UINFO};
use idx_model::{Coordinate, Record};
use idx_util::errors::IndexerError;
use idx_util::fs::{atomic_write, ensure_dir};
use std::path::{Path, PathBuf};
use tantivy::directory::MmapDirectory;
use tantivy::schema::Value;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, TantivyDocument, Term};

/// Name of the sidecar file carrying the context's last commit timestamp,
/// written atomically alongside every commit (spec §4.3).
const TIMESTAMP_FILE: &str = "index.timestamp";

const WRITER_BUFFER_BYTES: usize = 50_000_000;

/// The durable indexing context. Owns the single writer for its directory
/// (guarded by [`WriteLock`]) and an [`IndexReader`] kept current by
/// `commit`.
pub struct IndexingContext {
    id: String,
    dir: PathBuf,
    schema: IndexSchema,
    index: Index,
    writer: IndexWriter,
    reader: IndexReader,
    contributors: ContributorRegistry,
    _lock: WriteLock,
}

impl IndexingContext {
    /// Open an existing index at `dir`, or create one if absent (spec §4.3
    /// `open_or_create`). Acquires the directory's exclusive write lock;
    /// fails with [`IndexerError::LockObtainFailed`] if another writer
    /// already holds it.
    pub fn open_or_create(
        dir: &Path,
        id: impl Into<String>,
        contributors: ContributorRegistry,
    ) -> Result<Self, IndexerError> {
        ensure_dir(dir)?;
        let lock = WriteLock::acquire(dir)?;

        let schema = IndexSchema::build();
        let mmap_dir = MmapDirectory::open(dir).map_err(|e| IndexerError::IndexCorruption {
            message: format!("cannot open index directory {}: {e}", dir.display()),
        })?;
        let index = Index::open_or_create(mmap_dir, schema.schema.clone()).map_err(|e| {
            IndexerError::IndexCorruption {
                message: format!("cannot open or create index: {e}"),
            }
        })?;

        let writer = index
            .writer(WRITER_BUFFER_BYTES)
            .map_err(|e| IndexerError::Generic {
                message: format!("cannot open index writer: {e}"),
            })?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| IndexerError::Generic {
                message: format!("cannot build index reader: {e}"),
            })?;

        Ok(Self {
            id: id.into(),
            dir: dir.to_path_buf(),
            schema,
            index,
            writer,
            reader,
            contributors,
            _lock: lock,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// The ordered contributor set this context was opened with (spec §4.3
    /// `getIndexCreators`).
    pub fn index_creators(&self) -> &ContributorRegistry {
        &self.contributors
    }

    /// Upsert by UINFO: delete any prior document sharing this artifact's
    /// UINFO, then add the freshly-built one (spec §4.3 `addArtifact`).
    /// The record is built from this context's own contributor set so
    /// that every document in the index reflects the same field set,
    /// regardless of which listener drove the scan.
    pub fn add_artifact(&mut self, ctx: &ArtifactContext) -> Result<(), IndexerError> {
        let mut record = Record::new();
        self.contributors.update_document_all(ctx, &mut record);
        self.add_record(record)
    }

    /// Upsert an already-built record by its `uinfo` field (spec §4.3
    /// `addArtifact`, generalized to accept a prebuilt record so the
    /// legacy archive writer can reuse the same upsert path with a
    /// different contributor subset).
    pub fn add_record(&mut self, record: Record) -> Result<(), IndexerError> {
        let uinfo = record
            .uinfo()
            .ok_or_else(|| IndexerError::Generic {
                message: "record has no uinfo field".to_string(),
            })?
            .to_string();

        self.writer.delete_term(Term::from_field_text(self.schema.uinfo_raw, &uinfo));

        let mut doc = TantivyDocument::new();
        for field in record.fields() {
            let Some(tantivy_field) = self.schema.field(&field.name) else {
                continue;
            };
            doc.add_text(tantivy_field, &field.value);
        }
        doc.add_text(self.schema.uinfo_raw, &uinfo);
        if let Some(last_modified) = record.last_modified() {
            doc.add_u64(self.schema.last_modified_fast, last_modified.max(0) as u64);
        }

        self.writer.add_document(doc).map_err(|e| IndexerError::Generic {
            message: format!("failed to add document: {e}"),
        })?;
        Ok(())
    }

    /// Delete by exact UINFO (spec §4.3 `deleteArtifact`).
    pub fn delete_artifact(&mut self, coordinate: &Coordinate) -> Result<(), IndexerError> {
        let uinfo = coordinate.uinfo();
        self.writer.delete_term(Term::from_field_text(self.schema.uinfo_raw, &uinfo));
        Ok(())
    }

    /// Flush pending writes, reload the reader, and atomically advance the
    /// timestamp file to the wall-clock time at commit start (spec §4.3).
    pub fn commit(&mut self, now_millis: i64) -> Result<(), IndexerError> {
        self.writer.commit().map_err(|e| IndexerError::IoFailure {
            message: format!("commit failed: {e}"),
        })?;
        self.reader.reload().map_err(|e| IndexerError::Generic {
            message: format!("reader reload failed: {e}"),
        })?;
        atomic_write(&self.timestamp_path(), now_millis.to_string().as_bytes())?;
        Ok(())
    }

    pub fn timestamp_path(&self) -> PathBuf {
        self.dir.join(TIMESTAMP_FILE)
    }

    /// The last committed timestamp, in epoch milliseconds, or `None` if
    /// this context has never committed.
    pub fn last_committed_at(&self) -> Option<i64> {
        std::fs::read_to_string(self.timestamp_path())
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }

    /// A point-in-time snapshot, safe to hold across concurrent commits
    /// (spec §4.3 `acquireSearcher`). tantivy's `Searcher` is itself a
    /// cheap, reference-counted snapshot; this wrapper exists so callers
    /// have an explicit acquire/release pair rather than reaching into
    /// the reader directly.
    pub fn acquire_searcher(&self) -> Searcher {
        self.reader.searcher()
    }

    /// Symmetric with [`Self::acquire_searcher`]; tantivy drops the
    /// underlying segment references when the last handle is dropped, so
    /// this is a no-op kept for interface symmetry (spec §4.3).
    pub fn release_searcher(&self, _searcher: Searcher) {}

    /// Compact down to `max_segments` (spec §4.3 `optimize`).
    pub fn optimize(&mut self, max_segments: usize) -> Result<(), IndexerError> {
        let segment_ids = self.index.searchable_segment_ids().map_err(|e| IndexerError::Generic {
            message: format!("failed to list segments: {e}"),
        })?;
        if segment_ids.len() <= max_segments {
            return Ok(());
        }
        self.writer
            .merge(&segment_ids)
            .wait()
            .map_err(|e| IndexerError::Generic {
                message: format!("merge failed: {e}"),
            })?;
        self.writer.commit().map_err(|e| IndexerError::IoFailure {
            message: format!("post-merge commit failed: {e}"),
        })?;
        self.reader.reload().map_err(|e| IndexerError::Generic {
            message: format!("reader reload failed: {e}"),
        })?;
        Ok(())
    }

    /// Count of live (non-deleted) documents, for test assertions.
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Every live document as a [`Record`], in segment/doc-id order. The
    /// position within the returned vector is that document's ordinal for
    /// this snapshot (used by the incremental handler and the v1 writer
    /// to select a chunk's subset).
    pub fn live_records(&self) -> Result<Vec<Record>, IndexerError> {
        let searcher = self.reader.searcher();
        let mut records = Vec::new();
        for (segment_ord, segment_reader) in searcher.segment_readers().iter().enumerate() {
            let store = segment_reader
                .get_store_reader(0)
                .map_err(|e| IndexerError::Generic {
                    message: format!("failed to open segment store reader: {e}"),
                })?;
            for doc_id in segment_reader.doc_ids_alive() {
                let doc: TantivyDocument = store.get(doc_id).map_err(|e| IndexerError::Generic {
                    message: format!(
                        "failed to read document {doc_id} in segment {segment_ord}: {e}"
                    ),
                })?;
                records.push(self.document_to_record(&doc));
            }
        }
        Ok(records)
    }

    fn document_to_record(&self, doc: &TantivyDocument) -> Record {
        let mut record = Record::new();
        for (field, field_entry) in self.schema.schema.fields() {
            if field == self.schema.uinfo_raw || field == self.schema.last_modified_fast {
                continue;
            }
            if let Some(value) = doc.get_first(field).and_then(|v| v.as_str()) {
                record.set(field_entry.name(), value, FieldFlags::STORED_INDEXED);
            }
        }
        record
    }

    /// Field accessor for tests and downstream crates that read raw
    /// record values back out of the tantivy `Document`.
    pub fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    pub fn field_value_str(&self, doc: &TantivyDocument, field_name: &str) -> Option<String> {
        let field = self.schema.field(field_name)?;
        doc.get_first(field)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idx_contrib::default_registry;
    use tempfile::TempDir;

    fn ctx_for(group: &str, artifact: &str, version: &str) -> ArtifactContext {
        let coord = Coordinate::new(group, artifact, version, None, "jar");
        ArtifactContext::new(coord)
    }

    #[test]
    fn add_artifact_upserts_by_uinfo() {
        let dir = TempDir::new().unwrap();
        let mut ictx =
            IndexingContext::open_or_create(dir.path(), "ctx-1", default_registry()).unwrap();

        let a = ctx_for("org.ex", "a", "1.0");
        ictx.add_artifact(&a).unwrap();
        ictx.commit(1_700_000_000_000).unwrap();
        assert_eq!(ictx.num_docs(), 1);

        // Re-adding the same coordinate replaces, not duplicates.
        let a_again = ctx_for("org.ex", "a", "1.0");
        ictx.add_artifact(&a_again).unwrap();
        ictx.commit(1_700_000_001_000).unwrap();
        assert_eq!(ictx.num_docs(), 1);
    }

    #[test]
    fn distinct_coordinates_both_persist() {
        let dir = TempDir::new().unwrap();
        let mut ictx =
            IndexingContext::open_or_create(dir.path(), "ctx-1", default_registry()).unwrap();

        ictx.add_artifact(&ctx_for("org.ex", "a", "1.0")).unwrap();
        ictx.add_artifact(&ctx_for("org.ex", "b", "1.0")).unwrap();
        ictx.commit(1_700_000_000_000).unwrap();
        assert_eq!(ictx.num_docs(), 2);
    }

    #[test]
    fn commit_advances_timestamp_monotonically() {
        let dir = TempDir::new().unwrap();
        let mut ictx =
            IndexingContext::open_or_create(dir.path(), "ctx-1", default_registry()).unwrap();
        ictx.commit(1_000).unwrap();
        assert_eq!(ictx.last_committed_at(), Some(1_000));
        ictx.commit(2_000).unwrap();
        assert_eq!(ictx.last_committed_at(), Some(2_000));
    }

    #[test]
    fn second_context_on_same_dir_fails_to_obtain_lock() {
        let dir = TempDir::new().unwrap();
        let _first =
            IndexingContext::open_or_create(dir.path(), "ctx-1", default_registry()).unwrap();
        let second = IndexingContext::open_or_create(dir.path(), "ctx-1", default_registry());
        assert!(second.is_err());
    }
}
