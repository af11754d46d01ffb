//! The legacy archive writer (spec §4.7): a zip of a compacted,
//! legacy-schema inverted index directory built from the source context's
//! live documents.

use idx_contrib::{ArtifactContext, ContributorRegistry};
use idx_core::IndexingContext;
use idx_model::Coordinate;
use idx_util::errors::IndexerError;
use std::io::Write as _;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Name of the sentinel timestamp sidecar copied alongside the legacy
/// index files (spec §4.7 step 4).
const TIMESTAMP_ENTRY: &str = "index.timestamp";

/// Build and zip the legacy archive (spec §4.7). The temporary
/// directory-backed index is guaranteed to be removed before returning,
/// on both the success and failure paths.
pub fn write_legacy_archive(
    source: &IndexingContext,
    contributors: &ContributorRegistry,
    target_zip: &std::path::Path,
    max_segments: usize,
    timestamp_ms: i64,
) -> Result<(), IndexerError> {
    let temp_dir = tempfile::tempdir()?;
    let result = build_and_zip(
        source,
        contributors,
        temp_dir.path(),
        target_zip,
        max_segments,
        timestamp_ms,
    );
    temp_dir.close()?;
    result
}

fn build_and_zip(
    source: &IndexingContext,
    contributors: &ContributorRegistry,
    temp_dir: &std::path::Path,
    target_zip: &std::path::Path,
    max_segments: usize,
    timestamp_ms: i64,
) -> Result<(), IndexerError> {
    let mut legacy = IndexingContext::open_or_create(temp_dir, source.id(), contributors.clone())?;

    for record in source.live_records()? {
        if record.is_descriptor() || record.is_tombstone() {
            continue;
        }
        let Some(uinfo) = record.uinfo() else { continue };
        let Some(coordinate) = Coordinate::from_uinfo(uinfo) else {
            continue;
        };

        let mut ctx = ArtifactContext::new(coordinate);
        contributors.update_artifact_info_all(&record, &mut ctx);

        let mut legacy_record = idx_model::Record::new();
        contributors.update_legacy_document_all(&ctx, &mut legacy_record);
        legacy.add_record(legacy_record)?;
    }

    legacy.commit(timestamp_ms)?;
    legacy.optimize(max_segments)?;

    // `commit` already wrote the timestamp sidecar atomically; copy its
    // contents into the archive under a fixed entry name regardless of
    // what the directory listing would otherwise include (spec §4.7
    // step 4).
    let timestamp_contents = std::fs::read(legacy.timestamp_path())?;

    let mut entries: Vec<_> = std::fs::read_dir(temp_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    entries.sort();

    let zip_file = std::fs::File::create(target_zip)?;
    let mut writer = ZipWriter::new(zip_file);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .compression_level(Some(9));

    let mut wrote_timestamp = false;
    for entry in &entries {
        let name = entry.file_name().unwrap().to_string_lossy().to_string();
        writer.start_file(&name, options).map_err(|e| IndexerError::IoFailure {
            message: format!("failed to start zip entry {name}: {e}"),
        })?;
        let contents = std::fs::read(entry)?;
        writer.write_all(&contents)?;
        if name == TIMESTAMP_ENTRY {
            wrote_timestamp = true;
        }
    }
    if !wrote_timestamp {
        writer.start_file(TIMESTAMP_ENTRY, options).map_err(|e| IndexerError::IoFailure {
            message: format!("failed to start timestamp entry: {e}"),
        })?;
        writer.write_all(&timestamp_contents)?;
    }

    writer.finish().map_err(|e| IndexerError::IoFailure {
        message: format!("failed to finish zip archive: {e}"),
    })?;
    Ok(())
}
