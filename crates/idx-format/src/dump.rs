//! The v1 portable dump: a gzip-compressed stream of the descriptor
//! record followed by the selected artifact records (spec §4.6, §6).

use crate::wire::{read_record, write_record};
use flate2::write::GzEncoder;
use flate2::read::GzDecoder;
use flate2::Compression;
use idx_core::IndexingContext;
use idx_model::Record;
use idx_util::errors::IndexerError;
use std::io::{Read, Write};

pub const FORMAT_VERSION: u8 = 1;

/// Stream either every live document (`ordinals = None`) or just the
/// ordinals given (an incremental chunk) to `sink`, gzip-compressed as a
/// whole, descriptor record first (spec §4.6).
pub fn write_dump<W: Write>(
    sink: W,
    context: &IndexingContext,
    ordinals: Option<&[usize]>,
    timestamp_ms: i64,
    extra_records: &[Record],
) -> Result<(), IndexerError> {
    let mut encoder = GzEncoder::new(sink, Compression::best());
    encoder.write_all(&[FORMAT_VERSION])?;
    encoder.write_all(&timestamp_ms.to_be_bytes())?;

    let descriptor = Record::descriptor(context.id(), FORMAT_VERSION);
    write_record(&mut encoder, &descriptor)?;

    for extra in extra_records {
        write_record(&mut encoder, extra)?;
    }

    let live = context.live_records()?;
    match ordinals {
        None => {
            for record in &live {
                write_record(&mut encoder, record)?;
            }
        }
        Some(selected) => {
            for &ord in selected {
                if let Some(record) = live.get(ord) {
                    write_record(&mut encoder, record)?;
                }
            }
        }
    }

    encoder.finish().map_err(|e| IndexerError::IoFailure {
        message: format!("failed to finish gzip stream: {e}"),
    })?;
    Ok(())
}

/// The header and decoded records of a v1 dump, as read back.
pub struct ParsedDump {
    pub version: u8,
    pub timestamp_ms: i64,
    pub records: Vec<Record>,
}

/// Parse a gzip-compressed v1 dump (spec §6). Used by tests and by any
/// tooling that verifies a published dump rather than the live index.
pub fn read_dump<R: Read>(source: R) -> Result<ParsedDump, IndexerError> {
    let mut decoder = GzDecoder::new(source);
    let mut header = [0u8; 1 + 8];
    decoder.read_exact(&mut header).map_err(|e| IndexerError::IndexCorruption {
        message: format!("truncated dump header: {e}"),
    })?;
    let version = header[0];
    let timestamp_ms = i64::from_be_bytes(header[1..9].try_into().unwrap());

    let mut records = Vec::new();
    loop {
        match read_record(&mut decoder).map_err(|e| IndexerError::IndexCorruption {
            message: format!("malformed record in dump: {e}"),
        })? {
            Some(record) => records.push(record),
            None => break,
        }
    }

    Ok(ParsedDump {
        version,
        timestamp_ms,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use idx_contrib::{default_registry, ArtifactContext};
    use idx_model::Coordinate;
    use tempfile::TempDir;

    #[test]
    fn empty_context_dump_contains_only_descriptor() {
        let dir = TempDir::new().unwrap();
        let ctx = IndexingContext::open_or_create(dir.path(), "ctx-1", default_registry()).unwrap();

        let mut buf = Vec::new();
        write_dump(&mut buf, &ctx, None, 1_000, &[]).unwrap();

        let parsed = read_dump(std::io::Cursor::new(buf)).unwrap();
        assert_eq!(parsed.version, FORMAT_VERSION);
        assert_eq!(parsed.records.len(), 1);
        assert!(parsed.records[0].is_descriptor());
    }

    #[test]
    fn full_dump_contains_descriptor_plus_every_live_record() {
        let dir = TempDir::new().unwrap();
        let mut ctx =
            IndexingContext::open_or_create(dir.path(), "ctx-1", default_registry()).unwrap();
        let coord = Coordinate::new("org.ex", "a", "1.0", None, "jar");
        ctx.add_artifact(&ArtifactContext::new(coord)).unwrap();
        ctx.commit(1_000).unwrap();

        let mut buf = Vec::new();
        write_dump(&mut buf, &ctx, None, 1_000, &[]).unwrap();
        let parsed = read_dump(std::io::Cursor::new(buf)).unwrap();

        assert_eq!(parsed.records.len(), 2);
        assert!(parsed.records.iter().any(|r| r.uinfo() == Some("org.ex|a|1.0|NA|jar")));
    }

    #[test]
    fn selected_ordinals_filter_to_a_single_record() {
        let dir = TempDir::new().unwrap();
        let mut ctx =
            IndexingContext::open_or_create(dir.path(), "ctx-1", default_registry()).unwrap();
        ctx.add_artifact(&ArtifactContext::new(Coordinate::new(
            "org.ex", "a", "1.0", None, "jar",
        )))
        .unwrap();
        ctx.add_artifact(&ArtifactContext::new(Coordinate::new(
            "org.ex", "b", "1.0", None, "jar",
        )))
        .unwrap();
        ctx.commit(1_000).unwrap();

        let mut buf = Vec::new();
        write_dump(&mut buf, &ctx, Some(&[0]), 1_000, &[]).unwrap();
        let parsed = read_dump(std::io::Cursor::new(buf)).unwrap();
        assert_eq!(parsed.records.len(), 2); // descriptor + 1 selected
    }
}
