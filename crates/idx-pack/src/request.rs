//! The packer request (spec §4.8, §6): what a single publication cycle
//! should produce.

use idx_format::DEFAULT_CHUNK_RETENTION;
use std::path::PathBuf;

/// Which publication format(s) a cycle should emit (spec §6 `--format`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    V1,
    Legacy,
    Both,
}

impl Format {
    pub fn includes_v1(self) -> bool {
        matches!(self, Format::V1 | Format::Both)
    }

    pub fn includes_legacy(self) -> bool {
        matches!(self, Format::Legacy | Format::Both)
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v1" => Ok(Format::V1),
            "legacy" => Ok(Format::Legacy),
            "both" => Ok(Format::Both),
            other => Err(format!("unknown format '{other}', expected v1|legacy|both")),
        }
    }
}

/// A single publication cycle's parameters (spec §4.8).
#[derive(Debug, Clone)]
pub struct PackerRequest {
    /// Where the publication set is written.
    pub target_dir: PathBuf,
    pub format: Format,
    /// Whether to compute and emit an incremental chunk (spec §6 `--chunks`).
    pub chunks: bool,
    /// Whether to write `.sha1`/`.md5` siblings for every emitted file
    /// (spec §6 `--checksums`).
    pub checksums: bool,
    /// Segment ceiling the legacy archive is force-merged to.
    pub max_legacy_segments: usize,
    /// Historical chunk markers retained in the descriptor (spec §9,
    /// default 30).
    pub chunk_retention: usize,
    /// Per spec §9's open question: the context-local sidecar is
    /// authoritative for writing; the target directory copy is read back
    /// to seed the cycle only when this is explicitly set.
    pub read_descriptor_from_target: bool,
}

impl PackerRequest {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            format: Format::V1,
            chunks: false,
            checksums: true,
            max_legacy_segments: 1,
            chunk_retention: DEFAULT_CHUNK_RETENTION,
            read_descriptor_from_target: false,
        }
    }
}
