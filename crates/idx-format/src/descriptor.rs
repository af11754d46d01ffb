//! The descriptor properties file (spec §6): `nexus-maven-repository-index.properties`.

use idx_util::errors::IndexerError;
use idx_util::fs::atomic_write;
use std::collections::BTreeMap;
use std::path::Path;
use time::OffsetDateTime;

pub const DESCRIPTOR_FILENAME: &str = "nexus-maven-repository-index.properties";

/// Format an epoch-millisecond timestamp as `yyyyMMddHHmmss.SSS`, GMT
/// (spec §6 `INDEX_TIMESTAMP` / `INDEX_LEGACY_TIMESTAMP`).
pub fn format_gmt_timestamp(epoch_millis: i64) -> String {
    let seconds = epoch_millis.div_euclid(1000);
    let millis = epoch_millis.rem_euclid(1000);
    let dt = OffsetDateTime::from_unix_timestamp(seconds).unwrap_or(OffsetDateTime::UNIX_EPOCH);
    format!(
        "{:04}{:02}{:02}{:02}{:02}{:02}.{:03}",
        dt.year(),
        u8::from(dt.month()),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        millis
    )
}

pub const KEY_ID: &str = "nexus.index.id";
pub const KEY_TIMESTAMP: &str = "nexus.index.timestamp";
pub const KEY_LEGACY_TIMESTAMP: &str = "nexus.index.legacy-timestamp";
pub const KEY_CHAIN_ID: &str = "nexus.index.chain-id";
pub const KEY_CHUNK_COUNTER: &str = "nexus.index.chunk-counter";
const KEY_CHUNK_PREFIX: &str = "nexus.index.incremental-chunk-";
/// Supplemental key (not in the original wire table) recording the
/// contributor id set live when the chain was started, so a later run can
/// detect a contributor-set change and force a chain reset (spec §4.5).
pub const KEY_CONTRIBUTOR_IDS: &str = "nexus.index.contributor-ids";
/// Supplemental key recording the commit timestamp the incremental
/// handler last computed against, used to detect a stale/rolled-back
/// on-disk commit (spec §4.5).
pub const KEY_LAST_SEEN_COMMIT: &str = "nexus.index.last-seen-commit";

/// Default retention window for historical chunk markers (spec §9 open
/// question, resolved here).
pub const DEFAULT_CHUNK_RETENTION: usize = 30;

/// The publication state carried alongside an index: identity, the last
/// commit times for each format, the current incremental chain, and a
/// bounded history of recent chunk markers (spec §4.5, §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub id: String,
    pub timestamp: Option<String>,
    pub legacy_timestamp: Option<String>,
    pub chain_id: Option<String>,
    pub chunk_counter: u64,
    /// chunk number -> chain-id it belonged to, newest last.
    pub chunks: Vec<(u64, String)>,
    pub contributor_ids: Option<String>,
    pub last_seen_commit: Option<i64>,
}

impl Descriptor {
    pub fn fresh(id: impl Into<String>, chain_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp: None,
            legacy_timestamp: None,
            chain_id: Some(chain_id.into()),
            chunk_counter: 0,
            chunks: Vec::new(),
            contributor_ids: None,
            last_seen_commit: None,
        }
    }

    /// Record a newly-published chunk, advancing the counter and evicting
    /// markers beyond `retention` (spec §4.5).
    pub fn record_chunk(&mut self, chunk_number: u64, chain_id: &str, retention: usize) {
        self.chunks.push((chunk_number, chain_id.to_string()));
        if self.chunks.len() > retention {
            let overflow = self.chunks.len() - retention;
            self.chunks.drain(0..overflow);
        }
        self.chunk_counter = chunk_number + 1;
    }

    pub fn to_properties(&self) -> String {
        let mut map: BTreeMap<String, String> = BTreeMap::new();
        map.insert(KEY_ID.to_string(), self.id.clone());
        if let Some(ts) = &self.timestamp {
            map.insert(KEY_TIMESTAMP.to_string(), ts.clone());
        }
        if let Some(ts) = &self.legacy_timestamp {
            map.insert(KEY_LEGACY_TIMESTAMP.to_string(), ts.clone());
        }
        if let Some(chain) = &self.chain_id {
            map.insert(KEY_CHAIN_ID.to_string(), chain.clone());
        }
        map.insert(KEY_CHUNK_COUNTER.to_string(), self.chunk_counter.to_string());
        for (n, chain) in &self.chunks {
            map.insert(format!("{KEY_CHUNK_PREFIX}{n}"), chain.clone());
        }
        if let Some(ids) = &self.contributor_ids {
            map.insert(KEY_CONTRIBUTOR_IDS.to_string(), ids.clone());
        }
        if let Some(ts) = self.last_seen_commit {
            map.insert(KEY_LAST_SEEN_COMMIT.to_string(), ts.to_string());
        }

        let mut out = String::new();
        for (k, v) in map {
            out.push_str(&k);
            out.push('=');
            out.push_str(&v);
            out.push('\n');
        }
        out
    }

    pub fn parse(contents: &str) -> Result<Self, IndexerError> {
        let mut raw: BTreeMap<String, String> = BTreeMap::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((k, v)) = line.split_once('=') else {
                return Err(IndexerError::IndexCorruption {
                    message: format!("malformed descriptor line: {line}"),
                });
            };
            raw.insert(k.trim().to_string(), v.trim().to_string());
        }

        let id = raw
            .get(KEY_ID)
            .cloned()
            .ok_or_else(|| IndexerError::IndexCorruption {
                message: format!("descriptor missing required key {KEY_ID}"),
            })?;
        let chunk_counter = raw
            .get(KEY_CHUNK_COUNTER)
            .map(|s| s.parse::<u64>())
            .transpose()
            .map_err(|_| IndexerError::IndexCorruption {
                message: "chunk-counter is not a valid integer".to_string(),
            })?
            .unwrap_or(0);

        let mut chunks: Vec<(u64, String)> = raw
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(KEY_CHUNK_PREFIX)
                    .and_then(|n| n.parse::<u64>().ok())
                    .map(|n| (n, v.clone()))
            })
            .collect();
        chunks.sort_by_key(|(n, _)| *n);

        let last_seen_commit = raw
            .get(KEY_LAST_SEEN_COMMIT)
            .map(|s| s.parse::<i64>())
            .transpose()
            .map_err(|_| IndexerError::IndexCorruption {
                message: "last-seen-commit is not a valid integer".to_string(),
            })?;

        Ok(Self {
            id,
            timestamp: raw.get(KEY_TIMESTAMP).cloned(),
            legacy_timestamp: raw.get(KEY_LEGACY_TIMESTAMP).cloned(),
            chain_id: raw.get(KEY_CHAIN_ID).cloned(),
            chunk_counter,
            chunks,
            contributor_ids: raw.get(KEY_CONTRIBUTOR_IDS).cloned(),
            last_seen_commit,
        })
    }

    pub fn read_from(path: &Path) -> Result<Self, IndexerError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), IndexerError> {
        atomic_write(path, self.to_properties().as_bytes())?;
        Ok(())
    }
}
