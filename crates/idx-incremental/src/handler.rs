//! The incremental publication state machine (spec §4.5): chunk
//! computation, chain-id management, and cross-run staleness detection.

use crate::baseline::Baseline;
use idx_contrib::ContributorRegistry;
use idx_core::IndexingContext;
use idx_format::Descriptor;
use idx_model::Record;
use idx_util::errors::IndexerError;
use idx_util::hash::sha1_bytes;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lifecycle states the handler cycles through across publication runs
/// (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    Uninit,
    Ready,
    Broken,
}

/// Result of a single [`IncrementalHandler::compute_incremental`] call.
pub enum IncrementalOutcome {
    /// The on-disk state can no longer be trusted as a basis for a diff;
    /// the caller must reinitialize the descriptor and publish a full
    /// dump only this cycle (spec §4.5: reset to `Uninit`).
    CannotCompute,
    /// Nothing changed since the baseline was last recorded; skip
    /// emitting a chunk.
    NoChanges,
    /// Emit a chunk carrying these live ordinals (new or changed
    /// records) and these tombstones (records present in the baseline
    /// but no longer live), then persist `next_baseline`.
    Chunk {
        ordinals: Vec<usize>,
        tombstones: Vec<Record>,
        next_baseline: Baseline,
    },
}

static CHAIN_NONCE: AtomicU64 = AtomicU64::new(0);

/// State machine over chunk publications (spec §4.5). Holds only the
/// configured retention window; all other state lives in the descriptor
/// and the [`Baseline`] passed into each call, so the handler itself is
/// cheap to construct per publication cycle.
pub struct IncrementalHandler {
    retention: usize,
}

impl IncrementalHandler {
    pub fn new(retention: usize) -> Self {
        Self { retention }
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Build a fresh descriptor with `chunk-counter=0` and a new
    /// chain-id (spec §4.5 `initializeProperties`). Called when the
    /// descriptor is missing or corrupt, or after `compute_incremental`
    /// returns [`IncrementalOutcome::CannotCompute`].
    pub fn initialize_properties(&self, context_id: &str, now_millis: i64) -> Descriptor {
        Descriptor::fresh(context_id, generate_chain_id(context_id, now_millis))
    }

    /// Whether the on-disk descriptor can no longer be trusted as a
    /// basis for an incremental chunk (spec §4.5): the chain-id is
    /// missing, the context's last commit is older than what the
    /// descriptor last saw (a rollback), or the live contributor set
    /// disagrees with the one recorded when the chain was started.
    fn is_broken(&self, context: &IndexingContext, contributors: &ContributorRegistry, descriptor: &Descriptor) -> bool {
        if descriptor.chain_id.is_none() {
            return true;
        }
        if let Some(last_seen) = descriptor.last_seen_commit {
            if context.last_committed_at().unwrap_or(i64::MIN) < last_seen {
                return true;
            }
        }
        if let Some(recorded) = &descriptor.contributor_ids {
            if *recorded != contributor_ids_key(contributors) {
                return true;
            }
        }
        false
    }

    /// Compute the next chunk's contents by diffing the context's
    /// current live records against `baseline` by content fingerprint
    /// (spec §4.5 `computeIncremental`). Never mutates `descriptor` or
    /// `baseline`; the caller applies [`IncrementalOutcome::Chunk`]'s
    /// `next_baseline` and advances the descriptor's counter itself.
    pub fn compute_incremental(
        &self,
        context: &IndexingContext,
        contributors: &ContributorRegistry,
        descriptor: &Descriptor,
        baseline: &Baseline,
    ) -> Result<IncrementalOutcome, IndexerError> {
        if self.is_broken(context, contributors, descriptor) {
            return Ok(IncrementalOutcome::CannotCompute);
        }

        let live = context.live_records()?;
        let mut next_baseline = Baseline::default();
        let mut ordinals = Vec::new();

        for (ordinal, record) in live.iter().enumerate() {
            let Some(uinfo) = record.uinfo() else {
                continue;
            };
            let fingerprint = Baseline::fingerprint(record);
            let changed = match baseline.fingerprints.get(uinfo) {
                Some(prior) => *prior != fingerprint,
                None => true,
            };
            if changed {
                ordinals.push(ordinal);
            }
            next_baseline.fingerprints.insert(uinfo.to_string(), fingerprint);
        }

        let tombstones: Vec<Record> = baseline
            .fingerprints
            .keys()
            .filter(|uinfo| !next_baseline.fingerprints.contains_key(uinfo.as_str()))
            .map(|uinfo| Record::tombstone(uinfo))
            .collect();

        if ordinals.is_empty() && tombstones.is_empty() {
            return Ok(IncrementalOutcome::NoChanges);
        }

        Ok(IncrementalOutcome::Chunk {
            ordinals,
            tombstones,
            next_baseline,
        })
    }
}

fn generate_chain_id(context_id: &str, now_millis: i64) -> String {
    let nonce = CHAIN_NONCE.fetch_add(1, Ordering::Relaxed);
    sha1_bytes(format!("{context_id}:{now_millis}:{nonce}").as_bytes())
}

/// The recorded-contributor-set key stored in the descriptor and
/// compared against the live registry on every cycle (spec §4.5).
pub fn contributor_ids_key(contributors: &ContributorRegistry) -> String {
    contributors.ids().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use idx_contrib::{default_registry, ArtifactContext};
    use idx_model::Coordinate;
    use tempfile::TempDir;

    fn artifact(group: &str, artifact: &str, version: &str) -> ArtifactContext {
        ArtifactContext::new(Coordinate::new(group, artifact, version, None, "jar"))
    }

    #[test]
    fn fresh_context_with_no_baseline_yields_a_chunk_of_everything() {
        let dir = TempDir::new().unwrap();
        let registry = default_registry();
        let mut ctx = IndexingContext::open_or_create(dir.path(), "ctx-1", registry.clone()).unwrap();
        ctx.add_artifact(&artifact("org.ex", "a", "1.0")).unwrap();
        ctx.commit(1_000).unwrap();

        let handler = IncrementalHandler::new(30);
        let mut descriptor = handler.initialize_properties("ctx-1", 1_000);
        descriptor.last_seen_commit = Some(1_000);
        descriptor.contributor_ids = Some(contributor_ids_key(&registry));

        let baseline = Baseline::default();
        match handler
            .compute_incremental(&ctx, &registry, &descriptor, &baseline)
            .unwrap()
        {
            IncrementalOutcome::Chunk { ordinals, tombstones, .. } => {
                assert_eq!(ordinals.len(), 1);
                assert!(tombstones.is_empty());
            }
            _ => panic!("expected a chunk"),
        }
    }

    #[test]
    fn repacking_identical_state_reports_no_changes() {
        let dir = TempDir::new().unwrap();
        let registry = default_registry();
        let mut ctx = IndexingContext::open_or_create(dir.path(), "ctx-1", registry.clone()).unwrap();
        ctx.add_artifact(&artifact("org.ex", "a", "1.0")).unwrap();
        ctx.commit(1_000).unwrap();

        let handler = IncrementalHandler::new(30);
        let mut descriptor = handler.initialize_properties("ctx-1", 1_000);
        descriptor.last_seen_commit = Some(1_000);
        descriptor.contributor_ids = Some(contributor_ids_key(&registry));

        let live = ctx.live_records().unwrap();
        let mut baseline = Baseline::default();
        for record in &live {
            baseline
                .fingerprints
                .insert(record.uinfo().unwrap().to_string(), Baseline::fingerprint(record));
        }

        match handler
            .compute_incremental(&ctx, &registry, &descriptor, &baseline)
            .unwrap()
        {
            IncrementalOutcome::NoChanges => {}
            _ => panic!("expected no changes"),
        }
    }

    #[test]
    fn new_artifact_since_baseline_yields_only_that_ordinal() {
        let dir = TempDir::new().unwrap();
        let registry = default_registry();
        let mut ctx = IndexingContext::open_or_create(dir.path(), "ctx-1", registry.clone()).unwrap();
        ctx.add_artifact(&artifact("org.ex", "a", "1.0")).unwrap();
        ctx.commit(1_000).unwrap();

        let live = ctx.live_records().unwrap();
        let mut baseline = Baseline::default();
        for record in &live {
            baseline
                .fingerprints
                .insert(record.uinfo().unwrap().to_string(), Baseline::fingerprint(record));
        }

        ctx.add_artifact(&artifact("org.ex", "a", "2.0")).unwrap();
        ctx.commit(2_000).unwrap();

        let handler = IncrementalHandler::new(30);
        let mut descriptor = handler.initialize_properties("ctx-1", 1_000);
        descriptor.last_seen_commit = Some(1_000);
        descriptor.contributor_ids = Some(contributor_ids_key(&registry));

        match handler
            .compute_incremental(&ctx, &registry, &descriptor, &baseline)
            .unwrap()
        {
            IncrementalOutcome::Chunk { ordinals, tombstones, next_baseline } => {
                assert_eq!(ordinals.len(), 1);
                assert!(tombstones.is_empty());
                assert_eq!(next_baseline.fingerprints.len(), 2);
            }
            _ => panic!("expected a chunk with exactly the new artifact"),
        }
    }

    #[test]
    fn deleted_artifact_yields_a_tombstone() {
        let dir = TempDir::new().unwrap();
        let registry = default_registry();
        let mut ctx = IndexingContext::open_or_create(dir.path(), "ctx-1", registry.clone()).unwrap();
        ctx.add_artifact(&artifact("org.ex", "a", "1.0")).unwrap();
        ctx.commit(1_000).unwrap();

        let live = ctx.live_records().unwrap();
        let mut baseline = Baseline::default();
        for record in &live {
            baseline
                .fingerprints
                .insert(record.uinfo().unwrap().to_string(), Baseline::fingerprint(record));
        }

        ctx.delete_artifact(&Coordinate::new("org.ex", "a", "1.0", None, "jar"))
            .unwrap();
        ctx.commit(2_000).unwrap();

        let handler = IncrementalHandler::new(30);
        let mut descriptor = handler.initialize_properties("ctx-1", 1_000);
        descriptor.last_seen_commit = Some(1_000);
        descriptor.contributor_ids = Some(contributor_ids_key(&registry));

        match handler
            .compute_incremental(&ctx, &registry, &descriptor, &baseline)
            .unwrap()
        {
            IncrementalOutcome::Chunk { ordinals, tombstones, next_baseline } => {
                assert!(ordinals.is_empty());
                assert_eq!(tombstones.len(), 1);
                assert!(tombstones[0].is_tombstone());
                assert!(next_baseline.fingerprints.is_empty());
            }
            _ => panic!("expected a chunk with a tombstone"),
        }
    }

    #[test]
    fn missing_chain_id_is_broken() {
        let dir = TempDir::new().unwrap();
        let registry = default_registry();
        let ctx = IndexingContext::open_or_create(dir.path(), "ctx-1", registry.clone()).unwrap();

        let handler = IncrementalHandler::new(30);
        let mut descriptor = Descriptor::fresh("ctx-1", "chain-a");
        descriptor.chain_id = None;

        match handler
            .compute_incremental(&ctx, &registry, &descriptor, &Baseline::default())
            .unwrap()
        {
            IncrementalOutcome::CannotCompute => {}
            _ => panic!("expected CannotCompute"),
        }
    }

    #[test]
    fn rolled_back_commit_is_broken() {
        let dir = TempDir::new().unwrap();
        let registry = default_registry();
        let mut ctx = IndexingContext::open_or_create(dir.path(), "ctx-1", registry.clone()).unwrap();
        ctx.commit(1_000).unwrap();

        let handler = IncrementalHandler::new(30);
        let mut descriptor = handler.initialize_properties("ctx-1", 1_000);
        descriptor.last_seen_commit = Some(5_000); // newer than the context's actual last commit
        descriptor.contributor_ids = Some(contributor_ids_key(&registry));

        match handler
            .compute_incremental(&ctx, &registry, &descriptor, &Baseline::default())
            .unwrap()
        {
            IncrementalOutcome::CannotCompute => {}
            _ => panic!("expected CannotCompute"),
        }
    }

    #[test]
    fn contributor_set_mismatch_is_broken() {
        let dir = TempDir::new().unwrap();
        let registry = default_registry();
        let ctx = IndexingContext::open_or_create(dir.path(), "ctx-1", registry.clone()).unwrap();

        let handler = IncrementalHandler::new(30);
        let mut descriptor = handler.initialize_properties("ctx-1", 1_000);
        descriptor.last_seen_commit = Some(0);
        descriptor.contributor_ids = Some("some-other-contributor-set".to_string());

        match handler
            .compute_incremental(&ctx, &registry, &descriptor, &Baseline::default())
            .unwrap()
        {
            IncrementalOutcome::CannotCompute => {}
            _ => panic!("expected CannotCompute"),
        }
    }
}
