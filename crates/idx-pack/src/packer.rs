//! The packer orchestrator (spec §4.8): drives a single publication
//! cycle, producing whichever of the full dump, an incremental chunk,
//! and the legacy archive the request asks for, then the descriptor and
//! checksums.

use crate::digest::write_checksums;
use crate::request::{Format, PackerRequest};
use idx_contrib::ContributorRegistry;
use idx_core::IndexingContext;
use idx_format::{format_gmt_timestamp, write_dump, write_legacy_archive, Descriptor, DESCRIPTOR_FILENAME};
use idx_incremental::{contributor_ids_key, Baseline, IncrementalHandler, IncrementalOutcome};
use idx_util::errors::IndexerError;
use std::path::{Path, PathBuf};

pub const PUBLICATION_PREFIX: &str = "nexus-maven-repository-index";

/// What a publication cycle actually produced, summarized for the caller
/// (the CLI maps this onto the exit codes in spec §6/§7).
#[derive(Debug, Default)]
pub struct PublicationOutcome {
    /// The descriptor was corrupt, or the incremental state was judged
    /// unusable (spec §4.5 `CannotCompute`), forcing a fresh chain this
    /// cycle (spec §6/§7 exit code 3). A full dump was still published;
    /// no chunk was emitted. A simply *absent* descriptor — a fresh index,
    /// or one whose sidecar was deleted between cycles — also starts a
    /// fresh chain but is not corruption, so it leaves this `false`.
    pub regenerated: bool,
    /// The chunk number written this cycle, if any.
    pub chunk_written: Option<u64>,
    /// Every file this cycle wrote, in the order it wrote them.
    pub files_written: Vec<PathBuf>,
}

/// Orchestrates one publication cycle against a single indexing context
/// (spec §4.8). Stateless beyond the borrowed context and contributor
/// set; a fresh `Packer` is cheap to build per cycle.
pub struct Packer<'a> {
    context: &'a IndexingContext,
    contributors: &'a ContributorRegistry,
}

impl<'a> Packer<'a> {
    pub fn new(context: &'a IndexingContext, contributors: &'a ContributorRegistry) -> Self {
        Self { context, contributors }
    }

    /// Run a single publication cycle. The descriptor and dump timestamps
    /// are stamped from the context's own committed timestamp (spec §4.8
    /// steps 4-5, §6 `nexus.index.timestamp`), not from the invocation
    /// clock, so re-packing unchanged state reproduces byte-identical
    /// output. `now_millis` is used only to seed a new chain-id when the
    /// descriptor is absent or corrupt, and as a fallback if the context
    /// has never been committed; the caller supplies it so the packer
    /// itself never reads the system clock.
    pub fn publish(&self, request: &PackerRequest, now_millis: i64) -> Result<PublicationOutcome, IndexerError> {
        validate_target_dir(&request.target_dir)?;

        let sidecar_path = self.context.directory().join(DESCRIPTOR_FILENAME);
        let target_descriptor_path = request.target_dir.join(DESCRIPTOR_FILENAME);
        let load_path: &Path = if request.read_descriptor_from_target {
            &target_descriptor_path
        } else {
            &sidecar_path
        };

        let committed_at = self.context.last_committed_at().unwrap_or(now_millis);

        let handler = IncrementalHandler::new(request.chunk_retention);
        let mut outcome = PublicationOutcome::default();

        let (mut descriptor, mut just_initialized) = match Descriptor::read_from(load_path) {
            Ok(descriptor) => (descriptor, false),
            Err(IndexerError::Io(io_error)) if io_error.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %load_path.display(), "descriptor absent; starting a fresh chain");
                (handler.initialize_properties(self.context.id(), now_millis), true)
            }
            Err(error) => {
                tracing::warn!(path = %load_path.display(), %error, "descriptor corrupt; forcing full regeneration");
                outcome.regenerated = true;
                (handler.initialize_properties(self.context.id(), now_millis), true)
            }
        };

        // A freshly (re)initialized descriptor has no baseline worth
        // diffing against yet, so the first cycle of a chain only ever
        // publishes a full dump; chunk numbering resumes on the cycle
        // after that (spec §4.5, scenario E4).
        let mut computed_baseline: Option<Baseline> = None;
        if request.chunks && !just_initialized {
            let baseline = Baseline::load(self.context.directory())?;
            match handler.compute_incremental(self.context, self.contributors, &descriptor, &baseline)? {
                IncrementalOutcome::CannotCompute => {
                    tracing::warn!("incremental state unusable; forcing full regeneration");
                    descriptor = handler.initialize_properties(self.context.id(), now_millis);
                    just_initialized = true;
                    outcome.regenerated = true;
                }
                IncrementalOutcome::NoChanges => {
                    computed_baseline = Some(baseline);
                }
                IncrementalOutcome::Chunk {
                    ordinals,
                    tombstones,
                    next_baseline,
                } => {
                    let chunk_number = descriptor.chunk_counter;
                    let chunk_path = request
                        .target_dir
                        .join(format!("{PUBLICATION_PREFIX}.{chunk_number}.gz"));
                    let context = self.context;
                    atomic_publish(&chunk_path, |file| {
                        write_dump(file, context, Some(&ordinals), committed_at, &tombstones)
                    })?;
                    if request.checksums {
                        write_checksums(&chunk_path)?;
                    }
                    let chain_id = descriptor.chain_id.clone().unwrap_or_default();
                    descriptor.record_chunk(chunk_number, &chain_id, request.chunk_retention);
                    outcome.chunk_written = Some(chunk_number);
                    outcome.files_written.push(chunk_path);
                    computed_baseline = Some(next_baseline);
                }
            }
        }

        if request.format.includes_legacy() {
            descriptor.legacy_timestamp = Some(format_gmt_timestamp(committed_at));
            let zip_path = request.target_dir.join(format!("{PUBLICATION_PREFIX}.zip"));
            let context = self.context;
            let contributors = self.contributors;
            let max_segments = request.max_legacy_segments;
            atomic_publish_via_path(&zip_path, |tmp| {
                write_legacy_archive(context, contributors, tmp, max_segments, committed_at)
            })?;
            if request.checksums {
                write_checksums(&zip_path)?;
            }
            outcome.files_written.push(zip_path);
        }

        if request.format.includes_v1() {
            descriptor.timestamp = Some(format_gmt_timestamp(committed_at));
            let dump_path = request.target_dir.join(format!("{PUBLICATION_PREFIX}.gz"));
            let context = self.context;
            atomic_publish(&dump_path, |file| write_dump(file, context, None, committed_at, &[]))?;
            if request.checksums {
                write_checksums(&dump_path)?;
            }
            outcome.files_written.push(dump_path);
        }

        // The baseline always tracks "what clients last received in
        // full", independent of whether this cycle happened to request
        // chunks, so a later cycle that does request them diffs against
        // an accurate prior state rather than treating everything as new
        // (spec §4.5; see DESIGN.md for why this departs from a purely
        // Lucene-generation-driven diff).
        let baseline = match computed_baseline {
            Some(baseline) => baseline,
            None => Baseline::from_live_records(self.context)?,
        };
        baseline.write_to(self.context.directory())?;

        descriptor.contributor_ids = Some(contributor_ids_key(self.contributors));
        descriptor.last_seen_commit = self.context.last_committed_at();

        descriptor.write_to(&sidecar_path)?;
        descriptor.write_to(&target_descriptor_path)?;
        if request.checksums {
            write_checksums(&target_descriptor_path)?;
        }
        outcome.files_written.push(target_descriptor_path);

        Ok(outcome)
    }
}

fn validate_target_dir(dir: &Path) -> Result<(), IndexerError> {
    if dir.exists() {
        if !dir.is_dir() {
            return Err(IndexerError::InvalidArgument {
                message: format!("target path {} exists and is not a directory", dir.display()),
            });
        }
    } else {
        std::fs::create_dir_all(dir).map_err(|e| IndexerError::InvalidArgument {
            message: format!("cannot create target directory {}: {e}", dir.display()),
        })?;
    }
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = std::ffi::OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Stream a file's contents via `write`, then atomically publish it with
/// a temp-sibling-plus-rename (spec §7): readers never observe a
/// partially-written file under the final name.
fn atomic_publish(
    path: &Path,
    write: impl FnOnce(&mut std::fs::File) -> Result<(), IndexerError>,
) -> Result<(), IndexerError> {
    let tmp = tmp_sibling(path);
    let result: Result<(), IndexerError> = (|| {
        let mut file = std::fs::File::create(&tmp)?;
        write(&mut file)?;
        file.sync_all()?;
        Ok(())
    })();
    finish_publish(&tmp, path, result)
}

/// As [`atomic_publish`], for writers (like the zip archive) that create
/// the destination file themselves given a path rather than a sink.
fn atomic_publish_via_path(path: &Path, write: impl FnOnce(&Path) -> Result<(), IndexerError>) -> Result<(), IndexerError> {
    let tmp = tmp_sibling(path);
    let result = write(&tmp);
    finish_publish(&tmp, path, result)
}

fn finish_publish(tmp: &Path, path: &Path, result: Result<(), IndexerError>) -> Result<(), IndexerError> {
    match result {
        Ok(()) => {
            std::fs::rename(tmp, path)?;
            Ok(())
        }
        Err(error) => {
            let _ = std::fs::remove_file(tmp);
            Err(error)
        }
    }
}
