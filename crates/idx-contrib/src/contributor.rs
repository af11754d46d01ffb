//! The field contributor contract (spec §4.2, §9).

use crate::context::ArtifactContext;
use idx_model::{ArtifactInfo, Record};

/// A pluggable unit that enriches artifact records with domain-specific
/// fields.
///
/// Registered once per indexing context, in a stable order; `populate`
/// runs to completion for every contributor before `update_document` runs
/// for any, so later contributors may read enrichments earlier ones made
/// to the shared `ArtifactContext` (spec §4.2).
pub trait Contributor: Send + Sync {
    /// Stable, unique id for this contributor (used for diagnostics and
    /// for the descriptor's recorded contributor set, spec §4.5).
    fn id(&self) -> &str;

    /// Enrich `ctx.info` from on-disk evidence. Failures are confined to
    /// `ctx.errors`; this method itself never returns an error — a
    /// contributor that cannot do its job leaves the context as it found
    /// it and records why.
    fn populate(&self, ctx: &mut ArtifactContext);

    /// Write this contributor's fields into `record` from `info`.
    fn update_document(&self, info: &ArtifactInfo, record: &mut Record);

    /// The inverse of `update_document`: reconstruct fields of `info` from
    /// a previously-written `record` (used when reading a record back).
    fn update_artifact_info(&self, record: &Record, info: &mut ArtifactInfo);

    /// Whether this contributor also supports the legacy record shape
    /// (spec §4.7). Tested by this tag rather than by downcasting to a
    /// concrete type (spec §9) — most contributors answer `false`.
    fn supports_legacy(&self) -> bool {
        false
    }

    /// Rebuild this contributor's fields into the legacy document shape.
    /// Only called when [`Contributor::supports_legacy`] returns `true`.
    fn update_legacy_document(&self, _info: &ArtifactInfo, _record: &mut Record) {}
}
