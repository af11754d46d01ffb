//! The scanning listener contract (spec §4.4) and its default
//! implementation wired to an [`IndexingContext`].

use idx_contrib::{ArtifactContext, ContributorRegistry};
use idx_core::IndexingContext;
use idx_util::errors::IndexerError;
use std::path::Path;

/// Aggregate counts reported at the end of a scan.
#[derive(Debug, Default, Clone)]
pub struct ScanStats {
    pub files_visited: u64,
    pub artifacts_discovered: u64,
    pub artifact_errors: u64,
}

/// Progress callbacks a scan reports to (spec §4.4): `scanStarted`,
/// `scanningFile`, `artifactDiscovered`, `scanFinished`.
pub trait ScanningListener {
    fn scan_started(&mut self, _repository_root: &Path) {}
    fn scanning_file(&mut self, _path: &Path) {}

    /// Called once per coalesced artifact. Implementations decide what
    /// happens to it (the default listener populates and indexes it).
    fn artifact_discovered(&mut self, ctx: &mut ArtifactContext);

    fn scan_finished(&mut self, _stats: &ScanStats) {}
}

/// The default listener (spec §4.4): runs every contributor's `populate`,
/// then hands the context to [`IndexingContext::add_artifact`], which
/// itself builds the document from the same contributor set.
pub struct DefaultScanningListener<'a> {
    contributors: ContributorRegistry,
    context: &'a mut IndexingContext,
    errors: Vec<(String, IndexerError)>,
}

impl<'a> DefaultScanningListener<'a> {
    pub fn new(context: &'a mut IndexingContext) -> Self {
        let contributors = context.index_creators().clone();
        Self {
            contributors,
            context,
            errors: Vec::new(),
        }
    }

    /// Errors `add_artifact` raised for individual artifacts, paired with
    /// the artifact's UINFO. The scan itself continues past these (spec
    /// §4.4); callers decide whether to surface them.
    pub fn errors(&self) -> &[(String, IndexerError)] {
        &self.errors
    }
}

impl ScanningListener for DefaultScanningListener<'_> {
    fn artifact_discovered(&mut self, ctx: &mut ArtifactContext) {
        self.contributors.populate_all(ctx);
        if let Err(e) = self.context.add_artifact(ctx) {
            tracing::warn!(uinfo = %ctx.coordinate.uinfo(), error = %e, "failed to index artifact");
            self.errors.push((ctx.coordinate.uinfo(), e));
        }
    }
}
