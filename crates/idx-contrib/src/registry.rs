//! The ordered contributor set a context holds (spec §4.2, §4.3 `getIndexCreators`).

use crate::context::ArtifactContext;
use crate::contributor::Contributor;
use idx_model::Record;
use std::sync::Arc;

/// An ordered, immutable set of contributors. Cheaply cloneable (an
/// `Arc<Vec<_>>`) so the indexing context and the scanner can each hold
/// their own handle to the same registered set.
#[derive(Clone)]
pub struct ContributorRegistry {
    contributors: Arc<Vec<Box<dyn Contributor>>>,
}

impl ContributorRegistry {
    pub fn new(contributors: Vec<Box<dyn Contributor>>) -> Self {
        Self {
            contributors: Arc::new(contributors),
        }
    }

    pub fn ids(&self) -> Vec<&str> {
        self.contributors.iter().map(|c| c.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Box<dyn Contributor>> {
        self.contributors.iter()
    }

    /// Run every contributor's `populate` against `ctx`, in registration
    /// order, to completion before any `update_document` runs (spec §4.2).
    pub fn populate_all(&self, ctx: &mut ArtifactContext) {
        for c in self.contributors.iter() {
            c.populate(ctx);
        }
    }

    /// Write every contributor's fields into `record`.
    pub fn update_document_all(&self, ctx: &ArtifactContext, record: &mut Record) {
        for c in self.contributors.iter() {
            c.update_document(&ctx.info, record);
        }
    }

    /// Rebuild every legacy-capable contributor's fields into `record`
    /// (spec §4.7). Contributors without legacy support are skipped.
    pub fn update_legacy_document_all(&self, ctx: &ArtifactContext, record: &mut Record) {
        for c in self.contributors.iter() {
            if c.supports_legacy() {
                c.update_legacy_document(&ctx.info, record);
            }
        }
    }

    /// The inverse of `update_document_all`: reconstruct `ctx.info` from a
    /// previously-written `record` (used when rebuilding artifacts for the
    /// legacy archive from the live index rather than from disk).
    pub fn update_artifact_info_all(&self, record: &Record, ctx: &mut ArtifactContext) {
        for c in self.contributors.iter() {
            c.update_artifact_info(record, &mut ctx.info);
        }
    }
}
