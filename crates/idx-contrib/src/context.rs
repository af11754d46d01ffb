//! The per-artifact working context contributors populate (spec §4.2, §4.4).

use idx_model::{ArtifactInfo, Coordinate};
use std::path::PathBuf;

/// A recoverable, per-artifact failure. Never propagated as a `Result`
/// error (spec §7): accumulated here and surfaced only through the
/// scanning listener's callbacks.
#[derive(Debug, Clone)]
pub struct PerArtifactError {
    pub contributor_id: String,
    pub message: String,
}

impl std::fmt::Display for PerArtifactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.contributor_id, self.message)
    }
}

/// The tuple the scanner hands to contributors and the scanning listener:
/// the artifact's on-disk siblings, its coordinate, its in-progress
/// `ArtifactInfo`, and any errors accumulated so far (spec §4.4).
pub struct ArtifactContext {
    pub coordinate: Coordinate,
    pub pom_file: Option<PathBuf>,
    pub artifact_file: Option<PathBuf>,
    pub metadata_file: Option<PathBuf>,
    pub info: ArtifactInfo,
    pub errors: Vec<PerArtifactError>,
}

impl ArtifactContext {
    pub fn new(coordinate: Coordinate) -> Self {
        let info = ArtifactInfo {
            group_id: coordinate.group_id.clone(),
            artifact_id: coordinate.artifact_id.clone(),
            version: coordinate.version.clone(),
            classifier: coordinate.classifier.clone(),
            extension: coordinate.extension.clone(),
            ..ArtifactInfo::default()
        };
        Self {
            coordinate,
            pom_file: None,
            artifact_file: None,
            metadata_file: None,
            info,
            errors: Vec::new(),
        }
    }

    /// Record a non-fatal, per-artifact failure from `contributor_id`.
    /// Never aborts the scan (spec §4.2, §7).
    pub fn push_error(&mut self, contributor_id: &str, message: impl Into<String>) {
        self.errors.push(PerArtifactError {
            contributor_id: contributor_id.to_string(),
            message: message.into(),
        });
    }
}
