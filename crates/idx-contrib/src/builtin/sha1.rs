//! SHA-1 digest contributor: prefers an on-disk `.sha1` sidecar, falling
//! back to computing the digest over the artifact file (spec §3).

use crate::context::ArtifactContext;
use crate::contributor::Contributor;
use idx_model::record::{FieldFlags, FIELD_SHA1};
use idx_model::{ArtifactInfo, Record};

pub struct Sha1DigestContributor;

impl Contributor for Sha1DigestContributor {
    fn id(&self) -> &str {
        "sha1-digest"
    }

    fn populate(&self, ctx: &mut ArtifactContext) {
        let Some(artifact_file) = ctx.artifact_file.clone() else {
            return;
        };
        let sidecar = artifact_file.with_extension(format!(
            "{}.sha1",
            artifact_file
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
        ));
        if let Ok(content) = std::fs::read_to_string(&sidecar) {
            if let Some(hash) = content.split_whitespace().next() {
                ctx.info.sha1 = Some(hash.to_lowercase());
                return;
            }
        }
        match idx_util::hash::sha1_file(&artifact_file) {
            Ok(hash) => ctx.info.sha1 = Some(hash),
            Err(e) => ctx.push_error(self.id(), format!("failed to hash artifact: {e}")),
        }
    }

    fn update_document(&self, info: &ArtifactInfo, record: &mut Record) {
        if let Some(sha1) = &info.sha1 {
            record.set(FIELD_SHA1, sha1, FieldFlags::STORED_INDEXED);
        }
    }

    fn update_artifact_info(&self, record: &Record, info: &mut ArtifactInfo) {
        if let Some(v) = record.get(FIELD_SHA1) {
            info.sha1 = Some(v.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idx_model::Coordinate;
    use tempfile::TempDir;

    #[test]
    fn populate_computes_sha1_without_sidecar() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a-1.0.jar");
        std::fs::write(&file, b"DATA").unwrap();

        let coord = Coordinate::new("org.ex", "a", "1.0", None, "jar");
        let mut ctx = ArtifactContext::new(coord);
        ctx.artifact_file = Some(file);

        Sha1DigestContributor.populate(&mut ctx);
        assert_eq!(
            ctx.info.sha1.as_deref(),
            Some(idx_util::hash::sha1_bytes(b"DATA").as_str())
        );
        assert!(ctx.errors.is_empty());
    }

    #[test]
    fn populate_prefers_sidecar_checksum() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a-1.0.jar");
        std::fs::write(&file, b"DATA").unwrap();
        std::fs::write(dir.path().join("a-1.0.jar.sha1"), "deadbeef  a-1.0.jar\n").unwrap();

        let coord = Coordinate::new("org.ex", "a", "1.0", None, "jar");
        let mut ctx = ArtifactContext::new(coord);
        ctx.artifact_file = Some(file);

        Sha1DigestContributor.populate(&mut ctx);
        assert_eq!(ctx.info.sha1.as_deref(), Some("deadbeef"));
    }
}
