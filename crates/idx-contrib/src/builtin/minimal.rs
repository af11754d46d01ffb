//! The required field subset every record carries (spec §3): UINFO,
//! last-modified, file size, packaging, and the coordinate components.

use crate::context::ArtifactContext;
use crate::contributor::Contributor;
use idx_model::record::{
    FieldFlags, FIELD_ARTIFACT_ID, FIELD_CLASSIFIER, FIELD_EXTENSION, FIELD_FILE_SIZE,
    FIELD_GROUP_ID, FIELD_LAST_MODIFIED, FIELD_PACKAGING, FIELD_UINFO, FIELD_VERSION,
};
use idx_model::{ArtifactInfo, Record};

pub struct MinimalArtifactInfoContributor;

impl Contributor for MinimalArtifactInfoContributor {
    fn id(&self) -> &str {
        "minimal"
    }

    fn populate(&self, ctx: &mut ArtifactContext) {
        if let Some(path) = &ctx.artifact_file {
            if let Ok(meta) = std::fs::metadata(path) {
                ctx.info.file_size = meta.len();
                if let Ok(modified) = meta.modified() {
                    if let Ok(since_epoch) = modified.duration_since(std::time::UNIX_EPOCH) {
                        ctx.info.last_modified = since_epoch.as_millis() as i64;
                    }
                }
            }
        }
        if ctx.info.packaging.is_none() {
            ctx.info.packaging = Some(ctx.info.extension.clone());
        }
    }

    fn update_document(&self, info: &ArtifactInfo, record: &mut Record) {
        record.set(
            FIELD_UINFO,
            info.calculate_gav().uinfo(),
            FieldFlags::STORED_INDEXED,
        );
        record.set(FIELD_GROUP_ID, &info.group_id, FieldFlags::STORED_INDEXED);
        record.set(FIELD_ARTIFACT_ID, &info.artifact_id, FieldFlags::STORED_INDEXED);
        record.set(FIELD_VERSION, &info.version, FieldFlags::STORED_INDEXED);
        record.set(
            FIELD_CLASSIFIER,
            info.classifier.as_deref().unwrap_or(idx_model::coordinate::NO_CLASSIFIER),
            FieldFlags::STORED_INDEXED,
        );
        record.set(FIELD_EXTENSION, &info.extension, FieldFlags::STORED_INDEXED);
        record.set(
            FIELD_LAST_MODIFIED,
            info.last_modified.to_string(),
            FieldFlags::STORED_ONLY,
        );
        record.set(FIELD_FILE_SIZE, info.file_size.to_string(), FieldFlags::STORED_ONLY);
        if let Some(packaging) = &info.packaging {
            record.set(FIELD_PACKAGING, packaging, FieldFlags::STORED_INDEXED);
        }
    }

    fn update_artifact_info(&self, record: &Record, info: &mut ArtifactInfo) {
        if let Some(v) = record.get(FIELD_GROUP_ID) {
            info.group_id = v.to_string();
        }
        if let Some(v) = record.get(FIELD_ARTIFACT_ID) {
            info.artifact_id = v.to_string();
        }
        if let Some(v) = record.get(FIELD_VERSION) {
            info.version = v.to_string();
        }
        if let Some(v) = record.get(FIELD_CLASSIFIER) {
            info.classifier = (v != idx_model::coordinate::NO_CLASSIFIER).then(|| v.to_string());
        }
        if let Some(v) = record.get(FIELD_EXTENSION) {
            info.extension = v.to_string();
        }
        if let Some(v) = record.get(FIELD_LAST_MODIFIED) {
            info.last_modified = v.parse().unwrap_or_default();
        }
        if let Some(v) = record.get(FIELD_FILE_SIZE) {
            info.file_size = v.parse().unwrap_or_default();
        }
        if let Some(v) = record.get(FIELD_PACKAGING) {
            info.packaging = Some(v.to_string());
        }
    }

    fn supports_legacy(&self) -> bool {
        true
    }

    fn update_legacy_document(&self, info: &ArtifactInfo, record: &mut Record) {
        self.update_document(info, record);
    }
}
