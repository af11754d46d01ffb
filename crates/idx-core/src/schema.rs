//! The tantivy schema backing the durable indexing context (spec §4.3).
//!
//! Every record field is carried as a `STORED` text field so the original
//! value round-trips byte-for-byte; `uinfo` additionally gets a raw,
//! untokenized indexed variant (`uinfo_raw`) used for the exact-match
//! delete-by-UINFO upsert, and `lastModified` additionally gets a `u64`
//! fast field for range queries and ordering.

use idx_model::record::{FIELD_LAST_MODIFIED, FIELD_UINFO};
use tantivy::schema::{
    Field, Schema, SchemaBuilder, FAST, INDEXED, STORED, STRING, TEXT,
};

/// Suffix appended to the raw, untokenized mirror of `uinfo`.
pub const UINFO_RAW_SUFFIX: &str = "_raw";

pub struct IndexSchema {
    pub schema: Schema,
    pub uinfo: Field,
    pub uinfo_raw: Field,
    pub last_modified: Field,
    pub last_modified_fast: Field,
}

impl IndexSchema {
    /// Build the fixed schema this workspace's format version uses. The
    /// record model's field set is closed (spec §3), so this schema is
    /// built once rather than derived per-context.
    pub fn build() -> Self {
        let mut builder = SchemaBuilder::new();

        let uinfo = builder.add_text_field(FIELD_UINFO, TEXT | STORED);
        let uinfo_raw = builder.add_text_field(
            &format!("{FIELD_UINFO}{UINFO_RAW_SUFFIX}"),
            STRING | STORED | INDEXED,
        );
        let last_modified = builder.add_text_field(FIELD_LAST_MODIFIED, STORED);
        let last_modified_fast =
            builder.add_u64_field(&format!("{FIELD_LAST_MODIFIED}_fast"), FAST | STORED);

        for other in [
            idx_model::record::FIELD_GROUP_ID,
            idx_model::record::FIELD_ARTIFACT_ID,
            idx_model::record::FIELD_VERSION,
            idx_model::record::FIELD_CLASSIFIER,
            idx_model::record::FIELD_EXTENSION,
            idx_model::record::FIELD_PACKAGING,
            idx_model::record::FIELD_FILE_SIZE,
            idx_model::record::FIELD_SHA1,
            idx_model::record::FIELD_NAME,
            idx_model::record::FIELD_DESCRIPTION,
            idx_model::record::FIELD_CLASSNAMES,
            idx_model::record::FIELD_CONTEXT_ID,
            idx_model::record::FIELD_FORMAT_VERSION,
            idx_model::record::DESCRIPTOR_FIELD,
        ] {
            builder.add_text_field(other, TEXT | STORED);
        }

        let schema = builder.build();
        Self {
            schema,
            uinfo,
            uinfo_raw,
            last_modified,
            last_modified_fast,
        }
    }

    pub fn field(&self, name: &str) -> Option<Field> {
        self.schema.get_field(name).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_resolves_every_known_record_field() {
        let s = IndexSchema::build();
        for name in [
            idx_model::record::FIELD_UINFO,
            idx_model::record::FIELD_GROUP_ID,
            idx_model::record::FIELD_SHA1,
            idx_model::record::DESCRIPTOR_FIELD,
        ] {
            assert!(s.field(name).is_some(), "missing field {name}");
        }
    }
}
