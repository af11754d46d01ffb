//! The typed artifact record stored by the indexing context (spec §3).

/// Sentinel field name identifying the descriptor record. Readers key on
/// this field *name*, never on ordinal position, so a descriptor record
/// tolerates reordering within the dump (spec §9).
pub const DESCRIPTOR_FIELD: &str = "DESCRIPTOR";
/// Content token written into the descriptor field.
pub const DESCRIPTOR_VALUE: &str = "NexusIndex";

pub const FIELD_UINFO: &str = "uinfo";
pub const FIELD_GROUP_ID: &str = "groupId";
pub const FIELD_ARTIFACT_ID: &str = "artifactId";
pub const FIELD_VERSION: &str = "version";
pub const FIELD_CLASSIFIER: &str = "classifier";
pub const FIELD_EXTENSION: &str = "extension";
pub const FIELD_PACKAGING: &str = "packaging";
pub const FIELD_LAST_MODIFIED: &str = "lastModified";
pub const FIELD_FILE_SIZE: &str = "fileSize";
pub const FIELD_SHA1: &str = "sha1";
pub const FIELD_NAME: &str = "name";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_CLASSNAMES: &str = "classnames";
/// Context id + format version, carried only on the descriptor record.
pub const FIELD_CONTEXT_ID: &str = "contextId";
pub const FIELD_FORMAT_VERSION: &str = "formatVersion";
/// Marks a record as a deletion tombstone (spec §8 scenario E3): present
/// with value `"true"` alongside `uinfo` only, carrying no other fields.
pub const FIELD_DELETED: &str = "deleted";

/// Orthogonal per-field flags (spec §3): whether a field round-trips
/// through storage, participates in the full-text index, and is exposed
/// to client-side search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldFlags {
    pub stored: bool,
    pub indexed: bool,
    pub searchable: bool,
}

impl FieldFlags {
    pub const STORED_ONLY: FieldFlags = FieldFlags {
        stored: true,
        indexed: false,
        searchable: false,
    };
    pub const STORED_INDEXED: FieldFlags = FieldFlags {
        stored: true,
        indexed: true,
        searchable: true,
    };
    pub const INDEXED_ONLY: FieldFlags = FieldFlags {
        stored: false,
        indexed: true,
        searchable: true,
    };
}

/// A single named, typed, flagged field within a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordField {
    pub name: String,
    pub value: String,
    pub flags: FieldFlags,
}

/// A typed mapping from field name to value (spec §3).
///
/// Backed by an insertion-ordered `Vec` rather than a map: records are
/// small (a handful of fields), contributors read each other's
/// enrichments by name, and unknown field names from a future format
/// version must survive a read/write round-trip in whatever order they
/// arrived — a property a `Vec` preserves for free.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<RecordField>,
}

impl Record {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Set a field's value and flags, replacing any prior value under the
    /// same name (a contributor re-populating a field it already wrote).
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>, flags: FieldFlags) {
        let name = name.into();
        if let Some(existing) = self.fields.iter_mut().find(|f| f.name == name) {
            existing.value = value.into();
            existing.flags = flags;
        } else {
            self.fields.push(RecordField {
                name,
                value: value.into(),
                flags,
            });
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    pub fn uinfo(&self) -> Option<&str> {
        self.get(FIELD_UINFO)
    }

    pub fn last_modified(&self) -> Option<i64> {
        self.get(FIELD_LAST_MODIFIED)?.parse().ok()
    }

    /// Whether this is the sentinel descriptor record (spec §3, §9):
    /// identified by the presence of [`DESCRIPTOR_FIELD`], not by
    /// position within the dump.
    pub fn is_descriptor(&self) -> bool {
        self.get(DESCRIPTOR_FIELD) == Some(DESCRIPTOR_VALUE)
    }

    /// Build the sentinel descriptor record carrying the context id and
    /// format version (spec §3).
    pub fn descriptor(context_id: &str, format_version: u8) -> Self {
        let mut r = Record::new();
        r.set(DESCRIPTOR_FIELD, DESCRIPTOR_VALUE, FieldFlags::STORED_ONLY);
        r.set(FIELD_CONTEXT_ID, context_id, FieldFlags::STORED_ONLY);
        r.set(
            FIELD_FORMAT_VERSION,
            format_version.to_string(),
            FieldFlags::STORED_ONLY,
        );
        r
    }

    /// Build a deletion tombstone for `uinfo` (spec §8 scenario E3):
    /// carries only the UINFO and the deleted marker.
    pub fn tombstone(uinfo: &str) -> Self {
        let mut r = Record::new();
        r.set(FIELD_UINFO, uinfo, FieldFlags::STORED_INDEXED);
        r.set(FIELD_DELETED, "true", FieldFlags::STORED_ONLY);
        r
    }

    /// Whether this record is a deletion tombstone rather than a live
    /// artifact record.
    pub fn is_tombstone(&self) -> bool {
        self.get(FIELD_DELETED) == Some("true")
    }
}
