//! Artifact coordinate and record model shared by every indexer crate.
//!
//! See [`coordinate`] for the GAV+ coordinate and UINFO key, and [`record`]
//! for the typed artifact record the indexing context stores.

pub mod coordinate;
pub mod record;

pub use coordinate::{ArtifactInfo, Coordinate};
pub use record::{FieldFlags, Record, RecordField};
