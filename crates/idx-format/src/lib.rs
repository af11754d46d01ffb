//! Wire formats for publication (spec §4.6, §4.7, §6): the v1 gzip dump,
//! the legacy zip archive, and the descriptor properties file.

pub mod descriptor;
pub mod dump;
pub mod legacy;
pub mod wire;

pub use descriptor::{format_gmt_timestamp, Descriptor, DEFAULT_CHUNK_RETENTION, DESCRIPTOR_FILENAME};
pub use dump::{read_dump, write_dump, ParsedDump, FORMAT_VERSION};
pub use legacy::write_legacy_archive;
