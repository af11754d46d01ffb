//! The packer orchestrator (spec §4.8) and digester (spec §4.9): drives
//! a single publication cycle producing the full dump, incremental
//! chunks, the legacy archive, the descriptor, and their checksums.

pub mod digest;
pub mod packer;
pub mod request;

pub use digest::write_checksums;
pub use packer::{Packer, PublicationOutcome, PUBLICATION_PREFIX};
pub use request::{Format, PackerRequest};
