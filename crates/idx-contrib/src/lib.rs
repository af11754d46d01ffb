//! Field contributors: the plugin seam that turns on-disk artifact
//! evidence into typed, flagged record fields (spec §4.2).

pub mod builtin;
pub mod context;
pub mod contributor;
pub mod registry;

pub use builtin::{default_contributors, default_registry};
pub use context::{ArtifactContext, PerArtifactError};
pub use contributor::Contributor;
pub use registry::ContributorRegistry;
