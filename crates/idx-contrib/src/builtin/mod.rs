//! Built-in field contributors shipped with the workspace (spec §4.2).

mod jar;
mod minimal;
mod pom;
mod sha1;

pub use jar::JarFileContentsContributor;
pub use minimal::MinimalArtifactInfoContributor;
pub use pom::PomContributor;
pub use sha1::Sha1DigestContributor;

use crate::contributor::Contributor;
use crate::registry::ContributorRegistry;

/// The default contributor set, in the order the minimal identity fields,
/// the digest, the POM metadata, and the JAR contents are populated and
/// written (spec §4.2, §9).
pub fn default_contributors() -> Vec<Box<dyn Contributor>> {
    vec![
        Box::new(MinimalArtifactInfoContributor),
        Box::new(Sha1DigestContributor),
        Box::new(PomContributor),
        Box::new(JarFileContentsContributor),
    ]
}

/// Build the default [`ContributorRegistry`] (spec §4.3 `getIndexCreators`).
pub fn default_registry() -> ContributorRegistry {
    ContributorRegistry::new(default_contributors())
}
