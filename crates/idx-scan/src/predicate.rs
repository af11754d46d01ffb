//! The artifact-file predicate and default skip-directory list (spec §4.4).

/// Sidecar suffixes that parse as a valid (if unusual) extension but are
/// never themselves indexable artifacts.
const NON_ARTIFACT_SUFFIXES: &[&str] = &["sha1", "md5", "asc", "sha256", "sha512"];

/// Whether a coordinate's extension should be treated as an indexable
/// artifact rather than a checksum or signature sidecar.
pub fn is_artifact_extension(extension: &str) -> bool {
    match extension.rsplit_once('.') {
        Some((_, suffix)) => !NON_ARTIFACT_SUFFIXES.contains(&suffix),
        None => !NON_ARTIFACT_SUFFIXES.contains(&extension),
    }
}

/// Directory names the scanner skips outright (spec §4.4): dotfiles and
/// the index's own working state.
pub fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.') || name == ".index" || name == ".meta"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_checksum_and_signature_suffixes() {
        assert!(!is_artifact_extension("jar.sha1"));
        assert!(!is_artifact_extension("sha1"));
        assert!(!is_artifact_extension("pom.asc"));
        assert!(is_artifact_extension("jar"));
        assert!(is_artifact_extension("pom"));
    }

    #[test]
    fn skips_dotdirs_and_index_state() {
        assert!(is_skipped_dir(".git"));
        assert!(is_skipped_dir(".index"));
        assert!(is_skipped_dir(".meta"));
        assert!(!is_skipped_dir("org"));
    }
}
