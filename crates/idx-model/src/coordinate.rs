//! GAV+ artifact coordinates, the UINFO identity key, and path recognition.

use std::fmt;

/// Joins UINFO components; never occurs inside a well-formed coordinate
/// component (group/artifact/version/classifier/extension).
pub const FIELD_SEPARATOR: char = '|';

/// Token written in place of an absent classifier in a UINFO string.
pub const NO_CLASSIFIER: &str = "NA";

/// The two Maven metadata filenames the scanner treats as metadata
/// siblings rather than indexable artifacts.
pub const METADATA_FILENAMES: &[&str] = &["maven-metadata.xml", "maven-metadata-local.xml"];

/// A `(groupId, artifactId, version, classifier?, extension)` tuple — the
/// canonical identity of an artifact file within a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: Option<String>,
    pub extension: String,
}

impl Coordinate {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        classifier: Option<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            classifier,
            extension: extension.into(),
        }
    }

    /// The canonical, case-sensitive, stable identity key: `g|a|v|c|e`,
    /// `NA` standing in for an absent classifier. This is the primary
    /// identity of a record and must never be confused with [`Coordinate::base_version`]
    /// grouping, which is coarser.
    pub fn uinfo(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}{sep}{}{sep}{}",
            self.group_id,
            self.artifact_id,
            self.version,
            self.classifier.as_deref().unwrap_or(NO_CLASSIFIER),
            self.extension,
            sep = FIELD_SEPARATOR,
        )
    }

    /// The baseVersion: strips a `-<timestamp>-<buildNumber>` snapshot
    /// suffix to `<base>-SNAPSHOT`, so that `1.0-20240102.030405-7` and
    /// `1.0-SNAPSHOT` group together. Used only for grouping, never for
    /// UINFO — the UINFO retains the artifact's literal version.
    pub fn base_version(&self) -> String {
        base_version_of(&self.version)
    }

    /// Parse a coordinate back out of its own [`Coordinate::uinfo`]
    /// encoding (`g|a|v|c|e`, `NA` standing in for an absent classifier).
    pub fn from_uinfo(uinfo: &str) -> Option<Coordinate> {
        let parts: Vec<&str> = uinfo.split(FIELD_SEPARATOR).collect();
        let [group_id, artifact_id, version, classifier, extension] = parts[..] else {
            return None;
        };
        let classifier = (classifier != NO_CLASSIFIER).then(|| classifier.to_string());
        Some(Coordinate::new(group_id, artifact_id, version, classifier, extension))
    }
}

impl fmt::Display for Coordinate {
    /// `g:a:v[:c]:e` — for diagnostics and logging only. Never use this as
    /// a lookup key; [`Coordinate::uinfo`] is the canonical identity.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.classifier {
            Some(c) => write!(
                f,
                "{}:{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.version, c, self.extension
            ),
            None => write!(
                f,
                "{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.version, self.extension
            ),
        }
    }
}

/// Strip a timestamped snapshot suffix (`-yyyyMMdd.HHmmss-<build>`) from a
/// version string, normalizing it to `<base>-SNAPSHOT`. Versions already
/// ending in the literal `-SNAPSHOT`, or not matching the pattern at all,
/// are returned unchanged.
fn base_version_of(version: &str) -> String {
    let Some((base, timestamp, build)) = split_snapshot_suffix(version) else {
        return version.to_string();
    };
    let _ = (timestamp, build);
    format!("{base}-SNAPSHOT")
}

/// Split `<base>-yyyyMMdd.HHmmss-<build>` into `(base, timestamp, build)`.
fn split_snapshot_suffix(version: &str) -> Option<(&str, &str, &str)> {
    let (rest, build) = version.rsplit_once('-')?;
    if build.is_empty() || !build.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (base, timestamp) = rest.rsplit_once('-')?;
    if !is_timestamp_token(timestamp) {
        return None;
    }
    Some((base, timestamp, build))
}

/// `yyyyMMdd.HHmmss` — 8 digits, a literal dot, 6 digits.
fn is_timestamp_token(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 15
        && bytes[..8].iter().all(u8::is_ascii_digit)
        && bytes[8] == b'.'
        && bytes[9..].iter().all(u8::is_ascii_digit)
}

/// Recognize a repository-relative path of the form
/// `g1/g2/.../artifactId/version/artifactId-version[-classifier].extension[.ext2]`.
///
/// Returns `None` for paths that don't match an artifact file's layout —
/// callers should separately check [`is_metadata_file`] for repository
/// metadata files, which this function never parses as a coordinate.
///
/// Unknown extensions are preserved verbatim; there is no silent fallback
/// to `jar` here — that defaulting, where it happens at all, is a
/// packaging-driven decision made by a field contributor, not the parser.
pub fn parse_from_path(path: &str) -> Option<Coordinate> {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    if parts.len() < 4 {
        return None;
    }
    let filename = *parts.last().unwrap();
    if is_metadata_file(filename) {
        return None;
    }
    let version = parts[parts.len() - 2];
    let artifact_id = parts[parts.len() - 3];
    let group_id = parts[..parts.len() - 3].join(".");
    if group_id.is_empty() {
        return None;
    }

    let (classifier, extension) = parse_filename(artifact_id, version, filename)?;
    Some(Coordinate::new(
        group_id,
        artifact_id,
        version,
        classifier,
        extension,
    ))
}

/// Whether `filename` is a repository metadata file rather than an artifact.
pub fn is_metadata_file(filename: &str) -> bool {
    METADATA_FILENAMES.contains(&filename)
}

fn parse_filename(artifact_id: &str, version: &str, filename: &str) -> Option<(Option<String>, String)> {
    let prefix = format!("{artifact_id}-{version}");
    let rest = filename.strip_prefix(&prefix)?;
    if let Some(after_dash) = rest.strip_prefix('-') {
        let dot = after_dash.find('.')?;
        let classifier = after_dash[..dot].to_string();
        let extension = after_dash[dot + 1..].to_string();
        if extension.is_empty() {
            return None;
        }
        Some((Some(classifier), extension))
    } else {
        let extension = rest.strip_prefix('.')?.to_string();
        if extension.is_empty() {
            return None;
        }
        Some((None, extension))
    }
}

/// Mutable, partially-populated artifact info accumulated by the scanner and
/// field contributors before it is frozen into a [`crate::record::Record`]
/// (spec §4.2). Distinct from `Record`: this is the write-side staging
/// area; `Record` is the read-side, already-typed-and-flagged form.
#[derive(Debug, Clone, Default)]
pub struct ArtifactInfo {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: Option<String>,
    pub extension: String,
    pub packaging: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub last_modified: i64,
    pub file_size: u64,
    pub sha1: Option<String>,
    pub classnames: Vec<String>,
}

impl ArtifactInfo {
    /// Compute the `Coordinate` this info currently describes (spec §4.1
    /// `calculateGav`).
    pub fn calculate_gav(&self) -> Coordinate {
        Coordinate::new(
            self.group_id.clone(),
            self.artifact_id.clone(),
            self.version.clone(),
            self.classifier.clone(),
            self.extension.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uinfo_uses_pipe_separator_and_na_classifier() {
        let c = Coordinate::new("org.ex", "a", "1.0", None, "jar");
        assert_eq!(c.uinfo(), "org.ex|a|1.0|NA|jar");
    }

    #[test]
    fn from_uinfo_round_trips_with_uinfo() {
        let c = Coordinate::new("org.ex", "a", "1.0", Some("sources".into()), "jar");
        let parsed = Coordinate::from_uinfo(&c.uinfo()).unwrap();
        assert_eq!(parsed, c);
    }

    #[test]
    fn uinfo_with_classifier() {
        let c = Coordinate::new("org.ex", "a", "1.0", Some("sources".into()), "jar");
        assert_eq!(c.uinfo(), "org.ex|a|1.0|sources|jar");
    }

    #[test]
    fn base_version_strips_timestamped_snapshot() {
        let c = Coordinate::new("org.ex", "a", "1.0-20240102.030405-7", None, "jar");
        assert_eq!(c.base_version(), "1.0-SNAPSHOT");
    }

    #[test]
    fn base_version_literal_snapshot_unchanged() {
        let c = Coordinate::new("org.ex", "a", "1.0-SNAPSHOT", None, "jar");
        assert_eq!(c.base_version(), "1.0-SNAPSHOT");
    }

    #[test]
    fn base_version_release_unchanged() {
        let c = Coordinate::new("org.ex", "a", "1.0", None, "jar");
        assert_eq!(c.base_version(), "1.0");
    }

    #[test]
    fn uinfo_is_stable_for_timestamped_and_literal_snapshot_separately() {
        let ts = Coordinate::new("org.ex", "a", "1.0-20240102.030405-7", None, "jar");
        let lit = Coordinate::new("org.ex", "a", "1.0-SNAPSHOT", None, "jar");
        assert_ne!(ts.uinfo(), lit.uinfo());
        assert_eq!(ts.base_version(), lit.base_version());
    }

    #[test]
    fn parse_simple_jar() {
        let c = parse_from_path("org/ex/a/1.0/a-1.0.jar").unwrap();
        assert_eq!(c.group_id, "org.ex");
        assert_eq!(c.artifact_id, "a");
        assert_eq!(c.version, "1.0");
        assert_eq!(c.classifier, None);
        assert_eq!(c.extension, "jar");
    }

    #[test]
    fn parse_with_classifier() {
        let c = parse_from_path("org/ex/a/1.0/a-1.0-sources.jar").unwrap();
        assert_eq!(c.classifier.as_deref(), Some("sources"));
        assert_eq!(c.extension, "jar");
    }

    #[test]
    fn parse_unknown_extension_preserved_verbatim() {
        let c = parse_from_path("org/ex/a/1.0/a-1.0.module").unwrap();
        assert_eq!(c.extension, "module");
    }

    #[test]
    fn parse_rejects_metadata_file() {
        assert!(parse_from_path("org/ex/a/maven-metadata.xml").is_none());
        assert!(is_metadata_file("maven-metadata.xml"));
        assert!(is_metadata_file("maven-metadata-local.xml"));
    }

    #[test]
    fn parse_rejects_malformed_path() {
        assert!(parse_from_path("a/1.0/a-1.0.jar").is_none());
        assert!(parse_from_path("not-an-artifact-path").is_none());
    }

    #[test]
    fn parse_deep_group_id() {
        let c = parse_from_path("org/jetbrains/kotlinx/kotlinx-coroutines-core/1.8.0/kotlinx-coroutines-core-1.8.0.pom")
            .unwrap();
        assert_eq!(c.group_id, "org.jetbrains.kotlinx");
        assert_eq!(c.artifact_id, "kotlinx-coroutines-core");
        assert_eq!(c.extension, "pom");
    }
}
