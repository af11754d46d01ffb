//! The depth-first repository scanner (spec §4.4).

use crate::listener::{ScanStats, ScanningListener};
use crate::predicate::{is_artifact_extension, is_skipped_dir};
use idx_contrib::ArtifactContext;
use idx_model::coordinate::{is_metadata_file, parse_from_path};
use idx_model::Coordinate;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Grouping key used to coalesce sibling POM/JAR/metadata files into one
/// artifact (spec §4.4): everything but the extension.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct CoalesceKey {
    group_id: String,
    artifact_id: String,
    version: String,
    classifier: Option<String>,
}

struct DirEntryInfo {
    path: PathBuf,
    coordinate: Coordinate,
}

/// Walks a repository tree depth-first, coalescing sibling files that
/// share a coordinate into a single [`ArtifactContext`] per directory
/// (spec §4.4), and reports progress through a [`ScanningListener`].
pub struct Scanner {
    repository_root: PathBuf,
}

impl Scanner {
    pub fn new(repository_root: impl Into<PathBuf>) -> Self {
        Self {
            repository_root: repository_root.into(),
        }
    }

    pub fn scan(&self, listener: &mut dyn ScanningListener) -> std::io::Result<ScanStats> {
        let mut stats = ScanStats::default();
        listener.scan_started(&self.repository_root);
        self.walk_dir(&self.repository_root, listener, &mut stats)?;
        listener.scan_finished(&stats);
        Ok(stats)
    }

    fn walk_dir(
        &self,
        dir: &Path,
        listener: &mut dyn ScanningListener,
        stats: &mut ScanStats,
    ) -> std::io::Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(dir)?.filter_map(|e| e.ok()).collect();
        entries.sort_by_key(|e| e.file_name());

        let mut artifact_entries: Vec<DirEntryInfo> = Vec::new();
        let mut metadata_files: Vec<PathBuf> = Vec::new();
        let mut subdirs: Vec<PathBuf> = Vec::new();

        for entry in entries {
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if !is_skipped_dir(&name) {
                    subdirs.push(path);
                }
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            stats.files_visited += 1;
            listener.scanning_file(&path);

            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if is_metadata_file(&file_name) {
                metadata_files.push(path);
                continue;
            }

            let Ok(relative) = path.strip_prefix(&self.repository_root) else {
                continue;
            };
            let relative_str = relative.to_string_lossy().replace(std::path::MAIN_SEPARATOR, "/");
            let Some(coordinate) = parse_from_path(&relative_str) else {
                continue;
            };
            if !is_artifact_extension(&coordinate.extension) {
                continue;
            }
            artifact_entries.push(DirEntryInfo { path, coordinate });
        }

        self.coalesce_and_report(artifact_entries, metadata_files, listener, stats);

        for subdir in subdirs {
            self.walk_dir(&subdir, listener, stats)?;
        }
        Ok(())
    }

    fn coalesce_and_report(
        &self,
        entries: Vec<DirEntryInfo>,
        metadata_files: Vec<PathBuf>,
        listener: &mut dyn ScanningListener,
        stats: &mut ScanStats,
    ) {
        let mut groups: BTreeMap<CoalesceKey, Vec<DirEntryInfo>> = BTreeMap::new();
        for entry in entries {
            let key = CoalesceKey {
                group_id: entry.coordinate.group_id.clone(),
                artifact_id: entry.coordinate.artifact_id.clone(),
                version: entry.coordinate.version.clone(),
                classifier: entry.coordinate.classifier.clone(),
            };
            groups.entry(key).or_default().push(entry);
        }

        for (key, mut members) in groups {
            members.sort_by(|a, b| a.coordinate.extension.cmp(&b.coordinate.extension));
            let pom = members
                .iter()
                .position(|m| m.coordinate.extension == "pom")
                .map(|i| members.remove(i));
            let primary = if !members.is_empty() {
                Some(members.remove(0))
            } else {
                None
            };

            let extension = primary
                .as_ref()
                .map(|p| p.coordinate.extension.clone())
                .unwrap_or_else(|| "pom".to_string());
            let coordinate = Coordinate::new(
                key.group_id,
                key.artifact_id,
                key.version,
                key.classifier,
                extension,
            );

            let mut ctx = ArtifactContext::new(coordinate);
            ctx.pom_file = pom.map(|p| p.path);
            ctx.artifact_file = primary.map(|p| p.path);
            ctx.metadata_file = metadata_files.first().cloned();

            stats.artifacts_discovered += 1;
            listener.artifact_discovered(&mut ctx);
            stats.artifact_errors += ctx.errors.len() as u64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idx_contrib::ArtifactContext as Ctx;
    use tempfile::TempDir;

    struct RecordingListener {
        discovered: Vec<Ctx>,
    }

    impl ScanningListener for RecordingListener {
        fn artifact_discovered(&mut self, ctx: &mut Ctx) {
            self.discovered.push(ArtifactContext::new(ctx.coordinate.clone()));
            let last = self.discovered.last_mut().unwrap();
            last.pom_file = ctx.pom_file.clone();
            last.artifact_file = ctx.artifact_file.clone();
        }
    }

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn coalesces_pom_and_jar_into_one_artifact() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "org/ex/a/1.0/a-1.0.pom", "<project/>");
        write(dir.path(), "org/ex/a/1.0/a-1.0.jar", "JARDATA");

        let scanner = Scanner::new(dir.path());
        let mut listener = RecordingListener { discovered: Vec::new() };
        let stats = scanner.scan(&mut listener).unwrap();

        assert_eq!(listener.discovered.len(), 1);
        assert_eq!(stats.artifacts_discovered, 1);
        let artifact = &listener.discovered[0];
        assert_eq!(artifact.coordinate.extension, "jar");
        assert!(artifact.pom_file.is_some());
        assert!(artifact.artifact_file.is_some());
    }

    #[test]
    fn pom_only_artifact_keeps_pom_extension() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "org/ex/parent/1.0/parent-1.0.pom", "<project/>");

        let scanner = Scanner::new(dir.path());
        let mut listener = RecordingListener { discovered: Vec::new() };
        scanner.scan(&mut listener).unwrap();

        assert_eq!(listener.discovered.len(), 1);
        assert_eq!(listener.discovered[0].coordinate.extension, "pom");
    }

    #[test]
    fn checksum_sidecars_are_not_separate_artifacts() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "org/ex/a/1.0/a-1.0.jar", "JARDATA");
        write(dir.path(), "org/ex/a/1.0/a-1.0.jar.sha1", "deadbeef");

        let scanner = Scanner::new(dir.path());
        let mut listener = RecordingListener { discovered: Vec::new() };
        scanner.scan(&mut listener).unwrap();

        assert_eq!(listener.discovered.len(), 1);
    }

    #[test]
    fn skips_dotdirs() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".git/objects/foo", "x");
        write(dir.path(), "org/ex/a/1.0/a-1.0.jar", "JARDATA");

        let scanner = Scanner::new(dir.path());
        let mut listener = RecordingListener { discovered: Vec::new() };
        scanner.scan(&mut listener).unwrap();
        assert_eq!(listener.discovered.len(), 1);
    }
}
