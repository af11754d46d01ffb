//! JAR contents contributor: peeks a JAR's central directory for
//! fully-qualified classnames (spec §3, §4.2). Skipped for non-JAR
//! extensions; a corrupt zip is a recoverable per-artifact error, never
//! a fatal one.

use crate::context::ArtifactContext;
use crate::contributor::Contributor;
use idx_model::record::{FieldFlags, FIELD_CLASSNAMES};
use idx_model::{ArtifactInfo, Record};

const JAR_LIKE_EXTENSIONS: &[&str] = &["jar", "war", "ear", "aar"];

pub struct JarFileContentsContributor;

impl Contributor for JarFileContentsContributor {
    fn id(&self) -> &str {
        "jar-contents"
    }

    fn populate(&self, ctx: &mut ArtifactContext) {
        if !JAR_LIKE_EXTENSIONS.contains(&ctx.coordinate.extension.as_str()) {
            return;
        }
        let Some(artifact_file) = ctx.artifact_file.clone() else {
            return;
        };
        match read_classnames(&artifact_file) {
            Ok(names) => ctx.info.classnames = names,
            Err(e) => ctx.push_error(self.id(), format!("failed to read jar contents: {e}")),
        }
    }

    fn update_document(&self, info: &ArtifactInfo, record: &mut Record) {
        if !info.classnames.is_empty() {
            record.set(
                FIELD_CLASSNAMES,
                info.classnames.join("\n"),
                FieldFlags::INDEXED_ONLY,
            );
        }
    }

    fn update_artifact_info(&self, record: &Record, info: &mut ArtifactInfo) {
        if let Some(v) = record.get(FIELD_CLASSNAMES) {
            info.classnames = v.lines().map(str::to_string).collect();
        }
    }
}

fn read_classnames(path: &std::path::Path) -> Result<Vec<String>, String> {
    let file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| e.to_string())?;

    let mut names = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(|e| e.to_string())?;
        let entry_name = entry.name();
        if let Some(class) = entry_name.strip_suffix(".class") {
            if !class.contains('$') {
                names.push(class.replace('/', "."));
            }
        }
    }
    Ok(names)
}
