//! POM metadata contributor: pulls `name`, `description`, and `packaging`
//! out of the sibling POM when one is present (spec §3, §4.2).

use crate::context::ArtifactContext;
use crate::contributor::Contributor;
use idx_model::record::{FieldFlags, FIELD_DESCRIPTION, FIELD_NAME, FIELD_PACKAGING};
use idx_model::{ArtifactInfo, Record};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

pub struct PomContributor;

impl Contributor for PomContributor {
    fn id(&self) -> &str {
        "pom"
    }

    fn populate(&self, ctx: &mut ArtifactContext) {
        let Some(pom_file) = ctx.pom_file.clone() else {
            return;
        };
        let content = match std::fs::read_to_string(&pom_file) {
            Ok(c) => c,
            Err(e) => {
                ctx.push_error(self.id(), format!("failed to read POM: {e}"));
                return;
            }
        };
        match parse_pom(&content) {
            Ok(parsed) => {
                if ctx.info.name.is_none() {
                    ctx.info.name = parsed.name;
                }
                if ctx.info.description.is_none() {
                    ctx.info.description = parsed.description;
                }
                if ctx.info.packaging.is_none() {
                    ctx.info.packaging = parsed.packaging;
                }
            }
            Err(e) => ctx.push_error(self.id(), format!("malformed POM: {e}")),
        }
    }

    fn update_document(&self, info: &ArtifactInfo, record: &mut Record) {
        if let Some(name) = &info.name {
            record.set(FIELD_NAME, name, FieldFlags::STORED_INDEXED);
        }
        if let Some(description) = &info.description {
            record.set(FIELD_DESCRIPTION, description, FieldFlags::STORED_INDEXED);
        }
        if let Some(packaging) = &info.packaging {
            record.set(FIELD_PACKAGING, packaging, FieldFlags::STORED_INDEXED);
        }
    }

    fn update_artifact_info(&self, record: &Record, info: &mut ArtifactInfo) {
        if let Some(v) = record.get(FIELD_NAME) {
            info.name = Some(v.to_string());
        }
        if let Some(v) = record.get(FIELD_DESCRIPTION) {
            info.description = Some(v.to_string());
        }
        if let Some(v) = record.get(FIELD_PACKAGING) {
            info.packaging = Some(v.to_string());
        }
    }
}

#[derive(Default)]
struct ParsedPom {
    name: Option<String>,
    description: Option<String>,
    packaging: Option<String>,
}

/// Pull only the top-level `name`/`description`/`packaging` elements out of
/// a POM, ignoring everything nested under `<dependencies>`,
/// `<build>`, `<profiles>`, or any element named `project` children other
/// than depth 1 — a full Maven model is out of scope (spec §3 Non-goals).
fn parse_pom(xml: &str) -> Result<ParsedPom, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parsed = ParsedPom::default();
    let mut depth = 0u32;
    let mut capturing: Option<&'static str> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                if depth == 2 {
                    capturing = match e.local_name().as_ref() {
                        b"name" => Some("name"),
                        b"description" => Some("description"),
                        b"packaging" => Some("packaging"),
                        _ => None,
                    };
                }
            }
            Event::Text(t) => {
                if let Some(field) = capturing {
                    let text = t.unescape()?.into_owned();
                    match field {
                        "name" => parsed.name = Some(text),
                        "description" => parsed.description = Some(text),
                        "packaging" => parsed.packaging = Some(text),
                        _ => unreachable!(),
                    }
                }
            }
            Event::End(_) => {
                if depth == 2 {
                    capturing = None;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use idx_model::Coordinate;
    use tempfile::TempDir;

    #[test]
    fn populate_reads_name_description_packaging() {
        let dir = TempDir::new().unwrap();
        let pom = dir.path().join("a-1.0.pom");
        std::fs::write(
            &pom,
            r#"<project>
                <name>My Artifact</name>
                <description>Does a thing</description>
                <packaging>war</packaging>
                <dependencies>
                    <dependency><name>ignored</name></dependency>
                </dependencies>
            </project>"#,
        )
        .unwrap();

        let coord = Coordinate::new("org.ex", "a", "1.0", None, "jar");
        let mut ctx = ArtifactContext::new(coord);
        ctx.pom_file = Some(pom);

        PomContributor.populate(&mut ctx);
        assert_eq!(ctx.info.name.as_deref(), Some("My Artifact"));
        assert_eq!(ctx.info.description.as_deref(), Some("Does a thing"));
        assert_eq!(ctx.info.packaging.as_deref(), Some("war"));
    }

    #[test]
    fn populate_without_pom_is_noop() {
        let coord = Coordinate::new("org.ex", "a", "1.0", None, "jar");
        let mut ctx = ArtifactContext::new(coord);
        PomContributor.populate(&mut ctx);
        assert!(ctx.info.name.is_none());
        assert!(ctx.errors.is_empty());
    }

    #[test]
    fn populate_records_error_on_malformed_xml() {
        let dir = TempDir::new().unwrap();
        let pom = dir.path().join("a-1.0.pom");
        std::fs::write(&pom, "<project><name>unterminated").unwrap();

        let coord = Coordinate::new("org.ex", "a", "1.0", None, "jar");
        let mut ctx = ArtifactContext::new(coord);
        ctx.pom_file = Some(pom);

        PomContributor.populate(&mut ctx);
        assert_eq!(ctx.errors.len(), 1);
    }
}
