//! Picks the professors and subjects documents out of a project's hyperlinks.

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::LocatePatterns;
use crate::error::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperlink {
    pub name: String,
    #[serde(default)]
    pub desc: String,
    pub path: String,
    /// Text of the line the link sits on.
    #[serde(default)]
    pub line: String,
}

impl Hyperlink {
    fn haystack(&self) -> String {
        format!("{} {} {}", self.name, self.desc, self.line)
    }
}

pub fn load_links(path: &Path) -> Result<Vec<Hyperlink>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Compiled locator patterns.
#[derive(Debug, Clone)]
pub struct Locator {
    professors: Regex,
    professors_path: Regex,
    subjects: Regex,
    subjects_name: Regex,
}

impl Locator {
    pub fn new(patterns: &LocatePatterns) -> crate::error::Result<Self> {
        // without its own path pattern the professors pattern is tried on paths too
        let path_pattern = patterns
            .professors_path
            .as_deref()
            .unwrap_or(&patterns.professors);
        Ok(Locator {
            professors: compile("locate.professors", &patterns.professors)?,
            professors_path: compile("locate.professors_path", path_pattern)?,
            subjects: compile("locate.subjects", &patterns.subjects)?,
            subjects_name: compile("locate.subjects_name", &patterns.subjects_name)?,
        })
    }

    /// First link that looks like the professors document. Among several, the
    /// first whose path also matches wins.
    pub fn professors_file<'a>(&self, links: &'a [Hyperlink]) -> Option<&'a Hyperlink> {
        let hits: Vec<&Hyperlink> = links
            .iter()
            .filter(|l| self.professors.is_match(&l.haystack()))
            .collect();
        if hits.len() > 1 {
            info!("{} candidate professors files", hits.len());
            if let Some(hit) = hits.iter().find(|l| self.professors_path.is_match(&l.path)) {
                debug!("professors file by path: {}", hit.path);
                return Some(*hit);
            }
        }
        hits.first().copied()
    }

    pub fn subjects_file<'a>(&self, links: &'a [Hyperlink]) -> Option<&'a Hyperlink> {
        links.iter().find(|l| {
            self.subjects.is_match(&l.haystack()) && self.subjects_name.is_match(&l.name)
        })
    }
}

fn compile(field: &str, pattern: &str) -> crate::error::Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::InvalidPattern {
        field: field.to_string(),
        source,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> Vec<Hyperlink> {
        load_links(Path::new("tests/fixtures/links.json")).unwrap()
    }

    #[test]
    fn professors_file_prefers_matching_path() {
        let locator = Locator::new(&LocatePatterns::default()).unwrap();
        let links = links();
        let hit = locator.professors_file(&links).unwrap();
        assert_eq!(hit.path, "docs/Knjiga nastavnika.docx");
    }

    #[test]
    fn explicit_path_pattern() {
        let patterns = LocatePatterns {
            professors_path: Some("arhiva".into()),
            ..Default::default()
        };
        let locator = Locator::new(&patterns).unwrap();
        let links = links();
        let hit = locator.professors_file(&links).unwrap();
        assert_eq!(hit.path, "docs/arhiva/knjiga_nastavnika_2019.docx");
    }

    #[test]
    fn no_path_match_falls_back_to_first_hit() {
        let patterns = LocatePatterns {
            professors_path: Some("nepostojeci".into()),
            ..Default::default()
        };
        let locator = Locator::new(&patterns).unwrap();
        let links = links();
        assert_eq!(
            locator.professors_file(&links).unwrap().path,
            "docs/arhiva/knjiga_nastavnika_2019.docx"
        );
    }

    #[test]
    fn subjects_file_needs_table_name() {
        let locator = Locator::new(&LocatePatterns::default()).unwrap();
        let links = links();
        let hit = locator.subjects_file(&links).unwrap();
        assert_eq!(hit.path, "docs/Knjiga predmeta.docx");
    }

    #[test]
    fn nothing_found() {
        let locator = Locator::new(&LocatePatterns::default()).unwrap();
        let links = vec![Hyperlink {
            name: "Standard 1".into(),
            path: "docs/Strategija.pdf".into(),
            ..Default::default()
        }];
        assert!(locator.professors_file(&links).is_none());
        assert!(locator.subjects_file(&links).is_none());
    }

    #[test]
    fn bad_pattern() {
        let patterns = LocatePatterns {
            subjects: "[".into(),
            ..Default::default()
        };
        assert!(matches!(
            Locator::new(&patterns),
            Err(Error::InvalidPattern { ref field, .. }) if field == "locate.subjects"
        ));
    }
}
