use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::LazyLock;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::Error;

const DEFAULT_SETTINGS_FILE: &str = "accred";
const DEFAULT_OUTPUT_DIR: &str = "data/results";

/// Built-in label table, compiled once.
#[cfg(test)]
pub static DEFAULT_LABELS: LazyLock<Labels> =
    LazyLock::new(|| Labels::compile(&LabelPatterns::default()).unwrap());

// ── Settings ──

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub labels: LabelPatterns,
    pub locate: LocatePatterns,
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            labels: LabelPatterns::default(),
            locate: LocatePatterns::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// Defaults, then `accred.toml` (or an explicit file), then `ACCRED__*` env vars.
pub fn load(path: Option<&Path>) -> Result<Settings> {
    let builder = match path {
        Some(p) => Config::builder().add_source(File::from(p)),
        None => Config::builder().add_source(File::with_name(DEFAULT_SETTINGS_FILE).required(false)),
    };
    builder
        .add_source(Environment::with_prefix("ACCRED").separator("__"))
        .build()
        .context("reading settings")?
        .try_deserialize::<Settings>()
        .context("parsing settings")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatePatterns {
    pub professors: String,
    /// Tie-breaker on `path` when several links look like the professors file.
    /// Unset means `professors` is tried on the path.
    pub professors_path: Option<String>,
    pub subjects: String,
    pub subjects_name: String,
}

impl Default for LocatePatterns {
    fn default() -> Self {
        LocatePatterns {
            professors: r"Knjiga\snastavnika".into(),
            professors_path: None,
            subjects: r"Knjiga\spredmeta".into(),
            subjects_name: r"(?i)Tabela".into(),
        }
    }
}

// ── Label table ──

/// Fields of a subject-detail table that are found by their row label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectField {
    School,
    StudiesProgramme,
    Subject,
    Professor,
    SubjectStatus,
    Espb,
    Condition,
    ClassHours,
    ClassPoints,
}

impl SubjectField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::School => "school",
            Self::StudiesProgramme => "studies_programme",
            Self::Subject => "subject",
            Self::Professor => "professor",
            Self::SubjectStatus => "subject_status",
            Self::Espb => "espb",
            Self::Condition => "condition",
            Self::ClassHours => "class_hours",
            Self::ClassPoints => "class_points",
        }
    }
}

/// Raw (uncompiled) label patterns. All are matched case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelPatterns {
    pub professor_name: String,
    pub subject_list_start: String,
    pub subject_list_end: String,
    /// Row labels of subject-detail tables; anchored at the start of the first cell.
    /// Entries given in settings override the built-in ones field by field.
    pub subject_fields: BTreeMap<SubjectField, String>,
    pub theory_classes: String,
    pub practical_classes: String,
    /// Two groups: the bracketed code and the remaining name.
    pub subject_code: String,
    pub points_caption: String,
}

impl Default for LabelPatterns {
    fn default() -> Self {
        LabelPatterns {
            professor_name: r"ime\s+i\s+prezime".into(),
            subject_list_start: r"spisak\s+predmeta.*?akreditovan".into(),
            subject_list_end: r"reprezentativne\s+reference".into(),
            subject_fields: default_subject_fields(),
            theory_classes: r"teorijsk\w*\s+nastav\w*\s*:?".into(),
            practical_classes: r"praktičn\w*\s+nastav\w*\s*:?".into(),
            subject_code: r"^(\[[\p{L}\p{N}._/-]+\])\s*(.*)$".into(),
            points_caption: r"^poena$".into(),
        }
    }
}

fn default_subject_fields() -> BTreeMap<SubjectField, String> {
    use SubjectField::*;
    BTreeMap::from([
        (School, r"^(?:visokoškolska\s+ustanova|škola|fakultet)(?:[^:]*:)?".to_string()),
        (StudiesProgramme, r"^studijsk\w*\s+program\w*(?:[^:]*:)?".to_string()),
        (Subject, r"^naziv\s+predmeta(?:[^:]*:)?".to_string()),
        (Professor, r"^nastavni\w*(?:[^:]*:)?".to_string()),
        (SubjectStatus, r"^status\s+predmeta(?:[^:]*:)?".to_string()),
        (Espb, r"^broj\s+espb(?:[^:]*:)?".to_string()),
        (Condition, r"^uslov\w*(?:[^:]*:)?".to_string()),
        (ClassHours, r"^broj\s+časova\s+aktivne\s+nastave(?:[^:]*:)?".to_string()),
        (ClassPoints, r"^ocena\s+znanja".to_string()),
    ])
}

/// Compiled label table handed to the extractors.
#[derive(Debug, Clone)]
pub struct Labels {
    pub professor_name: Regex,
    pub subject_list_start: Regex,
    pub subject_list_end: Regex,
    pub subject_fields: Vec<(SubjectField, Regex)>,
    pub theory_classes: Regex,
    pub practical_classes: Regex,
    pub subject_code: Regex,
    pub points_caption: Regex,
}

impl Labels {
    pub fn compile(patterns: &LabelPatterns) -> crate::error::Result<Labels> {
        let mut fields = default_subject_fields();
        fields.extend(patterns.subject_fields.clone());
        let subject_fields = fields
            .iter()
            .map(|(field, pat)| Ok((*field, build(field.as_str(), pat)?)))
            .collect::<crate::error::Result<Vec<_>>>()?;

        Ok(Labels {
            professor_name: build("professor_name", &patterns.professor_name)?,
            subject_list_start: build("subject_list_start", &patterns.subject_list_start)?,
            subject_list_end: build("subject_list_end", &patterns.subject_list_end)?,
            subject_fields,
            theory_classes: build("theory_classes", &patterns.theory_classes)?,
            practical_classes: build("practical_classes", &patterns.practical_classes)?,
            subject_code: build("subject_code", &patterns.subject_code)?,
            points_caption: build("points_caption", &patterns.points_caption)?,
        })
    }

    /// First subject field whose label starts `cell`, with the label's match.
    pub fn classify_subject_row<'c>(&self, cell: &'c str) -> Option<(SubjectField, &'c str)> {
        self.subject_fields.iter().find_map(|(field, re)| {
            re.find(cell).map(|m| (*field, &cell[m.end()..]))
        })
    }
}

fn build(field: &str, pattern: &str) -> crate::error::Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|source| Error::InvalidPattern {
            field: field.to_string(),
            source,
        })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_compile() {
        let labels = &*DEFAULT_LABELS;
        assert_eq!(labels.subject_fields.len(), 9);
        assert!(labels.professor_name.is_match("IME I PREZIME"));
    }

    #[test]
    fn classify_rows_by_label() {
        let labels = &*DEFAULT_LABELS;
        let (field, rest) = labels
            .classify_subject_row("Naziv predmeta: Programiranje 1")
            .unwrap();
        assert_eq!(field, SubjectField::Subject);
        assert_eq!(rest.trim(), "Programiranje 1");

        let (field, rest) = labels
            .classify_subject_row("Nastavnik/nastavnici: Petar Petrović")
            .unwrap();
        assert_eq!(field, SubjectField::Professor);
        assert_eq!(rest.trim(), "Petar Petrović");

        assert!(labels.classify_subject_row("Cilj predmeta").is_none());
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let patterns = LabelPatterns {
            professor_name: "(unclosed".into(),
            ..Default::default()
        };
        let err = Labels::compile(&patterns).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { ref field, .. } if field == "professor_name"));
    }

    #[test]
    fn partial_field_override_keeps_other_defaults() {
        let mut patterns = LabelPatterns::default();
        patterns.subject_fields = BTreeMap::from([(SubjectField::Espb, r"^espb\s+bodovi".to_string())]);
        let labels = Labels::compile(&patterns).unwrap();
        assert_eq!(labels.subject_fields.len(), 9);
        assert!(matches!(
            labels.classify_subject_row("ESPB bodovi 6"),
            Some((SubjectField::Espb, _))
        ));
        assert!(matches!(
            labels.classify_subject_row("Status predmeta: obavezni"),
            Some((SubjectField::SubjectStatus, _))
        ));
    }

    #[test]
    fn load_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accred.toml");
        std::fs::write(
            &path,
            "output_dir = \"out\"\n\n[locate]\nprofessors = \"Nastavnici\"\n\n[labels.subject_fields]\nespb = \"^bodovi\"\n",
        )
        .unwrap();
        let settings = load(Some(&path)).unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("out"));
        assert_eq!(settings.locate.professors, "Nastavnici");
        assert_eq!(settings.locate.subjects, r"Knjiga\spredmeta");
        assert_eq!(settings.labels.subject_fields[&SubjectField::Espb], "^bodovi");
        assert_eq!(settings.labels.professor_name, r"ime\s+i\s+prezime");
    }
}
