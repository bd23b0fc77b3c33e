use serde::{Deserialize, Serialize};

// ── Professors ──

/// One subject row claimed inside a professor table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectDeclaration {
    pub index: String,
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub studies_programme: String,
    pub studies_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessorRecord {
    /// Ordinal of the source table in the professors document.
    pub table_key: usize,
    pub name: Option<String>,
    pub title: Option<String>,
    pub institution: Option<String>,
    pub sci_discipline: Option<String>,
    pub subjects_header: Vec<String>,
    /// Declarations within the report's programme scope; always a subset of `subjects_all`.
    pub subjects: Vec<SubjectDeclaration>,
    pub subjects_all: Vec<SubjectDeclaration>,
}

impl ProfessorRecord {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessorListEntry {
    pub ord_num: String,
    pub prof_name: String,
    pub prof_title: String,
}

/// Professors document as two tagged tables: the summary list and the per-professor tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProfessorTable {
    ProfList {
        data: Vec<ProfessorListEntry>,
        header: Vec<String>,
    },
    ProfTables {
        data: Vec<ProfessorRecord>,
        header: Vec<String>,
    },
}

// ── Subjects ──

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    /// Ordinal of the source table in the subjects document.
    pub table_key: usize,
    pub school: Option<String>,
    pub studies_programme: Option<String>,
    /// Code and name as printed, e.g. `[13E1OOP] Objektno orijentisano programiranje`.
    pub subject: Option<String>,
    pub subject_code: Option<String>,
    pub subject_name: Option<String>,
    /// Free text; may name several professors.
    pub professor: Option<String>,
    pub subject_status: Option<String>,
    pub espb: Option<String>,
    pub condition: Option<String>,
    pub theory_classes: Option<String>,
    pub practical_classes: Option<String>,
    pub class_points: Vec<ClassPoints>,
    pub subjects_header: Vec<String>,
}

impl SubjectRecord {
    pub fn subject(&self) -> &str {
        self.subject.as_deref().unwrap_or("")
    }

    pub fn subject_name(&self) -> &str {
        self.subject_name.as_deref().unwrap_or("")
    }

    pub fn professor(&self) -> &str {
        self.professor.as_deref().unwrap_or("")
    }

    pub fn studies_programme(&self) -> &str {
        self.studies_programme.as_deref().unwrap_or("")
    }
}

/// One graded activity from the assessment block of a subject table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassPoints {
    pub activity: String,
    pub points: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectListEntry {
    pub index: String,
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sem: String,
    pub p: String,
    pub v: String,
    pub don: String,
    pub other: String,
    pub espb: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubjectTable {
    SubjList {
        data: Vec<SubjectListEntry>,
        header: Vec<String>,
    },
    SubjTables {
        data: Vec<SubjectRecord>,
        header: Vec<String>,
    },
}

// ── Reconciliation ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// Codes agree but the professor is not named on the other side.
    ProfessorNameMismatch,
    /// Codes and professor agree but the subject names do not.
    SubjectNameMismatch,
}


/// Same-code record from the other side that failed exactly one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchCandidate<R> {
    pub kind: MismatchKind,
    pub record: R,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedEntry<S, R> {
    pub source: S,
    /// Empty for a hard miss (no record with the same code at all).
    pub potential_matches: Vec<MismatchCandidate<R>>,
}

impl<S, R> UnmatchedEntry<S, R> {
    pub fn is_hard_miss(&self) -> bool {
        self.potential_matches.is_empty()
    }
}

/// A declaration together with the professor who made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredSubject {
    pub professor_key: usize,
    pub professor: String,
    pub declaration: SubjectDeclaration,
}

pub type ProfessorToSubjectEntry = UnmatchedEntry<DeclaredSubject, SubjectRecord>;
pub type SubjectToProfessorEntry = UnmatchedEntry<SubjectRecord, ProfessorRecord>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub prof_to_subj_not_found: Vec<ProfessorToSubjectEntry>,
    pub subj_to_prof_not_found: Vec<SubjectToProfessorEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredResult {
    pub studies_programme: String,
    pub prof_to_subj_not_found: Vec<ProfessorToSubjectEntry>,
    pub subj_to_prof_not_found: Vec<SubjectToProfessorEntry>,
    pub prof_to_subj_pot_matches_prof_name: Vec<ProfessorToSubjectEntry>,
    pub subj_to_prof_pot_matches_prof_name: Vec<SubjectToProfessorEntry>,
    pub prof_to_subj_pot_matches_prof_name_middle: Vec<ProfessorToSubjectEntry>,
    pub subj_to_prof_pot_matches_prof_name_middle: Vec<SubjectToProfessorEntry>,
    pub prof_to_subj_pot_matches_subj_name: Vec<ProfessorToSubjectEntry>,
    pub subj_to_prof_pot_matches_subj_name: Vec<SubjectToProfessorEntry>,
}

// ── Run report ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMeta {
    pub run_at: String,
    pub studies_programme: String,
    pub studies_type: Option<String>,
    pub professors_file: String,
    pub subjects_file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub meta: RunMeta,
    pub reconciliation: ReconciliationResult,
    pub filtered: FilteredResult,
}
