use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Labels;
use crate::model::{
    ProfessorListEntry, ProfessorRecord, ProfessorTable, SubjectListEntry, SubjectRecord,
    SubjectTable,
};
use crate::parser;
use crate::reconcile::scope::Scope;

/// Everything extracted from one professors document and one subjects document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceIndex {
    pub professor_list: Vec<ProfessorListEntry>,
    pub professors: Vec<ProfessorRecord>,
    pub subject_list: Vec<SubjectListEntry>,
    pub subjects: Vec<SubjectRecord>,
}

impl ReferenceIndex {
    pub fn new(professors: Vec<ProfessorTable>, subjects: Vec<SubjectTable>) -> Self {
        let mut index = ReferenceIndex::default();
        for table in professors {
            match table {
                ProfessorTable::ProfList { data, .. } => index.professor_list = data,
                ProfessorTable::ProfTables { data, .. } => index.professors = data,
            }
        }
        for table in subjects {
            match table {
                SubjectTable::SubjList { data, .. } => index.subject_list = data,
                SubjectTable::SubjTables { data, .. } => index.subjects = data,
            }
        }
        index
    }

    /// Extract both documents.
    pub fn build(professors_html: &str, subjects_html: &str, labels: &Labels) -> Self {
        let (professors, subjects) = rayon::join(
            || parser::read_professors(professors_html, labels),
            || parser::read_subjects(subjects_html, labels),
        );
        let index = Self::new(professors, subjects);
        info!(
            "indexed {} professors ({} listed), {} subjects ({} listed)",
            index.professors.len(),
            index.professor_list.len(),
            index.subjects.len(),
            index.subject_list.len()
        );
        index
    }

    /// Recompute every professor's `subjects` from `subjects_all`.
    pub fn apply_scope(&mut self, scope: &Scope) {
        for prof in &mut self.professors {
            prof.subjects = prof
                .subjects_all
                .iter()
                .filter(|d| scope.admits_declaration(d))
                .cloned()
                .collect();
        }
    }

    pub fn declarations(&self) -> usize {
        self.professors.iter().map(|p| p.subjects.len()).sum()
    }
}

// ── Tests ──
