//! Programme scope and the re-bucketing of reconciliation output.

use serde::{Deserialize, Serialize};

use crate::model::{
    FilteredResult, MismatchCandidate, MismatchKind, ReconciliationResult, SubjectDeclaration,
    SubjectRecord, UnmatchedEntry,
};
use crate::reconcile::names;

/// Programme (and optionally studies type) a report is about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub studies_programme: String,
    pub studies_type: Option<String>,
}

impl Scope {
    pub fn new(studies_programme: impl Into<String>, studies_type: Option<String>) -> Self {
        Scope {
            studies_programme: studies_programme.into(),
            studies_type,
        }
    }

    /// An empty target programme admits everything; the type is only checked
    /// when a non-empty target type is set.
    pub fn admits(&self, programme: &str, kind: &str) -> bool {
        loosely_equal(programme, &self.studies_programme)
            && self
                .studies_type
                .as_deref()
                .filter(|t| !t.is_empty())
                .map_or(true, |t| loosely_equal(kind, t))
    }

    pub fn admits_declaration(&self, decl: &SubjectDeclaration) -> bool {
        self.admits(&decl.studies_programme, &decl.studies_type)
    }

    /// Subject records carry no studies type; their programme text stands in for it.
    pub fn admits_record(&self, rec: &SubjectRecord) -> bool {
        self.admits(rec.studies_programme(), rec.studies_programme())
    }
}

/// Case-insensitive equality or containment in either direction.
fn loosely_equal(value: &str, target: &str) -> bool {
    if target.is_empty() {
        return true;
    }
    let value = value.trim().to_lowercase();
    let target = target.trim().to_lowercase();
    value.contains(&target) || target.contains(&value)
}

/// Derive the eight report buckets from a reconciliation result.
/// Never mutates its input.
pub fn filter(result: &ReconciliationResult, scope: &Scope) -> FilteredResult {
    let p2s = &result.prof_to_subj_not_found;
    let s2p = &result.subj_to_prof_not_found;

    let p2s_prof_name = by_kind(p2s, MismatchKind::ProfessorNameMismatch);
    let s2p_prof_name = by_kind(s2p, MismatchKind::ProfessorNameMismatch);

    let p2s_middle = p2s_prof_name
        .iter()
        .filter_map(|e| retain(e, |c| names::still_differ(&e.source.professor, c.record.professor())))
        .collect();
    let s2p_middle = s2p_prof_name
        .iter()
        .filter_map(|e| retain(e, |c| names::still_differ(c.record.name(), e.source.professor())))
        .collect();

    FilteredResult {
        studies_programme: scope.studies_programme.clone(),
        prof_to_subj_not_found: p2s
            .iter()
            .filter(|e| e.is_hard_miss() && scope.admits_declaration(&e.source.declaration))
            .cloned()
            .collect(),
        subj_to_prof_not_found: s2p
            .iter()
            .filter(|e| e.is_hard_miss() && scope.admits_record(&e.source))
            .cloned()
            .collect(),
        prof_to_subj_pot_matches_prof_name_middle: p2s_middle,
        subj_to_prof_pot_matches_prof_name_middle: s2p_middle,
        prof_to_subj_pot_matches_prof_name: p2s_prof_name,
        subj_to_prof_pot_matches_prof_name: s2p_prof_name,
        prof_to_subj_pot_matches_subj_name: by_kind(p2s, MismatchKind::SubjectNameMismatch),
        subj_to_prof_pot_matches_subj_name: by_kind(s2p, MismatchKind::SubjectNameMismatch),
    }
}

fn by_kind<S: Clone, R: Clone>(
    entries: &[UnmatchedEntry<S, R>],
    kind: MismatchKind,
) -> Vec<UnmatchedEntry<S, R>> {
    entries
        .iter()
        .filter_map(|e| retain(e, |c| c.kind == kind))
        .collect()
}

/// Copy of `entry` keeping only the candidates `keep` accepts; `None` when none are left.
fn retain<S: Clone, R: Clone>(
    entry: &UnmatchedEntry<S, R>,
    keep: impl Fn(&MismatchCandidate<R>) -> bool,
) -> Option<UnmatchedEntry<S, R>> {
    let potential_matches: Vec<_> = entry
        .potential_matches
        .iter()
        .filter(|c| keep(c))
        .cloned()
        .collect();
    if potential_matches.is_empty() {
        return None;
    }
    Some(UnmatchedEntry {
        source: entry.source.clone(),
        potential_matches,
    })
}

// ── Tests ──
