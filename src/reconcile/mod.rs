//! Bidirectional cross-check between professor declarations and subject records.

pub mod names;
pub mod scope;

use tracing::info;

use crate::model::{
    DeclaredSubject, MismatchCandidate, MismatchKind, ProfessorRecord, ProfessorToSubjectEntry,
    ReconciliationResult, SubjectDeclaration, SubjectRecord, SubjectToProfessorEntry,
    UnmatchedEntry,
};

/// Run both directions. Only the professors' scoped `subjects` take part.
pub fn reconcile(professors: &[ProfessorRecord], subjects: &[SubjectRecord]) -> ReconciliationResult {
    let (prof_to_subj_not_found, subj_to_prof_not_found) = rayon::join(
        || professors_to_subjects(professors, subjects),
        || subjects_to_professors(subjects, professors),
    );
    info!(
        "reconciled: {} declarations unmatched, {} subject records unmatched",
        prof_to_subj_not_found.len(),
        subj_to_prof_not_found.len()
    );
    ReconciliationResult {
        prof_to_subj_not_found,
        subj_to_prof_not_found,
    }
}

fn professors_to_subjects(
    professors: &[ProfessorRecord],
    subjects: &[SubjectRecord],
) -> Vec<ProfessorToSubjectEntry> {
    let mut out = Vec::new();
    for prof in professors {
        for decl in &prof.subjects {
            let checks = subjects
                .iter()
                .filter(|rec| is_candidate(decl, rec))
                .map(|rec| (check(prof.name(), decl, rec), rec));
            if let Some(potential_matches) = settle(checks) {
                out.push(UnmatchedEntry {
                    source: DeclaredSubject {
                        professor_key: prof.table_key,
                        professor: prof.name().to_string(),
                        declaration: decl.clone(),
                    },
                    potential_matches,
                });
            }
        }
    }
    out
}

fn subjects_to_professors(
    subjects: &[SubjectRecord],
    professors: &[ProfessorRecord],
) -> Vec<SubjectToProfessorEntry> {
    subjects
        .iter()
        .filter_map(|rec| {
            let checks = professors.iter().flat_map(|prof| {
                prof.subjects
                    .iter()
                    .filter(|decl| is_candidate(decl, rec))
                    .map(move |decl| (check(prof.name(), decl, rec), prof))
            });
            settle(checks).map(|potential_matches| UnmatchedEntry {
                source: rec.clone(),
                potential_matches,
            })
        })
        .collect()
}

/// Same code on both sides: exact code equality, or the code appearing in
/// the record's display string. A blank code is never a candidate.
fn is_candidate(decl: &SubjectDeclaration, rec: &SubjectRecord) -> bool {
    let code = decl.code.trim();
    if code.is_empty() {
        return false;
    }
    rec.subject_code.as_deref().map(str::trim) == Some(code) || contains_ci(rec.subject(), code)
}

/// `None` when the pair is confirmed, else the first check it failed.
fn check(professor: &str, decl: &SubjectDeclaration, rec: &SubjectRecord) -> Option<MismatchKind> {
    if !contains_ci(rec.professor(), professor.trim()) {
        return Some(MismatchKind::ProfessorNameMismatch);
    }
    let declared = decl.name.trim().to_lowercase();
    let recorded = rec.subject_name().trim().to_lowercase();
    if !declared.contains(&recorded) && !recorded.contains(&declared) {
        return Some(MismatchKind::SubjectNameMismatch);
    }
    None
}

/// Walk the candidates in order. A confirmed one ends the walk with `None`;
/// otherwise every failed candidate is returned.
fn settle<'a, R: Clone + 'a>(
    checks: impl Iterator<Item = (Option<MismatchKind>, &'a R)>,
) -> Option<Vec<MismatchCandidate<R>>> {
    let mut potential = Vec::new();
    for (verdict, record) in checks {
        match verdict {
            None => return None,
            Some(kind) => potential.push(MismatchCandidate {
                kind,
                record: record.clone(),
            }),
        }
    }
    Some(potential)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(code: &str, name: &str) -> SubjectDeclaration {
        SubjectDeclaration {
            index: "1".into(),
            code: code.into(),
            name: name.into(),
            kind: "Predavanja".into(),
            studies_programme: "Softversko inženjerstvo".into(),
            studies_type: "OAS".into(),
        }
    }

    fn professor(key: usize, name: &str, subjects: Vec<SubjectDeclaration>) -> ProfessorRecord {
        ProfessorRecord {
            table_key: key,
            name: Some(name.into()),
            subjects_all: subjects.clone(),
            subjects,
            ..Default::default()
        }
    }

    fn subject(key: usize, code: Option<&str>, text: &str, name: &str, professor: &str) -> SubjectRecord {
        SubjectRecord {
            table_key: key,
            studies_programme: Some("Softversko inženjerstvo".into()),
            subject: Some(text.into()),
            subject_code: code.map(String::from),
            subject_name: Some(name.into()),
            professor: Some(professor.into()),
            ..Default::default()
        }
    }

    #[test]
    fn consistent_data_has_nothing_unmatched() {
        let profs = vec![
            professor(1, "Petar Petrović", vec![decl("13E1OOP", "Objektno orijentisano programiranje")]),
            professor(2, "Ana Anić", vec![decl("13E1OOP", "Objektno orijentisano programiranje")]),
        ];
        let subjects = vec![subject(
            1,
            Some("[13E1OOP]"),
            "[13E1OOP] Objektno orijentisano programiranje",
            "Objektno orijentisano programiranje",
            "Petar Petrović, Ana Anić",
        )];
        let result = reconcile(&profs, &subjects);
        assert!(result.prof_to_subj_not_found.is_empty());
        assert!(result.subj_to_prof_not_found.is_empty());
    }

    #[test]
    fn code_found_inside_display_string() {
        // no bracketed code on the record, only its display text carries it
        let profs = vec![professor(1, "Ana Anić", vec![decl("13E1BP", "Baze podataka")])];
        let subjects = vec![subject(1, None, "13E1BP Baze podataka", "Baze podataka", "dr Ana Anić")];
        let result = reconcile(&profs, &subjects);
        assert!(result.prof_to_subj_not_found.is_empty());
        assert!(result.subj_to_prof_not_found.is_empty());
    }

    #[test]
    fn hard_miss_both_ways() {
        let profs = vec![professor(1, "Ana Anić", vec![decl("13E1WEB", "Veb programiranje")])];
        let subjects = vec![subject(1, Some("[17E2MA]"), "[17E2MA] Mašinsko učenje", "Mašinsko učenje", "Marko Marković")];
        let result = reconcile(&profs, &subjects);
        assert_eq!(result.prof_to_subj_not_found.len(), 1);
        assert!(result.prof_to_subj_not_found[0].is_hard_miss());
        assert_eq!(result.prof_to_subj_not_found[0].source.professor_key, 1);
        assert_eq!(result.subj_to_prof_not_found.len(), 1);
        assert!(result.subj_to_prof_not_found[0].is_hard_miss());
    }

    #[test]
    fn mismatches_tagged_by_first_failed_check() {
        let profs = vec![
            professor(1, "Petar M. Petrović", vec![decl("13E1BP", "Baze podataka")]),
            professor(3, "Jovan Jovanović", vec![decl("13E1BP", "Baze podataka")]),
        ];
        let subjects = vec![subject(
            2,
            Some("[13E1BP]"),
            "[13E1BP] Sistemi baza podataka",
            "Sistemi baza podataka",
            "Jovan Jovanović",
        )];
        let result = reconcile(&profs, &subjects);

        let kinds: Vec<MismatchKind> = result
            .prof_to_subj_not_found
            .iter()
            .map(|e| {
                assert_eq!(e.potential_matches.len(), 1);
                e.potential_matches[0].kind
            })
            .collect();
        assert_eq!(
            kinds,
            vec![MismatchKind::ProfessorNameMismatch, MismatchKind::SubjectNameMismatch]
        );

        let reverse = &result.subj_to_prof_not_found;
        assert_eq!(reverse.len(), 1);
        let kinds: Vec<(MismatchKind, usize)> = reverse[0]
            .potential_matches
            .iter()
            .map(|c| (c.kind, c.record.table_key))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (MismatchKind::ProfessorNameMismatch, 1),
                (MismatchKind::SubjectNameMismatch, 3)
            ]
        );
    }

    #[test]
    fn blank_code_has_no_candidates() {
        let profs = vec![professor(1, "Ana Anić", vec![decl("  ", "Veb programiranje")])];
        let subjects = vec![subject(1, None, "Veb programiranje", "Veb programiranje", "Ana Anić")];
        let result = reconcile(&profs, &subjects);
        assert!(result.prof_to_subj_not_found[0].is_hard_miss());
        assert!(result.subj_to_prof_not_found[0].is_hard_miss());
    }

    #[test]
    fn fixture_documents_end_to_end() {
        use crate::config::DEFAULT_LABELS;
        use crate::index::ReferenceIndex;
        use crate::reconcile::scope::{filter, Scope};

        let profs = std::fs::read_to_string("tests/fixtures/professors.html").unwrap();
        let subjects = std::fs::read_to_string("tests/fixtures/subjects.html").unwrap();
        let mut index = ReferenceIndex::build(&profs, &subjects, &DEFAULT_LABELS);
        let scope = Scope::new("Softversko inženjerstvo", Some("OAS".into()));
        index.apply_scope(&scope);

        let result = reconcile(&index.professors, &index.subjects);
        let unmatched: Vec<(&str, &str)> = result
            .prof_to_subj_not_found
            .iter()
            .map(|e| (e.source.professor.as_str(), e.source.declaration.code.as_str()))
            .collect();
        assert_eq!(
            unmatched,
            vec![
                ("Petar M. Petrović", "13E1OOP"),
                ("Petar M. Petrović", "13E1BP"),
                ("Ana Anić", "13E1WEB"),
                ("Jovan Jovanović", "13E1BP"),
            ]
        );
        let reverse: Vec<&str> = result
            .subj_to_prof_not_found
            .iter()
            .map(|e| e.source.subject_code.as_deref().unwrap_or(""))
            .collect();
        assert_eq!(reverse, vec!["[13E1BP]", "[17E2MA]"]);

        let f = filter(&result, &scope);
        assert_eq!(f.prof_to_subj_not_found.len(), 1);
        assert_eq!(f.prof_to_subj_not_found[0].source.declaration.code, "13E1WEB");
        assert!(f.subj_to_prof_not_found.is_empty());
        assert_eq!(f.prof_to_subj_pot_matches_prof_name.len(), 2);
        assert_eq!(f.prof_to_subj_pot_matches_prof_name_middle.len(), 1);
        assert_eq!(
            f.prof_to_subj_pot_matches_prof_name_middle[0].source.declaration.code,
            "13E1BP"
        );
        assert_eq!(f.prof_to_subj_pot_matches_subj_name.len(), 1);
        assert_eq!(f.subj_to_prof_pot_matches_prof_name.len(), 1);
        assert_eq!(f.subj_to_prof_pot_matches_prof_name_middle.len(), 1);
        assert_eq!(f.subj_to_prof_pot_matches_subj_name.len(), 1);
    }

    #[test]
    fn only_scoped_declarations_take_part() {
        let mut prof = professor(1, "Ana Anić", vec![]);
        prof.subjects_all = vec![decl("13E1WEB", "Veb programiranje")];
        let result = reconcile(&[prof], &[]);
        assert!(result.prof_to_subj_not_found.is_empty());
    }
}
