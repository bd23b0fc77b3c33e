use std::collections::BTreeMap;

use serde::Serialize;

use crate::index::ReferenceIndex;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfessorLoad {
    pub name: String,
    pub title: String,
    pub discipline: String,
    /// Declarations within the current scope.
    pub active: usize,
    pub total: usize,
}

/// Overview numbers for one pair of documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub professors: usize,
    pub listed_subjects: usize,
    pub detailed_subjects: usize,
    pub titles: BTreeMap<String, usize>,
    /// Declarations per study programme, over all declarations.
    pub programmes: BTreeMap<String, usize>,
    pub subject_types: BTreeMap<String, usize>,
    pub semesters: BTreeMap<String, usize>,
    pub total_espb: u64,
    pub avg_espb: f64,
    /// Lecture plus exercise hours from the subject list.
    pub total_class_hours: u64,
    pub avg_subjects_per_professor: f64,
    /// Most loaded first; ties keep document order.
    pub load: Vec<ProfessorLoad>,
}

pub fn overview(index: &ReferenceIndex) -> Overview {
    let mut titles = BTreeMap::new();
    let mut programmes = BTreeMap::new();
    let mut load = Vec::with_capacity(index.professors.len());

    for prof in &index.professors {
        *titles.entry(or_unknown(prof.title.as_deref())).or_insert(0) += 1;
        for decl in &prof.subjects_all {
            *programmes
                .entry(or_unknown(Some(&decl.studies_programme)))
                .or_insert(0) += 1;
        }
        load.push(ProfessorLoad {
            name: or_unknown(prof.name.as_deref()),
            title: or_unknown(prof.title.as_deref()),
            discipline: prof.sci_discipline.clone().unwrap_or_else(|| "N/A".into()),
            active: prof.subjects.len(),
            total: prof.subjects_all.len(),
        });
    }
    load.sort_by(|a, b| b.active.cmp(&a.active));

    let list = &index.subject_list;
    let total_espb = list
        .iter()
        .filter_map(|s| number(&s.espb))
        .fold(0u64, u64::saturating_add);
    let total_class_hours = list
        .iter()
        .map(|s| number(&s.p).unwrap_or(0).saturating_add(number(&s.v).unwrap_or(0)))
        .fold(0u64, u64::saturating_add);

    let active: usize = load.iter().map(|l| l.active).sum();

    Overview {
        professors: index.professors.len(),
        listed_subjects: list.len(),
        detailed_subjects: index.subjects.len(),
        titles,
        programmes,
        subject_types: histogram(list.iter().map(|s| s.kind.as_str())),
        semesters: histogram(list.iter().map(|s| s.sem.as_str())),
        total_espb,
        avg_espb: ratio(total_espb as f64, list.len()),
        total_class_hours,
        avg_subjects_per_professor: ratio(active as f64, index.professors.len()),
        load,
    }
}

fn histogram<'a>(values: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut out = BTreeMap::new();
    for v in values {
        *out.entry(or_unknown(Some(v))).or_insert(0) += 1;
    }
    out
}

fn or_unknown(s: Option<&str>) -> String {
    match s.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Plain unsigned integers only; anything else, or a value past `u64`, counts as missing.
fn number(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn ratio(n: f64, d: usize) -> f64 {
    if d == 0 {
        0.0
    } else {
        n / d as f64
    }
}

// ── Tests ──
