use std::collections::HashSet;

use regex::Regex;

use crate::config::{Labels, SubjectField};
use crate::model::{ClassPoints, SubjectRecord};
use crate::parser::extract::{cell, label_value};
use crate::parser::grid::{is_blank_row, TableGrid};

/// Turn one subject-detail table into a record.
///
/// Rows are classified on their own by the label their first cell starts
/// with; the first row for a field wins and later ones are ignored. The first
/// row, when it carries no field label, is the table header.
pub fn extract(table_key: usize, grid: &TableGrid, labels: &Labels) -> SubjectRecord {
    let mut rec = SubjectRecord {
        table_key,
        ..Default::default()
    };
    let mut seen: HashSet<SubjectField> = HashSet::new();
    let mut first_row = true;
    let mut in_points = false;

    for row in &grid.collapsed_rows() {
        if row.is_empty() || is_blank_row(row) {
            continue;
        }
        let classified = labels.classify_subject_row(&row[0]);

        if std::mem::take(&mut first_row) && classified.is_none() {
            rec.subjects_header = row.clone();
            continue;
        }

        let Some((field, rest)) = classified else {
            if in_points {
                rec.class_points.extend(points_pairs(row, &labels.points_caption));
            }
            continue;
        };
        in_points = false;
        if !seen.insert(field) {
            continue;
        }

        match field {
            SubjectField::School => rec.school = Some(label_value(rest, row)),
            SubjectField::StudiesProgramme => rec.studies_programme = Some(label_value(rest, row)),
            SubjectField::Subject => {
                let text = label_value(rest, row);
                let (code, name) = split_code(&text, &labels.subject_code);
                rec.subject_code = code;
                rec.subject_name = Some(name);
                rec.subject = Some(text);
            }
            SubjectField::Professor => rec.professor = Some(label_value(rest, row)),
            SubjectField::SubjectStatus => rec.subject_status = Some(label_value(rest, row)),
            SubjectField::Espb => rec.espb = Some(label_value(rest, row)),
            SubjectField::Condition => rec.condition = Some(label_value(rest, row)),
            SubjectField::ClassHours => {
                let text = row.join(" ");
                rec.theory_classes =
                    sub_label_value(&text, &labels.theory_classes, &labels.practical_classes);
                rec.practical_classes =
                    sub_label_value(&text, &labels.practical_classes, &labels.theory_classes);
            }
            SubjectField::ClassPoints => in_points = true,
        }
    }

    rec
}

/// `[13E1OOP] Objektno orijentisano programiranje` → (`[13E1OOP]`, `Objektno orijentisano programiranje`).
fn split_code(text: &str, code_re: &Regex) -> (Option<String>, String) {
    match code_re.captures(text) {
        Some(caps) => (
            Some(caps[1].to_string()),
            caps.get(2).map(|m| m.as_str().trim()).unwrap_or("").to_string(),
        ),
        None => (None, text.to_string()),
    }
}

/// First token after `own`'s sub-label, cut short at `other`'s sub-label.
/// `None` when the sub-label is absent from the row.
fn sub_label_value(text: &str, own: &Regex, other: &Regex) -> Option<String> {
    let m = own.find(text)?;
    let end = other
        .find_at(text, m.end())
        .map(|o| o.start())
        .unwrap_or(text.len());
    let value = text[m.end()..end]
        .trim()
        .trim_start_matches(':')
        .split_whitespace()
        .next()
        .unwrap_or("");
    Some(value.to_string())
}

/// Assessment rows come as (activity, points) cell pairs, two pairs per row.
fn points_pairs(row: &[String], caption: &Regex) -> Vec<ClassPoints> {
    (0..row.len())
        .step_by(2)
        .filter_map(|i| {
            let activity = cell(row, i);
            let points = cell(row, i + 1);
            if activity.is_empty() || points.is_empty() || caption.is_match(&points) {
                None
            } else {
                Some(ClassPoints { activity, points })
            }
        })
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_LABELS;

    fn grid(rows: &[&[&str]]) -> TableGrid {
        TableGrid {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    fn sample() -> TableGrid {
        grid(&[
            &["Tabela 5.2 Specifikacija predmeta"],
            &["Škola: Fakultet tehničkih nauka"],
            &["Studijski program: Softversko inženjerstvo (OAS)"],
            &["Naziv predmeta: [13E1OOP] Objektno orijentisano programiranje"],
            &["Nastavnik/nastavnici: Petar M. Petrović, Jovan Jovanović"],
            &["Status predmeta: obavezni"],
            &["Broj ESPB: 8"],
            &["Uslov: nema"],
            &["Cilj predmeta"],
            &["Broj časova aktivne nastave", "Praktična nastava: 2", "Teorijska nastava: 3"],
            &["Ocena znanja (maksimalni broj poena 100)"],
            &["Predispitne obaveze", "poena", "Završni ispit", "poena"],
            &["aktivnost u toku predavanja", "10", "pismeni ispit", "40"],
            &["kolokvijumi", "20", "usmeni ispit", "30"],
            &["Naziv predmeta: [13E1XXX] Ignored second subject row"],
        ])
    }

    #[test]
    fn labelled_fields() {
        let rec = extract(3, &sample(), &DEFAULT_LABELS);
        assert_eq!(rec.table_key, 3);
        assert_eq!(rec.subjects_header, vec!["Tabela 5.2 Specifikacija predmeta"]);
        assert_eq!(rec.school.as_deref(), Some("Fakultet tehničkih nauka"));
        assert_eq!(rec.studies_programme(), "Softversko inženjerstvo (OAS)");
        assert_eq!(rec.professor(), "Petar M. Petrović, Jovan Jovanović");
        assert_eq!(rec.subject_status.as_deref(), Some("obavezni"));
        assert_eq!(rec.espb.as_deref(), Some("8"));
        assert_eq!(rec.condition.as_deref(), Some("nema"));
    }

    #[test]
    fn bracket_code_split_from_name() {
        let rec = extract(0, &sample(), &DEFAULT_LABELS);
        assert_eq!(rec.subject_code.as_deref(), Some("[13E1OOP]"));
        assert_eq!(rec.subject_name(), "Objektno orijentisano programiranje");
        assert_eq!(
            rec.subject(),
            "[13E1OOP] Objektno orijentisano programiranje"
        );
    }

    #[test]
    fn name_without_code() {
        let g = grid(&[&["Naziv predmeta", "Matematička analiza 1"]]);
        let rec = extract(0, &g, &DEFAULT_LABELS);
        assert!(rec.subject_code.is_none());
        assert_eq!(rec.subject_name(), "Matematička analiza 1");
        assert!(rec.subjects_header.is_empty());
    }

    #[test]
    fn class_hours_found_by_sub_label_in_any_order() {
        let rec = extract(0, &sample(), &DEFAULT_LABELS);
        assert_eq!(rec.theory_classes.as_deref(), Some("3"));
        assert_eq!(rec.practical_classes.as_deref(), Some("2"));

        let g = grid(&[&["Broj časova aktivne nastave: Teorijska nastava: 2 Praktična nastava: 1"]]);
        let rec = extract(0, &g, &DEFAULT_LABELS);
        assert_eq!(rec.theory_classes.as_deref(), Some("2"));
        assert_eq!(rec.practical_classes.as_deref(), Some("1"));
    }

    #[test]
    fn assessment_points() {
        let rec = extract(0, &sample(), &DEFAULT_LABELS);
        let pairs: Vec<(&str, &str)> = rec
            .class_points
            .iter()
            .map(|p| (p.activity.as_str(), p.points.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("aktivnost u toku predavanja", "10"),
                ("pismeni ispit", "40"),
                ("kolokvijumi", "20"),
                ("usmeni ispit", "30"),
            ]
        );
    }

    #[test]
    fn equal_points_both_kept() {
        let g = grid(&[
            &["Naziv predmeta: Baze podataka"],
            &["Ocena znanja (maksimalni broj poena 100)"],
            &["Predispitne obaveze", "poena", "Završni ispit", "poena"],
            &["kolokvijumi", "30", "usmeni ispit", "30"],
        ]);
        let rec = extract(0, &g, &DEFAULT_LABELS);
        let pairs: Vec<(&str, &str)> = rec
            .class_points
            .iter()
            .map(|p| (p.activity.as_str(), p.points.as_str()))
            .collect();
        assert_eq!(pairs, vec![("kolokvijumi", "30"), ("usmeni ispit", "30")]);
    }

    #[test]
    fn first_match_wins() {
        let rec = extract(0, &sample(), &DEFAULT_LABELS);
        assert_ne!(rec.subject_code.as_deref(), Some("[13E1XXX]"));
    }

    #[test]
    fn found_but_blank_differs_from_missing() {
        let g = grid(&[&["Uslov:"], &["Broj ESPB", ""]]);
        let rec = extract(0, &g, &DEFAULT_LABELS);
        assert_eq!(rec.condition.as_deref(), Some(""));
        assert_eq!(rec.espb.as_deref(), Some(""));
        assert!(rec.professor.is_none());
    }

    #[test]
    fn extraction_is_idempotent() {
        let g = sample();
        assert_eq!(extract(1, &g, &DEFAULT_LABELS), extract(1, &g, &DEFAULT_LABELS));
    }
}
