use crate::config::Labels;
use crate::model::{ProfessorRecord, SubjectDeclaration};
use crate::parser::extract::{any_cell_matches, cell, positional, strip_ordinal};
use crate::parser::grid::{is_blank_row, TableGrid};

/// Reading position inside a professor table. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekName,
    /// Label seen; the next row holds the name.
    ReadName,
    SeekTitle,
    SeekInstitution,
    SeekDiscipline,
    SeekSubjectTableHeader,
    InSubjectTable { header_read: bool },
    Done,
}

/// Turn one professor table into a record. Pure: the same grid always gives
/// the same record, and a grid without the expected labels gives an empty one.
/// Only `subjects_all` is filled; scoping happens later.
pub fn extract(table_key: usize, grid: &TableGrid, labels: &Labels) -> ProfessorRecord {
    let mut rec = ProfessorRecord {
        table_key,
        ..Default::default()
    };
    let mut state = State::SeekName;

    for (row, cells) in grid.collapsed_rows().iter().zip(&grid.rows) {
        if row.is_empty() {
            continue;
        }
        let blank = is_blank_row(row);

        state = match state {
            State::SeekName => {
                if any_cell_matches(row, &labels.professor_name) {
                    State::ReadName
                } else {
                    State::SeekName
                }
            }
            State::ReadName if blank => State::ReadName,
            State::ReadName => {
                rec.name = positional(row, 1).map(str::to_string);
                State::SeekTitle
            }
            State::SeekTitle | State::SeekInstitution | State::SeekDiscipline if blank => state,
            State::SeekTitle => {
                rec.title = positional(row, 2).map(str::to_string);
                State::SeekInstitution
            }
            State::SeekInstitution => {
                rec.institution = positional(row, 3).map(str::to_string);
                State::SeekDiscipline
            }
            State::SeekDiscipline => {
                rec.sci_discipline = positional(row, 4).map(str::to_string);
                State::SeekSubjectTableHeader
            }
            State::SeekSubjectTableHeader => {
                if any_cell_matches(row, &labels.subject_list_start) {
                    State::InSubjectTable { header_read: false }
                } else {
                    State::SeekSubjectTableHeader
                }
            }
            State::InSubjectTable { .. } if any_cell_matches(row, &labels.subject_list_end) => {
                State::Done
            }
            State::InSubjectTable { header_read: false } => {
                rec.subjects_header = row.clone();
                State::InSubjectTable { header_read: true }
            }
            State::InSubjectTable { header_read: true } => {
                // positional columns, read from the uncollapsed cells
                if let Some(decl) = declaration(cells) {
                    rec.subjects_all.push(decl);
                }
                state
            }
            State::Done => break,
        };
    }

    rec
}

/// Blank or separator rows (no subject name) produce nothing.
fn declaration(row: &[String]) -> Option<SubjectDeclaration> {
    let name = cell(row, 2);
    if name.is_empty() {
        return None;
    }
    Some(SubjectDeclaration {
        index: strip_ordinal(&cell(row, 0)),
        code: cell(row, 1),
        name,
        kind: cell(row, 3),
        studies_programme: cell(row, 4),
        studies_type: cell(row, 5),
    })
}

// ── Tests ──
