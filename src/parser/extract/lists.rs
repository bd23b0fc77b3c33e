//! Summary tables that open each document: the list of professors and the
//! list of subjects. The first row is the header, every other row one entry.
//! Entries are read by column position from the uncollapsed cells.

use crate::model::{ProfessorListEntry, SubjectListEntry};
use crate::parser::extract::{cell, strip_ordinal};
use crate::parser::grid::{collapse_adjacent, is_blank_row, TableGrid};

pub fn professor_list(grid: &TableGrid) -> (Vec<String>, Vec<ProfessorListEntry>) {
    let (header, rows) = split_header(grid);
    let entries = rows
        .map(|row| ProfessorListEntry {
            ord_num: strip_ordinal(&cell(row, 0)),
            // cell 1 is the personal ID number, never carried over
            prof_name: cell(row, 2),
            prof_title: cell(row, 3),
        })
        .collect();
    (header, entries)
}

pub fn subject_list(grid: &TableGrid) -> (Vec<String>, Vec<SubjectListEntry>) {
    let (header, rows) = split_header(grid);
    let entries = rows
        .map(|row| SubjectListEntry {
            index: strip_ordinal(&cell(row, 0)),
            code: cell(row, 1),
            name: cell(row, 2),
            kind: cell(row, 3),
            sem: cell(row, 4),
            p: cell(row, 5),
            v: cell(row, 6),
            don: cell(row, 7),
            other: cell(row, 8),
            espb: cell(row, 9),
        })
        .collect();
    (header, entries)
}

fn split_header(grid: &TableGrid) -> (Vec<String>, impl Iterator<Item = &Vec<String>>) {
    let header: Vec<String> = grid
        .rows
        .first()
        .map(|r| {
            collapse_adjacent(r)
                .into_iter()
                .filter(|c| !c.is_empty())
                .collect()
        })
        .unwrap_or_default();
    let rows = grid.rows.iter().skip(1).filter(|r| !is_blank_row(r));
    (header, rows)
}

// ── Tests ──
