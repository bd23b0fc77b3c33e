pub mod extract;
pub mod grid;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::Labels;
use crate::model::{ProfessorRecord, ProfessorTable, SubjectRecord, SubjectTable};
use grid::TableGrid;

/// Every top-level table of a converted document as a grid, paired with its
/// ordinal. Tables that fail to parse are logged and left out; the rest keep
/// the ordinal they had in the document.
pub fn read_grids(html: &str) -> Vec<(usize, TableGrid)> {
    let fragments = grid::split_tables(html);
    debug!("{} tables in document", fragments.len());

    fragments
        .par_iter()
        .enumerate()
        .filter_map(|(i, fragment)| match TableGrid::parse(i, fragment) {
            Ok(g) => Some((i, g)),
            Err(e) => {
                warn!("skipping {}", e);
                None
            }
        })
        .collect()
}

/// Professors document → `[prof_list, prof_tables]`.
///
/// Table 0 is the summary list; every later table is one professor. The
/// `prof_tables` header is taken from the first professor table as is.
pub fn read_professors(html: &str, labels: &Labels) -> Vec<ProfessorTable> {
    let grids = read_grids(html);

    let (list_header, list) = grids
        .iter()
        .find(|(i, _)| *i == 0)
        .map(|(_, g)| extract::lists::professor_list(g))
        .unwrap_or_default();

    let records: Vec<ProfessorRecord> = grids
        .par_iter()
        .filter(|(i, _)| *i > 0)
        .map(|(i, g)| extract::professor::extract(*i, g, labels))
        .collect();
    debug!("{} professor tables, {} list entries", records.len(), list.len());

    let header = records.first().map(|r| r.subjects_header.clone()).unwrap_or_default();
    vec![
        ProfessorTable::ProfList {
            data: list,
            header: list_header,
        },
        ProfessorTable::ProfTables {
            data: records,
            header,
        },
    ]
}

/// Subjects document → `[subj_list, subj_tables]`.
///
/// As with professors, the `subj_tables` header is the first record's, blank or not.
pub fn read_subjects(html: &str, labels: &Labels) -> Vec<SubjectTable> {
    let grids = read_grids(html);

    let (list_header, list) = grids
        .iter()
        .find(|(i, _)| *i == 0)
        .map(|(_, g)| extract::lists::subject_list(g))
        .unwrap_or_default();

    let records: Vec<SubjectRecord> = grids
        .par_iter()
        .filter(|(i, _)| *i > 0)
        .map(|(i, g)| extract::subject::extract(*i, g, labels))
        .collect();
    debug!("{} subject tables, {} list entries", records.len(), list.len());

    let header = records.first().map(|r| r.subjects_header.clone()).unwrap_or_default();
    vec![
        SubjectTable::SubjList {
            data: list,
            header: list_header,
        },
        SubjectTable::SubjTables {
            data: records,
            header,
        },
    ]
}

// ── Tests ──
