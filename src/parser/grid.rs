use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};

use crate::error::{Error, Result};

static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());

/// Elements whose boundaries separate words inside a cell.
const BREAK_TAGS: &[&str] = &["p", "br", "div", "li", "tr", "td", "th", "h1", "h2", "h3", "h4"];

/// Cell text of one HTML table, row by row. `rows` keeps every cell at its
/// column position; readers that go by label use [`TableGrid::collapsed_rows`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableGrid {
    pub rows: Vec<Vec<String>>,
}

/// Split a converted document into its top-level `<table>` fragments, in document order.
/// Tables nested inside a cell stay part of their parent fragment.
pub fn split_tables(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    doc.select(&TABLE_SEL)
        .filter(|t| enclosing_table(t).is_none())
        .map(|t| t.html())
        .collect()
}

impl TableGrid {
    /// Parse one `<table>` fragment. `index` is only used to label the error.
    pub fn parse(index: usize, fragment: &str) -> Result<TableGrid> {
        let html = Html::parse_fragment(fragment);
        let table = html
            .select(&TABLE_SEL)
            .next()
            .ok_or_else(|| Error::UnparseableTable {
                index,
                reason: "no <table> element".into(),
            })?;

        let rows: Vec<Vec<String>> = table
            .select(&ROW_SEL)
            .filter(|tr| enclosing_table(tr).map(|t| t.id()) == Some(table.id()))
            .map(read_row)
            .collect();

        if rows.is_empty() {
            return Err(Error::UnparseableTable {
                index,
                reason: "table has no rows".into(),
            });
        }
        Ok(TableGrid { rows })
    }

    /// Rows with each run of one repeated non-empty value (a merged cell
    /// rendered once per spanned column) folded into a single cell.
    pub fn collapsed_rows(&self) -> Vec<Vec<String>> {
        self.rows.iter().map(|row| collapse_adjacent(row)).collect()
    }
}

/// Drop a non-empty cell equal to the one right before it. Empty cells stay.
pub fn collapse_adjacent(row: &[String]) -> Vec<String> {
    let mut out = row.to_vec();
    out.dedup_by(|later, earlier| !later.is_empty() && later == earlier);
    out
}

/// True when every cell of the row is blank.
pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|c| c.is_empty())
}

fn enclosing_table<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "table")
}

fn read_row(tr: ElementRef) -> Vec<String> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter(|c| matches!(c.value().name(), "td" | "th"))
        .map(cell_text)
        .collect()
}

fn cell_text(cell: ElementRef) -> String {
    let mut out = String::new();
    for node in cell.descendants() {
        match node.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) if BREAK_TAGS.contains(&e.name()) => out.push(' '),
            _ => {}
        }
    }
    normalize_ws(&out)
}

/// Collapse runs of whitespace (including non-breaking spaces) into one space and trim.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Tests ──
