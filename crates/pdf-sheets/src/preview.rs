use std::fmt::Write as _;

use crate::model::{Cell, ExtractedTable, Row};

pub const DEFAULT_PREVIEW_ROWS: usize = 10;
pub const LINE_BREAK_MARKER: &str = "<br>";
const TABLE_CLASSES: &str = "table table-striped";

/// Display-ready excerpt of the first table in a document that has data rows.
///
/// Row cells are already HTML-escaped with line breaks turned into
/// [`LINE_BREAK_MARKER`]; null cells stay `None`. The header is kept raw and
/// escaped when rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSnapshot {
    pub header: Row,
    pub rows: Vec<Row>,
}

impl PreviewSnapshot {
    fn from_table(table: &ExtractedTable, max_rows: usize) -> Self {
        Self {
            header: table.header.clone(),
            rows: table
                .rows
                .iter()
                .take(max_rows)
                .map(|row| row.iter().map(normalize_cell).collect())
                .collect(),
        }
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = format!("<table class=\"{TABLE_CLASSES}\">\n<thead>\n<tr>");
        for cell in &self.header {
            let text = escape_html(cell.as_deref().unwrap_or(""));
            let _ = write!(html, "<th>{text}</th>");
        }
        html.push_str("</tr>\n</thead>\n<tbody>\n");

        for row in &self.rows {
            html.push_str("<tr>");
            for cell in row {
                let _ = write!(html, "<td>{}</td>", cell.as_deref().unwrap_or(""));
            }
            html.push_str("</tr>\n");
        }

        html.push_str("</tbody>\n</table>\n");
        html
    }
}

/// Watches page tables in pass order and keeps a snapshot of the first one
/// with at least one data row. Later tables are ignored.
#[derive(Debug)]
pub struct PreviewCapture {
    max_rows: usize,
    snapshot: Option<PreviewSnapshot>,
}

impl Default for PreviewCapture {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_ROWS)
    }
}

impl PreviewCapture {
    #[must_use]
    pub fn new(max_rows: usize) -> Self {
        Self {
            max_rows,
            snapshot: None,
        }
    }

    pub fn observe(&mut self, table: &ExtractedTable) {
        if self.snapshot.is_some() || !table.has_rows() {
            return;
        }
        self.snapshot = Some(PreviewSnapshot::from_table(table, self.max_rows));
    }

    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.snapshot.is_some()
    }

    #[must_use]
    pub fn into_snapshot(self) -> Option<PreviewSnapshot> {
        self.snapshot
    }
}

pub fn capture_preview<'a, I>(pages: I, max_rows: usize) -> Option<PreviewSnapshot>
where
    I: IntoIterator<Item = Option<&'a ExtractedTable>>,
{
    let mut capture = PreviewCapture::new(max_rows);
    for table in pages.into_iter().flatten() {
        capture.observe(table);
        if capture.is_captured() {
            break;
        }
    }
    capture.into_snapshot()
}

fn normalize_cell(cell: &Cell) -> Cell {
    cell.as_deref()
        .map(|text| escape_html(text).replace('\n', LINE_BREAK_MARKER))
}

/// Escapes text for use in HTML element content and quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
