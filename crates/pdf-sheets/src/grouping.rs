//! Groups consecutive page tables that share a header into sheets.
//!
//! Pages are folded one at a time. A page without a table is skipped and does
//! not end the current run. A header change closes the open buffer (if it holds
//! any rows) and opens a new one; a header seen again after a different one
//! starts a new sheet rather than rejoining the earlier run.

use tracing::{debug, info};

use crate::model::{ExtractedTable, LabeledSheet, LogicalTable, Row, SheetLabel};

#[derive(Debug)]
struct OpenBuffer {
    schema: Row,
    rows: Vec<Row>,
}

#[derive(Debug)]
pub struct SheetGrouper {
    open: Option<OpenBuffer>,
    next_label: SheetLabel,
}

impl Default for SheetGrouper {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetGrouper {
    #[must_use]
    pub fn new() -> Self {
        Self {
            open: None,
            next_label: SheetLabel::FIRST,
        }
    }

    /// Feeds one page's extraction result.
    ///
    /// Returns the sheet closed by a header change, if that buffer held rows.
    pub fn push(&mut self, page_table: Option<ExtractedTable>) -> Option<LabeledSheet> {
        let ExtractedTable { header, rows } = page_table?;

        if let Some(open) = self.open.as_mut().filter(|open| open.schema == header) {
            open.rows.extend(rows);
            return None;
        }

        let replaced = self.open.replace(OpenBuffer {
            schema: header,
            rows,
        });
        replaced.and_then(|buffer| self.flush(buffer))
    }

    /// Closes the final buffer once the pages are exhausted.
    pub fn finish(mut self) -> Option<LabeledSheet> {
        self.open.take().and_then(|buffer| self.flush(buffer))
    }

    #[must_use]
    pub fn sheets_emitted(&self) -> u32 {
        self.next_label.get() - 1
    }

    fn flush(&mut self, buffer: OpenBuffer) -> Option<LabeledSheet> {
        if buffer.rows.is_empty() {
            debug!(
                columns = buffer.schema.len(),
                "discarding header-only buffer"
            );
            return None;
        }

        let label = self.next_label;
        self.next_label = label.next();
        info!(
            sheet = %label.sheet_name(),
            rows = buffer.rows.len(),
            columns = buffer.schema.len(),
            "flushing sheet"
        );

        Some(LabeledSheet {
            label,
            table: LogicalTable {
                header: buffer.schema,
                rows: buffer.rows,
            },
        })
    }
}

/// Lazy sheet sequence over an infallible sequence of page results.
#[derive(Debug)]
pub struct GroupedSheets<I> {
    pages: I,
    grouper: Option<SheetGrouper>,
}

impl<I> Iterator for GroupedSheets<I>
where
    I: Iterator<Item = Option<ExtractedTable>>,
{
    type Item = LabeledSheet;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let grouper = self.grouper.as_mut()?;
            match self.pages.next() {
                Some(page_table) => {
                    if let Some(sheet) = grouper.push(page_table) {
                        return Some(sheet);
                    }
                }
                None => return self.grouper.take().and_then(SheetGrouper::finish),
            }
        }
    }
}

pub fn group_tables<I>(pages: I) -> GroupedSheets<I::IntoIter>
where
    I: IntoIterator<Item = Option<ExtractedTable>>,
{
    GroupedSheets {
        pages: pages.into_iter(),
        grouper: Some(SheetGrouper::new()),
    }
}
