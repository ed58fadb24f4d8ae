use std::fmt::{Display, Formatter};

/// A single table cell. `None` is a null cell, as opposed to an empty string.
pub type Cell = Option<String>;

pub type Row = Vec<Cell>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// One page's table: a header row plus the data rows beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTable {
    pub header: Row,
    pub rows: Vec<Row>,
}

impl ExtractedTable {
    #[must_use]
    pub fn new(header: Row, rows: Vec<Row>) -> Self {
        Self { header, rows }
    }

    /// Builds a table from raw grid rows where row 0 is the header.
    ///
    /// Returns `None` for an empty grid.
    #[must_use]
    pub fn from_grid(mut grid: Vec<Row>) -> Option<Self> {
        if grid.is_empty() {
            return None;
        }
        let rows = grid.split_off(1);
        let header = grid.pop()?;
        Some(Self { header, rows })
    }

    #[must_use]
    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }
}

/// Position of a flushed sheet in the workbook, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SheetLabel(u32);

impl SheetLabel {
    pub const FIRST: Self = Self(1);

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub fn sheet_name(self) -> String {
        format!("Sheet{}", self.0)
    }
}

impl Display for SheetLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A run of same-header page tables merged into one sheet's worth of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalTable {
    pub header: Row,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledSheet {
    pub label: SheetLabel,
    pub table: LogicalTable,
}

/// Convenience for building rows of present cells, mostly in tests.
#[must_use]
pub fn text_row<S: AsRef<str>>(cells: &[S]) -> Row {
    cells
        .iter()
        .map(|cell| Some(cell.as_ref().to_string()))
        .collect()
}
