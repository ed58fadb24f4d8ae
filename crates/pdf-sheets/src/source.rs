use tracing::debug;

use crate::error::ExtractError;
use crate::model::ExtractedTable;
use crate::options::ExtractOptions;
use crate::pdf_reader::PdfPages;
use crate::table_detect::extract_page_table;

/// Yields at most one table per page, in page order.
pub trait PageTableSource {
    fn page_count(&self) -> usize;

    /// Extracts the table on the page at `index` (0-based within the source).
    ///
    /// `Ok(None)` means the page has no table. Errors abort the whole pass.
    fn page_table(&self, index: usize) -> Result<Option<ExtractedTable>, ExtractError>;
}

/// Tables that were already extracted elsewhere, one entry per page.
impl PageTableSource for Vec<Option<ExtractedTable>> {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page_table(&self, index: usize) -> Result<Option<ExtractedTable>, ExtractError> {
        Ok(self.get(index).cloned().flatten())
    }
}

/// Text-based table extraction over a PDF loaded from memory.
pub struct PdfTableSource {
    pages: PdfPages,
    min_cols: usize,
}

impl PdfTableSource {
    /// Loads the document, decrypting it with the options' password when it is
    /// encrypted.
    pub fn open(input_pdf: &[u8], options: &ExtractOptions) -> Result<Self, ExtractError> {
        options.validate()?;
        let pages = PdfPages::open(
            input_pdf,
            options.effective_password(),
            options.pages.as_ref(),
        )?;
        debug!(pages = pages.page_count(), "opened PDF");

        Ok(Self {
            pages,
            min_cols: options.min_cols,
        })
    }
}

impl PageTableSource for PdfTableSource {
    fn page_count(&self) -> usize {
        self.pages.page_count()
    }

    fn page_table(&self, index: usize) -> Result<Option<ExtractedTable>, ExtractError> {
        let Some(page) = self.pages.page_text(index) else {
            return Ok(None);
        };

        let table = extract_page_table(&page, self.min_cols);
        match &table {
            Some(table) => debug!(
                page = page.page_number,
                columns = table.header.len(),
                rows = table.rows.len(),
                "extracted page table"
            ),
            None => debug!(page = page.page_number, "no table on page"),
        }
        Ok(table)
    }
}
