use std::path::Path;

use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, Worksheet};
use tracing::warn;

use crate::error::ExtractError;
use crate::model::{LabeledSheet, Row};

/// Receives finished sheets in label order.
pub trait SheetSink {
    fn write_sheet(&mut self, sheet: &LabeledSheet) -> Result<(), ExtractError>;
}

impl SheetSink for Vec<LabeledSheet> {
    fn write_sheet(&mut self, sheet: &LabeledSheet) -> Result<(), ExtractError> {
        self.push(sheet.clone());
        Ok(())
    }
}

/// Builds an `.xlsx` workbook in memory, one worksheet per sheet.
///
/// Nothing touches the filesystem until [`XlsxWorkbookWriter::save`], so a
/// pass that fails part-way leaves no partial file behind.
pub struct XlsxWorkbookWriter {
    workbook: Workbook,
    header_format: Option<Format>,
    sheet_count: usize,
}

impl XlsxWorkbookWriter {
    #[must_use]
    pub fn new(bold_header: bool) -> Self {
        Self {
            workbook: Workbook::new(),
            header_format: bold_header.then(|| Format::new().set_bold()),
            sheet_count: 0,
        }
    }

    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheet_count
    }

    pub fn into_bytes(mut self) -> Result<Vec<u8>, ExtractError> {
        Ok(self.workbook.save_to_buffer()?)
    }

    pub fn save(mut self, path: &Path) -> Result<(), ExtractError> {
        self.workbook.save(path)?;
        Ok(())
    }
}

impl SheetSink for XlsxWorkbookWriter {
    fn write_sheet(&mut self, sheet: &LabeledSheet) -> Result<(), ExtractError> {
        let name = sheet.label.sheet_name();
        let table = &sheet.table;

        let ragged = table
            .rows
            .iter()
            .filter(|row| row.len() != table.header.len())
            .count();
        if ragged > 0 {
            warn!(
                sheet = %name,
                ragged,
                columns = table.header.len(),
                "rows do not match header width; writing cells positionally"
            );
        }

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(name.as_str())?;
        write_row(worksheet, &name, 0, &table.header, self.header_format.as_ref())?;
        for (index, row) in table.rows.iter().enumerate() {
            let row_num = RowNum::try_from(index + 1)
                .map_err(|_| ExtractError::SheetTooLarge(name.clone()))?;
            write_row(worksheet, &name, row_num, row, None)?;
        }

        self.sheet_count += 1;
        Ok(())
    }
}

/// Null cells are left blank; every other cell is written as text.
fn write_row(
    worksheet: &mut Worksheet,
    sheet_name: &str,
    row_num: RowNum,
    cells: &Row,
    format: Option<&Format>,
) -> Result<(), ExtractError> {
    for (index, cell) in cells.iter().enumerate() {
        let Some(text) = cell else {
            continue;
        };
        let col = ColNum::try_from(index)
            .map_err(|_| ExtractError::SheetTooLarge(sheet_name.to_string()))?;
        match format {
            Some(format) => worksheet.write_string_with_format(row_num, col, text, format)?,
            None => worksheet.write_string(row_num, col, text)?,
        };
    }
    Ok(())
}
