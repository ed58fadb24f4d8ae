mod error;
mod grouping;
mod model;
mod options;
mod pdf_reader;
mod preview;
mod sheet_writer;
mod source;
mod table_detect;
mod table_parse;

use std::path::{Path, PathBuf};

use tracing::info;

pub use error::ExtractError;
pub use grouping::{GroupedSheets, SheetGrouper, group_tables};
pub use model::{Cell, ExtractedTable, LabeledSheet, LogicalTable, Row, SheetLabel, text_row};
pub use options::{ExtractOptions, PageSelection};
pub use preview::{
    DEFAULT_PREVIEW_ROWS, LINE_BREAK_MARKER, PreviewCapture, PreviewSnapshot, capture_preview,
    escape_html,
};
pub use sheet_writer::{SheetSink, XlsxWorkbookWriter};
pub use source::{PageTableSource, PdfTableSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    pub name: String,
    pub columns: usize,
    pub rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub page_count: usize,
    /// Pages that yielded a table, including header-only ones.
    pub table_count: usize,
    pub row_count: usize,
    pub sheets: Vec<SheetSummary>,
}

impl ConversionReport {
    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOutcome {
    pub report: ConversionReport,
    pub preview: Option<PreviewSnapshot>,
}

/// Result of a conversion that got through every page.
///
/// `NoTabularData` is a successful outcome: the document was readable but no
/// sheet had any rows, so no workbook was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion<T> {
    Converted {
        output: T,
        report: ConversionReport,
        preview: Option<PreviewSnapshot>,
    },
    NoTabularData(ConversionReport),
}

impl<T> Conversion<T> {
    #[must_use]
    pub fn report(&self) -> &ConversionReport {
        match self {
            Self::Converted { report, .. } | Self::NoTabularData(report) => report,
        }
    }
}

/// Runs one pass over `source`, grouping page tables into sheets and
/// capturing the preview alongside.
///
/// Sheets reach `sink` only after the last page was read, so a source error
/// leaves the sink untouched.
pub fn run_pass<S, W>(
    source: &S,
    sink: &mut W,
    preview_rows: usize,
) -> Result<PassOutcome, ExtractError>
where
    S: PageTableSource + ?Sized,
    W: SheetSink + ?Sized,
{
    let mut grouper = SheetGrouper::new();
    let mut preview = PreviewCapture::new(preview_rows);
    let mut report = ConversionReport {
        page_count: source.page_count(),
        ..ConversionReport::default()
    };
    let mut sheets = Vec::new();

    for index in 0..source.page_count() {
        let page_table = source.page_table(index)?;
        if let Some(table) = &page_table {
            report.table_count += 1;
            preview.observe(table);
        }
        sheets.extend(grouper.push(page_table));
    }
    sheets.extend(grouper.finish());

    for sheet in &sheets {
        sink.write_sheet(sheet)?;
        report.row_count += sheet.table.rows.len();
        report.sheets.push(SheetSummary {
            name: sheet.label.sheet_name(),
            columns: sheet.table.header.len(),
            rows: sheet.table.rows.len(),
        });
    }

    Ok(PassOutcome {
        report,
        preview: preview.into_snapshot(),
    })
}

fn convert_to_workbook(
    input_pdf: &[u8],
    options: &ExtractOptions,
) -> Result<(XlsxWorkbookWriter, PassOutcome), ExtractError> {
    let source = PdfTableSource::open(input_pdf, options)?;
    let mut writer = XlsxWorkbookWriter::new(options.bold_header);
    let outcome = run_pass(&source, &mut writer, options.preview_rows)?;
    info!(
        pages = outcome.report.page_count,
        tables = outcome.report.table_count,
        sheets = outcome.report.sheet_count(),
        rows = outcome.report.row_count,
        "conversion pass completed"
    );
    Ok((writer, outcome))
}

pub fn extract_pdf_bytes_to_xlsx(
    input_pdf: &[u8],
    options: &ExtractOptions,
) -> Result<Conversion<Vec<u8>>, ExtractError> {
    let (writer, PassOutcome { report, preview }) = convert_to_workbook(input_pdf, options)?;
    if report.sheets.is_empty() {
        return Ok(Conversion::NoTabularData(report));
    }

    Ok(Conversion::Converted {
        output: writer.into_bytes()?,
        report,
        preview,
    })
}

/// Like [`extract_pdf_bytes_to_xlsx`], saving the workbook to `output_xlsx`.
/// The output file is only created when there is at least one sheet.
pub fn extract_pdf_to_xlsx(
    input_pdf: &Path,
    output_xlsx: &Path,
    options: &ExtractOptions,
) -> Result<Conversion<PathBuf>, ExtractError> {
    let bytes = std::fs::read(input_pdf)?;
    let (writer, PassOutcome { report, preview }) = convert_to_workbook(&bytes, options)?;
    if report.sheets.is_empty() {
        return Ok(Conversion::NoTabularData(report));
    }

    writer.save(output_xlsx)?;
    Ok(Conversion::Converted {
        output: output_xlsx.to_path_buf(),
        report,
        preview,
    })
}
