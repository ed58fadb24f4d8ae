use pdf_sheets::SheetSummary;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_PREVIEW_TTL_SECONDS: u32 = 30 * 60;
pub const CONVERSION_CACHE_KEY_PREFIX: &str = "conversion:v1:";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SheetInfo {
    pub name: String,
    pub columns: usize,
    pub rows: usize,
}

impl From<&SheetSummary> for SheetInfo {
    fn from(summary: &SheetSummary) -> Self {
        Self {
            name: summary.name.clone(),
            columns: summary.columns,
            rows: summary.rows,
        }
    }
}

/// Everything the preview and download steps need, cached under a handle.
/// The workbook bytes are cached separately under the same handle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredConversion {
    pub handle: String,
    pub file_name: String,
    pub page_count: usize,
    pub row_count: usize,
    pub sheets: Vec<SheetInfo>,
    pub preview_html: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
