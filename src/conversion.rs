use pdf_sheets::{
    Conversion, ConversionReport, ExtractError, ExtractOptions, PreviewSnapshot,
    extract_pdf_bytes_to_xlsx,
};

use crate::cache;
use crate::error::ApiError;
use crate::models::{SheetInfo, StoredConversion, XLSX_CONTENT_TYPE};
use crate::upload;

#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub password: Option<String>,
    pub pages: Option<String>,
}

pub fn options_for(request: &UploadRequest) -> Result<ExtractOptions, ApiError> {
    let options = ExtractOptions {
        password: request.password.clone(),
        ..ExtractOptions::default()
    };
    match request.pages.as_deref().map(str::trim) {
        Some(pages) if !pages.is_empty() => Ok(options.with_pages(pages)?),
        _ => Ok(options),
    }
}

pub fn convert_upload(request: &UploadRequest) -> Result<Conversion<Vec<u8>>, ApiError> {
    let options = options_for(request)?;
    let conversion = extract_pdf_bytes_to_xlsx(&request.bytes, &options).map_err(|error| {
        worker::console_error!("{}", failure_log_line(&request.file_name, &error));
        ApiError::from(error)
    })?;

    let report = conversion.report();
    worker::console_log!(
        "converted `{}`: {} pages, {} sheets, {} rows",
        request.file_name,
        report.page_count,
        report.sheet_count(),
        report.row_count
    );
    Ok(conversion)
}

pub fn failure_log_line(file_name: &str, error: &ExtractError) -> String {
    format!("conversion of `{file_name}` failed: {error}")
}

pub fn stored_conversion(
    handle: String,
    upload_name: &str,
    report: &ConversionReport,
    preview: Option<&PreviewSnapshot>,
) -> StoredConversion {
    StoredConversion {
        handle,
        file_name: upload::download_file_name(upload_name),
        page_count: report.page_count,
        row_count: report.row_count,
        sheets: report.sheets.iter().map(SheetInfo::from).collect(),
        preview_html: preview.map(PreviewSnapshot::to_html),
    }
}

/// Caches the workbook and its metadata under a fresh handle.
pub async fn store_conversion(
    upload_name: &str,
    workbook: &[u8],
    report: &ConversionReport,
    preview: Option<&PreviewSnapshot>,
    ttl_seconds: u32,
) -> Result<StoredConversion, ApiError> {
    let stored = stored_conversion(upload::new_handle()?, upload_name, report, preview);

    cache::put_bytes(
        &cache::conversion_workbook_key(&stored.handle),
        workbook,
        ttl_seconds,
        XLSX_CONTENT_TYPE,
    )
    .await?;
    cache::put_json(&cache::conversion_meta_key(&stored.handle), &stored, ttl_seconds).await?;

    Ok(stored)
}

pub async fn load_conversion(handle: &str) -> Result<StoredConversion, ApiError> {
    ensure_handle(handle)?;
    cache::get_json::<StoredConversion>(&cache::conversion_meta_key(handle))
        .await?
        .ok_or_else(|| expired(handle))
}

pub async fn load_workbook(handle: &str) -> Result<(StoredConversion, Vec<u8>), ApiError> {
    let stored = load_conversion(handle).await?;
    let bytes = cache::get_bytes(&cache::conversion_workbook_key(handle))
        .await?
        .ok_or_else(|| expired(handle))?;
    Ok((stored, bytes))
}

fn ensure_handle(handle: &str) -> Result<(), ApiError> {
    if upload::is_valid_handle(handle) {
        Ok(())
    } else {
        Err(ApiError::BadRequest("handle must be 32 lowercase hex characters".to_string()))
    }
}

fn expired(handle: &str) -> ApiError {
    ApiError::NotFound(format!("no stored conversion for handle `{handle}`, it may have expired"))
}
