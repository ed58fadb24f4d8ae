use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ApiError;

const FALLBACK_DOWNLOAD_NAME: &str = "output.xlsx";
const HANDLE_BYTES: usize = 16;

static UNSAFE_NAME_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9._-]+").expect("hardcoded file name regex is valid")
});

/// Checks the uploaded file before any parsing happens.
pub fn validate_upload(file_name: &str, size: usize, max_bytes: usize) -> Result<(), ApiError> {
    if !has_pdf_extension(file_name) {
        return Err(ApiError::UnsupportedMediaType(format!(
            "only .pdf uploads are accepted, got `{file_name}`"
        )));
    }
    if size == 0 {
        return Err(ApiError::BadRequest("uploaded file is empty".to_string()));
    }
    if size > max_bytes {
        return Err(ApiError::PayloadTooLarge(format!(
            "upload is {size} bytes, the limit is {max_bytes} bytes"
        )));
    }
    Ok(())
}

pub fn has_pdf_extension(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case("pdf"))
}

/// Trimmed password, or `None` when the field was blank.
pub fn normalize_password(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// `report 2024.pdf` becomes `report_2024.xlsx`.
pub fn download_file_name(upload_name: &str) -> String {
    let base = upload_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(upload_name);
    let stem = base.rsplit_once('.').map_or(base, |(stem, _)| stem);
    let cleaned = UNSAFE_NAME_CHARS.replace_all(stem, "_");
    let cleaned = cleaned.trim_matches(|ch| ch == '_' || ch == '.');

    if cleaned.is_empty() {
        FALLBACK_DOWNLOAD_NAME.to_string()
    } else {
        format!("{cleaned}.xlsx")
    }
}

pub fn new_handle() -> Result<String, ApiError> {
    let mut bytes = [0_u8; HANDLE_BYTES];
    getrandom::fill(&mut bytes)?;
    Ok(encode_hex(&bytes))
}

pub fn is_valid_handle(handle: &str) -> bool {
    handle.len() == HANDLE_BYTES * 2
        && handle
            .bytes()
            .all(|byte| byte.is_ascii_digit() || (b'a'..=b'f').contains(&byte))
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}
