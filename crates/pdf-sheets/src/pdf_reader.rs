use std::collections::BTreeMap;

use encoding_rs::{BIG5, UTF_16BE};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::ExtractError;
use crate::model::PageText;
use crate::options::PageSelection;
use crate::table_parse::{soft_split_line_into_cells, split_line_into_cells};

const FORM_FEED: char = '\u{000C}';
const WEAK_FIRST_PAGE_SCORE: i64 = 80;

#[derive(Debug, Clone, Copy)]
struct PageRef {
    page_number: u32,
    object_id: ObjectId,
    /// Position among all document pages, used to line up pdf-extract output.
    position: usize,
}

/// A loaded (and if needed decrypted) document that hands out page text on
/// demand, one page at a time.
pub(crate) struct PdfPages {
    document: Document,
    pages: Vec<PageRef>,
    split_text: Option<Vec<String>>,
    whole_text: Option<String>,
}

impl PdfPages {
    pub(crate) fn open(
        input_pdf: &[u8],
        password: &str,
        selection: Option<&PageSelection>,
    ) -> Result<Self, ExtractError> {
        let mut document = Document::load_mem(input_pdf)?;
        let encrypted = document.is_encrypted();
        if encrypted {
            document
                .decrypt(password)
                .map_err(|error| ExtractError::Decryption(error.to_string()))?;
            debug!("decrypted PDF");
        }

        let pages = document
            .get_pages()
            .into_iter()
            .enumerate()
            .filter(|(_, (page_number, _))| {
                selection.is_none_or(|selection| selection.contains(*page_number))
            })
            .map(|(position, (page_number, object_id))| PageRef {
                page_number,
                object_id,
                position,
            })
            .collect::<Vec<_>>();
        if pages.is_empty() {
            return Err(ExtractError::NoPages);
        }

        // pdf-extract reloads the document itself and cannot take our secret.
        let (split_text, whole_text) = if encrypted {
            (None, None)
        } else {
            match pdf_extract::extract_text_from_mem(input_pdf) {
                Ok(text) => {
                    let split = split_text_into_pages(&text);
                    if split.len() == document.get_pages().len() {
                        (Some(split), None)
                    } else {
                        (None, Some(text))
                    }
                }
                Err(error) => {
                    debug!(%error, "pdf-extract failed; using content streams only");
                    (None, None)
                }
            }
        };

        Ok(Self {
            document,
            pages,
            split_text,
            whole_text,
        })
    }

    pub(crate) fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub(crate) fn page_text(&self, index: usize) -> Option<PageText> {
        let page = self.pages.get(index)?;

        let mut candidates = Vec::new();
        if let Some(text) = self
            .split_text
            .as_ref()
            .and_then(|split| split.get(page.position))
            .filter(|text| !text.trim().is_empty())
        {
            candidates.push(text.clone());
        }
        if let Some(text) = content_stream_text(&self.document, page.object_id) {
            candidates.push(text);
        }
        if let Some(text) = self
            .document
            .extract_text(&[page.page_number])
            .ok()
            .filter(|text| !text.trim().is_empty())
        {
            candidates.push(text);
        }

        let best_local = candidates
            .iter()
            .map(|text| quality_score(text))
            .max()
            .unwrap_or(i64::MIN / 4);
        if page.position == 0
            && best_local < WEAK_FIRST_PAGE_SCORE
            && let Some(text) = self
                .whole_text
                .as_ref()
                .filter(|text| !text.trim().is_empty())
        {
            candidates.push(text.clone());
        }

        let text = candidates
            .into_iter()
            .max_by_key(|text| quality_score(text))
            .unwrap_or_default();

        Some(PageText {
            page_number: page.page_number,
            text,
        })
    }
}

fn split_text_into_pages(raw_text: &str) -> Vec<String> {
    let mut pages = raw_text
        .split(FORM_FEED)
        .map(str::to_string)
        .collect::<Vec<_>>();
    if pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}

fn looks_decoding_broken(text: &str) -> bool {
    if text.contains("?Identity-H Unimplemented?") {
        return true;
    }

    let total = text.chars().count();
    if total == 0 {
        return false;
    }

    let replacement = text.matches('\u{FFFD}').count();
    let control = text
        .chars()
        .filter(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t'))
        .count();

    replacement * 8 > total || control * 5 > total
}

fn decode_pdf_bytes(encoding: Option<&str>, bytes: &[u8]) -> String {
    let decoded = Document::decode_text(encoding, bytes);
    if !looks_decoding_broken(&decoded) {
        return decoded;
    }

    let has_bom = bytes.starts_with(&[0xFE, 0xFF]) || bytes.starts_with(&[0xFF, 0xFE]);
    let lower = encoding.map(str::to_ascii_lowercase).unwrap_or_default();
    let wide = ["utf16", "ucs2", "identity-h", "unicode"]
        .iter()
        .any(|hint| lower.contains(hint));
    if has_bom || wide {
        let body = if has_bom && bytes.len() > 2 {
            &bytes[2..]
        } else {
            bytes
        };
        let (utf16, had_errors) = UTF_16BE.decode_without_bom_handling(body);
        if !had_errors && !utf16.is_empty() {
            return utf16.into_owned();
        }
    }

    if ["big5", "b5", "eten", "cns"]
        .iter()
        .any(|hint| lower.contains(hint))
    {
        let (big5, _, had_errors) = BIG5.decode(bytes);
        if !had_errors && !big5.is_empty() {
            return big5.into_owned();
        }
    }

    String::from_utf8_lossy(bytes).into_owned()
}

/// Ranks candidate page texts; lines that split into several cells count most.
fn quality_score(text: &str) -> i64 {
    if text.trim().is_empty() {
        return i64::MIN / 4;
    }

    let mut non_empty_lines = 0_i64;
    let mut multi_cell_lines = 0_i64;
    let mut numeric_lines = 0_i64;

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        non_empty_lines += 1;
        if split_line_into_cells(line).len() >= 2 || soft_split_line_into_cells(line).len() >= 3
        {
            multi_cell_lines += 1;
        }
        if line.chars().any(|ch| ch.is_ascii_digit()) {
            numeric_lines += 1;
        }
    }

    let broken_penalty = if looks_decoding_broken(text) { 800 } else { 0 };
    multi_cell_lines * 50 + numeric_lines * 5 + non_empty_lines - broken_penalty
}

fn content_stream_text(document: &Document, page_id: ObjectId) -> Option<String> {
    fn collect_text(text: &mut String, encoding: Option<&str>, operands: &[Object]) {
        for operand in operands {
            match operand {
                Object::String(bytes, _) => text.push_str(&decode_pdf_bytes(encoding, bytes)),
                Object::Array(items) => {
                    collect_text(text, encoding, items);
                    text.push(' ');
                }
                // Large negative kerning in TJ arrays separates words.
                Object::Integer(value) if *value < -100 => text.push(' '),
                _ => {}
            }
        }
    }

    let raw_content = document.get_page_content(page_id).ok()?;
    let content = Content::decode(&raw_content).ok()?;
    let encodings = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect::<BTreeMap<Vec<u8>, &str>>();

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_encoding = None;
    for operation in content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                current_encoding = operation
                    .operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                    .and_then(|font_name| encodings.get(font_name).copied());
            }
            "Tj" | "TJ" | "'" | "\"" => {
                collect_text(&mut current, current_encoding, &operation.operands);
            }
            "T*" | "Td" | "TD" | "ET" => {
                if !current.trim().is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
            }
            _ => {}
        }
    }

    if !current.trim().is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
