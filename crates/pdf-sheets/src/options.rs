use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::ExtractError;
use crate::preview::DEFAULT_PREVIEW_ROWS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    pages: BTreeSet<u32>,
}

impl PageSelection {
    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }
}

impl FromStr for PageSelection {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut pages = BTreeSet::new();
        for token in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some((start, end)) = token.split_once('-') {
                let start = parse_page_number(start, "range start")?;
                let end = parse_page_number(end, "range end")?;
                if end < start {
                    return Err(format!(
                        "invalid range '{token}': end is smaller than start"
                    ));
                }
                pages.extend(start..=end);
            } else {
                pages.insert(parse_page_number(token, "number")?);
            }
        }

        if pages.is_empty() {
            return Err("page selection cannot be empty".to_string());
        }

        Ok(Self { pages })
    }
}

fn parse_page_number(raw: &str, what: &str) -> Result<u32, String> {
    let page: u32 = raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid page {what}: '{raw}'"))?;
    if page == 0 {
        return Err("pages are 1-based".to_string());
    }
    Ok(page)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Decryption secret. `None` and blank strings both mean "no secret".
    pub password: Option<String>,
    pub pages: Option<PageSelection>,
    /// Minimum cells required per candidate table row.
    pub min_cols: usize,
    pub preview_rows: usize,
    pub bold_header: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            password: None,
            pages: None,
            min_cols: 2,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            bold_header: true,
        }
    }
}

impl ExtractOptions {
    /// Restricts extraction to a page selection such as `1-3,5`.
    pub fn with_pages(mut self, pages: &str) -> Result<Self, ExtractError> {
        let selection = pages
            .parse::<PageSelection>()
            .map_err(ExtractError::InvalidPageSelection)?;
        self.pages = Some(selection);
        Ok(self)
    }

    pub(crate) fn validate(&self) -> Result<(), ExtractError> {
        if self.min_cols < 2 {
            return Err(ExtractError::InvalidOption(
                "min_cols must be at least 2".to_string(),
            ));
        }
        if self.preview_rows == 0 {
            return Err(ExtractError::InvalidOption(
                "preview_rows must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The password to decrypt with; empty when none was given.
    pub(crate) fn effective_password(&self) -> &str {
        self.password.as_deref().map_or("", str::trim)
    }
}
