//! Scraped dividend records.

use serde::Serialize;

/// Header row and body rows of the dividends table, as displayed on the page.
///
/// Cells are kept as raw display text. Rows are not checked against the
/// header width: a short or long row is stored exactly as read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DividendTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DividendTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a body row. Rows with no cells are dropped.
    pub fn push_row(&mut self, row: Vec<String>) -> bool {
        if row.is_empty() {
            return false;
        }
        self.rows.push(row);
        true
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose width differs from the header row.
    pub fn ragged_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.len() != self.headers.len())
            .count()
    }
}
