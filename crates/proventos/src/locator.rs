//! Dividends-table locator.
//!
//! Walks the page's tables in document order and takes the first one whose
//! header row names both an asset column and a value column. Later tables are
//! never looked at, even if they would also match.

use crate::error::Result;
use crate::renderer::RenderContext;
use crate::table::DividendTable;
use tracing::{debug, info};

/// Header keywords that identify the dividends table.
///
/// Matching is case-sensitive substring containment on each header cell.
#[derive(Debug, Clone)]
pub struct HeaderMatcher {
    pub asset_keywords: Vec<String>,
    pub value_keywords: Vec<String>,
}

impl Default for HeaderMatcher {
    fn default() -> Self {
        Self {
            asset_keywords: vec!["Ativo".into(), "Ticker".into()],
            value_keywords: vec!["Valor".into()],
        }
    }
}

impl HeaderMatcher {
    /// True iff some header names an asset and some header names a value.
    pub fn matches<S: AsRef<str>>(&self, headers: &[S]) -> bool {
        let has = |keywords: &[String]| {
            headers
                .iter()
                .any(|h| keywords.iter().any(|k| h.as_ref().contains(k.as_str())))
        };
        has(&self.asset_keywords[..]) && has(&self.value_keywords[..])
    }
}

/// A located table together with its position on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedTable {
    pub index: usize,
    pub table: DividendTable,
}

/// Find the first matching table and read its body rows.
///
/// Returns `Ok(None)` when no table on the page matches.
pub async fn locate(
    context: &mut dyn RenderContext,
    matcher: &HeaderMatcher,
) -> Result<Option<LocatedTable>> {
    let count = context.snapshot_tables().await?;
    debug!("{count} tables on page");

    for index in 0..count {
        let headers = context.table_headers(index).await?;
        debug!("table {index} headers: {headers:?}");
        if !matcher.matches(&headers) {
            continue;
        }

        let mut table = DividendTable::new(headers);
        for row in context.table_rows(index).await? {
            table.push_row(row);
        }
        info!("dividends table is #{index} with {} rows", table.len());
        return Ok(Some(LocatedTable { index, table }));
    }

    Ok(None)
}
