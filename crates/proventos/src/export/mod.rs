//! Writers for the scraped dividend records.

pub mod xlsx;

use crate::error::Result;
use crate::table::DividendTable;
use std::collections::HashMap;
use std::path::Path;

pub use xlsx::XlsxExporter;

/// Serializes a header row plus a row-major grid of strings to a file.
pub trait Exporter {
    /// Write `table` to `path`, replacing any existing file.
    fn export(&self, table: &DividendTable, path: &Path) -> Result<()>;
}

/// Render the records as pretty JSON.
///
/// Each row becomes an object keyed by header. A repeated header gets a
/// `_N` suffix on its later occurrences (`Valor`, `Valor_1`). Cells beyond the
/// header width are keyed by their column position; missing cells are omitted.
pub fn to_json(table: &DividendTable) -> serde_json::Value {
    let keys = record_keys(&table.headers);
    let records: Vec<serde_json::Value> = table
        .rows
        .iter()
        .map(|row| {
            let mut obj = serde_json::Map::new();
            for (i, cell) in row.iter().enumerate() {
                let key = keys
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("column_{i}"));
                obj.insert(key, serde_json::Value::String(cell.clone()));
            }
            serde_json::Value::Object(obj)
        })
        .collect();

    serde_json::json!({
        "headers": table.headers,
        "rows": records,
    })
}

/// One distinct object key per header.
fn record_keys(headers: &[String]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    headers
        .iter()
        .map(|h| {
            let n = seen.entry(h.as_str()).or_insert(0);
            let key = if *n == 0 { h.clone() } else { format!("{h}_{n}") };
            *n += 1;
            key
        })
        .collect()
}
