//! Single-sheet `.xlsx` writer.

use super::Exporter;
use crate::error::{ExtractError, Result};
use crate::table::DividendTable;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use std::path::Path;
use tracing::info;

/// Writes the header row and every data row as plain strings on one sheet.
/// No index column and no styling.
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxExporter;

fn write_row(sheet: &mut Worksheet, row: u32, cells: &[String]) -> std::result::Result<(), XlsxError> {
    for (col, cell) in cells.iter().enumerate() {
        let col = u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)?;
        sheet.write_string(row, col, cell)?;
    }
    Ok(())
}

impl Exporter for XlsxExporter {
    fn export(&self, table: &DividendTable, path: &Path) -> Result<()> {
        let export_err = |e: XlsxError| ExtractError::Export {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        write_row(sheet, 0, &table.headers).map_err(export_err)?;
        for (i, row) in table.rows.iter().enumerate() {
            let r = u32::try_from(i + 1).map_err(|_| export_err(XlsxError::RowColumnLimitError))?;
            write_row(sheet, r, row).map_err(export_err)?;
        }

        workbook.save(path).map_err(export_err)?;
        info!("wrote {} rows to {}", table.len(), path.display());
        Ok(())
    }
}
