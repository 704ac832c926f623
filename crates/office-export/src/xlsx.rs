//! Excel export of per-file analyses and of the comparison matrix

use clause_engine::ComparisonMatrix;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use shared_types::AnalysisRecord;
use tracing::debug;

use crate::error::ExportError;

/// Longest text a spreadsheet cell can hold
pub const MAX_CELL_CHARS: usize = 32_767;

const ANALYSIS_SHEET: &str = "Analysis";
const MATRIX_SHEET: &str = "Comparison";

/// Grid written by [`analysis_xlsx`]: a `Filename | Analysis` header,
/// then one row per record in input order
pub fn analysis_rows(records: &[AnalysisRecord]) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(vec!["Filename".to_string(), "Analysis".to_string()]);
    rows.extend(
        records
            .iter()
            .map(|r| vec![r.filename.clone(), r.analysis.clone()]),
    );
    rows
}

pub fn analysis_xlsx(records: &[AnalysisRecord]) -> Result<Vec<u8>, ExportError> {
    grid_workbook(ANALYSIS_SHEET, &analysis_rows(records), &[30.0, 100.0])
}

/// Comparison matrix as a sheet: labels down, files across. The raw
/// fallback is written as `Filename | Analysis`.
pub fn matrix_xlsx(matrix: &ComparisonMatrix) -> Result<Vec<u8>, ExportError> {
    let rows = matrix.rows();
    let widths = if matrix.is_fallback() {
        vec![30.0, 100.0]
    } else {
        let columns = rows.first().map_or(1, Vec::len);
        std::iter::once(26.0)
            .chain(std::iter::repeat(50.0).take(columns.saturating_sub(1)))
            .collect()
    };
    grid_workbook(MATRIX_SHEET, &rows, &widths)
}

fn grid_workbook(
    sheet: &str,
    rows: &[Vec<String>],
    widths: &[f64],
) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet)?;
    write_grid(worksheet, rows, widths)?;

    let bytes = workbook.save_to_buffer()?;
    debug!(
        "Wrote sheet {} with {} rows ({} bytes)",
        sheet,
        rows.len(),
        bytes.len()
    );
    Ok(bytes)
}

fn write_grid(
    worksheet: &mut Worksheet,
    rows: &[Vec<String>],
    widths: &[f64],
) -> Result<(), ExportError> {
    let header = Format::new().set_bold();
    let body = Format::new().set_text_wrap();

    for (col, width) in widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    for (r, row) in rows.iter().enumerate() {
        let format = if r == 0 { &header } else { &body };
        for (c, value) in row.iter().enumerate() {
            worksheet.write_string_with_format(r as u32, c as u16, truncate_cell(value), format)?;
        }
    }
    Ok(())
}

/// Cut `text` to the cell limit on a character boundary
pub fn truncate_cell(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}
