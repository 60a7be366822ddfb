use crate::error::Result;
use crate::record::{Cell, Table};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;

/// Longest string a single Excel cell accepts
const MAX_CELL_CHARS: usize = 32_767;

fn column_number(index: usize) -> std::result::Result<u16, XlsxError> {
    u16::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

fn row_number(index: usize) -> std::result::Result<u32, XlsxError> {
    u32::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

fn write_text(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    text: &str,
) -> std::result::Result<(), XlsxError> {
    if text.chars().count() > MAX_CELL_CHARS {
        tracing::debug!(row, col, "Truncating cell text to the Excel limit");
        let truncated: String = text.chars().take(MAX_CELL_CHARS).collect();
        sheet.write_string(row, col, truncated)?;
    } else {
        sheet.write_string(row, col, text)?;
    }
    Ok(())
}

/// Write a table to `Sheet1` with a bold header row and the index in column A
pub fn write_xlsx(table: &Table, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet1")?;

    for (i, column) in table.columns().iter().enumerate() {
        sheet.write_string_with_format(0, column_number(i + 1)?, column, &header)?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let excel_row = row_number(r + 1)?;
        sheet.write_string_with_format(excel_row, 0, &row.index, &header)?;

        for (c, column) in table.columns().iter().enumerate() {
            let col = column_number(c + 1)?;
            match row.get(column) {
                Some(Cell::Text(text)) => write_text(sheet, excel_row, col, text)?,
                Some(Cell::Integer(i)) => {
                    sheet.write_number(excel_row, col, *i as f64)?;
                }
                Some(Cell::Float(x)) => {
                    sheet.write_number(excel_row, col, *x)?;
                }
                Some(Cell::Bool(b)) => {
                    sheet.write_boolean(excel_row, col, *b)?;
                }
                None => {}
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_xlsx_creates_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.gen.xlsx");

        let mut table = Table::new();
        table.set("p", "title", Cell::Text("Title".into()));
        table.set("p", "authors.length", Cell::Integer(2));
        table.set("p", "flag", Cell::Bool(true));

        write_xlsx(&table, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // xlsx files are zip archives
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn test_long_text_is_truncated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("long.gen.xlsx");

        let mut table = Table::new();
        table.set("p", "body", Cell::Text("x".repeat(MAX_CELL_CHARS + 10)));

        assert!(write_xlsx(&table, &path).is_ok());
    }
}
