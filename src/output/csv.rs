use crate::error::Result;
use crate::record::{Cell, Table};
use std::path::Path;

/// Write a table with a leading index column whose header is empty
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = Vec::with_capacity(table.columns().len() + 1);
    header.push(String::new());
    header.extend(table.columns().iter().cloned());
    writer.write_record(&header)?;

    for row in table.rows() {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.index.clone());
        for column in table.columns() {
            record.push(row.get(column).map(Cell::to_string).unwrap_or_default());
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Read a table written by [`write_csv`]
///
/// Cell types are inferred again from the text, so integers and floats
/// survive a round trip while everything else comes back as text.
pub fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path)?;
    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .skip(1)
        .map(str::to_string)
        .collect();

    let mut table = Table::new();
    for column in &columns {
        table.add_column(column);
    }

    for result in reader.records() {
        let record = result?;
        let index = record.get(0).unwrap_or_default();
        table.ensure_row(index);
        for (column, raw) in columns.iter().zip(record.iter().skip(1)) {
            if let Some(cell) = Cell::parse(raw) {
                table.set(index, column, cell);
            }
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_csv_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.gen.csv");

        let mut table = Table::new();
        table.set("p", "title", Cell::Text("A, B".into()));
        table.set("p", "authors.length", Cell::Integer(2));

        write_csv(&table, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, ",title,authors.length\np,\"A, B\",2\n");
    }

    #[test]
    fn test_csv_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.gen.csv");

        let mut table = Table::new();
        table.set("p", "title", Cell::Text("Title".into()));
        table.set("p", "score", Cell::Float(0.5));
        table.set("q", "title", Cell::Text("Other".into()));
        table.add_column("empty");

        write_csv(&table, &path).unwrap();
        let read = read_csv(&path).unwrap();

        assert_eq!(read.columns(), ["title", "score", "empty"]);
        assert_eq!(read.get("p", "score"), Some(&Cell::Float(0.5)));
        assert_eq!(read.get("q", "score"), None);
        assert_eq!(read.rows().len(), 2);
    }
}
