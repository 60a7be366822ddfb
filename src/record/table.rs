//! Flat tabular view of records: ordered columns, rows keyed by document

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// A single table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl Cell {
    /// Convert a scalar JSON value; `None` for null, arrays and objects
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Cell::Text(s.clone())),
            Value::Bool(b) => Some(Cell::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Cell::Integer)
                .or_else(|| n.as_f64().map(Cell::Float)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Infer a cell from CSV text: integers, then floats, then booleans, else text
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Some(Cell::Integer(i));
        }
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                return Some(Cell::Float(f));
            }
        }
        match raw {
            "True" => Some(Cell::Bool(true)),
            "False" => Some(Cell::Bool(false)),
            _ => Some(Cell::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Float(x) => write!(f, "{}", x),
            Cell::Bool(true) => f.write_str("True"),
            Cell::Bool(false) => f.write_str("False"),
        }
    }
}

/// One row of a [`Table`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    /// Row label (the document key)
    pub index: String,
    cells: HashMap<String, Cell>,
}

impl TableRow {
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }
}

/// Columns in first-seen order and rows in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Append a column unless it already exists
    pub fn add_column(&mut self, column: &str) {
        if !self.columns.iter().any(|c| c == column) {
            self.columns.push(column.to_string());
        }
    }

    /// Set a cell, creating the row and column as needed
    pub fn set(&mut self, index: &str, column: &str, cell: Cell) {
        self.add_column(column);

        let row = match self.rows.iter().position(|r| r.index == index) {
            Some(pos) => &mut self.rows[pos],
            None => {
                self.rows.push(TableRow {
                    index: index.to_string(),
                    cells: HashMap::new(),
                });
                let last = self.rows.len() - 1;
                &mut self.rows[last]
            }
        };
        row.cells.insert(column.to_string(), cell);
    }

    pub fn get(&self, index: &str, column: &str) -> Option<&Cell> {
        self.rows
            .iter()
            .find(|r| r.index == index)
            .and_then(|r| r.get(column))
    }

    /// Make sure a row exists even when it has no cells
    pub fn ensure_row(&mut self, index: &str) {
        if !self.rows.iter().any(|r| r.index == index) {
            self.rows.push(TableRow {
                index: index.to_string(),
                cells: HashMap::new(),
            });
        }
    }

    /// Stack tables: union of columns in first-seen order, rows in input order
    pub fn concat<'a, I>(tables: I) -> Self
    where
        I: IntoIterator<Item = &'a Table>,
    {
        let mut merged = Table::new();
        for table in tables {
            for column in &table.columns {
                if !merged.columns.contains(column) {
                    merged.columns.push(column.clone());
                }
            }
            merged.rows.extend(table.rows.iter().cloned());
        }
        merged
    }
}
