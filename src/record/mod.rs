//! Per-paper records
//!
//! A record keeps every parser result twice: once as nested JSON (for the
//! JSON and pickle outputs) and once flattened into a single table row with
//! dotted column names (for CSV and XLSX). Lists become `name.length` plus
//! `name.0`, `name.1`, ...; objects become `name.<member>`.

pub mod table;

pub use table::{Cell, Table, TableRow};

use crate::error::{Error, Result};
use crate::parse::FieldTarget;
use serde_json::{Map, Value};

/// Separator between nested column name components
pub const COLUMN_SEPARATOR: &str = ".";

/// Everything extracted from one paper
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// File stem of the source PDF
    pub key: String,
    /// Nested values, starting with `document`
    pub structured: Map<String, Value>,
    /// One row indexed by `key`
    pub table: Table,
}

impl Record {
    pub fn new(key: &str) -> Self {
        let mut structured = Map::new();
        structured.insert("document".to_string(), Value::String(format!("{}.pdf", key)));
        let mut table = Table::new();
        table.ensure_row(key);

        Self {
            key: key.to_string(),
            structured,
            table,
        }
    }

    /// Store a parser result under its target
    ///
    /// Group targets take an object and spread the named members into
    /// sibling fields; members missing from the object are kept as `null`
    /// in the structured record and left out of the table.
    pub fn store(&mut self, parser: &str, target: FieldTarget, value: Value) -> Result<()> {
        match target {
            FieldTarget::Single(name) => {
                self.store_value(name, value, false);
                Ok(())
            }
            FieldTarget::Group(names) => match value {
                Value::Null => Ok(()),
                Value::Object(mut members) => {
                    for name in names {
                        let member = members.remove(*name).unwrap_or(Value::Null);
                        self.store_value(name, member.clone(), true);
                        self.structured.insert(name.to_string(), member);
                    }
                    Ok(())
                }
                other => Err(Error::Record {
                    parser: parser.to_string(),
                    reason: format!(
                        "group target {:?} needs an object, got {}",
                        names,
                        json_kind(&other)
                    ),
                }),
            },
        }
    }

    fn store_value(&mut self, name: &str, value: Value, table_only: bool) {
        match &value {
            Value::Null => return,
            Value::Array(entries) => {
                self.table.set(
                    &self.key,
                    &format!("{}{}length", name, COLUMN_SEPARATOR),
                    Cell::Integer(entries.len() as i64),
                );
                for (i, entry) in entries.iter().enumerate() {
                    self.store_value(&format!("{}{}{}", name, COLUMN_SEPARATOR, i), entry.clone(), true);
                }
            }
            Value::Object(members) => {
                for (member, entry) in members {
                    self.store_value(
                        &format!("{}{}{}", name, COLUMN_SEPARATOR, member),
                        entry.clone(),
                        true,
                    );
                }
            }
            scalar => {
                if let Some(cell) = Cell::from_json(scalar) {
                    self.table.set(&self.key, name, cell);
                }
            }
        }

        if !table_only {
            self.structured.insert(name.to_string(), value);
        }
    }

    /// The structured record as a JSON value
    pub fn to_json(&self) -> Value {
        Value::Object(self.structured.clone())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_new_record_has_document() {
        let record = Record::new("paper-01");
        assert_eq!(record.to_json(), json!({"document": "paper-01.pdf"}));
        assert_eq!(record.table.rows().len(), 1);
        assert!(record.table.columns().is_empty());
    }

    #[test]
    fn test_store_scalar_and_list() {
        let mut record = Record::new("p");
        record
            .store("title", FieldTarget::Single("title"), json!("A Title"))
            .unwrap();
        record
            .store("authors", FieldTarget::Single("authors"), json!(["Ana", "Marko"]))
            .unwrap();

        assert_eq!(
            record.table.columns(),
            ["title", "authors.length", "authors.0", "authors.1"]
        );
        assert_eq!(record.table.get("p", "authors.length"), Some(&Cell::Integer(2)));
        assert_eq!(record.table.get("p", "authors.1"), Some(&Cell::Text("Marko".into())));
        assert_eq!(
            record.to_json(),
            json!({"document": "p.pdf", "title": "A Title", "authors": ["Ana", "Marko"]})
        );
    }

    #[test]
    fn test_store_group_spreads_members() {
        let mut record = Record::new("p");
        record
            .store(
                "dates",
                FieldTarget::Group(&["received", "accepted", "published"]),
                json!({"published": "9 July 2020", "received": "3 May 2020"}),
            )
            .unwrap();

        assert_eq!(record.table.columns(), ["received", "published"]);
        assert_eq!(
            record.to_json(),
            json!({
                "document": "p.pdf",
                "received": "3 May 2020",
                "accepted": null,
                "published": "9 July 2020"
            })
        );
    }

    #[test]
    fn test_store_nested_objects_flatten() {
        let mut record = Record::new("p");
        record
            .store(
                "tables",
                FieldTarget::Single("tables"),
                json!([{"page": 2, "rows": [["a", "b"]]}]),
            )
            .unwrap();

        assert_eq!(
            record.table.columns(),
            [
                "tables.length",
                "tables.0.page",
                "tables.0.rows.length",
                "tables.0.rows.0.length",
                "tables.0.rows.0.0",
                "tables.0.rows.0.1"
            ]
        );
        assert_eq!(record.table.get("p", "tables.0.page"), Some(&Cell::Integer(2)));
    }

    #[test]
    fn test_store_group_rejects_scalar() {
        let mut record = Record::new("p");
        let result = record.store("dates", FieldTarget::Group(&["received"]), json!("oops"));
        assert!(matches!(result, Err(Error::Record { .. })));
    }

    #[test]
    fn test_null_is_skipped() {
        let mut record = Record::new("p");
        record
            .store("title", FieldTarget::Single("title"), Value::Null)
            .unwrap();
        assert_eq!(record.to_json(), json!({"document": "p.pdf"}));
    }
}
