use super::text::{normalize, repair_ligatures};
use super::{FieldParser, FieldTarget, ParseContext, ParseError, ParseInput};
use crate::pdf::{PageLayout, TextLine};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;

/// Runs a line needs to count as a table row
pub const MIN_TABLE_COLUMNS: usize = 3;
/// Rows a run of tabular lines needs to count as a table
pub const MIN_TABLE_ROWS: usize = 2;

fn caption_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?i:table)\s+\d+").expect("valid caption regex"))
}

/// Column-aligned line groups
///
/// Every wide horizontal gap in a line already splits it into separate
/// runs, so a table row is simply a line with several runs.
pub struct TableParser {
    min_columns: usize,
    min_rows: usize,
}

impl Default for TableParser {
    fn default() -> Self {
        Self {
            min_columns: MIN_TABLE_COLUMNS,
            min_rows: MIN_TABLE_ROWS,
        }
    }
}

impl TableParser {
    /// Groups of consecutive tabular lines on one page
    fn find_row_groups<'a>(&self, page: &'a PageLayout) -> Vec<Vec<&'a TextLine>> {
        let mut groups = Vec::new();
        let mut current: Vec<&TextLine> = Vec::new();

        for line in &page.lines {
            let tabular = line.runs.len() >= self.min_columns;
            let adjacent = current.last().map_or(true, |prev: &&TextLine| {
                let height = (prev.bottom - prev.top).max(1.0);
                line.top - prev.bottom <= height * 2.0
            });

            if tabular && adjacent {
                current.push(line);
                continue;
            }

            if current.len() >= self.min_rows {
                groups.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }

            if tabular {
                current.push(line);
            }
        }

        if current.len() >= self.min_rows {
            groups.push(current);
        }

        groups
    }
}

fn cell_text(text: &str) -> Value {
    Value::String(normalize(&repair_ligatures(text)))
}

impl FieldParser for TableParser {
    fn name(&self) -> &'static str {
        "tables"
    }

    fn target(&self) -> FieldTarget {
        FieldTarget::Single("tables")
    }

    fn parse(
        &self,
        input: &ParseInput<'_>,
        _context: &mut ParseContext,
    ) -> Result<Value, ParseError> {
        let mut tables = Vec::new();

        for page in &input.layout.pages {
            for group in self.find_row_groups(page) {
                let top = group.first().map(|l| l.top).unwrap_or_default();

                let caption = input
                    .page_blocks(page.page)
                    .filter(|b| b.bottom <= top)
                    .filter(|b| caption_re().is_match(b.text.trim()))
                    .last()
                    .map(|b| normalize(&repair_ligatures(&b.text)));

                let rows: Vec<Value> = group
                    .iter()
                    .map(|line| Value::Array(line.runs.iter().map(|r| cell_text(&r.text)).collect()))
                    .collect();

                let mut table = Map::new();
                table.insert("page".to_string(), json!(page.page));
                if let Some(caption) = caption {
                    table.insert("caption".to_string(), Value::String(caption));
                }
                table.insert("rows".to_string(), Value::Array(rows));
                tables.push(Value::Object(table));
            }
        }

        if tables.is_empty() {
            return Err(ParseError::Insufficient("No tables found".to_string()));
        }

        Ok(Value::Array(tables))
    }
}
