//! Field parsers
//!
//! Each parser looks at the text blocks of a paper and produces one JSON
//! value. Parsers run in a fixed order and share a [`ParseContext`], so the
//! author heuristic can use the title and date positions found before it.
//!
//! A parser that cannot find its field returns [`ParseError::Insufficient`];
//! the caller logs it and moves on to the next parser.

mod authors;
mod body;
mod dates;
mod tables;
pub mod text;
mod title;

pub use authors::AuthorsParser;
pub use body::BodyParser;
pub use dates::{parse_dates, DatesParser, DATE_KEYWORDS};
pub use tables::{TableParser, MIN_TABLE_COLUMNS, MIN_TABLE_ROWS};
pub use title::TitleParser;

use crate::config::HarvestConfig;
use crate::pdf::{DocumentLayout, TextBlock};
use serde_json::Value;
use thiserror::Error;

/// Why a parser produced no value
#[derive(Error, Debug)]
pub enum ParseError {
    /// The heuristic did not find its field in this paper
    #[error("{0}")]
    Insufficient(String),

    /// The layout contradicted the parser's assumptions
    #[error("{0}")]
    Malformed(String),
}

/// Where a parser's value is stored in the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTarget {
    /// One field, e.g. `title`
    Single(&'static str),
    /// An object whose members are spread into sibling fields
    Group(&'static [&'static str]),
}

/// Facts discovered by earlier parsers
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    /// Font size of the title block
    pub title_size: Option<f32>,
    /// Top edge of the date block on page 1
    pub date_top: Option<f32>,
    /// Font size of the date block
    pub date_size: Option<f32>,
    /// Dominant font size of the running text
    pub body_size: Option<f32>,
}

/// Input shared by every parser of one document
pub struct ParseInput<'a> {
    pub layout: &'a DocumentLayout,
    pub blocks: &'a [TextBlock],
}

impl<'a> ParseInput<'a> {
    /// Blocks on the given page, in document order
    pub fn page_blocks(&self, page: u32) -> impl Iterator<Item = &'a TextBlock> + 'a {
        self.blocks.iter().filter(move |b| b.page == page)
    }
}

/// A heuristic extracting one field (or group of fields) from a paper
pub trait FieldParser: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    fn target(&self) -> FieldTarget;

    fn parse(
        &self,
        input: &ParseInput<'_>,
        context: &mut ParseContext,
    ) -> Result<Value, ParseError>;
}

/// Parsers in the order they must run
pub fn default_parsers(config: &HarvestConfig) -> Vec<Box<dyn FieldParser>> {
    let mut parsers: Vec<Box<dyn FieldParser>> = vec![
        Box::new(TitleParser::new(config.min_title_font_size)),
        Box::new(DatesParser),
        Box::new(AuthorsParser),
    ];
    if config.extract_body {
        parsers.push(Box::new(BodyParser::new(config.layout.clone())));
    }
    if config.extract_tables {
        parsers.push(Box::new(TableParser::default()));
    }
    parsers
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parser_order() {
        let parsers = default_parsers(&HarvestConfig::default());
        let names: Vec<&str> = parsers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["title", "dates", "authors", "body", "tables"]);
    }

    #[test]
    fn test_optional_parsers_disabled() {
        let config = HarvestConfig {
            extract_body: false,
            extract_tables: false,
            ..HarvestConfig::default()
        };
        let names: Vec<&str> = default_parsers(&config).iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["title", "dates", "authors"]);
    }
}
