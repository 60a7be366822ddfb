use super::text::{normalize, repair_ligatures};
use super::{FieldParser, FieldTarget, ParseContext, ParseError, ParseInput};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

// One name component: letters, modifier letters/symbols, dots and dashes.
// This matches most short phrases too; position and font size do the real
// filtering.
const NAME_COMPONENT: &str = r"[\p{L}\p{Lm}\p{Sk}.\p{Pd}]";

/// Separator some journals render in place of `·` between authors
const SEPARATOR_GLYPH: &str = "Æ";

fn author_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"^(?:[,\u{{00B7}}]\p{{Zs}}+)?({c}+(?:\p{{Zs}}{c}+)+)",
            c = NAME_COMPONENT
        );
        Regex::new(&pattern).expect("valid author regex")
    })
}

fn prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[,\u{00B7}]\p{Zs}+").expect("valid prefix regex"))
}

/// Whether `content` starts like a list of author names
pub fn is_namelike(content: &str) -> bool {
    author_name_re().is_match(content)
}

/// Author blocks between the title and the publication history
///
/// Authors sit above the dates on page 1 and are set larger than the dates
/// but smaller than the title.
pub struct AuthorsParser;

impl FieldParser for AuthorsParser {
    fn name(&self) -> &'static str {
        "authors"
    }

    fn target(&self) -> FieldTarget {
        FieldTarget::Single("authors")
    }

    fn parse(
        &self,
        input: &ParseInput<'_>,
        context: &mut ParseContext,
    ) -> Result<Value, ParseError> {
        let (Some(title_size), Some(date_top), Some(date_size)) =
            (context.title_size, context.date_top, context.date_size)
        else {
            return Err(ParseError::Insufficient(
                "Authors need title and date positions".to_string(),
            ));
        };

        let authors: Vec<Value> = input
            .page_blocks(1)
            .filter(|b| b.top <= date_top)
            .filter(|b| b.font_size > date_size && b.font_size < title_size)
            .map(|b| normalize(&repair_ligatures(&b.text)))
            .filter(|text| !text.is_empty() && text != SEPARATOR_GLYPH)
            .filter(|text| is_namelike(text))
            .map(|text| Value::String(prefix_re().replace(&text, "").into_owned()))
            .collect();

        if authors.is_empty() {
            return Err(ParseError::Insufficient("Author not found".to_string()));
        }

        Ok(Value::Array(authors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{fixtures, DatesParser, TitleParser};
    use crate::pdf::LayoutConfig;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("Ana Kovač", true)]
    #[case("· Marko Horvat", true)]
    #[case(", J. R. R. Tolkien", true)]
    #[case("Jean-Luc Picard", true)]
    #[case("Ørjan Ødegård-Nilsen", true)]
    #[case("Madonna", false)]
    #[case("1 Department of Physics", false)]
    fn test_is_namelike(#[case] content: &str, #[case] expected: bool) {
        assert_eq!(is_namelike(content), expected);
    }

    #[test]
    fn test_authors_between_title_and_dates() {
        let layout = fixtures::document(vec![fixtures::first_page()]);
        let config = LayoutConfig::default();
        let blocks = layout.blocks(&config);
        let input = ParseInput {
            layout: &layout,
            blocks: &blocks,
        };
        let mut context = ParseContext::default();
        TitleParser::new(15.0).parse(&input, &mut context).unwrap();
        DatesParser.parse(&input, &mut context).unwrap();

        let value = AuthorsParser.parse(&input, &mut context).unwrap();
        assert_eq!(value, json!(["Ana Kovač", "Marko Horvat"]));
    }

    #[test]
    fn test_authors_require_context() {
        let layout = fixtures::document(vec![fixtures::first_page()]);
        let config = LayoutConfig::default();
        let blocks = layout.blocks(&config);
        let input = ParseInput {
            layout: &layout,
            blocks: &blocks,
        };

        let result = AuthorsParser.parse(&input, &mut ParseContext::default());
        assert!(matches!(result, Err(ParseError::Insufficient(_))));
    }

    #[test]
    fn test_separator_glyph_skipped() {
        let layout = fixtures::document(vec![fixtures::page(
            1,
            &[
                ("Title Of Paper", 50.0, 80.0, 18.0),
                ("Ana Kovač", 50.0, 120.0, 11.0),
                ("Æ", 150.0, 120.0, 11.0),
                ("Received: 1 May 2020", 50.0, 170.0, 8.0),
            ],
        )]);
        let config = LayoutConfig::default();
        let blocks = layout.blocks(&config);
        let input = ParseInput {
            layout: &layout,
            blocks: &blocks,
        };
        let mut context = ParseContext {
            title_size: Some(18.0),
            date_top: Some(170.0),
            date_size: Some(8.0),
            ..ParseContext::default()
        };

        let value = AuthorsParser.parse(&input, &mut context).unwrap();
        assert_eq!(value, json!(["Ana Kovač"]));
    }
}
