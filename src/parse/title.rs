use super::text::{normalize, repair_ligatures};
use super::{FieldParser, FieldTarget, ParseContext, ParseError, ParseInput};
use serde_json::Value;

/// First large block on page 1
///
/// Only the page number or running header tends to come before the title,
/// and both are set small, so "first big text" is enough.
pub struct TitleParser {
    min_font_size: f32,
}

impl TitleParser {
    pub fn new(min_font_size: f32) -> Self {
        Self { min_font_size }
    }
}

impl FieldParser for TitleParser {
    fn name(&self) -> &'static str {
        "title"
    }

    fn target(&self) -> FieldTarget {
        FieldTarget::Single("title")
    }

    fn parse(
        &self,
        input: &ParseInput<'_>,
        context: &mut ParseContext,
    ) -> Result<Value, ParseError> {
        let title = input
            .page_blocks(1)
            .find(|b| b.font_size >= self.min_font_size)
            .ok_or_else(|| ParseError::Insufficient("Title not found".to_string()))?;

        context.title_size = Some(title.font_size);
        Ok(Value::String(normalize(&repair_ligatures(&title.text))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::fixtures;
    use crate::pdf::LayoutConfig;

    #[test]
    fn test_finds_title_and_records_size() {
        let layout = fixtures::document(vec![fixtures::first_page()]);
        let config = LayoutConfig::default();
        let blocks = layout.blocks(&config);
        let input = ParseInput {
            layout: &layout,
            blocks: &blocks,
        };
        let mut context = ParseContext::default();

        let value = TitleParser::new(15.0).parse(&input, &mut context).unwrap();
        assert_eq!(value, Value::String("Layout Heuristics for Scholarly PDFs".into()));
        assert_eq!(context.title_size, Some(18.0));
    }

    #[test]
    fn test_multiline_title_is_joined() {
        let layout = fixtures::document(vec![fixtures::page(
            1,
            &[
                ("A Very Long Title That", 50.0, 80.0, 18.0),
                ("Wraps Onto Two Lines", 50.0, 100.0, 18.0),
            ],
        )]);
        let config = LayoutConfig::default();
        let blocks = layout.blocks(&config);
        let input = ParseInput {
            layout: &layout,
            blocks: &blocks,
        };

        let value = TitleParser::new(15.0)
            .parse(&input, &mut ParseContext::default())
            .unwrap();
        assert_eq!(
            value,
            Value::String("A Very Long Title That Wraps Onto Two Lines".into())
        );
    }

    #[test]
    fn test_title_only_on_first_page() {
        let layout = fixtures::document(vec![
            fixtures::page(1, &[("small text only", 50.0, 80.0, 10.0)]),
            fixtures::page(2, &[("Large Heading", 50.0, 80.0, 18.0)]),
        ]);
        let config = LayoutConfig::default();
        let blocks = layout.blocks(&config);
        let input = ParseInput {
            layout: &layout,
            blocks: &blocks,
        };

        let result = TitleParser::new(15.0).parse(&input, &mut ParseContext::default());
        assert!(matches!(result, Err(ParseError::Insufficient(_))));
    }
}
