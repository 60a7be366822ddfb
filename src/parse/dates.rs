use super::text::normalize;
use super::{FieldParser, FieldTarget, ParseContext, ParseError, ParseInput};
use serde_json::{Map, Value};

/// Line prefixes (lowercase) that open the publication history block
pub const DATE_KEYWORDS: &[&str] = &[
    "received:",
    "accepted:",
    "published:",
    "published online:",
];

/// Split a `Received: ... / Accepted: ... / Published online: ...` line
///
/// Parts are classified by prefix; anything not received or accepted
/// counts as published. Parts without a `:` carry no date and are skipped.
pub fn parse_dates(line: &str) -> Map<String, Value> {
    let mut result = Map::new();

    for part in line.split('/').map(str::trim) {
        let Some((_, value)) = part.split_once(':') else {
            continue;
        };

        let lowered = part.to_lowercase();
        let phase = if lowered.starts_with("received") {
            "received"
        } else if lowered.starts_with("accepted") {
            "accepted"
        } else {
            "published"
        };

        result.insert(phase.to_string(), Value::String(normalize(value)));
    }

    result
}

/// Publication history found on page 1
pub struct DatesParser;

impl FieldParser for DatesParser {
    fn name(&self) -> &'static str {
        "dates"
    }

    fn target(&self) -> FieldTarget {
        FieldTarget::Group(&["received", "accepted", "published"])
    }

    fn parse(
        &self,
        input: &ParseInput<'_>,
        context: &mut ParseContext,
    ) -> Result<Value, ParseError> {
        for block in input.page_blocks(1) {
            let lowered = block.text.trim().to_lowercase();

            for keyword in DATE_KEYWORDS {
                if !lowered.starts_with(keyword) {
                    continue;
                }

                context.date_top = Some(block.top);
                context.date_size = Some(block.font_size);

                let line = block
                    .text
                    .lines()
                    .find(|l| l.trim().to_lowercase().starts_with(keyword))
                    .ok_or_else(|| {
                        ParseError::Malformed(format!("date line for '{}' vanished", keyword))
                    })?;

                return Ok(Value::Object(parse_dates(line)));
            }
        }

        Err(ParseError::Insufficient("Dates not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::fixtures;
    use crate::pdf::LayoutConfig;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(
        "Received: 3 May 2020 / Accepted: 1 June 2020 / Published online: 9 July 2020",
        json!({"received": "3 May 2020", "accepted": "1 June 2020", "published": "9 July 2020"})
    )]
    #[case("Received: 12 January 2019", json!({"received": "12 January 2019"}))]
    #[case("Published: 2 March 2021 / Online first", json!({"published": "2 March 2021"}))]
    #[case("Accepted:   5   May 2018", json!({"accepted": "5 May 2018"}))]
    fn test_parse_dates(#[case] line: &str, #[case] expected: Value) {
        assert_eq!(Value::Object(parse_dates(line)), expected);
    }

    #[test]
    fn test_dates_parser_records_position() {
        let layout = fixtures::document(vec![fixtures::first_page()]);
        let config = LayoutConfig::default();
        let blocks = layout.blocks(&config);
        let input = ParseInput {
            layout: &layout,
            blocks: &blocks,
        };
        let mut context = ParseContext::default();

        let value = DatesParser.parse(&input, &mut context).unwrap();
        assert_eq!(
            value,
            json!({"received": "3 May 2020", "accepted": "1 June 2020", "published": "9 July 2020"})
        );
        assert_eq!(context.date_top, Some(170.0));
        assert_eq!(context.date_size, Some(8.0));
    }

    #[test]
    fn test_dates_missing() {
        let layout = fixtures::document(vec![fixtures::page(1, &[("Just a title", 50.0, 80.0, 18.0)])]);
        let config = LayoutConfig::default();
        let blocks = layout.blocks(&config);
        let input = ParseInput {
            layout: &layout,
            blocks: &blocks,
        };

        let result = DatesParser.parse(&input, &mut ParseContext::default());
        assert!(matches!(result, Err(ParseError::Insufficient(_))));
    }
}
