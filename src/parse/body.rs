use super::text::{dehyphenate, repair_ligatures};
use super::{FieldParser, FieldTarget, ParseContext, ParseError, ParseInput};
use crate::pdf::{LayoutConfig, TextBlock};
use serde_json::Value;

/// Blocks narrower than this share of the page width belong to a column
const COLUMN_WIDTH_RATIO: f32 = 0.6;

/// Running text set in the dominant font size, in reading order
pub struct BodyParser {
    layout: LayoutConfig,
}

impl BodyParser {
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }
}

/// Reorder one page of blocks for two-column reading
///
/// Full-width blocks (headings spanning both columns, wide figures) cut the
/// page into bands; inside a band the left column is read before the right.
fn reading_order<'a>(mut blocks: Vec<&'a TextBlock>, page_width: f32) -> Vec<&'a TextBlock> {
    blocks.sort_by(|a, b| a.top.partial_cmp(&b.top).unwrap_or(std::cmp::Ordering::Equal));

    let column_of = |b: &TextBlock| -> usize {
        if b.left + b.width / 2.0 < page_width / 2.0 {
            0
        } else {
            1
        }
    };

    let mut ordered = Vec::with_capacity(blocks.len());
    let mut band: Vec<&TextBlock> = Vec::new();

    for block in blocks {
        if page_width > 0.0 && block.width >= page_width * COLUMN_WIDTH_RATIO {
            band.sort_by_key(|b| column_of(b));
            ordered.append(&mut band);
            ordered.push(block);
        } else {
            band.push(block);
        }
    }

    // sort_by_key is stable, so blocks keep their vertical order per column
    band.sort_by_key(|b| column_of(b));
    ordered.append(&mut band);
    ordered
}

impl FieldParser for BodyParser {
    fn name(&self) -> &'static str {
        "body"
    }

    fn target(&self) -> FieldTarget {
        FieldTarget::Single("body")
    }

    fn parse(
        &self,
        input: &ParseInput<'_>,
        context: &mut ParseContext,
    ) -> Result<Value, ParseError> {
        let body_size = input
            .layout
            .dominant_font_size(&self.layout)
            .ok_or_else(|| ParseError::Insufficient("Document has no text".to_string()))?;
        context.body_size = Some(body_size);

        let mut paragraphs = Vec::new();

        for page in &input.layout.pages {
            let blocks: Vec<&TextBlock> = input
                .page_blocks(page.page)
                .filter(|b| (b.font_size - body_size).abs() <= self.layout.font_tolerance)
                .collect();

            for block in reading_order(blocks, page.width) {
                let repaired = repair_ligatures(&block.text);
                let paragraph = dehyphenate(repaired.lines());
                if !paragraph.is_empty() {
                    paragraphs.push(paragraph);
                }
            }
        }

        if paragraphs.is_empty() {
            return Err(ParseError::Insufficient("Body text not found".to_string()));
        }

        Ok(Value::String(paragraphs.join("\n\n")))
    }
}
