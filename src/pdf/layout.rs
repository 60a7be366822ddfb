//! Page layout model: glyphs grouped into lines, runs and text blocks
//!
//! The grouping works on plain coordinates so it can be driven from PDFium
//! output or from a cached layout file alike. All coordinates are in points
//! with `y` growing downwards from the top edge of the page.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Character information collected from a page
#[derive(Debug, Clone, PartialEq)]
pub struct CharInfo {
    /// The character
    pub ch: char,
    /// X coordinate (left)
    pub x: f32,
    /// Distance from the top of the page to the glyph's top edge
    pub y: f32,
    /// Glyph width
    pub width: f32,
    /// Glyph height
    pub height: f32,
    /// Font size reported by the PDF
    pub font_size: f32,
}

/// Contiguous glyphs on one line sharing a font size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
}

impl TextRun {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Runs sharing a baseline band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub top: f32,
    pub bottom: f32,
    pub runs: Vec<TextRun>,
}

impl TextLine {
    /// Line text with runs separated by a single space
    pub fn text(&self) -> String {
        self.runs
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One page of grouped text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Page number (1-indexed)
    pub page: u32,
    pub width: f32,
    pub height: f32,
    pub lines: Vec<TextLine>,
}

/// Layout of a whole document, as stored in the layout cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    /// Path of the PDF the layout was built from
    pub source: String,
    pub pages: Vec<PageLayout>,
}

/// A text box: vertically adjacent runs with one font size and left edge
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    /// Page number (1-indexed)
    pub page: u32,
    /// Block text, line breaks preserved as `\n`
    pub text: String,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub bottom: f32,
    pub font_size: f32,
}

/// Thresholds for grouping glyphs
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Glyphs whose font sizes differ by at most this much stay in one run
    pub font_tolerance: f32,
    /// Horizontal gap (in median glyph heights) that starts a new run
    pub run_gap_factor: f32,
    /// Vertical gap (in font sizes) still treated as the same block
    pub block_gap_factor: f32,
    /// Left edge drift allowed inside one block
    pub block_left_tolerance: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_tolerance: 0.5,
            run_gap_factor: 1.5,
            block_gap_factor: 0.8,
            block_left_tolerance: 2.0,
        }
    }
}

fn cmp_f32(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Calculate line tolerance and space threshold from the median glyph height
fn calculate_dynamic_thresholds(chars: &[CharInfo]) -> (f32, f32, f32) {
    let mut heights: Vec<f32> = chars
        .iter()
        .filter(|c| c.height > 0.0)
        .map(|c| c.height)
        .collect();

    if heights.is_empty() {
        return (5.0, 3.0, 10.0);
    }

    heights.sort_by(|a, b| cmp_f32(*a, *b));
    let median_height = heights[heights.len() / 2];

    let y_tolerance = (median_height * 0.4).max(2.0);
    let space_threshold = (median_height * 0.3).max(3.0);

    (y_tolerance, space_threshold, median_height)
}

/// Group glyphs into lines by vertical proximity, each sorted left to right
fn group_into_lines(mut chars: Vec<CharInfo>, y_tolerance: f32) -> Vec<Vec<CharInfo>> {
    chars.sort_by(|a, b| match cmp_f32(a.y, b.y) {
        Ordering::Equal => cmp_f32(a.x, b.x),
        other => other,
    });

    let mut lines: Vec<Vec<CharInfo>> = Vec::new();
    let mut current: Vec<CharInfo> = Vec::new();
    let mut current_y: Option<f32> = None;

    for info in chars {
        match current_y {
            Some(y) if (info.y - y).abs() <= y_tolerance => current.push(info),
            _ => {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current_y = Some(info.y);
                current.push(info);
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    for line in &mut lines {
        line.sort_by(|a, b| cmp_f32(a.x, b.x));
    }

    lines
}

struct RunBuilder {
    text: String,
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
    font_size: f32,
}

impl RunBuilder {
    fn start(c: &CharInfo) -> Self {
        Self {
            text: c.ch.to_string(),
            left: c.x,
            right: c.x + c.width,
            top: c.y,
            bottom: c.y + c.height,
            font_size: c.font_size,
        }
    }

    fn push(&mut self, c: &CharInfo, space: bool) {
        if space {
            self.text.push(' ');
        }
        self.text.push(c.ch);
        self.right = self.right.max(c.x + c.width);
        self.top = self.top.min(c.y);
        self.bottom = self.bottom.max(c.y + c.height);
    }

    fn finish(self) -> Option<TextRun> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return None;
        }
        Some(TextRun {
            text,
            left: self.left,
            top: self.top,
            width: self.right - self.left,
            height: self.bottom - self.top,
            font_size: self.font_size,
        })
    }
}

/// Split one sorted line into runs at font size changes and wide gaps
fn split_runs(
    line: &[CharInfo],
    space_threshold: f32,
    run_gap: f32,
    config: &LayoutConfig,
) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut current: Option<RunBuilder> = None;

    for c in line {
        current = match current.take() {
            None => {
                if c.ch.is_whitespace() {
                    None
                } else {
                    Some(RunBuilder::start(c))
                }
            }
            Some(mut run) => {
                let gap = c.x - run.right;
                let size_changed = (c.font_size - run.font_size).abs() > config.font_tolerance;

                if c.ch.is_whitespace() {
                    if !run.text.ends_with(' ') {
                        run.text.push(' ');
                    }
                    Some(run)
                } else if size_changed || gap > run_gap {
                    runs.extend(run.finish());
                    Some(RunBuilder::start(c))
                } else {
                    let space = gap > space_threshold && !run.text.ends_with(' ');
                    run.push(c, space);
                    Some(run)
                }
            }
        };
    }

    if let Some(run) = current {
        runs.extend(run.finish());
    }

    runs
}

/// Build the layout of one page from its glyphs
pub fn build_page(
    page: u32,
    width: f32,
    height: f32,
    chars: Vec<CharInfo>,
    config: &LayoutConfig,
) -> PageLayout {
    let (y_tolerance, space_threshold, median_height) = calculate_dynamic_thresholds(&chars);
    let run_gap = median_height * config.run_gap_factor;

    let lines = group_into_lines(chars, y_tolerance)
        .into_iter()
        .filter_map(|line| {
            let runs = split_runs(&line, space_threshold, run_gap, config);
            if runs.is_empty() {
                return None;
            }
            let top = runs.iter().map(|r| r.top).fold(f32::MAX, f32::min);
            let bottom = runs.iter().map(|r| r.bottom()).fold(f32::MIN, f32::max);
            Some(TextLine { top, bottom, runs })
        })
        .collect();

    PageLayout {
        page,
        width,
        height,
        lines,
    }
}

impl PageLayout {
    /// Merge vertically adjacent runs into text blocks
    pub fn blocks(&self, config: &LayoutConfig) -> Vec<TextBlock> {
        let mut open: Vec<TextBlock> = Vec::new();
        let mut closed: Vec<TextBlock> = Vec::new();

        for line in &self.lines {
            let mut next_open = Vec::with_capacity(line.runs.len());

            for run in &line.runs {
                let candidate = open.iter().position(|block| {
                    (block.font_size - run.font_size).abs() <= config.font_tolerance
                        && (block.left - run.left).abs() <= config.block_left_tolerance
                        && run.top >= block.bottom - run.height * 0.5
                        && run.top - block.bottom <= run.font_size * config.block_gap_factor
                });

                match candidate {
                    Some(index) => {
                        let mut block = open.swap_remove(index);
                        block.text.push('\n');
                        block.text.push_str(&run.text);
                        block.width = block.width.max(run.right() - block.left);
                        block.bottom = run.bottom();
                        next_open.push(block);
                    }
                    None => next_open.push(TextBlock {
                        page: self.page,
                        text: run.text.clone(),
                        left: run.left,
                        top: run.top,
                        width: run.width,
                        bottom: run.bottom(),
                        font_size: run.font_size,
                    }),
                }
            }

            // Blocks not continued on this line are complete
            closed.append(&mut open);
            open = next_open;
        }

        closed.append(&mut open);
        closed.sort_by(|a, b| match cmp_f32(a.top, b.top) {
            Ordering::Equal => cmp_f32(a.left, b.left),
            other => other,
        });
        closed
    }
}

impl DocumentLayout {
    /// All text blocks in document order (page, top, left)
    pub fn blocks(&self, config: &LayoutConfig) -> Vec<TextBlock> {
        self.pages.iter().flat_map(|p| p.blocks(config)).collect()
    }

    /// Font size carrying the most glyphs, i.e. the body text size
    ///
    /// Sizes within `config.font_tolerance` of each other count as one.
    pub fn dominant_font_size(&self, config: &LayoutConfig) -> Option<f32> {
        let mut buckets: Vec<(f32, usize)> = Vec::new();

        for run in self
            .pages
            .iter()
            .flat_map(|p| p.lines.iter())
            .flat_map(|l| l.runs.iter())
        {
            let glyphs = run.text.chars().filter(|c| !c.is_whitespace()).count();
            match buckets
                .iter_mut()
                .find(|(size, _)| (size - run.font_size).abs() <= config.font_tolerance)
            {
                Some(bucket) => bucket.1 += glyphs,
                None => buckets.push((run.font_size, glyphs)),
            }
        }

        buckets
            .into_iter()
            .max_by_key(|(_, count)| *count)
            .map(|(size, _)| size)
    }

    /// Total glyph count; zero for scanned documents without a text layer
    pub fn char_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| p.lines.iter())
            .flat_map(|l| l.runs.iter())
            .map(|r| r.text.chars().count())
            .sum()
    }
}

/// Lay out a string as evenly spaced glyphs; used by tests and benchmarks
#[doc(hidden)]
pub fn place_text(text: &str, x: f32, y: f32, font_size: f32) -> Vec<CharInfo> {
    let advance = font_size * 0.5;
    text.chars()
        .enumerate()
        .map(|(i, ch)| CharInfo {
            ch,
            x: x + i as f32 * advance,
            y,
            width: if ch == ' ' { 0.0 } else { advance * 0.9 },
            height: font_size,
            font_size,
        })
        .collect()
}
