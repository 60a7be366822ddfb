//! Run configuration

use crate::pdf::LayoutConfig;
use std::path::PathBuf;

/// Default minimum font size (points) for the paper title
pub const MIN_TITLE_FONT_SIZE: f32 = 15.0;

/// Configuration for a harvest run
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Directory scanned for `*.pdf` files (default: `./data`)
    pub in_dir: PathBuf,
    /// Directory receiving generated files (default: `./out`)
    pub out_dir: PathBuf,
    /// Documents processed concurrently in batch mode
    pub workers: usize,
    /// Optional glob applied to PDF file names in batch mode
    pub pattern: Option<String>,
    /// Minimum font size for a block to be taken as the title
    pub min_title_font_size: f32,
    /// Run the body text parser
    pub extract_body: bool,
    /// Run the table parser
    pub extract_tables: bool,
    /// Read and write `<file>.pdf.layout.json` next to each PDF
    pub use_layout_cache: bool,
    /// Glyph grouping thresholds
    pub layout: LayoutConfig,
}

/// Number of worker threads used when none is configured
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            in_dir: PathBuf::from("./data"),
            out_dir: PathBuf::from("./out"),
            workers: default_workers(),
            pattern: None,
            min_title_font_size: MIN_TITLE_FONT_SIZE,
            extract_body: true,
            extract_tables: true,
            use_layout_cache: true,
            layout: LayoutConfig::default(),
        }
    }
}
