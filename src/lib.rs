//! paper-harvest library
//!
//! Extracts bibliographic fields and text from journal PDFs:
//! - `title`, `authors` and the `received`/`accepted`/`published` dates
//!   from the first page
//! - `body`: running text in reading order, with ligatures and hyphenation
//!   repaired
//! - `tables`: column-aligned line groups with their captions
//!
//! Each paper becomes a record written as CSV, XLSX, JSON and pickle; a
//! batch run also merges all records into `merged.*`.

pub mod config;
pub mod error;
pub mod output;
pub mod package;
pub mod parse;
pub mod pdf;
pub mod pipeline;
pub mod record;
pub mod source;

pub use config::HarvestConfig;
pub use error::{Error, Result};
pub use package::{package_outputs, DEFAULT_PATTERNS};
pub use pipeline::{process_document, run_batch, run_specific, Outcome, RunSummary};
pub use record::Record;
