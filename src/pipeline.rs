//! Batch and single-file runs
//!
//! One PDF goes through layout loading, the field parsers and the record
//! store on a single blocking thread. Failures stay local to the document
//! they happened in; the run itself only fails when the input or output
//! directory is unusable.

use crate::config::HarvestConfig;
use crate::error::{Error, Result};
use crate::output::{generated_path, merge_outputs, write_document};
use crate::parse::{default_parsers, ParseContext, ParseError, ParseInput};
use crate::pdf::{DocumentLayout, PdfReader};
use crate::record::Record;
use crate::source::{document_key, scan_pdfs, LayoutCache};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Result of processing one PDF
#[derive(Debug)]
pub enum Outcome {
    /// Outputs already exist from an earlier run
    Skipped,
    /// A record was extracted
    Produced(Record),
    /// The document could not be processed
    Failed(Error),
}

/// Counts of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub produced: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    fn count(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Skipped => self.skipped += 1,
            Outcome::Produced(_) => self.produced += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Load the layout of a PDF, from the cache when possible
pub fn load_layout(path: &Path, config: &HarvestConfig) -> Result<DocumentLayout> {
    let cache = LayoutCache::new(config.use_layout_cache);
    if let Some(layout) = cache.load(path) {
        return Ok(layout);
    }

    let layout = PdfReader::open_with_repair(path, &config.layout)?.into_layout();
    if let Err(e) = cache.store(path, &layout) {
        tracing::warn!(path = %path.display(), error = %e, "Failed to write layout cache");
    }
    Ok(layout)
}

/// Run every enabled parser over a layout and collect the results
///
/// A parser that finds nothing is logged and skipped; the record keeps
/// whatever the other parsers found.
pub fn extract_record(key: &str, layout: &DocumentLayout, config: &HarvestConfig) -> Record {
    let blocks = layout.blocks(&config.layout);
    let input = ParseInput {
        layout,
        blocks: &blocks,
    };
    let mut context = ParseContext::default();
    let mut record = Record::new(key);

    for parser in default_parsers(config) {
        match parser.parse(&input, &mut context) {
            Ok(value) => {
                if let Err(e) = record.store(parser.name(), parser.target(), value) {
                    tracing::error!(key, parser = parser.name(), error = %e, "Failed to store parser result");
                }
            }
            Err(ParseError::Insufficient(reason)) => {
                tracing::warn!(key, parser = parser.name(), reason = %reason, "Field not found");
            }
            Err(e) => {
                tracing::error!(key, parser = parser.name(), error = %e, "Parser failed");
            }
        }
    }

    record
}

/// Process one PDF
///
/// Returns [`Outcome::Skipped`] when `<key>.gen.csv` already exists in the
/// output directory.
pub fn process_document(path: &Path, config: &HarvestConfig) -> Outcome {
    let key = document_key(path);

    if generated_path(&config.out_dir, &key, "csv").is_file() {
        tracing::debug!(key = %key, "Outputs exist, skipping");
        return Outcome::Skipped;
    }

    match load_layout(path, config) {
        Ok(layout) => {
            let chars = layout.char_count();
            if chars == 0 {
                tracing::warn!(key = %key, "No text layer found");
            }
            tracing::debug!(key = %key, pages = layout.pages.len(), chars, "Layout loaded");
            Outcome::Produced(extract_record(&key, &layout, config))
        }
        Err(e) => Outcome::Failed(e),
    }
}

/// Process one PDF and write its outputs
fn harvest(path: &Path, config: &HarvestConfig) -> Outcome {
    match process_document(path, config) {
        Outcome::Produced(record) => match write_document(&config.out_dir, &record) {
            Ok(()) => Outcome::Produced(record),
            Err(e) => Outcome::Failed(e),
        },
        other => other,
    }
}

/// Run `job` on the blocking pool; a panic fails only this document
async fn run_blocking<F>(path: PathBuf, job: F) -> (PathBuf, Outcome)
where
    F: FnOnce(&Path) -> Outcome + Send + 'static,
{
    let worker_path = path.clone();
    match tokio::task::spawn_blocking(move || job(&worker_path)).await {
        Ok(outcome) => (path, outcome),
        Err(e) => (path, Outcome::Failed(Error::Join(e))),
    }
}

fn log_outcome(path: &Path, outcome: &Outcome) {
    match outcome {
        Outcome::Skipped => {}
        Outcome::Produced(record) => {
            tracing::info!(key = %record.key, "Document processed");
        }
        Outcome::Failed(e) => {
            tracing::error!(path = %path.display(), error = %e, "Document failed");
        }
    }
}

/// Process every PDF in the input directory
///
/// At most `config.workers` documents are in flight at once. Documents whose
/// outputs already exist are skipped, and when this run produced more than
/// one record the per-paper outputs are merged.
pub async fn run_batch(config: &HarvestConfig) -> Result<RunSummary> {
    tokio::fs::create_dir_all(&config.out_dir).await?;
    let files = scan_pdfs(&config.in_dir, config.pattern.as_deref())?;

    tracing::info!(
        in_dir = %config.in_dir.display(),
        documents = files.len(),
        workers = config.workers,
        "Starting batch"
    );

    let shared = Arc::new(config.clone());
    let workers = config.workers.max(1);
    let mut tasks: JoinSet<(PathBuf, Outcome)> = JoinSet::new();
    let mut summary = RunSummary::default();
    let mut produced = Vec::new();

    let mut pending = files.into_iter();
    loop {
        while tasks.len() < workers {
            let Some(path) = pending.next() else {
                break;
            };
            let config = Arc::clone(&shared);
            // PDFium and file output are blocking
            tasks.spawn(run_blocking(path, move |path| harvest(path, &config)));
        }

        let Some(joined) = tasks.join_next().await else {
            break;
        };
        let (path, outcome) = joined?;

        log_outcome(&path, &outcome);
        summary.count(&outcome);
        if let Outcome::Produced(record) = outcome {
            produced.push(record.key);
        }
    }

    if produced.len() > 1 {
        produced.sort();
        let out_dir = config.out_dir.clone();
        tokio::task::spawn_blocking(move || merge_outputs(&out_dir, &produced)).await??;
    }

    tracing::info!(
        produced = summary.produced,
        skipped = summary.skipped,
        failed = summary.failed,
        "Batch finished"
    );
    Ok(summary)
}

/// Process the given PDFs one after another, replacing earlier outputs
///
/// Nothing is merged.
pub fn run_specific(files: &[PathBuf], config: &HarvestConfig) -> Result<RunSummary> {
    std::fs::create_dir_all(&config.out_dir)?;
    let mut summary = RunSummary::default();

    for path in files {
        let existing = generated_path(&config.out_dir, &document_key(path), "csv");
        if existing.is_file() {
            std::fs::remove_file(&existing)?;
        }

        let outcome = harvest(path, config);
        log_outcome(path, &outcome);
        summary.count(&outcome);
    }

    Ok(summary)
}
