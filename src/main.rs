//! paper-harvest - Entry point
//!
//! Without a subcommand every PDF in the input directory is processed and
//! the results merged. `files` reprocesses the given PDFs one by one and
//! `package` zips the generated outputs.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use paper_harvest::config::{default_workers, MIN_TITLE_FONT_SIZE};
use paper_harvest::{package_outputs, run_batch, run_specific, HarvestConfig, RunSummary, DEFAULT_PATTERNS};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    options: HarvestArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug)]
struct HarvestArgs {
    /// Directory scanned for PDFs
    #[arg(long, env = "IN_DIR", default_value = "./data", global = true)]
    in_dir: PathBuf,

    /// Directory receiving the generated files
    #[arg(long, env = "OUT_DIR", default_value = "./out", global = true)]
    out_dir: PathBuf,

    /// Documents processed at once [default: number of CPUs]
    #[arg(long, env = "WORKER_COUNT", global = true)]
    workers: Option<usize>,

    /// Only process PDFs whose file name matches this glob
    #[arg(long, global = true)]
    pattern: Option<String>,

    /// Minimum font size of the title
    #[arg(long, default_value_t = MIN_TITLE_FONT_SIZE, global = true)]
    min_title_size: f32,

    /// Skip body text extraction
    #[arg(long, global = true)]
    no_body: bool,

    /// Skip table detection
    #[arg(long, global = true)]
    no_tables: bool,

    /// Neither read nor write layout caches
    #[arg(long, global = true)]
    no_cache: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reprocess the given PDFs sequentially, replacing earlier outputs
    Files {
        #[arg(required = true)]
        pdfs: Vec<PathBuf>,
    },
    /// Zip generated outputs
    Package {
        /// Archive to create
        #[arg(long, default_value = "outputs.zip")]
        archive: PathBuf,

        /// File name globs to include (repeatable)
        #[arg(long = "include")]
        include: Vec<String>,
    },
}

impl HarvestArgs {
    fn into_config(self) -> HarvestConfig {
        HarvestConfig {
            in_dir: self.in_dir,
            out_dir: self.out_dir,
            workers: self.workers.unwrap_or_else(default_workers).max(1),
            pattern: self.pattern,
            min_title_font_size: self.min_title_size,
            extract_body: !self.no_body,
            extract_tables: !self.no_tables,
            use_layout_cache: !self.no_cache,
            ..HarvestConfig::default()
        }
    }
}

fn report(summary: RunSummary) {
    tracing::info!(
        produced = summary.produced,
        skipped = summary.skipped,
        failed = summary.failed,
        "Done"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paper_harvest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.options.into_config();

    match cli.command {
        None => {
            let summary = run_batch(&config)
                .await
                .with_context(|| format!("batch over {} failed", config.in_dir.display()))?;
            report(summary);
        }
        Some(Command::Files { pdfs }) => {
            let summary = tokio::task::spawn_blocking(move || run_specific(&pdfs, &config))
                .await??;
            report(summary);
        }
        Some(Command::Package { archive, include }) => {
            let patterns = if include.is_empty() {
                DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect()
            } else {
                include
            };
            let count = package_outputs(&config.out_dir, &patterns, &archive)
                .with_context(|| format!("packaging {} failed", config.out_dir.display()))?;
            println!("{} files archived into {}", count, archive.display());
        }
    }

    Ok(())
}
