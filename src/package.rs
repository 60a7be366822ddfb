//! Zip packaging of generated outputs

use crate::error::Result;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// File name globs packaged when none are given
pub const DEFAULT_PATTERNS: &[&str] = &["*.gen.*", "merged.*"];

/// Archive every file in `out_dir` whose name matches one of `patterns`
///
/// Files are stored flat under their file names, sorted. The archive itself
/// is never added even when it lives in `out_dir`. Returns the number of
/// files written.
pub fn package_outputs(out_dir: &Path, patterns: &[String], archive: &Path) -> Result<usize> {
    let patterns = patterns
        .iter()
        .map(|p| glob::Pattern::new(p))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let archive_abs = std::fs::canonicalize(archive).ok();
    let mut files: Vec<PathBuf> = Vec::new();

    for entry in std::fs::read_dir(out_dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if archive_abs.is_some() && std::fs::canonicalize(&path).ok() == archive_abs {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if patterns.iter().any(|p| p.matches(&name)) {
            files.push(path);
        }
    }
    files.sort();

    let mut writer = ZipWriter::new(BufWriter::new(File::create(archive)?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        writer.start_file(name, options)?;
        let mut input = File::open(path)?;
        std::io::copy(&mut input, &mut writer)?;
    }

    writer.finish()?;
    tracing::info!(archive = %archive.display(), files = files.len(), "Outputs packaged");
    Ok(files.len())
}
