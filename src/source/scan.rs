use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Suffix of files written by the qpdf repair path
const REPAIRED_SUFFIX: &str = "_repaired";

/// Key of a document: its file name without the `.pdf` extension
pub fn document_key(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// List the PDFs directly inside `dir`, sorted by path
///
/// `pattern` is a glob matched against the file name. Repaired copies left
/// next to their originals are not listed.
pub fn scan_pdfs(dir: &Path, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::InvalidDirectory {
            path: dir.display().to_string(),
        });
    }

    let pattern = pattern.map(glob::Pattern::new).transpose()?;
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue, // Skip entries we can't read
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if !is_pdf || document_key(&path).ends_with(REPAIRED_SUFFIX) {
            continue;
        }

        if let Some(ref pat) = pattern {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if !pat.matches(&name) {
                continue;
            }
        }

        files.push(path);
    }

    files.sort();
    Ok(files)
}
