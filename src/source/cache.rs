//! Page layout cache
//!
//! Extracting glyphs through PDFium dominates the run time, so the layout of
//! every PDF is stored next to it as `<file>.pdf.layout.json`. Reruns with
//! different parser settings then skip PDFium entirely.

use crate::error::Result;
use crate::pdf::DocumentLayout;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Suffix appended to the PDF file name
pub const CACHE_SUFFIX: &str = ".layout.json";

/// Path of the cache file belonging to a PDF
pub fn cache_path(pdf: &Path) -> PathBuf {
    let mut name = pdf.as_os_str().to_os_string();
    name.push(CACHE_SUFFIX);
    PathBuf::from(name)
}

/// Layout cache manager
#[derive(Debug, Clone, Copy)]
pub struct LayoutCache {
    enabled: bool,
}

impl LayoutCache {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Load the cached layout of `pdf`
    ///
    /// Returns `None` when caching is off, no cache exists, the PDF is newer
    /// than its cache, or the cache cannot be parsed.
    pub fn load(&self, pdf: &Path) -> Option<DocumentLayout> {
        if !self.enabled {
            return None;
        }

        let path = cache_path(pdf);
        if !path.is_file() || is_stale(pdf, &path) {
            return None;
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot open layout cache");
                return None;
            }
        };

        match serde_json::from_reader::<_, DocumentLayout>(BufReader::new(file)) {
            Ok(layout) => {
                tracing::debug!(path = %path.display(), pages = layout.pages.len(), "Layout cache hit");
                Some(layout)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt layout cache");
                None
            }
        }
    }

    /// Store the layout of `pdf`; a no-op when caching is off
    pub fn store(&self, pdf: &Path, layout: &DocumentLayout) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let path = cache_path(pdf);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(&mut writer, layout)?;
        writer.flush()?;
        Ok(())
    }
}

fn is_stale(pdf: &Path, cache: &Path) -> bool {
    let modified = |p: &Path| std::fs::metadata(p).and_then(|m| m.modified()).ok();
    match (modified(pdf), modified(cache)) {
        (Some(pdf_time), Some(cache_time)) => pdf_time > cache_time,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::{build_page, place_text, LayoutConfig};
    use pretty_assertions::assert_eq;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn layout() -> DocumentLayout {
        let chars = place_text("Cached Title", 50.0, 80.0, 18.0);
        DocumentLayout {
            source: "paper.pdf".to_string(),
            pages: vec![build_page(1, 595.0, 842.0, chars, &LayoutConfig::default())],
        }
    }

    #[test]
    fn test_cache_path() {
        assert_eq!(
            cache_path(Path::new("/data/paper.pdf")),
            PathBuf::from("/data/paper.pdf.layout.json")
        );
    }

    #[test]
    fn test_store_and_load() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("paper.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();

        let cache = LayoutCache::new(true);
        cache.store(&pdf, &layout()).unwrap();

        let loaded = cache.load(&pdf).unwrap();
        assert_eq!(loaded.pages.len(), 1);
        assert_eq!(loaded.pages[0].lines[0].text(), "Cached Title");
    }

    #[test]
    fn test_disabled_cache() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("paper.pdf");

        let cache = LayoutCache::new(false);
        cache.store(&pdf, &layout()).unwrap();
        assert!(!cache_path(&pdf).exists());
        assert!(cache.load(&pdf).is_none());
    }

    #[test]
    fn test_cache_older_than_pdf_ignored() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("paper.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();

        let cache = LayoutCache::new(true);
        cache.store(&pdf, &layout()).unwrap();
        assert!(cache.load(&pdf).is_some());

        let later = SystemTime::now() + Duration::from_secs(60);
        File::options()
            .write(true)
            .open(&pdf)
            .unwrap()
            .set_modified(later)
            .unwrap();
        assert!(cache.load(&pdf).is_none());
    }

    #[test]
    fn test_corrupt_cache_ignored() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("paper.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();
        std::fs::write(cache_path(&pdf), b"{not json").unwrap();

        assert!(LayoutCache::new(true).load(&pdf).is_none());
    }
}
