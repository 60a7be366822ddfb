//! PDF reader wrapper for PDFium

use crate::error::{Error, Result};
use crate::pdf::layout::{build_page, CharInfo, DocumentLayout, LayoutConfig, PageLayout};
use crate::pdf::qpdf::QpdfWrapper;
use pdfium_render::prelude::*;
use std::path::Path;

/// Get PDFium instance (creates new instance each time - PDFium is not thread-safe)
fn create_pdfium() -> Result<Pdfium> {
    // Try to bind to system library or use static linking
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Error::PdfiumUnavailable {
            reason: format!("Failed to initialize PDFium: {}", e),
        })?;

    Ok(Pdfium::new(bindings))
}

/// Bytes searched for the `%PDF` marker; readers accept junk before it
const HEADER_SEARCH_LIMIT: usize = 1024;

fn check_header(data: &[u8]) -> Result<()> {
    let window = &data[..data.len().min(HEADER_SEARCH_LIMIT)];
    if !window.windows(4).any(|w| w == b"%PDF") {
        return Err(Error::InvalidPdf {
            reason: "Not a valid PDF file".to_string(),
        });
    }
    Ok(())
}

/// Errors caused by the file itself, which a qpdf rewrite may fix
fn is_repairable(err: &Error) -> bool {
    matches!(err, Error::Pdfium { .. } | Error::InvalidPdf { .. })
}

/// PDF reader using PDFium
pub struct PdfReader {
    page_count: u32,
    layout: DocumentLayout,
}

impl PdfReader {
    /// Open a PDF, rewriting it through qpdf once if the file is rejected
    ///
    /// A missing PDFium library is returned as is. The repaired copy is kept
    /// next to the original as `<stem>_repaired.pdf`.
    pub fn open_with_repair<P: AsRef<Path>>(path: P, config: &LayoutConfig) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Error::PdfNotFound {
                path: path.display().to_string(),
            });
        }

        let data = std::fs::read(path)?;
        let source = path.display().to_string();

        let err = match Self::open_bytes(&data, &source, config) {
            Err(e) if is_repairable(&e) => e,
            other => return other,
        };

        tracing::warn!(path = %source, error = %err, "PDF rejected, trying to repair");
        let (repaired_path, repaired) = match QpdfWrapper::repair_file(path, &data) {
            Ok(repaired) => repaired,
            Err(e) => {
                tracing::warn!(path = %source, error = %e, "Repair failed");
                return Err(err);
            }
        };
        tracing::info!(path = %repaired_path.display(), "Repaired PDF written");
        let mut reader = Self::open_bytes(&repaired, &source, config)?;

        let expected = QpdfWrapper::get_page_count(&repaired)?;
        if reader.page_count() != expected {
            tracing::warn!(
                path = %source,
                pdfium_pages = reader.page_count(),
                qpdf_pages = expected,
                "Page count differs after repair"
            );
        }

        reader.layout.source = source;
        Ok(reader)
    }

    /// Open a PDF from bytes
    pub fn open_bytes(data: &[u8], source: &str, config: &LayoutConfig) -> Result<Self> {
        check_header(data)?;

        let pdfium = create_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(data, None)
            .map_err(Self::map_pdfium_error)?;

        let page_count = document.pages().len() as u32;
        let pages = Self::extract_all_page_layouts(&document, config)?;

        Ok(Self {
            page_count,
            layout: DocumentLayout {
                source: source.to_string(),
                pages,
            },
        })
    }

    fn extract_all_page_layouts(
        document: &PdfDocument,
        config: &LayoutConfig,
    ) -> Result<Vec<PageLayout>> {
        let pages = document.pages();
        let mut layouts = Vec::with_capacity(pages.len() as usize);

        for index in 0..pages.len() {
            let page = pages.get(index).map_err(|e| Error::Pdfium {
                reason: format!("Failed to get page {}: {}", index + 1, e),
            })?;

            let width = page.width().value;
            let height = page.height().value;
            let chars = Self::collect_chars_with_info(&page);

            layouts.push(build_page(index as u32 + 1, width, height, chars, config));
        }

        Ok(layouts)
    }

    /// Collect character information from page text
    ///
    /// PDF coordinates grow upwards; `CharInfo::y` is flipped to grow
    /// downwards from the top edge so it reads like screen layout.
    fn collect_chars_with_info(page: &PdfPage) -> Vec<CharInfo> {
        let text_obj = match page.text() {
            Ok(t) => t,
            Err(_) => return Vec::new(),
        };
        let page_height = page.height().value;
        let mut chars = Vec::new();

        for segment in text_obj.segments().iter() {
            if let Ok(char_iter) = segment.chars() {
                for char_result in char_iter.iter() {
                    if let Some(c) = char_result.unicode_char() {
                        if let Ok(bounds) = char_result.loose_bounds() {
                            chars.push(CharInfo {
                                ch: c,
                                x: bounds.left().value,
                                y: page_height - bounds.top().value,
                                width: bounds.width().value,
                                height: bounds.height().value,
                                font_size: char_result.scaled_font_size().value,
                            });
                        }
                    }
                }
            }
        }

        chars
    }

    /// Map PDFium errors to our error type
    fn map_pdfium_error(err: PdfiumError) -> Error {
        match err {
            PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
                Error::PasswordRequired
            }
            _ => Error::Pdfium {
                reason: format!("{}", err),
            },
        }
    }

    /// Get the number of pages
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn into_layout(self) -> DocumentLayout {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pdf_detection() {
        let result = PdfReader::open_bytes(b"not a pdf", "<memory>", &LayoutConfig::default());
        assert!(matches!(result, Err(Error::InvalidPdf { .. })));
    }

    #[test]
    fn test_header_after_leading_junk() {
        assert!(check_header(b"\r\n%PDF-1.4\n").is_ok());

        let mut late = vec![b' '; HEADER_SEARCH_LIMIT];
        late.extend_from_slice(b"%PDF-1.4");
        assert!(matches!(check_header(&late), Err(Error::InvalidPdf { .. })));
    }

    #[test]
    fn test_only_file_errors_are_repaired() {
        assert!(is_repairable(&Error::Pdfium {
            reason: "bad xref".into()
        }));
        assert!(is_repairable(&Error::InvalidPdf {
            reason: "no header".into()
        }));
        assert!(!is_repairable(&Error::PdfiumUnavailable {
            reason: "LoadLibraryError".into()
        }));
        assert!(!is_repairable(&Error::PasswordRequired));
    }

    #[test]
    fn test_unrepairable_file_keeps_original_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let pdf = dir.path().join("garbage.pdf");
        std::fs::write(&pdf, b"this is not a pdf").unwrap();

        let result = PdfReader::open_with_repair(&pdf, &LayoutConfig::default());
        assert!(matches!(result, Err(Error::InvalidPdf { .. })));
        assert!(!crate::pdf::repaired_path(&pdf).exists());
    }

    #[test]
    fn test_open_nonexistent_file() {
        let result = PdfReader::open_with_repair("/nonexistent/paper.pdf", &LayoutConfig::default());
        assert!(matches!(result, Err(Error::PdfNotFound { .. })));
    }
}
