//! qpdf FFI wrapper used to repair damaged PDFs
//!
//! qpdf reconstructs broken cross-reference tables while reading, so
//! reading a file and writing it back out yields a file PDFium can open in
//! most of the cases PDFium rejects on its own.

use crate::error::{Error, Result};
use qpdf::{ObjectStreamMode, QPdf};
use std::path::{Path, PathBuf};

/// Wrapper for qpdf operations via FFI
pub struct QpdfWrapper;

/// Map qpdf crate errors to our error types
fn map_qpdf_error(e: qpdf::QPdfError) -> Error {
    match e.error_code() {
        qpdf::QPdfErrorCode::InvalidPassword => Error::PasswordRequired,
        _ => Error::QpdfError {
            reason: e.to_string(),
        },
    }
}

/// Path the repaired copy of `path` is written to (`paper.pdf` -> `paper_repaired.pdf`)
pub fn repaired_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!("{}_repaired.pdf", stem))
}

impl QpdfWrapper {
    /// Rewrite a PDF through qpdf
    ///
    /// # Arguments
    /// * `input_data` - Raw PDF bytes, possibly with a damaged xref table
    ///
    /// # Returns
    /// A freshly written PDF with every page of the input
    pub fn repair(input_data: &[u8]) -> Result<Vec<u8>> {
        let qpdf = QPdf::read_from_memory(input_data).map_err(map_qpdf_error)?;

        let num_pages = qpdf.get_num_pages().map_err(map_qpdf_error)?;
        if num_pages == 0 {
            return Err(Error::QpdfError {
                reason: "PDF has no pages".to_string(),
            });
        }

        let mut writer = qpdf.writer();
        writer
            .object_stream_mode(ObjectStreamMode::Disable)
            .preserve_unreferenced_objects(false)
            .preserve_encryption(false);
        writer.write_to_memory().map_err(map_qpdf_error)
    }

    /// Repair the PDF at `path` and write the result next to it
    ///
    /// # Returns
    /// The path of the repaired copy and its bytes
    pub fn repair_file(path: &Path, input_data: &[u8]) -> Result<(PathBuf, Vec<u8>)> {
        let repaired = Self::repair(input_data)?;
        let target = repaired_path(path);
        std::fs::write(&target, &repaired)?;
        Ok((target, repaired))
    }

    /// Get the page count of a PDF
    pub fn get_page_count(input_data: &[u8]) -> Result<u32> {
        let qpdf = QPdf::read_from_memory(input_data).map_err(map_qpdf_error)?;
        qpdf.get_num_pages().map_err(map_qpdf_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repaired_path() {
        assert_eq!(
            repaired_path(Path::new("/data/paper.pdf")),
            PathBuf::from("/data/paper_repaired.pdf")
        );
        assert_eq!(
            repaired_path(Path::new("relative.v2.pdf")),
            PathBuf::from("relative.v2_repaired.pdf")
        );
    }

    /// One-page PDF whose xref offsets and `startxref` point nowhere
    const DAMAGED_XREF: &[u8] = b"%PDF-1.4
1 0 obj
<< /Type /Catalog /Pages 2 0 R >>
endobj
2 0 obj
<< /Type /Pages /Kids [3 0 R] /Count 1 >>
endobj
3 0 obj
<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>
endobj
xref
0 4
0000000000 65535 f 
0000000999 00000 n 
0000000999 00000 n 
0000000999 00000 n 
trailer
<< /Size 4 /Root 1 0 R >>
startxref
9999
%%EOF
";

    #[test]
    fn test_repair_damaged_xref() {
        let repaired = QpdfWrapper::repair(DAMAGED_XREF).unwrap();
        assert!(repaired.starts_with(b"%PDF"));
        assert_eq!(QpdfWrapper::get_page_count(&repaired).unwrap(), 1);
    }

    #[test]
    fn test_repair_file_writes_copy() {
        let dir = tempfile::TempDir::new().unwrap();
        let pdf = dir.path().join("paper.pdf");

        let (target, repaired) = QpdfWrapper::repair_file(&pdf, DAMAGED_XREF).unwrap();
        assert_eq!(target, dir.path().join("paper_repaired.pdf"));
        assert_eq!(std::fs::read(&target).unwrap(), repaired);
    }

    #[test]
    fn test_repair_rejects_garbage() {
        assert!(QpdfWrapper::repair(b"this is not a pdf at all").is_err());
    }
}
