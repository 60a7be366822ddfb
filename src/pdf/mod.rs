//! PDF processing layer
//!
//! This module turns PDFs into page layouts using PDFium, with qpdf as the
//! repair path for files PDFium refuses to open.

pub mod layout;
mod qpdf;
mod reader;

pub use layout::{
    build_page, place_text, CharInfo, DocumentLayout, LayoutConfig, PageLayout, TextBlock,
    TextLine, TextRun,
};
pub use qpdf::{repaired_path, QpdfWrapper};
pub use reader::PdfReader;
