//! Input discovery and layout caching

pub mod cache;
pub mod scan;

pub use cache::{cache_path, LayoutCache};
pub use scan::{document_key, scan_pdfs};
