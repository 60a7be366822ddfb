//! Error types for paper-harvest

use thiserror::Error;

/// Result type alias for paper-harvest
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for paper-harvest
#[derive(Error, Debug)]
pub enum Error {
    /// PDF file not found
    #[error("PDF not found: {path}")]
    PdfNotFound { path: String },

    /// Invalid PDF file
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// PDF is password protected; the archive never ships passwords
    #[error("PDF is password protected")]
    PasswordRequired,

    /// PDFium error
    #[error("PDFium error: {reason}")]
    Pdfium { reason: String },

    /// The PDFium library could not be bound
    #[error("PDFium unavailable: {reason}")]
    PdfiumUnavailable { reason: String },

    /// qpdf error
    #[error("qpdf error: {reason}")]
    QpdfError { reason: String },

    /// Input directory missing or not a directory
    #[error("Input directory not usable: {path}")]
    InvalidDirectory { path: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// XLSX write error
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Pickle encode/decode error
    #[error("Pickle error: {0}")]
    Pickle(#[from] serde_pickle::Error),

    /// Zip archive error
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Invalid glob pattern
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A parser result could not be stored in a record
    #[error("Cannot store '{parser}' result: {reason}")]
    Record { parser: String, reason: String },

    /// Worker task panicked or was cancelled
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}
