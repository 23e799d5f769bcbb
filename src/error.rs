//! Error taxonomy for the export pipeline.
//!
//! Malformed resume *content* never produces an error: missing fields fall
//! back to empty values at deserialisation time. Errors are reserved for
//! input that cannot be read at all and for failures while producing bytes.

use thiserror::Error;

/// Failure raised while reading input or generating an export artifact.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid resume input: {0}")]
    InvalidInput(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Font loading failed: {0}")]
    Font(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("DOCX packaging failed: {0}")]
    Docx(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = ExportError> = std::result::Result<T, E>;
