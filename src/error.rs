//! Error types for the edgequake-img2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Img2PdfError`]: **Fatal**: the run cannot produce a document at all
//!   (missing directory, bad options, an image that will not decode, the PDF
//!   could not be written). Returned as `Err(Img2PdfError)` from the top-level
//!   `convert*` functions. No output file exists after a fatal error.
//!
//! * [`DeletionError`]: **Non-fatal**: the PDF was written but one original
//!   image could not be removed during cleanup. Collected inside
//!   [`crate::output::ConversionReport`]; the remaining files are still
//!   attempted and the PDF is left untouched.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-img2pdf library.
#[derive(Debug, Error)]
pub enum Img2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input path does not exist or is not a directory.
    #[error("Image directory not found: '{path}'\nCheck the path exists and is a directory.")]
    DirectoryNotFound { path: PathBuf },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    // ── Render errors ─────────────────────────────────────────────────────
    /// An image file could not be read or decoded. Aborts the whole run.
    #[error("Cannot decode image '{path}': {detail}")]
    UnreadableImage { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal failure to delete one original image after the PDF was written.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
#[error("Could not delete '{path}': {detail}")]
pub struct DeletionError {
    pub path: PathBuf,
    pub detail: String,
}
