//! Document assembly: collect rendered pages and write the PDF atomically.
//!
//! The PDF is serialised in memory, written to a temporary file next to the
//! destination and then renamed over it. A failed write leaves either the
//! previous file or nothing at the destination, never a truncated document.
//! An existing file at the destination is replaced without prompting.

use crate::config::PageSize;
use crate::error::Img2PdfError;
use crate::pipeline::render::RenderedPage;
use printpdf::{Mm, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, RawImage};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// The PDF being assembled: registered images plus pages in order.
pub struct OutputDocument {
    doc: PdfDocument,
    pages: Vec<PdfPage>,
    page_size: PageSize,
}

impl OutputDocument {
    pub fn new(title: &str, page_size: PageSize) -> Self {
        Self {
            doc: PdfDocument::new(title),
            pages: Vec::new(),
            page_size,
        }
    }

    /// Register an image XObject; the returned id is referenced by page ops.
    pub fn add_image(&mut self, raw: &RawImage) -> printpdf::XObjectId {
        self.doc.add_image(raw)
    }

    /// Append a rendered page after all previously pushed pages.
    pub fn push_page(&mut self, page: RenderedPage) {
        let (w_mm, h_mm) = self.page_size.dimensions_mm();
        debug!(page = page.index + 1, ops = page.ops.len(), "Page appended");
        self.pages.push(PdfPage::new(Mm(w_mm), Mm(h_mm), page.ops));
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialise the document.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.doc.with_pages(self.pages);
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = self.doc.save(&PdfSaveOptions::default(), &mut warnings);
        for w in &warnings {
            debug!("printpdf: {:?}", w);
        }
        bytes
    }
}

/// Serialise `doc` and write it to `path`. Returns the number of bytes written.
pub fn write_pdf(doc: OutputDocument, path: &Path) -> Result<u64, Img2PdfError> {
    let pages = doc.page_count();
    let bytes = doc.into_bytes();
    write_atomic(path, &bytes)?;
    info!("Wrote {} pages ({} bytes) to {}", pages, bytes.len(), path.display());
    Ok(bytes.len() as u64)
}

/// Write `bytes` to `path` via a sibling temp file and rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), Img2PdfError> {
    let write_error = |source: std::io::Error| Img2PdfError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_error)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(write_error)?;
    tmp.write_all(bytes).map_err(write_error)?;
    tmp.as_file().sync_all().map_err(write_error)?;

    if path.exists() {
        warn!("Overwriting existing file {}", path.display());
    }
    tmp.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}
