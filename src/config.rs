//! Configuration types for image-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionOptions`], built
//! via its [`ConversionOptionsBuilder`]. Validation happens once, in
//! [`ConversionOptionsBuilder::build`], so the pipeline stages never see a
//! zero images-per-page count or a margin that leaves no room for images.

use crate::error::Img2PdfError;
use crate::pipeline::layout::GridShape;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// File name used when no explicit output path is configured.
pub const DEFAULT_OUTPUT_NAME: &str = "combined_output.pdf";

/// Points per millimetre (1 pt = 1/72 inch).
const PT_PER_MM: f32 = 72.0 / 25.4;

/// Configuration for one conversion run.
///
/// Built via [`ConversionOptions::builder()`] or using
/// [`ConversionOptions::default()`].
///
/// # Example
/// ```rust
/// use edgequake_img2pdf::{ConversionOptions, SortMode};
///
/// let options = ConversionOptions::builder()
///     .images_per_page(4)
///     .margin(12.0)
///     .label_images(true)
///     .sort_mode(SortMode::CreationTime)
///     .build()
///     .unwrap();
/// assert_eq!(options.images_per_page, 4);
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Images placed on each page. Always ≥ 1 after `build()`. Default: 1.
    pub images_per_page: usize,

    /// Spacing in PDF points between grid cells and from the page edge. Default: 0.
    ///
    /// One point equals one pixel at 72 DPI.
    pub margin: f32,

    /// Draw a "Question N" caption above every image. Default: false.
    pub label_images: bool,

    /// Input ordering. Default: [`SortMode::NaturalFilename`].
    pub sort_mode: SortMode,

    /// Delete the source images once the PDF has been written. Default: false.
    pub delete_originals: bool,

    /// Output page size. Default: [`PageSize::A4`].
    pub page_size: PageSize,

    /// Raster resolution for embedded images. Range: 72–600. Default: 150.
    ///
    /// Images larger than their placed size at this resolution are downscaled
    /// before embedding; smaller images are embedded as-is.
    pub dpi: u32,

    /// PDF title metadata. If None, the input directory's name is used.
    pub title: Option<String>,

    /// Destination PDF. If None, `<directory>/combined_output.pdf`.
    pub output_path: Option<PathBuf>,

    /// Receives per-image and per-page events.
    #[serde(skip)]
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            images_per_page: 1,
            margin: 0.0,
            label_images: false,
            sort_mode: SortMode::default(),
            delete_originals: false,
            page_size: PageSize::default(),
            dpi: 150,
            title: None,
            output_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionOptions")
            .field("images_per_page", &self.images_per_page)
            .field("margin", &self.margin)
            .field("label_images", &self.label_images)
            .field("sort_mode", &self.sort_mode)
            .field("delete_originals", &self.delete_originals)
            .field("page_size", &self.page_size)
            .field("dpi", &self.dpi)
            .field("title", &self.title)
            .field("output_path", &self.output_path)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionOptions {
    /// Create a new builder for `ConversionOptions`.
    pub fn builder() -> ConversionOptionsBuilder {
        ConversionOptionsBuilder {
            options: Self::default(),
        }
    }

    /// Where the PDF for `directory` will be written.
    pub fn resolve_output_path(&self, directory: &Path) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| directory.join(DEFAULT_OUTPUT_NAME))
    }

    /// Document title for `directory`.
    pub fn resolve_title(&self, directory: &Path) -> String {
        if let Some(ref t) = self.title {
            return t.clone();
        }
        directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Images".to_string())
    }

    /// Re-run the builder checks. Used by entry points that accept a
    /// hand-assembled struct rather than one produced by `build()`.
    pub fn validate(&self) -> Result<(), Img2PdfError> {
        if self.images_per_page == 0 {
            return Err(Img2PdfError::InvalidOptions(
                "images_per_page must be ≥ 1, got 0".into(),
            ));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(Img2PdfError::InvalidOptions(format!(
                "margin must be a non-negative number of points, got {}",
                self.margin
            )));
        }
        if self.dpi < 72 || self.dpi > 600 {
            return Err(Img2PdfError::InvalidOptions(format!(
                "DPI must be 72–600, got {}",
                self.dpi
            )));
        }

        let grid = GridShape::for_count(self.images_per_page);
        let (page_w, page_h) = self.page_size.dimensions_pt();
        let free_w = page_w - (grid.columns + 1) as f32 * self.margin;
        let free_h = page_h - (grid.rows + 1) as f32 * self.margin;
        if free_w <= 0.0 || free_h <= 0.0 {
            return Err(Img2PdfError::InvalidOptions(format!(
                "margin {}pt leaves no room for a {}x{} grid on {:?} ({:.0}x{:.0}pt)",
                self.margin, grid.rows, grid.columns, self.page_size, page_w, page_h
            )));
        }
        Ok(())
    }
}

/// Builder for [`ConversionOptions`].
#[derive(Debug)]
pub struct ConversionOptionsBuilder {
    options: ConversionOptions,
}

impl ConversionOptionsBuilder {
    pub fn images_per_page(mut self, n: usize) -> Self {
        self.options.images_per_page = n;
        self
    }

    pub fn margin(mut self, points: f32) -> Self {
        self.options.margin = points;
        self
    }

    pub fn label_images(mut self, v: bool) -> Self {
        self.options.label_images = v;
        self
    }

    pub fn sort_mode(mut self, mode: SortMode) -> Self {
        self.options.sort_mode = mode;
        self
    }

    pub fn delete_originals(mut self, v: bool) -> Self {
        self.options.delete_originals = v;
        self
    }

    pub fn page_size(mut self, size: PageSize) -> Self {
        self.options.page_size = size;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.options.dpi = dpi;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.options.title = Some(title.into());
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.output_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.options.progress_callback = Some(cb);
        self
    }

    /// Build the options, validating constraints.
    pub fn build(self) -> Result<ConversionOptions, Img2PdfError> {
        self.options.validate()?;
        Ok(self.options)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How collected images are ordered before layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Filename order with embedded numbers compared numerically, so
    /// `img2.png` precedes `img10.png`. (default)
    #[default]
    NaturalFilename,
    /// Filesystem creation time, oldest first.
    CreationTime,
}

/// Output page size, always portrait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
}

impl PageSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::A3 => (297.0, 420.0),
            Self::A5 => (148.0, 210.0),
            Self::Letter => (215.9, 279.4),
            Self::Legal => (215.9, 355.6),
        }
    }

    /// Dimensions in PDF points (width, height).
    pub fn dimensions_pt(&self) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        (w * PT_PER_MM, h * PT_PER_MM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let o = ConversionOptions::builder().build().unwrap();
        assert_eq!(o.images_per_page, 1);
        assert_eq!(o.margin, 0.0);
        assert!(!o.label_images);
        assert!(!o.delete_originals);
        assert_eq!(o.sort_mode, SortMode::NaturalFilename);
        assert_eq!(o.page_size, PageSize::A4);
    }

    #[test]
    fn zero_images_per_page_rejected() {
        let err = ConversionOptions::builder()
            .images_per_page(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Img2PdfError::InvalidOptions(_)));
        assert!(err.to_string().contains("images_per_page"));
    }

    #[test]
    fn negative_margin_rejected() {
        let err = ConversionOptions::builder().margin(-1.0).build().unwrap_err();
        assert!(matches!(err, Img2PdfError::InvalidOptions(_)));
    }

    #[test]
    fn nan_margin_rejected() {
        assert!(ConversionOptions::builder().margin(f32::NAN).build().is_err());
    }

    #[test]
    fn margin_swallowing_page_rejected() {
        // A4 is ~595pt wide; two margins of 300pt leave nothing.
        let err = ConversionOptions::builder().margin(300.0).build().unwrap_err();
        assert!(err.to_string().contains("no room"), "got: {err}");
    }

    #[test]
    fn dpi_out_of_range_rejected() {
        assert!(ConversionOptions::builder().dpi(10).build().is_err());
        assert!(ConversionOptions::builder().dpi(601).build().is_err());
        assert!(ConversionOptions::builder().dpi(300).build().is_ok());
    }

    #[test]
    fn a4_points() {
        let (w, h) = PageSize::A4.dimensions_pt();
        assert!((w - 595.28).abs() < 0.1, "w = {w}");
        assert!((h - 841.89).abs() < 0.1, "h = {h}");
    }

    #[test]
    fn default_output_path_inside_directory() {
        let o = ConversionOptions::default();
        let p = o.resolve_output_path(Path::new("/tmp/scans"));
        assert_eq!(p, PathBuf::from("/tmp/scans/combined_output.pdf"));

        let o = ConversionOptions::builder()
            .output_path("/tmp/out.pdf")
            .build()
            .unwrap();
        assert_eq!(o.resolve_output_path(Path::new("/tmp/scans")), PathBuf::from("/tmp/out.pdf"));
    }

    #[test]
    fn title_falls_back_to_directory_name() {
        let o = ConversionOptions::default();
        assert_eq!(o.resolve_title(Path::new("/home/me/homework")), "homework");
        let o = ConversionOptions::builder().title("Quiz 3").build().unwrap();
        assert_eq!(o.resolve_title(Path::new("/home/me/homework")), "Quiz 3");
    }

    #[test]
    fn sort_mode_serialises_snake_case() {
        let json = serde_json::to_string(&SortMode::CreationTime).unwrap();
        assert_eq!(json, "\"creation_time\"");
    }
}
