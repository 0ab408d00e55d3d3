//! # edgequake-img2pdf
//!
//! Combine a directory of images into a single multi-page PDF.
//!
//! Images are ordered by natural filename (`img2` before `img10`) or by
//! creation time, laid out several to a page on an evenly balanced grid,
//! optionally captioned "Question 1", "Question 2", … and written as one PDF.
//! The source images can be deleted once the PDF is safely on disk.
//!
//! ## Pipeline Overview
//!
//! ```text
//! directory
//!  │
//!  ├─ 1. Collect   list .png/.jpg/.jpeg/.bmp/.gif/.tif/.tiff files
//!  ├─ 2. Sort      natural filename or creation time (total order)
//!  ├─ 3. Plan      chunk into pages, assign grid cells + caption bands
//!  ├─ 4. Render    decode, fit, centre; draw "Question N" captions
//!  ├─ 5. Assemble  serialise via printpdf, atomic write
//!  └─ 6. Cleanup   optional best-effort deletion of originals
//! ```
//!
//! Everything runs on the calling thread, one stage after another.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_img2pdf::{convert, ConversionOptions, ConversionOutcome};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ConversionOptions::builder()
//!         .images_per_page(4)
//!         .margin(10.0)
//!         .label_images(true)
//!         .build()?;
//!     match convert("./scans", &options)? {
//!         ConversionOutcome::Converted(report) => {
//!             eprintln!("{} pages → {}", report.page_count, report.output_path.display());
//!         }
//!         ConversionOutcome::NothingToConvert { directory } => {
//!             eprintln!("no images in {}", directory.display());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `img2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-img2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionOptions, ConversionOptionsBuilder, PageSize, SortMode};
pub use convert::{convert, convert_to_file, plan};
pub use error::{DeletionError, Img2PdfError};
pub use output::{
    ConversionOutcome, ConversionPlan, ConversionReport, ConversionStats, PageSummary,
    SlotSummary,
};
pub use pipeline::collect::ImageEntry;
pub use pipeline::layout::{LayoutSlot, PageSpec};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
