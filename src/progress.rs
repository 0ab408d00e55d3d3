//! Progress-callback trait for per-image and per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionOptionsBuilder::progress_callback`] to receive
//! events as the pipeline decodes each image and finishes each page.
//!
//! # Example
//!
//! ```rust
//! use edgequake_img2pdf::{ConversionProgressCallback, ConversionOptions};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     pages: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, images_on_page: usize) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} done ({} images)", page_num, total_pages, images_on_page);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     pages: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let options = ConversionOptions::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the conversion pipeline as it works through the images.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The pipeline is single-threaded; `Send + Sync` is
/// required only so options holding a callback can move between threads.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once, after planning and before the first image is decoded.
    fn on_conversion_start(&self, total_images: usize, total_pages: usize) {
        let _ = (total_images, total_pages);
    }

    /// Called just before an image is decoded.
    ///
    /// # Arguments
    /// * `image_num`   : 1-indexed position in the final ordering
    /// * `total_images`: number of images in the run
    /// * `file_name`   : the image's file name
    fn on_image_start(&self, image_num: usize, total_images: usize, file_name: &str) {
        let _ = (image_num, total_images, file_name);
    }

    /// Called when every image on a page has been placed.
    ///
    /// # Arguments
    /// * `page_num`      : 1-indexed page number
    /// * `total_pages`   : pages in the document
    /// * `images_on_page`: images drawn on this page
    fn on_page_complete(&self, page_num: usize, total_pages: usize, images_on_page: usize) {
        let _ = (page_num, total_pages, images_on_page);
    }

    /// Called when a fatal error aborts the run. No PDF exists afterwards.
    fn on_conversion_failed(&self, error: &str) {
        let _ = error;
    }

    /// Called after the cleanup pass (only when deleting originals).
    fn on_cleanup_complete(&self, deleted: usize, failed: usize) {
        let _ = (deleted, failed);
    }

    /// Called once after the PDF has been written.
    fn on_conversion_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionOptions`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
