//! Pipeline stages for image-to-PDF conversion.
//!
//! Each submodule implements exactly one step; they run strictly in order,
//! each to completion, on the calling thread.
//!
//! ## Data Flow
//!
//! ```text
//! collect ──▶ sort ──▶ layout ──▶ render ──▶ assemble ──▶ cleanup
//! (readdir)  (order)  (grid)    (decode)   (PDF write)  (optional)
//! ```
//!
//! 1. [`collect`] : list allow-listed image files as [`collect::ImageEntry`]s
//! 2. [`sort`]    : natural filename or creation-time order, always total
//! 3. [`layout`]  : chunk into pages and assign grid cells
//! 4. [`render`]  : decode, fit and place each image; draw captions
//! 5. [`assemble`]: serialise the PDF and write it atomically
//! 6. [`cleanup`] : best-effort deletion of originals after a good write

pub mod assemble;
pub mod cleanup;
pub mod collect;
pub mod layout;
pub mod render;
pub mod sort;
