//! Result types returned by the conversion entry points.

use crate::error::DeletionError;
use crate::pipeline::collect::ImageEntry;
use crate::pipeline::layout::PageSpec;
use serde::Serialize;
use std::path::PathBuf;

/// What a run did.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    /// The PDF was written.
    Converted(ConversionReport),
    /// The directory held no images; no PDF was created.
    NothingToConvert { directory: PathBuf },
}

impl ConversionOutcome {
    /// The report, if a PDF was written.
    pub fn report(&self) -> Option<&ConversionReport> {
        match self {
            ConversionOutcome::Converted(r) => Some(r),
            ConversionOutcome::NothingToConvert { .. } => None,
        }
    }
}

/// Summary of a successful conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub output_path: PathBuf,
    pub image_count: usize,
    pub page_count: usize,
    /// File listing per page, in output order.
    pub pages: Vec<PageSummary>,
    /// Originals removed by cleanup (empty unless deletion was requested).
    pub deleted: Vec<PathBuf>,
    /// Originals that could not be removed. Never invalidates the PDF.
    pub deletion_errors: Vec<DeletionError>,
    pub stats: ConversionStats,
}

/// Timing and size figures for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionStats {
    pub total_duration_ms: u64,
    pub render_duration_ms: u64,
    pub write_duration_ms: u64,
    pub bytes_written: u64,
}

/// One page of a plan or report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSummary {
    /// 1-indexed.
    pub page: usize,
    pub images: Vec<SlotSummary>,
}

/// One placed image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSummary {
    /// 1-indexed position in the global ordering (the caption number).
    pub number: usize,
    pub file: String,
    pub row: usize,
    pub column: usize,
}

/// Collected, sorted and laid-out input, before any image is decoded.
#[derive(Debug, Clone)]
pub struct ConversionPlan {
    pub directory: PathBuf,
    pub output_path: PathBuf,
    pub entries: Vec<ImageEntry>,
    pub pages: Vec<PageSpec>,
}

impl ConversionPlan {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Per-page file listing.
    pub fn summary(&self) -> Vec<PageSummary> {
        self.pages
            .iter()
            .map(|page| PageSummary {
                page: page.index + 1,
                images: page
                    .slots
                    .iter()
                    .map(|slot| SlotSummary {
                        number: slot.question_number(),
                        file: self
                            .entries
                            .get(slot.sequence)
                            .map(|e| e.file_name.clone())
                            .unwrap_or_default(),
                        row: slot.row,
                        column: slot.column,
                    })
                    .collect(),
            })
            .collect()
    }
}
