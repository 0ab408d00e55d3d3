//! Cleanup: best-effort deletion of the source images after a successful write.
//!
//! Each file is removed independently. A failure is recorded as a
//! [`DeletionError`] and the loop moves on; nothing already deleted is
//! restored and the written PDF is never touched.

use crate::error::DeletionError;
use crate::pipeline::collect::ImageEntry;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Outcome of a cleanup pass.
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub deleted: Vec<PathBuf>,
    pub errors: Vec<DeletionError>,
}

/// Delete every entry's file, collecting per-file failures.
pub fn delete_originals(entries: &[ImageEntry]) -> CleanupReport {
    let mut report = CleanupReport::default();

    for entry in entries {
        match std::fs::remove_file(&entry.path) {
            Ok(()) => {
                debug!("Deleted {}", entry.path.display());
                report.deleted.push(entry.path.clone());
            }
            Err(e) => {
                warn!("Could not delete {}: {}", entry.path.display(), e);
                report.errors.push(DeletionError {
                    path: entry.path.clone(),
                    detail: e.to_string(),
                });
            }
        }
    }

    info!(
        "Cleanup: {} deleted, {} failed",
        report.deleted.len(),
        report.errors.len()
    );
    report
}
