//! File collection: list the image files directly inside a directory.
//!
//! Every candidate becomes an [`ImageEntry`] whose sort inputs (natural-sort
//! key and creation timestamp) are captured once, here, so the sorter never
//! touches the filesystem and never re-parses a file name.

use crate::error::Img2PdfError;
use crate::pipeline::sort::NaturalKey;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

/// Extensions recognised as images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff"];

/// One source image. Immutable once collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// Full path to the file.
    pub path: PathBuf,
    /// File name component, used for display and tie-breaking.
    pub file_name: String,
    /// Precomputed natural-order key derived from `file_name`.
    pub natural_key: NaturalKey,
    /// Birth time where the platform reports one, else modification time.
    pub created: SystemTime,
}

impl ImageEntry {
    /// Build an entry with an explicit timestamp (no filesystem access).
    pub fn new(path: impl Into<PathBuf>, created: SystemTime) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let natural_key = NaturalKey::new(&file_name);
        Self {
            path,
            file_name,
            natural_key,
            created,
        }
    }
}

/// Check whether a path carries an allow-listed image extension.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// List the image files in `dir`, unordered.
///
/// Non-recursive; sub-directories are skipped even when their names end in an
/// image extension. An empty result is not an error.
pub fn collect_images(dir: &Path) -> Result<Vec<ImageEntry>, Img2PdfError> {
    if !dir.is_dir() {
        return Err(Img2PdfError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let read_dir = std::fs::read_dir(dir).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Img2PdfError::DirectoryNotFound {
                path: dir.to_path_buf(),
            }
        } else {
            Img2PdfError::Internal(format!("Failed to list '{}': {}", dir.display(), e))
        }
    })?;

    let mut entries = Vec::new();
    for item in read_dir {
        let item = item.map_err(|e| {
            Img2PdfError::Internal(format!("Failed to list '{}': {}", dir.display(), e))
        })?;
        let path = item.path();
        if !is_image_path(&path) {
            continue;
        }

        // Follows symlinks; a dangling link fails here and is skipped.
        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                debug!("Skipping {}: metadata unavailable ({})", path.display(), e);
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        let created = match metadata.created() {
            Ok(t) => t,
            Err(_) => {
                debug!(
                    "No birth time for {}; using modification time",
                    path.display()
                );
                metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH)
            }
        };

        entries.push(ImageEntry::new(path, created));
    }

    info!("Collected {} images from {}", entries.len(), dir.display());
    Ok(entries)
}
