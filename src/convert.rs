//! Conversion entry points.
//!
//! A run moves through `Collecting → Sorting → Planning → Rendering →
//! Assembling → CleaningUp → Done`, each stage finishing before the next
//! starts. Any fatal error stops the run where it happened: nothing is
//! written before `Assembling`, and originals are only deleted after the PDF
//! is safely on disk.

use crate::config::ConversionOptions;
use crate::error::Img2PdfError;
use crate::output::{ConversionOutcome, ConversionPlan, ConversionReport, ConversionStats};
use crate::pipeline::assemble::{self, OutputDocument};
use crate::pipeline::{cleanup, collect, layout, render, sort};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Collect, sort and lay out the images in `directory` without decoding them.
///
/// # Errors
/// - [`Img2PdfError::DirectoryNotFound`] if `directory` is missing or not a directory
/// - [`Img2PdfError::InvalidOptions`] if `options` fail validation
pub fn plan(
    directory: impl AsRef<Path>,
    options: &ConversionOptions,
) -> Result<ConversionPlan, Img2PdfError> {
    let directory = directory.as_ref();
    options.validate()?;

    // ── Collecting ───────────────────────────────────────────────────────
    let mut entries = collect::collect_images(directory)?;

    // ── Sorting ──────────────────────────────────────────────────────────
    sort::sort_entries(&mut entries, options.sort_mode);

    // ── Planning ─────────────────────────────────────────────────────────
    let pages = layout::plan_pages(&entries, options)?;
    debug!(
        "Plan: {} images on {} pages ({} per page)",
        entries.len(),
        pages.len(),
        options.images_per_page
    );

    Ok(ConversionPlan {
        directory: directory.to_path_buf(),
        output_path: options.resolve_output_path(directory),
        entries,
        pages,
    })
}

/// Convert every image in `directory` into one PDF.
///
/// This is the primary entry point for the library. The PDF goes to
/// `options.output_path`, or `<directory>/combined_output.pdf` when unset.
///
/// # Returns
/// - `Ok(ConversionOutcome::Converted(report))` once the PDF is written, even
///   if some originals could not be deleted (see `report.deletion_errors`)
/// - `Ok(ConversionOutcome::NothingToConvert { .. })` for a directory with no
///   images; no file is created
///
/// # Errors
/// Returns `Err(Img2PdfError)` for fatal errors, after which no output PDF
/// exists and no original has been deleted:
/// - Directory not found / invalid options
/// - An image that cannot be decoded
/// - The PDF cannot be written
pub fn convert(
    directory: impl AsRef<Path>,
    options: &ConversionOptions,
) -> Result<ConversionOutcome, Img2PdfError> {
    let result = run(directory.as_ref(), options);
    if let (Err(e), Some(cb)) = (&result, &options.progress_callback) {
        cb.on_conversion_failed(&e.to_string());
    }
    result
}

/// Convert `directory` and write the PDF to `output_path`, overriding
/// `options.output_path`.
pub fn convert_to_file(
    directory: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    options: &ConversionOptions,
) -> Result<ConversionOutcome, Img2PdfError> {
    let mut options = options.clone();
    options.output_path = Some(output_path.as_ref().to_path_buf());
    convert(directory, &options)
}

fn run(directory: &Path, options: &ConversionOptions) -> Result<ConversionOutcome, Img2PdfError> {
    let total_start = Instant::now();
    info!("Starting conversion: {}", directory.display());

    // ── Steps 1–3: Collect, sort, plan ───────────────────────────────────
    let plan = plan(directory, options)?;
    if plan.is_empty() {
        info!("No images found in {}", directory.display());
        return Ok(ConversionOutcome::NothingToConvert {
            directory: directory.to_path_buf(),
        });
    }

    let total_pages = plan.pages.len();
    if let Some(ref cb) = options.progress_callback {
        cb.on_conversion_start(plan.entries.len(), total_pages);
    }

    // ── Step 4: Render pages ─────────────────────────────────────────────
    let render_start = Instant::now();
    let mut doc = OutputDocument::new(&options.resolve_title(directory), options.page_size);
    for page in &plan.pages {
        let rendered = render::render_page(&mut doc, page, &plan.entries, options)?;
        let images_on_page = rendered.image_count;
        doc.push_page(rendered);
        if let Some(ref cb) = options.progress_callback {
            cb.on_page_complete(page.index + 1, total_pages, images_on_page);
        }
    }
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!("Rendered {} pages in {}ms", total_pages, render_duration_ms);

    // ── Step 5: Assemble and write ───────────────────────────────────────
    let write_start = Instant::now();
    let bytes_written = assemble::write_pdf(doc, &plan.output_path)?;
    let write_duration_ms = write_start.elapsed().as_millis() as u64;

    // ── Step 6: Cleanup ──────────────────────────────────────────────────
    let cleaned = if options.delete_originals {
        let report = cleanup::delete_originals(&plan.entries);
        if let Some(ref cb) = options.progress_callback {
            cb.on_cleanup_complete(report.deleted.len(), report.errors.len());
        }
        report
    } else {
        cleanup::CleanupReport::default()
    };

    let stats = ConversionStats {
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        render_duration_ms,
        write_duration_ms,
        bytes_written,
    };

    info!(
        "Conversion complete: {} images, {} pages, {}ms total → {}",
        plan.entries.len(),
        total_pages,
        stats.total_duration_ms,
        plan.output_path.display()
    );

    if let Some(ref cb) = options.progress_callback {
        cb.on_conversion_complete(total_pages);
    }

    Ok(ConversionOutcome::Converted(ConversionReport {
        output_path: plan.output_path.clone(),
        image_count: plan.entries.len(),
        page_count: total_pages,
        pages: plan.summary(),
        deleted: cleaned.deleted,
        deletion_errors: cleaned.errors,
        stats,
    }))
}
