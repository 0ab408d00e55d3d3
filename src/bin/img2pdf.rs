//! CLI binary for edgequake-img2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionOptions` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_img2pdf::{
    convert, plan, ConversionOptions, ConversionOutcome, ConversionProgressCallback,
    ConversionReport, PageSize, PageSummary, SortMode,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Exit status when the directory contains no images.
const EXIT_NOTHING_TO_CONVERT: u8 = 3;
/// Exit status when the PDF was written but some originals survived cleanup.
const EXIT_DELETION_ERRORS: u8 = 4;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a bar counting images plus one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
    /// When the page currently being rendered started.
    page_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    /// Create a callback whose bar length is set by `on_conversion_start`.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Scanning directory…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_started: Mutex::new(None),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total_images: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} images  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_images as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }

    /// Clear the spinner when the run ends without conversion events.
    fn finish_idle(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }

    fn mark_page_start(&self) -> Option<Instant> {
        let mut started = self.page_started.lock().ok()?;
        started.replace(Instant::now())
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_images: usize, total_pages: usize) {
        self.activate_bar(total_images);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Placing {total_images} images on {total_pages} pages…"
            ))
        ));
        self.mark_page_start();
    }

    fn on_image_start(&self, _image_num: usize, _total_images: usize, file_name: &str) {
        self.bar.set_message(file_name.to_string());
    }

    fn on_page_complete(&self, page_num: usize, total_pages: usize, images_on_page: usize) {
        let elapsed_ms = self
            .mark_page_start()
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<10}  {}",
            green("✓"),
            page_num,
            total_pages,
            dim(&format!("{images_on_page} images")),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(images_on_page as u64);
    }

    fn on_conversion_failed(&self, error: &str) {
        self.bar.finish_and_clear();
        let first_line = error.lines().next().unwrap_or(error);
        eprintln!("{} {}", red("✘"), red(first_line));
    }

    fn on_cleanup_complete(&self, deleted: usize, failed: usize) {
        if failed == 0 {
            self.bar
                .println(format!("  {} Deleted {deleted} originals", green("✓")));
        } else {
            self.bar.println(format!(
                "  {} Deleted {deleted} originals, {} could not be deleted",
                cyan("⚠"),
                red(&failed.to_string())
            ));
        }
    }

    fn on_conversion_complete(&self, total_pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages written",
            green("✔"),
            bold(&total_pages.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One image per page, natural filename order, into ./combined_output.pdf
  img2pdf

  # Four images per page with a 12pt margin and question captions
  img2pdf scans/ -n 4 -m 12 --label -o worksheet.pdf

  # Order by creation time and delete the originals afterwards
  img2pdf photos/ --sort time --delete

  # Show which file lands on which page without writing anything
  img2pdf scans/ -n 6 --dry-run

EXIT STATUS:
  0  PDF written
  1  fatal error (missing directory, bad option, unreadable image, write failure)
  3  no images found; nothing written
  4  PDF written, but some originals could not be deleted
"#;

/// Combine a directory of images into one PDF.
#[derive(Parser, Debug)]
#[command(
    name = "img2pdf",
    version,
    about = "Combine a directory of images into one multi-page PDF",
    long_about = "Combine every PNG, JPEG, BMP, GIF and TIFF image in a directory into a \
single PDF, several to a page if requested, ordered by natural filename or creation time, \
optionally captioned \"Question N\".",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the images.
    #[arg(default_value = ".", env = "IMG2PDF_DIR")]
    directory: PathBuf,

    /// Output PDF path. Default: <DIRECTORY>/combined_output.pdf
    #[arg(short, long, env = "IMG2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// Images per page (≥ 1).
    #[arg(short = 'n', long, env = "IMG2PDF_IMAGES_PER_PAGE", default_value_t = 1)]
    images_per_page: usize,

    /// Margin in points (1pt = 1px at 72 DPI) between images and around the page.
    #[arg(short, long, env = "IMG2PDF_MARGIN", default_value_t = 0.0)]
    margin: f32,

    /// Caption each image "Question N", numbered across the whole document.
    #[arg(short, long, env = "IMG2PDF_LABEL")]
    label: bool,

    /// Input ordering.
    #[arg(long, env = "IMG2PDF_SORT", value_enum, default_value = "natural")]
    sort: SortArg,

    /// Delete the original images after the PDF is written.
    #[arg(long, env = "IMG2PDF_DELETE")]
    delete: bool,

    /// Page size.
    #[arg(long, env = "IMG2PDF_PAGE_SIZE", value_enum, default_value = "a4")]
    page_size: PageSizeArg,

    /// Resolution for embedded images (72–600).
    #[arg(long, env = "IMG2PDF_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// PDF title metadata. Default: the directory name.
    #[arg(long, env = "IMG2PDF_TITLE")]
    title: Option<String>,

    /// Print the page plan without decoding images or writing a PDF.
    #[arg(long)]
    dry_run: bool,

    /// Print the result (or plan) as JSON on stdout.
    #[arg(long, env = "IMG2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "IMG2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMG2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "IMG2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum SortArg {
    /// Natural filename order (img2 before img10).
    Natural,
    /// File creation time, oldest first.
    Time,
}

impl From<SortArg> for SortMode {
    fn from(v: SortArg) -> Self {
        match v {
            SortArg::Natural => SortMode::NaturalFilename,
            SortArg::Time => SortMode::CreationTime,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum PageSizeArg {
    A4,
    A3,
    A5,
    Letter,
    Legal,
}

impl From<PageSizeArg> for PageSize {
    fn from(v: PageSizeArg) -> Self {
        match v {
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::A3 => PageSize::A3,
            PageSizeArg::A5 => PageSize::A5,
            PageSizeArg::Letter => PageSize::Letter,
            PageSizeArg::Legal => PageSize::Legal,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.dry_run;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let mut options = build_options(&cli)?;

    // The spinner starts only once the options are known to be valid.
    let cli_progress = show_progress.then(CliProgressCallback::new_dynamic);
    options.progress_callback = cli_progress
        .clone()
        .map(|cb| cb as Arc<dyn ConversionProgressCallback>);

    // ── Dry run ──────────────────────────────────────────────────────────
    if cli.dry_run {
        let plan = plan(&cli.directory, &options).context("Failed to plan conversion")?;
        if plan.is_empty() {
            if !cli.quiet {
                eprintln!("No images found in {}", cli.directory.display());
            }
            return Ok(ExitCode::from(EXIT_NOTHING_TO_CONVERT));
        }
        let summary = plan.summary();
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Failed to serialise plan")?
            );
        } else {
            print_pages(&summary);
            println!(
                "{} images on {} pages → {}",
                plan.entries.len(),
                plan.pages.len(),
                plan.output_path.display()
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let outcome = convert(&cli.directory, &options).context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialise output")?
        );
    }

    match outcome {
        ConversionOutcome::NothingToConvert { directory } => {
            if let Some(ref cb) = cli_progress {
                cb.finish_idle();
            }
            if !cli.quiet && !cli.json {
                eprintln!("No images found in {}. Nothing to convert.", directory.display());
            }
            Ok(ExitCode::from(EXIT_NOTHING_TO_CONVERT))
        }
        ConversionOutcome::Converted(report) => {
            if !cli.quiet && !cli.json {
                print_summary(&report);
            }
            if report.deletion_errors.is_empty() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(EXIT_DELETION_ERRORS))
            }
        }
    }
}

/// Map CLI args to `ConversionOptions`. The progress callback is attached by the caller.
fn build_options(cli: &Cli) -> Result<ConversionOptions> {
    let mut builder = ConversionOptions::builder()
        .images_per_page(cli.images_per_page)
        .margin(cli.margin)
        .label_images(cli.label)
        .sort_mode(cli.sort.clone().into())
        .delete_originals(cli.delete)
        .page_size(cli.page_size.clone().into())
        .dpi(cli.dpi);

    if let Some(ref title) = cli.title {
        builder = builder.title(title);
    }
    if let Some(ref output) = cli.output {
        builder = builder.output_path(output);
    }
    builder.build().context("Invalid options")
}

fn print_pages(pages: &[PageSummary]) {
    for page in pages {
        println!("{}", bold(&format!("Page {}", page.page)));
        for slot in &page.images {
            println!(
                "  {:>4}  r{} c{}  {}",
                slot.number, slot.row, slot.column, slot.file
            );
        }
    }
}

fn print_summary(report: &ConversionReport) {
    eprintln!(
        "{}  {} images  {} pages  {}ms  →  {}",
        if report.deletion_errors.is_empty() {
            green("✔")
        } else {
            cyan("⚠")
        },
        report.image_count,
        report.page_count,
        report.stats.total_duration_ms,
        bold(&report.output_path.display().to_string()),
    );
    if !report.deleted.is_empty() {
        eprintln!("   {}", dim(&format!("{} originals deleted", report.deleted.len())));
    }
    for err in &report.deletion_errors {
        eprintln!("   {} {}", red("✗"), err);
    }
}
