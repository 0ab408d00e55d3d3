//! Page rendering: decode each slot's image and emit PDF drawing operators.
//!
//! Images are scaled to fit their slot's image box with aspect ratio
//! preserved and centred inside it. Pixels are only ever reduced: an image
//! larger than its placed size at the configured DPI is resampled with
//! Lanczos3, a smaller one is embedded untouched and scaled up by the PDF
//! transform. Transparent pixels are composited over white because PDF image
//! XObjects here are plain RGB.
//!
//! A decode failure aborts the run; there is no partial-page recovery.

use crate::config::ConversionOptions;
use crate::error::Img2PdfError;
use crate::pipeline::assemble::OutputDocument;
use crate::pipeline::collect::ImageEntry;
use crate::pipeline::layout::{LayoutSlot, PageSpec, Rect};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, Rgb, RgbImage};
use printpdf::{
    BuiltinFont, Op, Point, Pt, RawImage, RawImageData, RawImageFormat, TextItem,
    XObjectTransform,
};
use tracing::debug;

/// Font used for captions.
const CAPTION_FONT: BuiltinFont = BuiltinFont::Helvetica;

/// One page's drawing operators, ready to be appended to the document.
pub struct RenderedPage {
    pub index: usize,
    pub ops: Vec<Op>,
    /// Caption strings drawn on this page, in slot order.
    pub captions: Vec<String>,
    pub image_count: usize,
}

/// Caption text for a 1-based question number.
pub fn caption_text(question_number: usize) -> String {
    format!("Question {question_number}")
}

/// Render every slot of `page`, registering the decoded images with `doc`.
pub fn render_page(
    doc: &mut OutputDocument,
    page: &PageSpec,
    entries: &[ImageEntry],
    options: &ConversionOptions,
) -> Result<RenderedPage, Img2PdfError> {
    let total_images = entries.len();
    let mut ops = Vec::new();
    let mut captions = Vec::new();

    for slot in &page.slots {
        let entry = entries.get(slot.sequence).ok_or_else(|| {
            Img2PdfError::Internal(format!(
                "slot {} refers past the {} collected images",
                slot.sequence, total_images
            ))
        })?;

        if let Some(ref cb) = options.progress_callback {
            cb.on_image_start(slot.question_number(), total_images, &entry.file_name);
        }

        let image = decode_image(entry)?;
        let placed = slot
            .image_box
            .fit_centered(image.width() as f32, image.height() as f32);
        let raster = prepare_raster(image, &placed, options.dpi);
        let (px_w, px_h) = raster.dimensions();

        let raw = RawImage {
            pixels: RawImageData::U8(raster.into_raw()),
            width: px_w as usize,
            height: px_h as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let xobject_id = doc.add_image(&raw);

        // Native size of the raster at `dpi`, before the transform's scale.
        let dpi = options.dpi as f32;
        let native_w_pt = px_w as f32 / dpi * 72.0;
        let native_h_pt = px_h as f32 / dpi * 72.0;

        ops.push(Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(placed.x)),
                translate_y: Some(Pt(page.height - placed.bottom())),
                scale_x: Some(placed.width / native_w_pt),
                scale_y: Some(placed.height / native_h_pt),
                dpi: Some(dpi),
                rotate: None,
            },
        });

        debug!(
            file = %entry.file_name,
            page = page.index + 1,
            row = slot.row,
            column = slot.column,
            px_w,
            px_h,
            w_pt = placed.width,
            h_pt = placed.height,
            "Image placed"
        );

        if options.label_images {
            let text = caption_text(slot.question_number());
            push_caption(&mut ops, slot, page.height, &text);
            captions.push(text);
        }
    }

    Ok(RenderedPage {
        index: page.index,
        ops,
        captions,
        image_count: page.slots.len(),
    })
}

/// Decode an image, sniffing the format from content rather than extension.
fn decode_image(entry: &ImageEntry) -> Result<DynamicImage, Img2PdfError> {
    let unreadable = |detail: String| Img2PdfError::UnreadableImage {
        path: entry.path.clone(),
        detail,
    };
    ImageReader::open(&entry.path)
        .map_err(|e| unreadable(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| unreadable(e.to_string()))?
        .decode()
        .map_err(|e| unreadable(e.to_string()))
}

/// Downscale to the placed size at `dpi` (never upscale) and flatten to RGB.
fn prepare_raster(image: DynamicImage, placed: &Rect, dpi: u32) -> RgbImage {
    let max_w = ((placed.width / 72.0 * dpi as f32).ceil() as u32).max(1);
    let max_h = ((placed.height / 72.0 * dpi as f32).ceil() as u32).max(1);

    let image = if image.width() > max_w || image.height() > max_h {
        image.resize(max_w, max_h, FilterType::Lanczos3)
    } else {
        image
    };
    flatten_on_white(image)
}

/// Convert to 8-bit RGB, compositing any alpha channel over white.
fn flatten_on_white(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.into_rgb8();
    }
    let rgba = image.into_rgba8();
    let (w, h) = rgba.dimensions();
    let mut out = RgbImage::new(w, h);
    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let a = src[3] as u32;
        let blend = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        *dst = Rgb([blend(src[0]), blend(src[1]), blend(src[2])]);
    }
    out
}

fn push_caption(ops: &mut Vec<Op>, slot: &LayoutSlot, page_height: f32, text: &str) {
    let Some(caption) = slot.caption else {
        return;
    };
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: Pt(caption.x),
            y: Pt(page_height - caption.baseline),
        },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(caption.font_size),
        font: CAPTION_FONT,
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(text.to_string())],
        font: CAPTION_FONT,
    });
    ops.push(Op::EndTextSection);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::layout::plan_pages;
    use image::{Rgba, RgbaImage};
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str, w: u32, h: u32) -> ImageEntry {
        let path = dir.path().join(name);
        RgbImage::from_pixel(w, h, Rgb([30, 60, 90])).save(&path).unwrap();
        ImageEntry::new(path, SystemTime::UNIX_EPOCH)
    }

    #[test]
    fn caption_text_format() {
        assert_eq!(caption_text(1), "Question 1");
        assert_eq!(caption_text(12), "Question 12");
    }

    #[test]
    fn flatten_composites_over_white() {
        let mut rgba = RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 0, Rgba([10, 20, 30, 255]));
        let rgb = flatten_on_white(DynamicImage::ImageRgba8(rgba));
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(rgb.get_pixel(1, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn large_rasters_are_downscaled_small_kept() {
        let placed = Rect { x: 0.0, y: 0.0, width: 72.0, height: 72.0 };
        // 1 inch at 100 DPI = 100 px.
        let big = DynamicImage::ImageRgb8(RgbImage::new(400, 400));
        assert_eq!(prepare_raster(big, &placed, 100).dimensions(), (100, 100));

        let small = DynamicImage::ImageRgb8(RgbImage::new(40, 20));
        assert_eq!(prepare_raster(small, &placed, 100).dimensions(), (40, 20));
    }

    #[test]
    fn renders_images_and_global_captions() {
        let dir = TempDir::new().unwrap();
        let entries: Vec<ImageEntry> = (1..=6)
            .map(|i| write_png(&dir, &format!("q{i}.png"), 40, 30))
            .collect();
        let options = ConversionOptions::builder()
            .images_per_page(4)
            .label_images(true)
            .build()
            .unwrap();
        let pages = plan_pages(&entries, &options).unwrap();

        let mut doc = OutputDocument::new("test", options.page_size);
        let first = render_page(&mut doc, &pages[0], &entries, &options).unwrap();
        let second = render_page(&mut doc, &pages[1], &entries, &options).unwrap();

        assert_eq!(
            first.captions,
            vec!["Question 1", "Question 2", "Question 3", "Question 4"]
        );
        assert_eq!(second.captions, vec!["Question 5", "Question 6"]);
        assert_eq!(first.image_count, 4);
        assert_eq!(second.image_count, 2);
    }

    #[test]
    fn no_captions_when_disabled() {
        let dir = TempDir::new().unwrap();
        let entries = vec![write_png(&dir, "a.png", 10, 10)];
        let options = ConversionOptions::default();
        let pages = plan_pages(&entries, &options).unwrap();
        let mut doc = OutputDocument::new("test", options.page_size);
        let page = render_page(&mut doc, &pages[0], &entries, &options).unwrap();
        assert!(page.captions.is_empty());
        assert_eq!(page.ops.len(), 1);
    }

    #[test]
    fn undecodable_image_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let entries = vec![ImageEntry::new(path.clone(), SystemTime::UNIX_EPOCH)];
        let options = ConversionOptions::default();
        let pages = plan_pages(&entries, &options).unwrap();
        let mut doc = OutputDocument::new("test", options.page_size);

        match render_page(&mut doc, &pages[0], &entries, &options) {
            Err(Img2PdfError::UnreadableImage { path: p, .. }) => assert_eq!(p, path),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("broken image rendered"),
        }
    }
}
