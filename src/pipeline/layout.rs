//! Page layout: split the ordered images into pages and assign grid cells.
//!
//! ## Grid policy
//!
//! For `n` images per page the grid has `rows = ceil(sqrt(n))` and
//! `columns = ceil(n / rows)`. Pages are portrait, so the shape leans towards
//! more rows than columns: 2 images stack vertically, 4 form a 2×2 grid,
//! 6 form 3 rows of 2. Every page of a document uses the same grid, including
//! a short final page, so cells are the same size throughout.
//!
//! `margin` separates neighbouring cells and the outer cells from the page
//! edge. All geometry here is in PDF points with a **top-left** origin; the
//! renderer flips to PDF's bottom-left origin when emitting operators.

use crate::config::ConversionOptions;
use crate::error::Img2PdfError;
use crate::pipeline::collect::ImageEntry;
use serde::Serialize;
use tracing::debug;

/// Caption font size bounds in points.
const MIN_CAPTION_PT: f32 = 9.0;
const MAX_CAPTION_PT: f32 = 18.0;
/// Caption band height as a multiple of the font size.
const CAPTION_LEADING: f32 = 1.4;

/// Axis-aligned rectangle, top-left origin, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// True when the interiors of the two rectangles intersect.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Largest rectangle with aspect `src_w:src_h` that fits inside `self`,
    /// centred on both axes.
    pub fn fit_centered(&self, src_w: f32, src_h: f32) -> Rect {
        if src_w <= 0.0 || src_h <= 0.0 || self.width <= 0.0 || self.height <= 0.0 {
            return Rect {
                x: self.x + self.width / 2.0,
                y: self.y + self.height / 2.0,
                width: 0.0,
                height: 0.0,
            };
        }
        let scale = (self.width / src_w).min(self.height / src_h);
        let width = src_w * scale;
        let height = src_h * scale;
        Rect {
            x: self.x + (self.width - width) / 2.0,
            y: self.y + (self.height - height) / 2.0,
            width,
            height,
        }
    }
}

/// Rows and columns of the per-page grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridShape {
    pub rows: usize,
    pub columns: usize,
}

impl GridShape {
    /// Grid for `n` images per page. `n = 0` is treated as 1.
    pub fn for_count(n: usize) -> Self {
        let n = n.max(1);
        let mut rows = (n as f64).sqrt().ceil() as usize;
        // Float rounding can overshoot on perfect squares of large n.
        while rows > 1 && (rows - 1) * (rows - 1) >= n {
            rows -= 1;
        }
        let columns = n.div_ceil(rows);
        Self { rows, columns }
    }

    pub fn capacity(&self) -> usize {
        self.rows * self.columns
    }
}

/// Where the "Question N" caption for a slot is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CaptionPlacement {
    /// Left edge of the text.
    pub x: f32,
    /// Text baseline, measured from the top of the page.
    pub baseline: f32,
    pub font_size: f32,
}

/// Placement of one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSlot {
    /// 0-based position in the global ordering; also indexes the entry slice.
    pub sequence: usize,
    pub page_index: usize,
    pub row: usize,
    pub column: usize,
    /// Whole grid cell, caption band included.
    pub cell: Rect,
    /// Region the image is fitted into.
    pub image_box: Rect,
    /// Present only when captions are enabled.
    pub caption: Option<CaptionPlacement>,
}

impl LayoutSlot {
    /// 1-based caption number, continuous across pages.
    pub fn question_number(&self) -> usize {
        self.sequence + 1
    }
}

/// One output page and the slots placed on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSpec {
    pub index: usize,
    pub width: f32,
    pub height: f32,
    pub slots: Vec<LayoutSlot>,
}

/// Lay out `entries` (already sorted) onto pages.
///
/// Returns one [`PageSpec`] per `images_per_page` chunk; an empty input yields
/// no pages.
pub fn plan_pages(
    entries: &[ImageEntry],
    options: &ConversionOptions,
) -> Result<Vec<PageSpec>, Img2PdfError> {
    if options.images_per_page == 0 {
        return Err(Img2PdfError::InvalidOptions(
            "images_per_page must be ≥ 1, got 0".into(),
        ));
    }

    let grid = GridShape::for_count(options.images_per_page);
    let (page_w, page_h) = options.page_size.dimensions_pt();
    let margin = options.margin;

    let cell_w = (page_w - (grid.columns + 1) as f32 * margin) / grid.columns as f32;
    let cell_h = (page_h - (grid.rows + 1) as f32 * margin) / grid.rows as f32;
    if cell_w <= 0.0 || cell_h <= 0.0 {
        return Err(Img2PdfError::InvalidOptions(format!(
            "margin {}pt leaves no room for a {}x{} grid",
            margin, grid.rows, grid.columns
        )));
    }

    // Tiny cells shrink the caption so it never takes more than half the cell.
    let caption_font = if options.label_images {
        (cell_h * 0.03)
            .clamp(MIN_CAPTION_PT, MAX_CAPTION_PT)
            .min(cell_h / (2.0 * CAPTION_LEADING))
    } else {
        0.0
    };
    let caption_band = caption_font * CAPTION_LEADING;

    let pages: Vec<PageSpec> = entries
        .chunks(options.images_per_page)
        .enumerate()
        .map(|(page_index, chunk)| {
            let slots = (0..chunk.len())
                .map(|pos| {
                    let row = pos / grid.columns;
                    let column = pos % grid.columns;
                    let cell = Rect {
                        x: margin + column as f32 * (cell_w + margin),
                        y: margin + row as f32 * (cell_h + margin),
                        width: cell_w,
                        height: cell_h,
                    };
                    let image_box = Rect {
                        x: cell.x,
                        y: cell.y + caption_band,
                        width: cell.width,
                        height: cell.height - caption_band,
                    };
                    let caption = options.label_images.then(|| CaptionPlacement {
                        x: cell.x,
                        baseline: cell.y + caption_font,
                        font_size: caption_font,
                    });
                    LayoutSlot {
                        sequence: page_index * options.images_per_page + pos,
                        page_index,
                        row,
                        column,
                        cell,
                        image_box,
                        caption,
                    }
                })
                .collect();
            PageSpec {
                index: page_index,
                width: page_w,
                height: page_h,
                slots,
            }
        })
        .collect();

    debug!(
        "Planned {} pages on a {}x{} grid ({:.1}x{:.1}pt cells)",
        pages.len(),
        grid.rows,
        grid.columns,
        cell_w,
        cell_h
    );
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn entries(n: usize) -> Vec<ImageEntry> {
        (0..n)
            .map(|i| ImageEntry::new(format!("/s/img{i}.png"), SystemTime::UNIX_EPOCH))
            .collect()
    }

    fn options(per_page: usize, margin: f32, label: bool) -> ConversionOptions {
        ConversionOptions::builder()
            .images_per_page(per_page)
            .margin(margin)
            .label_images(label)
            .build()
            .unwrap()
    }

    #[test]
    fn grid_shapes() {
        let shape = |n| {
            let g = GridShape::for_count(n);
            (g.rows, g.columns)
        };
        assert_eq!(shape(1), (1, 1));
        assert_eq!(shape(2), (2, 1));
        assert_eq!(shape(3), (2, 2));
        assert_eq!(shape(4), (2, 2));
        assert_eq!(shape(5), (3, 2));
        assert_eq!(shape(6), (3, 2));
        assert_eq!(shape(9), (3, 3));
        assert_eq!(shape(10), (4, 3));
        assert_eq!(shape(0), (1, 1));
    }

    #[test]
    fn grid_always_has_enough_cells() {
        for n in 1..=200 {
            let g = GridShape::for_count(n);
            assert!(g.capacity() >= n, "n={n} grid={g:?}");
            assert!(g.rows >= g.columns, "n={n} grid={g:?}");
        }
    }

    #[test]
    fn page_count_is_ceiling_division() {
        for (n, per_page, expected) in [(1, 1, 1), (6, 4, 2), (8, 4, 2), (9, 4, 3), (3, 10, 1)] {
            let pages = plan_pages(&entries(n), &options(per_page, 0.0, false)).unwrap();
            assert_eq!(pages.len(), expected, "n={n} per_page={per_page}");
        }
    }

    #[test]
    fn empty_input_has_no_pages() {
        let pages = plan_pages(&[], &options(4, 0.0, false)).unwrap();
        assert!(pages.is_empty());
    }

    #[test]
    fn zero_per_page_rejected() {
        let mut o = ConversionOptions::default();
        o.images_per_page = 0;
        let err = plan_pages(&entries(3), &o).unwrap_err();
        assert!(matches!(err, Img2PdfError::InvalidOptions(_)));
    }

    #[test]
    fn every_entry_gets_exactly_one_slot() {
        let pages = plan_pages(&entries(11), &options(4, 5.0, false)).unwrap();
        let mut seqs: Vec<usize> = pages
            .iter()
            .flat_map(|p| p.slots.iter().map(|s| s.sequence))
            .collect();
        seqs.sort_unstable();
        assert_eq!(seqs, (0..11).collect::<Vec<_>>());
        for p in &pages {
            assert!(p.slots.iter().all(|s| s.page_index == p.index));
        }
    }

    #[test]
    fn row_major_placement() {
        let pages = plan_pages(&entries(4), &options(4, 0.0, false)).unwrap();
        let coords: Vec<(usize, usize)> =
            pages[0].slots.iter().map(|s| (s.row, s.column)).collect();
        assert_eq!(coords, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn slots_do_not_overlap_and_respect_margin() {
        let margin = 12.0;
        let pages = plan_pages(&entries(6), &options(6, margin, true)).unwrap();
        let page = &pages[0];
        for (i, a) in page.slots.iter().enumerate() {
            assert!(a.cell.x >= margin - 1e-3 && a.cell.y >= margin - 1e-3);
            assert!(a.cell.right() <= page.width - margin + 1e-3);
            assert!(a.cell.bottom() <= page.height - margin + 1e-3);
            for b in &page.slots[i + 1..] {
                assert!(!a.cell.overlaps(&b.cell), "{a:?} overlaps {b:?}");
            }
        }
        // Horizontal gap between neighbouring cells equals the margin.
        let gap = page.slots[1].cell.x - page.slots[0].cell.right();
        assert!((gap - margin).abs() < 1e-3, "gap = {gap}");
    }

    #[test]
    fn caption_band_sits_above_image_box() {
        let pages = plan_pages(&entries(1), &options(1, 20.0, true)).unwrap();
        let slot = &pages[0].slots[0];
        let caption = slot.caption.expect("caption placement");
        assert!(caption.font_size >= MIN_CAPTION_PT && caption.font_size <= MAX_CAPTION_PT);
        assert!(caption.baseline <= slot.image_box.y);
        assert!(slot.image_box.y > slot.cell.y);
        assert!((slot.image_box.bottom() - slot.cell.bottom()).abs() < 1e-3);
    }

    #[test]
    fn no_caption_without_labels() {
        let pages = plan_pages(&entries(2), &options(2, 0.0, false)).unwrap();
        assert!(pages[0].slots.iter().all(|s| s.caption.is_none()));
        assert_eq!(pages[0].slots[0].image_box, pages[0].slots[0].cell);
    }

    #[test]
    fn question_numbers_are_global() {
        let pages = plan_pages(&entries(6), &options(4, 0.0, true)).unwrap();
        let numbers: Vec<Vec<usize>> = pages
            .iter()
            .map(|p| p.slots.iter().map(LayoutSlot::question_number).collect())
            .collect();
        assert_eq!(numbers, vec![vec![1, 2, 3, 4], vec![5, 6]]);
    }

    #[test]
    fn planning_is_deterministic() {
        let o = options(3, 7.5, true);
        let a = plan_pages(&entries(10), &o).unwrap();
        let b = plan_pages(&entries(10), &o).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fit_centered_preserves_aspect() {
        let boxed = Rect { x: 0.0, y: 0.0, width: 200.0, height: 100.0 };
        let fitted = boxed.fit_centered(50.0, 50.0);
        assert_eq!(fitted, Rect { x: 50.0, y: 0.0, width: 100.0, height: 100.0 });

        let fitted = boxed.fit_centered(400.0, 100.0);
        assert_eq!(fitted, Rect { x: 0.0, y: 25.0, width: 200.0, height: 50.0 });
    }
}
