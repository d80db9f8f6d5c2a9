//! Crop marks for card sheets
//!
//! Marks are short ticks outside the card grid, one pair for every vertical
//! grid line (above and below the grid) and one pair for every horizontal
//! card edge (left and right of the grid). They depend on nothing but the
//! geometry and style, so a front page and its back carry the same marks.

use crate::layout::PageGeometry;
use crate::options::CropMarkStyle;

/// A straight line between two points, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl LineSegment {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    fn to_ops(self) -> String {
        format!("{} {} m {} {} l S\n", self.x1, self.y1, self.x2, self.y2)
    }
}

/// x coordinates of every vertical cut line, left to right
pub fn vertical_cut_lines(geometry: &PageGeometry) -> Vec<f32> {
    (0..=geometry.columns)
        .map(|col| geometry.margin + col as f32 * geometry.card_width)
        .collect()
}

/// y coordinates of every horizontal card edge, top to bottom.
///
/// Each row contributes its top and bottom edge; edges shared by adjacent
/// rows (no gap) appear once.
pub fn horizontal_cut_lines(geometry: &PageGeometry) -> Vec<f32> {
    let grid_top = geometry.grid_bounds().top();
    let mut lines: Vec<f32> = Vec::with_capacity(geometry.rows * 2);

    for row in 0..geometry.rows {
        let top = grid_top - row as f32 * (geometry.card_height + geometry.gap);
        let bottom = top - geometry.card_height;
        for y in [top, bottom] {
            if lines.last().is_none_or(|&last| (last - y).abs() > 1e-3) {
                lines.push(y);
            }
        }
    }

    lines
}

/// All crop mark segments for a page
pub fn crop_mark_segments(geometry: &PageGeometry, style: &CropMarkStyle) -> Vec<LineSegment> {
    if !style.enabled {
        return Vec::new();
    }

    let bounds = geometry.grid_bounds();
    let near = style.offset_pt;
    let far = style.offset_pt + style.length_pt;
    let mut segments = Vec::new();

    for x in vertical_cut_lines(geometry) {
        // Above the grid
        segments.push(LineSegment::new(x, bounds.top() + near, x, bounds.top() + far));
        // Below the grid
        segments.push(LineSegment::new(x, bounds.y - near, x, bounds.y - far));
    }

    for y in horizontal_cut_lines(geometry) {
        // Left of the grid
        segments.push(LineSegment::new(bounds.x - near, y, bounds.x - far, y));
        // Right of the grid
        segments.push(LineSegment::new(
            bounds.right() + near,
            y,
            bounds.right() + far,
            y,
        ));
    }

    segments
}

/// Generate the crop marks as PDF content stream operations
pub fn generate_crop_marks(geometry: &PageGeometry, style: &CropMarkStyle) -> String {
    let segments = crop_mark_segments(geometry, style);
    if segments.is_empty() {
        return String::new();
    }

    let mut ops = String::new();

    // Save graphics state
    ops.push_str("q\n");
    ops.push_str(&format!("{} {} {} RG\n", style.gray, style.gray, style.gray));
    ops.push_str(&format!("{} w\n", style.line_width_pt));
    ops.push_str("[] 0 d\n"); // solid line

    for segment in segments {
        ops.push_str(&segment.to_ops());
    }

    // Restore graphics state
    ops.push_str("Q\n");

    ops
}

/// Whether every crop mark lies on the page
pub fn marks_within_page(geometry: &PageGeometry, style: &CropMarkStyle) -> bool {
    crop_mark_segments(geometry, style).iter().all(|s| {
        [s.x1, s.x2].iter().all(|&x| (0.0..=geometry.page_width).contains(&x))
            && [s.y1, s.y2]
                .iter()
                .all(|&y| (0.0..=geometry.page_height).contains(&y))
    })
}

// =============================================================================
// Tests
// =============================================================================
