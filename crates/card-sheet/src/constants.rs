//! Shared constants for card sheet layout
//!
//! This module centralizes magic numbers and constants used throughout
//! the layout and rendering process.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Card Dimensions
// =============================================================================

/// Standard trading card width (2.5")
pub const DEFAULT_CARD_WIDTH_MM: f32 = 63.5;

/// Standard trading card height (3.5")
pub const DEFAULT_CARD_HEIGHT_MM: f32 = 88.9;

/// Default grid: 3 columns
pub const DEFAULT_COLUMNS: usize = 3;

/// Default grid: 3 rows
pub const DEFAULT_ROWS: usize = 3;

// =============================================================================
// Geometry Tolerances
// =============================================================================

/// Smallest inter-row gap a page-fitted grid will accept (points)
pub const MIN_ROW_GAP_PT: f32 = 0.01;

/// Float slack tolerated before a fixed grid counts as overflowing (points)
pub const GEOMETRY_TOLERANCE_PT: f32 = 1e-3;

// =============================================================================
// Crop Marks
// =============================================================================

/// Line width for crop marks (points)
pub const CROP_MARK_WIDTH: f32 = 0.5;

/// Length of crop marks (points)
pub const CROP_MARK_LENGTH: f32 = 12.0;

/// Gap between crop mark and grid edge (points)
pub const CROP_MARK_GAP: f32 = 3.0;

/// Gray level of crop marks (0 = black, 1 = white)
pub const CROP_MARK_GRAY: f32 = 0.8;

// =============================================================================
// Placeholders
// =============================================================================

/// Line width of the outline drawn in place of an unreadable image (points)
pub const PLACEHOLDER_LINE_WIDTH: f32 = 0.5;

/// Gray level of the placeholder outline
pub const PLACEHOLDER_GRAY: f32 = 0.6;
