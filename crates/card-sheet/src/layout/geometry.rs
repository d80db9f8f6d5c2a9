//! Page geometry calculation
//!
//! Turns the configured page and card size into the grid used for every
//! page of a document. One margin is used on the left, right and top edges;
//! any vertical space left over is spread between the rows, so crop marks
//! drawn relative to the grid line up on every edge.

use crate::constants::{GEOMETRY_TOLERANCE_PT, MIN_ROW_GAP_PT, mm_to_pt};
use crate::options::{GridPolicy, SheetOptions};
use crate::types::{Result, SheetError};

use super::PageGeometry;

/// Compute the page geometry for a set of options.
///
/// Fails with [`SheetError::Config`] when the grid cannot be placed on the
/// page without overflowing it.
pub fn compute_geometry(options: &SheetOptions) -> Result<PageGeometry> {
    options.validate()?;

    let (page_width, page_height) = options.page_size_pt();
    let (card_width, card_height) = options.card_size_pt();

    let (columns, rows) = match options.grid {
        GridPolicy::Fixed { columns, rows } => (columns, rows),
        GridPolicy::FitToPage { min_margin_mm } => fit_grid(
            page_width,
            page_height,
            card_width,
            card_height,
            mm_to_pt(min_margin_mm),
        )?,
    };

    let grid_width = columns as f32 * card_width;
    let margin = (page_width - grid_width) / 2.0;
    if margin < -GEOMETRY_TOLERANCE_PT {
        return Err(SheetError::Config(format!(
            "{} columns of {:.2}pt cards need {:.2}pt but the page is {:.2}pt wide",
            columns, card_width, grid_width, page_width
        )));
    }
    let margin = margin.max(0.0);

    let leftover = page_height - 2.0 * margin - rows as f32 * card_height;
    if leftover < -GEOMETRY_TOLERANCE_PT {
        return Err(SheetError::Config(format!(
            "{} rows of {:.2}pt cards with a {:.2}pt margin need {:.2}pt but the page is {:.2}pt tall",
            rows,
            card_height,
            margin,
            2.0 * margin + rows as f32 * card_height,
            page_height
        )));
    }

    // A single row has nothing to spread the leftover over; it hangs from the
    // top margin instead.
    let gap = if rows > 1 {
        (leftover / (rows - 1) as f32).max(0.0)
    } else {
        0.0
    };

    let geometry = PageGeometry {
        page_width,
        page_height,
        card_width,
        card_height,
        columns,
        rows,
        margin,
        gap,
    };

    log::debug!(
        "Geometry: {}x{} grid, margin {:.2}pt, row gap {:.2}pt on {:.2}x{:.2}pt page",
        columns,
        rows,
        margin,
        gap,
        page_width,
        page_height
    );

    Ok(geometry)
}

/// Largest grid that fits the page while keeping `min_margin` on every side
/// and at least [`MIN_ROW_GAP_PT`] between rows.
fn fit_grid(
    page_width: f32,
    page_height: f32,
    card_width: f32,
    card_height: f32,
    min_margin: f32,
) -> Result<(usize, usize)> {
    let columns = floor_count((page_width - 2.0 * min_margin) / card_width);
    if columns == 0 {
        return Err(SheetError::Config(format!(
            "A {:.2}pt wide card does not fit a {:.2}pt page with a {:.2}pt margin",
            card_width, page_width, min_margin
        )));
    }

    let margin = (page_width - columns as f32 * card_width) / 2.0;
    let available = page_height - 2.0 * margin;
    let rows = floor_count((available + MIN_ROW_GAP_PT) / (card_height + MIN_ROW_GAP_PT));
    if rows == 0 {
        return Err(SheetError::Config(format!(
            "A {:.2}pt tall card does not fit a {:.2}pt page with a {:.2}pt margin",
            card_height, page_height, margin
        )));
    }

    Ok((columns, rows))
}

fn floor_count(value: f32) -> usize {
    if value.is_finite() && value > 0.0 {
        (value + 1e-4).floor() as usize
    } else {
        0
    }
}

// =============================================================================
// Tests
// =============================================================================
