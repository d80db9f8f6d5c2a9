//! Card placement within the grid
//!
//! Fronts fill the grid row-major from the top left. Backs use the same rows
//! with the column order reversed, so that once the sheet is turned over
//! about its vertical centerline every back sits behind its own front.
//! The mirror is taken against the full grid width, also for a partially
//! filled last row.

use crate::options::ImageFit;

use super::{CardSlot, GridPosition, ImagePlacement, PageGeometry, Rect, SheetSide};

/// Cells for the fronts of a group of `count` cards
pub fn front_slots(geometry: &PageGeometry, count: usize) -> Vec<CardSlot> {
    side_slots(geometry, count, SheetSide::Front)
}

/// Cells for the backs of a group of `count` cards
pub fn back_slots(geometry: &PageGeometry, count: usize) -> Vec<CardSlot> {
    side_slots(geometry, count, SheetSide::Back)
}

/// Cells for one side of a group, in card order
pub fn side_slots(geometry: &PageGeometry, count: usize, side: SheetSide) -> Vec<CardSlot> {
    (0..count.min(geometry.capacity()))
        .map(|card_index| {
            let position = slot_position(geometry, card_index, side);
            CardSlot {
                card_index,
                position,
                cell: geometry.cell_rect(position),
            }
        })
        .collect()
}

/// Grid position of a card on the given side
pub fn slot_position(geometry: &PageGeometry, card_index: usize, side: SheetSide) -> GridPosition {
    let front = geometry.position_of(card_index);
    match side {
        SheetSide::Front => front,
        SheetSide::Back => GridPosition::new(front.row, geometry.mirrored_col(front.col)),
    }
}

/// Fit an image of `image_width` x `image_height` pixels into a cell.
///
/// Aspect ratio is always preserved. `Contain` centers the whole image and
/// leaves bars on the short side; `Cover` fills the cell and returns the cell
/// as a clip rectangle.
pub fn fit_image(cell: &Rect, image_width: u32, image_height: u32, fit: ImageFit) -> ImagePlacement {
    if image_width == 0 || image_height == 0 {
        return ImagePlacement {
            draw: *cell,
            clip: None,
        };
    }

    let width_ratio = cell.width / image_width as f32;
    let height_ratio = cell.height / image_height as f32;
    let scale = match fit {
        ImageFit::Contain => width_ratio.min(height_ratio),
        ImageFit::Cover => width_ratio.max(height_ratio),
    };

    let width = image_width as f32 * scale;
    let height = image_height as f32 * scale;
    let draw = Rect::new(
        cell.center_x() - width / 2.0,
        cell.center_y() - height / 2.0,
        width,
        height,
    );

    let overflows = width > cell.width + 1e-3 || height > cell.height + 1e-3;
    ImagePlacement {
        draw,
        clip: overflows.then_some(*cell),
    }
}

// =============================================================================
// Tests
// =============================================================================
