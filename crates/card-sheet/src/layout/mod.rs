//! Layout calculation modules for card sheets
//!
//! This module handles all the geometric calculations:
//! - Page geometry (grid size, margin, row gap)
//! - Grouping the card list into pages
//! - Card placement (front order, mirrored back order, image fit)

mod geometry;
mod grouping;
mod placement;
mod types;

pub use geometry::*;
pub use grouping::*;
pub use placement::*;
pub use types::*;
