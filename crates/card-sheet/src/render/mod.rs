//! PDF rendering modules for card sheets
//!
//! This module handles all PDF-specific operations:
//! - Embedding card images as image XObjects
//! - Building front and back pages

mod image;
mod page;

pub use image::EmbeddedImage;
pub use page::*;
