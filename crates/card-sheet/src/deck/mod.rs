//! Decklists and local card images
//!
//! A decklist names cards and quantities; resolution turns it into the
//! ordered front/back image pairs the layout engine consumes, using images
//! already present in a local directory.

mod parse;
mod resolve;

pub use parse::{DeckEntry, card_count, load_decklist, parse_decklist};
pub use resolve::{IMAGE_EXTENSIONS, ImageDirectory, Resolution, resolve_deck, safe_name};
