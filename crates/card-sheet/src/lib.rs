pub mod assemble;
pub mod constants;
pub mod deck;
pub mod layout;
pub mod manifest;
pub mod marks;
mod options;
pub mod render;
mod stats;
mod types;

pub use assemble::{
    DocumentState, NoopObserver, PageEvent, SheetDocument, SheetObserver, build_document,
    generate_pdf, generate_pdf_with_observer, write_pdf_atomic,
};
pub use layout::{PageGeometry, SheetSide, compute_geometry, group_cards};
pub use manifest::load_manifest;
pub use options::*;
pub use render::ImageFailure;
pub use stats::calculate_statistics;
pub use types::*;
