use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Illegal document state: {0}")]
    IllegalState(String),
    #[error("Image error for {image}: {message}")]
    Image { image: String, message: String },
    #[error("Manifest line {line}: {message}")]
    Manifest { line: usize, message: String },
    #[error("Decklist line {line}: {message}")]
    Deck { line: usize, message: String },
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SheetError>;

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Portrait: height > width (default for most paper sizes)
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaperSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// Get base dimensions (always portrait: width < height for standard sizes)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Tabloid => (279.4, 431.8),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// A readable image handle, already resolved by whoever built the card list.
///
/// Two equal refs are embedded into the output only once, which is what keeps
/// a shared card back from being duplicated on every page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageRef {
    /// Image file on disk
    Path(PathBuf),
    /// Image bytes already in memory, identified by name
    Memory { name: String, bytes: Arc<Vec<u8>> },
}

impl ImageRef {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        ImageRef::Path(path.into())
    }

    pub fn memory(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        ImageRef::Memory {
            name: name.into(),
            bytes: Arc::new(bytes),
        }
    }

    /// Path of a file-backed image
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ImageRef::Path(path) => Some(path),
            ImageRef::Memory { .. } => None,
        }
    }

    /// Read the encoded image bytes
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            ImageRef::Path(path) => Ok(std::fs::read(path)?),
            ImageRef::Memory { bytes, .. } => Ok(bytes.as_ref().clone()),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::Path(path) => write!(f, "{}", path.display()),
            ImageRef::Memory { name, .. } => write!(f, "<{}>", name),
        }
    }
}

/// One physical card: its face and the image printed behind it.
///
/// `back` is either the shared default back or a per-card back for
/// double-faced cards; the layout engine treats both the same.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardImagePair {
    pub front: ImageRef,
    pub back: ImageRef,
}

impl CardImagePair {
    pub fn new(front: ImageRef, back: ImageRef) -> Self {
        Self { front, back }
    }
}

/// Statistics about a card sheet build
#[derive(Debug, Clone, PartialEq)]
pub struct SheetStatistics {
    /// Total number of cards (quantities expanded)
    pub cards: usize,
    /// Cards per page
    pub capacity: usize,
    /// Number of page groups (physical sheets)
    pub groups: usize,
    /// Output page count (front and back per group)
    pub output_pages: usize,
    /// Cards on the final sheet (0 when there are no cards)
    pub last_group_size: usize,
    /// Unused cells on the final sheet
    pub empty_slots: usize,
}
