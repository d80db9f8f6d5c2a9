use crate::constants::*;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the number of columns and rows is chosen
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GridPolicy {
    /// Fixed grid; fails if it does not fit the page
    Fixed { columns: usize, rows: usize },
    /// As many cards as fit, keeping at least `min_margin_mm` around the grid
    FitToPage { min_margin_mm: f32 },
}

impl Default for GridPolicy {
    fn default() -> Self {
        GridPolicy::Fixed {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
        }
    }
}

/// How a card image is scaled into its cell. Aspect ratio is always kept.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ImageFit {
    /// Whole image visible, centered, letterboxed on the short side
    #[default]
    Contain,
    /// Cell fully covered, overflow clipped to the cell
    Cover,
}

/// Crop mark appearance
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CropMarkStyle {
    /// Draw crop marks at all
    pub enabled: bool,
    /// Distance between the grid edge and the start of a mark (points)
    pub offset_pt: f32,
    /// Mark length (points)
    pub length_pt: f32,
    /// Stroke width (points)
    pub line_width_pt: f32,
    /// Stroke gray level, 0 = black, 1 = white
    pub gray: f32,
}

impl Default for CropMarkStyle {
    fn default() -> Self {
        Self {
            enabled: true,
            offset_pt: CROP_MARK_GAP,
            length_pt: CROP_MARK_LENGTH,
            line_width_pt: CROP_MARK_WIDTH,
            gray: CROP_MARK_GRAY,
        }
    }
}

/// Card sheet configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SheetOptions {
    // Output page
    pub paper_size: PaperSize,
    pub orientation: Orientation,

    // Card size before scaling
    pub card_width_mm: f32,
    pub card_height_mm: f32,
    /// Uniform scale applied to the card size, e.g. 1.02 for 2% bleed
    pub scale: f32,

    pub grid: GridPolicy,
    pub image_fit: ImageFit,
    pub crop_marks: CropMarkStyle,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            orientation: Orientation::Portrait,
            card_width_mm: DEFAULT_CARD_WIDTH_MM,
            card_height_mm: DEFAULT_CARD_HEIGHT_MM,
            scale: 1.0,
            grid: GridPolicy::default(),
            image_fit: ImageFit::Contain,
            crop_marks: CropMarkStyle::default(),
        }
    }
}

impl SheetOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| SheetError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SheetError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Page size in points with orientation applied
    pub fn page_size_pt(&self) -> (f32, f32) {
        let (w, h) = self.paper_size.dimensions_with_orientation(self.orientation);
        (mm_to_pt(w), mm_to_pt(h))
    }

    /// Card cell size in points, scale included
    pub fn card_size_pt(&self) -> (f32, f32) {
        (
            mm_to_pt(self.card_width_mm) * self.scale,
            mm_to_pt(self.card_height_mm) * self.scale,
        )
    }

    /// Validate the options.
    ///
    /// This only checks the values on their own; whether the grid fits the
    /// page is decided by [`crate::compute_geometry`].
    pub fn validate(&self) -> Result<()> {
        let (page_w, page_h) = self.paper_size.dimensions_mm();
        if !(page_w > 0.0 && page_h > 0.0) {
            return Err(SheetError::Config(format!(
                "Page size must be positive, got {} x {} mm",
                page_w, page_h
            )));
        }

        if !(self.card_width_mm > 0.0 && self.card_height_mm > 0.0) {
            return Err(SheetError::Config(format!(
                "Card size must be positive, got {} x {} mm",
                self.card_width_mm, self.card_height_mm
            )));
        }

        if !(self.scale > 0.0 && self.scale.is_finite()) {
            return Err(SheetError::Config(format!(
                "Scale must be positive, got {}",
                self.scale
            )));
        }

        match self.grid {
            GridPolicy::Fixed { columns, rows } => {
                if columns == 0 || rows == 0 {
                    return Err(SheetError::Config(format!(
                        "Grid must have at least one column and row, got {}x{}",
                        columns, rows
                    )));
                }
            }
            GridPolicy::FitToPage { min_margin_mm } => {
                if !(min_margin_mm >= 0.0) {
                    return Err(SheetError::Config(format!(
                        "Minimum margin must not be negative, got {} mm",
                        min_margin_mm
                    )));
                }
            }
        }

        let marks = &self.crop_marks;
        if marks.enabled
            && (marks.offset_pt < 0.0 || marks.length_pt <= 0.0 || marks.line_width_pt <= 0.0)
        {
            return Err(SheetError::Config(
                "Crop marks need a non-negative offset and positive length and width".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&marks.gray) {
            return Err(SheetError::Config(format!(
                "Crop mark gray must be within 0..=1, got {}",
                marks.gray
            )));
        }

        Ok(())
    }
}
