//! Layout data types for card sheets
//!
//! These types represent the intermediate layout calculations between
//! grouping the card list and rendering PDF pages.

/// Which physical side of the printed sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetSide {
    /// Card faces (printed first in duplex)
    Front,
    /// Card backs, mirrored per row
    Back,
}

/// Position within the grid (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    /// Row index (0 = top row)
    pub row: usize,
    /// Column index (0 = leftmost column)
    pub col: usize,
}

impl GridPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A rectangular area in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge y coordinate
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Center x coordinate
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Center y coordinate
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// Page and grid geometry shared by every page of one document.
///
/// All values are in points. `margin` is the same on the left, right and top
/// edge; vertical leftover space goes into `gap` between rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub card_width: f32,
    pub card_height: f32,
    pub columns: usize,
    pub rows: usize,
    pub margin: f32,
    pub gap: f32,
}

impl PageGeometry {
    /// Cards per page
    pub fn capacity(&self) -> usize {
        self.columns * self.rows
    }

    /// Width of the card grid
    pub fn grid_width(&self) -> f32 {
        self.columns as f32 * self.card_width
    }

    /// Height of the card grid, gaps included
    pub fn grid_height(&self) -> f32 {
        self.rows as f32 * self.card_height + self.rows.saturating_sub(1) as f32 * self.gap
    }

    /// Bounds of the whole grid. The grid hangs from the top margin.
    pub fn grid_bounds(&self) -> Rect {
        let height = self.grid_height();
        Rect::new(
            self.margin,
            self.page_height - self.margin - height,
            self.grid_width(),
            height,
        )
    }

    /// Bottom-left origin of a cell. Row 0 is the top row.
    pub fn cell_origin(&self, pos: GridPosition) -> (f32, f32) {
        let x = self.margin + pos.col as f32 * self.card_width;
        let y = self.page_height
            - self.margin
            - (pos.row + 1) as f32 * self.card_height
            - pos.row as f32 * self.gap;
        (x, y)
    }

    /// Bounds of a cell
    pub fn cell_rect(&self, pos: GridPosition) -> Rect {
        let (x, y) = self.cell_origin(pos);
        Rect::new(x, y, self.card_width, self.card_height)
    }

    /// Column a front-side column lands in on the back side
    pub fn mirrored_col(&self, col: usize) -> usize {
        self.columns - 1 - col
    }

    /// Grid position of the n-th card of a group, row-major from the top left
    pub fn position_of(&self, index: usize) -> GridPosition {
        GridPosition::new(index / self.columns, index % self.columns)
    }
}

/// A card's cell on one side of a sheet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardSlot {
    /// Index of the card within its group
    pub card_index: usize,
    /// Cell position on this side
    pub position: GridPosition,
    /// Cell bounds in points
    pub cell: Rect,
}

/// Where an image is drawn inside its cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    /// Rectangle the image is scaled into
    pub draw: Rect,
    /// Clip rectangle when the image overflows the cell
    pub clip: Option<Rect>,
}
