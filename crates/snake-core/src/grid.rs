use serde::{Deserialize, Serialize};

/// A discrete grid coordinate. Signed so that a step off the edge is representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step along `(dx, dy)`.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Pixel rectangle covered by a cell on the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Square playfield of `tile_count * tile_count` cells drawn on a
/// `canvas_size`-pixel canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridDims")]
pub struct Grid {
    canvas_size: u32,
    cell_size: u32,
}

/// Unchecked wire form of [`Grid`].
#[derive(Deserialize)]
struct GridDims {
    canvas_size: u32,
    cell_size: u32,
}

impl TryFrom<GridDims> for Grid {
    type Error = &'static str;

    fn try_from(dims: GridDims) -> Result<Self, Self::Error> {
        if dims.cell_size == 0 {
            return Err("cell_size must be positive");
        }
        Ok(Self::new(dims.canvas_size, dims.cell_size))
    }
}

impl Grid {
    /// Panics if `cell_size` is zero; configs are validated before reaching here.
    pub fn new(canvas_size: u32, cell_size: u32) -> Self {
        assert!(cell_size > 0, "cell size must be positive");
        Self {
            canvas_size,
            cell_size,
        }
    }

    pub fn canvas_size(&self) -> u32 {
        self.canvas_size
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Number of cells along each axis.
    pub fn tile_count(&self) -> i32 {
        (self.canvas_size / self.cell_size) as i32
    }

    /// Total number of cells on the grid.
    pub fn cell_count(&self) -> usize {
        let n = self.tile_count() as usize;
        n * n
    }

    /// Whether `cell` lies within `[0, tile_count)` on both axes.
    pub fn contains(&self, cell: Cell) -> bool {
        let n = self.tile_count();
        (0..n).contains(&cell.x) && (0..n).contains(&cell.y)
    }

    /// Pixel region occupied by `cell`.
    pub fn cell_rect(&self, cell: Cell) -> PixelRect {
        let size = self.cell_size as f32;
        PixelRect {
            x: cell.x as f32 * size,
            y: cell.y as f32 * size,
            width: size,
            height: size,
        }
    }

    /// Iterate every cell on the grid, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + use<> {
        let n = self.tile_count();
        (0..n).flat_map(move |y| (0..n).map(move |x| Cell::new(x, y)))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(400, 20)
    }
}
