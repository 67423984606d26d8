use bevy::prelude::*;
use fixedbitset::FixedBitSet;

/// Level symbols that make a cell impassable: crystals, trees, walls,
/// player castle and AI castle.
pub const BLOCKING_SYMBOLS: [char; 5] = ['C', 'T', 'W', 'P', 'X'];

pub fn is_blocking_symbol(symbol: char) -> bool {
    BLOCKING_SYMBOLS.contains(&symbol)
}

/// Static per-cell passability map for the battlefield.
///
/// Built once from the level rows and read-only afterwards. An unloaded grid
/// has zero size, so every query against it reports "not accessible".
///
/// Passable cells are stored as set bits in a row-major [`FixedBitSet`].
#[derive(Resource, Default, Clone, Debug)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    passable: FixedBitSet,
}

impl OccupancyGrid {
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Self {
        let mut grid = Self::default();
        grid.load(rows);
        grid
    }

    /// Build the grid from row-major level symbols.
    ///
    /// The width is taken from the first row. Cells missing from a shorter row
    /// stay impassable; extra symbols in a longer row are ignored. Loading an
    /// already loaded grid is a no-op.
    pub fn load<S: AsRef<str>>(&mut self, rows: &[S]) {
        if self.is_loaded() {
            warn!(
                "[GRID] Ignoring second load of an already loaded {}x{} occupancy grid",
                self.width, self.height
            );
            return;
        }

        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().chars().count());
        let mut passable = FixedBitSet::with_capacity(width * height);

        for (y, row) in rows.iter().enumerate() {
            for (x, symbol) in row.as_ref().chars().take(width).enumerate() {
                if !is_blocking_symbol(symbol) {
                    passable.insert(y * width + x);
                }
            }
        }

        self.width = width;
        self.height = height;
        self.passable = passable;

        info!(
            "[GRID] Loaded {}x{} occupancy grid ({} passable cells)",
            width,
            height,
            self.passable.count_ones(..)
        );
    }

    pub fn is_loaded(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether an agent may stand on cell `(x, y)`. Out of bounds is never accessible.
    pub fn is_accessible(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return false;
        }
        self.passable.contains(y * self.width + x)
    }
}

/// Mapping between screen pixels and grid cells.
///
/// The top `playfield_offset_y` pixels of the screen belong to the UI, so grid
/// row 0 starts that far down. Cells are addressed by their top-left pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    pub cell_size: i32,
    pub playfield_offset_y: i32,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            cell_size: 16,
            playfield_offset_y: 88,
        }
    }
}

impl GridGeometry {
    /// Cell containing a pixel. Pixels above the playfield map to negative rows.
    pub fn pixel_to_cell(&self, pixel: Vec2) -> IVec2 {
        let size = self.cell_size as f32;
        IVec2::new(
            (pixel.x / size).floor() as i32,
            ((pixel.y - self.playfield_offset_y as f32) / size).floor() as i32,
        )
    }

    /// Top-left pixel of a cell.
    pub fn cell_to_pixel(&self, cell: IVec2) -> Vec2 {
        Vec2::new(
            (cell.x * self.cell_size) as f32,
            (cell.y * self.cell_size + self.playfield_offset_y) as f32,
        )
    }

    /// Snap a pixel position to the nearest cell boundary on both axes.
    pub fn snap_to_cell(&self, pixel: IVec2) -> IVec2 {
        IVec2::new(
            snap_axis(pixel.x, 0, self.cell_size),
            snap_axis(pixel.y, self.playfield_offset_y, self.cell_size),
        )
    }
}

fn snap_axis(value: i32, origin: i32, cell_size: i32) -> i32 {
    let rem = (value - origin).rem_euclid(cell_size);
    if rem == 0 {
        value
    } else if rem * 2 >= cell_size {
        value + (cell_size - rem)
    } else {
        value - rem
    }
}
