//! Fixed 28x28 intensity grid

/// Side length of the MNIST grid
pub const GRID_SIZE: usize = 28;

/// Number of cells in the grid (and values in an exported vector)
pub const PIXEL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// Drawing buffer
///
/// Each cell holds an ink intensity in `0..=255`, 0 being background.
/// Storage is a fixed array so the grid can never be resized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: [[u8; GRID_SIZE]; GRID_SIZE],
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    /// Create an all-zero grid
    pub fn new() -> Self {
        Self {
            cells: [[0; GRID_SIZE]; GRID_SIZE],
        }
    }

    /// Get the intensity at a cell
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Merge an intensity into a cell, keeping the brighter of the two
    ///
    /// Returns the value now stored, or `None` if the cell is out of range.
    #[inline]
    pub fn merge_max(&mut self, row: usize, col: usize, intensity: u8) -> Option<u8> {
        let cell = self.cells.get_mut(row)?.get_mut(col)?;
        *cell = (*cell).max(intensity);
        Some(*cell)
    }

    /// Reset every cell to 0
    pub fn clear(&mut self) {
        self.cells = [[0; GRID_SIZE]; GRID_SIZE];
    }

    /// True when no cell holds any ink
    pub fn is_blank(&self) -> bool {
        self.cells.iter().flatten().all(|&v| v == 0)
    }

    /// Rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[u8; GRID_SIZE]> {
        self.cells.iter()
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = u8> + '_ {
        self.cells.iter().flatten().copied()
    }

    /// Number of cells with non-zero intensity
    pub fn inked_cells(&self) -> usize {
        self.cells().filter(|&v| v > 0).count()
    }
}
