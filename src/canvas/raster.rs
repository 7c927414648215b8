//! Pointer-to-cell mapping and the radial brush
//!
//! A pointer position is mapped to the grid cell under it, then the distance
//! from the cell's center decides how much ink lands there:
//!
//! ```text
//!   corner ──────────── center ──────────── corner
//!     0        ...        255       ...        0
//! ```

use super::grid::{Grid, GRID_SIZE};

/// A position in the drawing surface's coordinate space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding box of the drawable area, in the same space as [`Point`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Surface {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Size of one grid cell on this surface
    #[inline]
    pub fn cell_size(&self) -> (f64, f64) {
        (
            self.width / GRID_SIZE as f64,
            self.height / GRID_SIZE as f64,
        )
    }

    /// A surface with no area (or NaN extents) cannot be drawn on
    #[inline]
    pub fn is_drawable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// True when the point lies within `[left, left + width) x [top, top + height)`
    pub fn contains(&self, point: Point) -> bool {
        let x = point.x - self.left;
        let y = point.y - self.top;
        self.is_drawable() && (0.0..self.width).contains(&x) && (0.0..self.height).contains(&y)
    }
}

/// Where a point landed: the cell and the offset inside it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelCoordinate {
    pub row: usize,
    pub col: usize,
    /// Offset from the cell's left edge
    pub local_x: f64,
    /// Offset from the cell's top edge
    pub local_y: f64,
    pub cell_width: f64,
    pub cell_height: f64,
}

impl PixelCoordinate {
    /// Brush intensity for this offset
    #[inline]
    pub fn intensity(&self) -> u8 {
        intensity(self.local_x, self.local_y, self.cell_width, self.cell_height)
    }
}

/// Result of a single paint event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stroke {
    pub row: usize,
    pub col: usize,
    /// Intensity the brush produced at this point
    pub intensity: u8,
    /// Value stored in the cell after merging
    pub stored: u8,
}

/// Map a point to the grid cell under it
///
/// Points outside the surface are rejected. Float rounding right at the far
/// edge can produce an index of 28; that is rejected too.
pub fn locate(surface: &Surface, point: Point) -> Option<PixelCoordinate> {
    if !surface.contains(point) {
        return None;
    }

    let x = point.x - surface.left;
    let y = point.y - surface.top;
    let (cell_width, cell_height) = surface.cell_size();

    let col = (x / cell_width).floor() as usize;
    let row = (y / cell_height).floor() as usize;
    if row >= GRID_SIZE || col >= GRID_SIZE {
        return None;
    }

    Some(PixelCoordinate {
        row,
        col,
        local_x: x % cell_width,
        local_y: y % cell_height,
        cell_width,
        cell_height,
    })
}

/// Radial falloff: 255 at the cell center, 0 at (and beyond) the corners
pub fn intensity(local_x: f64, local_y: f64, cell_width: f64, cell_height: f64) -> u8 {
    let center_x = cell_width / 2.0;
    let center_y = cell_height / 2.0;
    let distance = (local_x - center_x).hypot(local_y - center_y);
    let max_distance = center_x.hypot(center_y);
    if max_distance <= 0.0 {
        return 0;
    }

    let strength = (1.0 - distance / max_distance).max(0.0);
    (strength * 255.0).round().min(255.0) as u8
}

/// Paint one pointer event onto the grid
///
/// Exactly one cell changes at most, and only ever gets brighter.
pub fn paint(grid: &mut Grid, surface: &Surface, point: Point) -> Option<Stroke> {
    let pixel = locate(surface, point)?;
    let intensity = pixel.intensity();
    let stored = grid.merge_max(pixel.row, pixel.col, intensity)?;

    Some(Stroke {
        row: pixel.row,
        col: pixel.col,
        intensity,
        stored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // 10x10 units per cell keeps the arithmetic exact
    const SURFACE: Surface = Surface::new(100.0, 50.0, 280.0, 280.0);

    fn cell_center(row: usize, col: usize) -> Point {
        Point::new(
            SURFACE.left + col as f64 * 10.0 + 5.0,
            SURFACE.top + row as f64 * 10.0 + 5.0,
        )
    }

    #[rstest]
    #[case(0, 0)]
    #[case(13, 14)]
    #[case(27, 27)]
    #[case(0, 27)]
    fn test_center_paints_full_intensity(#[case] row: usize, #[case] col: usize) {
        let mut grid = Grid::new();
        let stroke = paint(&mut grid, &SURFACE, cell_center(row, col)).unwrap();
        assert_eq!((stroke.row, stroke.col), (row, col));
        assert_eq!(stroke.intensity, 255);
        assert_eq!(grid.get(row, col), Some(255));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(5, 9)]
    #[case(27, 27)]
    fn test_corner_paints_nothing(#[case] row: usize, #[case] col: usize) {
        let mut grid = Grid::new();
        let corner = Point::new(
            SURFACE.left + col as f64 * 10.0,
            SURFACE.top + row as f64 * 10.0,
        );
        let stroke = paint(&mut grid, &SURFACE, corner).unwrap();
        assert_eq!((stroke.row, stroke.col), (row, col));
        assert_eq!(stroke.intensity, 0);
        assert!(grid.is_blank());
    }

    #[test]
    fn test_intensity_boundaries() {
        assert_eq!(intensity(5.0, 5.0, 10.0, 10.0), 255);
        assert_eq!(intensity(0.0, 0.0, 10.0, 10.0), 0);
        assert_eq!(intensity(10.0, 10.0, 10.0, 10.0), 0);
        assert_eq!(intensity(0.0, 0.0, 0.0, 0.0), 0);
    }

    #[test]
    fn test_intensity_decreases_away_from_center() {
        let mut previous = 255;
        for step in 0..=5 {
            let offset = 5.0 - f64::from(step);
            let value = intensity(offset, offset, 10.0, 10.0);
            assert!(value <= previous);
            previous = value;
        }
    }

    #[test]
    fn test_intensity_on_non_square_cells() {
        assert_eq!(intensity(1.5, 0.5, 3.0, 1.0), 255);
        assert_eq!(intensity(0.0, 1.0, 3.0, 1.0), 0);
    }

    #[rstest]
    #[case(Point::new(99.9, 60.0))]
    #[case(Point::new(150.0, 49.0))]
    #[case(Point::new(380.0, 60.0))]
    #[case(Point::new(150.0, 330.0))]
    #[case(Point::new(f64::NAN, 60.0))]
    fn test_outside_points_are_rejected(#[case] point: Point) {
        let mut grid = Grid::new();
        assert!(locate(&SURFACE, point).is_none());
        assert!(paint(&mut grid, &SURFACE, point).is_none());
        assert!(grid.is_blank());
    }

    #[test]
    fn test_degenerate_surface_is_rejected() {
        let flat = Surface::new(0.0, 0.0, 0.0, 280.0);
        assert!(locate(&flat, Point::new(0.0, 10.0)).is_none());
    }

    #[test]
    fn test_local_offset_is_remainder() {
        let pixel = locate(&SURFACE, Point::new(100.0 + 37.5, 50.0 + 2.25)).unwrap();
        assert_eq!((pixel.row, pixel.col), (0, 3));
        assert!((pixel.local_x - 7.5).abs() < 1e-9);
        assert!((pixel.local_y - 2.25).abs() < 1e-9);
        assert!((pixel.cell_width - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_paint_never_darkens() {
        let mut grid = Grid::new();
        let center = cell_center(4, 4);
        let edge = Point::new(center.x + 4.0, center.y + 4.0);

        paint(&mut grid, &SURFACE, center);
        let stroke = paint(&mut grid, &SURFACE, edge).unwrap();
        assert!(stroke.intensity < 255);
        assert_eq!(stroke.stored, 255);
        assert_eq!(grid.get(4, 4), Some(255));
    }
}
