//! # Canvas - 28x28 drawing core
//!
//! ```text
//!   pointer event ──► raster::paint ──► Grid (u8 intensities)
//!                                          │
//!                                          ▼
//!                                  export::extract ──► PixelVector (784 x f64)
//! ```

mod export;
mod grid;
mod raster;

pub use export::{extract, PixelVector};
pub use grid::{Grid, GRID_SIZE, PIXEL_COUNT};
pub use raster::{intensity, locate, paint, PixelCoordinate, Point, Stroke, Surface};
