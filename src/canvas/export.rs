//! MNIST export: grid -> 784 normalized values

use serde::{Deserialize, Serialize};

use super::grid::{Grid, PIXEL_COUNT};
use crate::errors::CanvasError;

/// Row-major snapshot of a grid, each value in `[0, 1]` with at most 3 decimals
///
/// Always exactly [`PIXEL_COUNT`] long. Serializes as a bare JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct PixelVector(Vec<f64>);

impl PixelVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true; kept for clippy's `len_without_is_empty`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of non-zero entries
    pub fn inked(&self) -> usize {
        self.0.iter().filter(|&&v| v > 0.0).count()
    }

    /// Comma separated rendering, as shown in the pixel panel
    pub fn to_display_string(&self) -> String {
        let values: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        format!("[{}]", values.join(", "))
    }
}

impl TryFrom<Vec<f64>> for PixelVector {
    type Error = CanvasError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        if values.len() != PIXEL_COUNT {
            return Err(CanvasError::InvalidPixels(format!(
                "expected {} values, got {}",
                PIXEL_COUNT,
                values.len()
            )));
        }
        if let Some((index, value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            return Err(CanvasError::InvalidPixels(format!(
                "value {value} at index {index} is outside [0, 1]"
            )));
        }
        Ok(Self(values))
    }
}

impl From<PixelVector> for Vec<f64> {
    fn from(vector: PixelVector) -> Self {
        vector.0
    }
}

/// Round to 3 decimal places
#[inline]
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Flatten and normalize the grid
pub fn extract(grid: &Grid) -> PixelVector {
    PixelVector(
        grid.cells()
            .map(|v| round3(f64::from(v) / 255.0))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::grid::GRID_SIZE;

    fn has_at_most_three_decimals(value: f64) -> bool {
        (round3(value) - value).abs() < f64::EPSILON
    }

    #[test]
    fn test_empty_grid_exports_zeros() {
        let pixels = extract(&Grid::new());
        assert_eq!(pixels.len(), PIXEL_COUNT);
        assert!(pixels.iter().all(|v| v == 0.0));
        assert_eq!(pixels.inked(), 0);
    }

    #[test]
    fn test_every_intensity_normalizes_cleanly() {
        let mut grid = Grid::new();
        for intensity in 0..=255u8 {
            let index = usize::from(intensity);
            grid.merge_max(index / GRID_SIZE, index % GRID_SIZE, intensity);
        }
        let pixels = extract(&grid);
        assert_eq!(pixels.len(), PIXEL_COUNT);
        for value in pixels.iter() {
            assert!((0.0..=1.0).contains(&value));
            assert!(has_at_most_three_decimals(value), "{value}");
        }
        assert_eq!(pixels.as_slice()[255], 1.0);
        assert_eq!(pixels.as_slice()[128], 0.502);
    }

    #[test]
    fn test_row_major_order() {
        let mut grid = Grid::new();
        grid.merge_max(1, 2, 255);
        let pixels = extract(&grid);
        assert_eq!(pixels.as_slice()[GRID_SIZE + 2], 1.0);
        assert_eq!(pixels.inked(), 1);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let json = serde_json::to_value(extract(&Grid::new())).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(PIXEL_COUNT));
    }

    #[test]
    fn test_try_from_rejects_bad_shape() {
        assert!(PixelVector::try_from(vec![0.0; 10]).is_err());

        let mut values = vec![0.0; PIXEL_COUNT];
        values[7] = 1.5;
        let err = PixelVector::try_from(values).unwrap_err();
        assert!(err.to_string().contains("index 7"));

        assert!(PixelVector::try_from(vec![0.25; PIXEL_COUNT]).is_ok());
    }

    #[test]
    fn test_display_string() {
        let text = extract(&Grid::new()).to_display_string();
        assert!(text.starts_with("[0, 0"));
        assert!(text.ends_with("0]"));
    }
}
