//! Slope and aspect from DEMs
//!
//! Both attributes come from the same Horn (1981) gradient, so they are
//! computed in one pass. Slope is in degrees from horizontal, aspect is the
//! compass bearing of steepest descent.

use super::gradient::HornGradient;
use crate::maybe_rayon::map_cells;
use serde::{Deserialize, Serialize};
use terrashade_core::{Algorithm, ElevationGrid, Error, Result, ScalarGrid};
use tracing::debug;

/// Parameters for slope/aspect calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlopeParams {
    /// Vertical exaggeration applied to elevations (default 1.0)
    pub z_factor: f64,
}

impl Default for SlopeParams {
    fn default() -> Self {
        Self { z_factor: 1.0 }
    }
}

impl SlopeParams {
    pub fn validate(&self) -> Result<()> {
        validate_z_factor(self.z_factor)
    }
}

pub(crate) fn validate_z_factor(z_factor: f64) -> Result<()> {
    if !(z_factor.is_finite() && z_factor > 0.0) {
        return Err(Error::config("z_factor", z_factor, "must be finite and > 0"));
    }
    Ok(())
}

pub(crate) fn validate_cell_size(dem: &ElevationGrid) -> Result<f64> {
    let cell_size = dem.cell_size();
    if !(cell_size.is_finite() && cell_size > 0.0) {
        return Err(Error::config("cell_size", cell_size, "must be finite and > 0"));
    }
    Ok(cell_size)
}

/// Slope and aspect grids derived from one DEM
#[derive(Debug, Clone, PartialEq)]
pub struct SlopeAspectGrids {
    /// Degrees from horizontal, [0, 90]
    pub slope: ScalarGrid,
    /// Compass degrees in [0, 360), or [`FLAT_ASPECT`](super::FLAT_ASPECT)
    pub aspect: ScalarGrid,
}

/// Slope/aspect algorithm
#[derive(Debug, Clone, Default)]
pub struct SlopeAspect;

impl Algorithm for SlopeAspect {
    type Input = ElevationGrid;
    type Output = SlopeAspectGrids;
    type Params = SlopeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "SlopeAspect"
    }

    fn description(&self) -> &'static str {
        "Slope (degrees) and aspect (compass degrees) from a DEM using Horn's method"
    }

    fn execute(&self, input: &Self::Input, params: Self::Params) -> Result<Self::Output> {
        slope_aspect(input, params)
    }
}

/// Calculate slope and aspect from a DEM.
///
/// Border cells and cells with any missing neighbor are missing in both
/// outputs; a partial neighborhood is never used. Flat interior cells get
/// slope 0 and aspect [`FLAT_ASPECT`](super::FLAT_ASPECT).
pub fn slope_aspect(dem: &ElevationGrid, params: SlopeParams) -> Result<SlopeAspectGrids> {
    params.validate()?;
    let cell_size = validate_cell_size(dem)?;
    let (rows, cols) = dem.shape();

    let cells = map_cells(rows, cols, (None, None), |row, col| {
        match dem.window(row, col) {
            Some(w) => {
                let g = HornGradient::from_window(&w, cell_size, params.z_factor);
                (Some(g.slope_degrees()), Some(g.aspect_degrees()))
            }
            None => (None, None),
        }
    });
    let (slope, aspect): (Vec<_>, Vec<_>) = cells.into_iter().unzip();
    debug!(rows, cols, cell_size, z_factor = params.z_factor, "slope and aspect computed");

    Ok(SlopeAspectGrids {
        slope: dem.derive(slope)?,
        aspect: dem.derive(aspect)?,
    })
}

/// Slope alone, in degrees
pub fn slope(dem: &ElevationGrid, params: SlopeParams) -> Result<ScalarGrid> {
    slope_aspect(dem, params).map(|grids| grids.slope)
}

/// Aspect alone, in compass degrees
pub fn aspect(dem: &ElevationGrid, params: SlopeParams) -> Result<ScalarGrid> {
    slope_aspect(dem, params).map(|grids| grids.aspect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::FLAT_ASPECT;
    use approx::assert_relative_eq;
    use terrashade_core::Grid;

    fn plane(rows: usize, cols: usize, f: impl Fn(usize, usize) -> f64) -> ElevationGrid {
        let data = (0..rows * cols).map(|k| f(k / cols, k % cols)).collect();
        Grid::from_vec(data, rows, cols).unwrap().with_cell_size(1.0)
    }

    #[test]
    fn test_flat_grid() {
        let dem: ElevationGrid = Grid::filled(10, 10, 100.0).with_cell_size(1.0);
        let result = slope_aspect(&dem, SlopeParams::default()).unwrap();

        for row in 1..9 {
            for col in 1..9 {
                assert_eq!(result.slope.value(row, col), Some(0.0));
                assert_eq!(result.aspect.value(row, col), Some(FLAT_ASPECT));
            }
        }
    }

    #[test]
    fn test_tilted_plane() {
        // z = x
        let dem = plane(6, 7, |_, c| c as f64);
        let result = slope_aspect(&dem, SlopeParams::default()).unwrap();

        for row in 1..5 {
            for col in 1..6 {
                assert_relative_eq!(result.slope.value(row, col).unwrap(), 45.0, epsilon = 1e-9);
                assert_relative_eq!(result.aspect.value(row, col).unwrap(), 270.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_borders_are_missing() {
        let dem = plane(5, 5, |r, c| (r * 3 + c) as f64);
        let result = slope_aspect(&dem, SlopeParams::default()).unwrap();

        for k in 0..5 {
            for (r, c) in [(0, k), (4, k), (k, 0), (k, 4)] {
                assert_eq!(result.slope.value(r, c), None, "slope ({r},{c})");
                assert_eq!(result.aspect.value(r, c), None, "aspect ({r},{c})");
            }
        }
        assert!(result.slope.value(2, 2).is_some());
    }

    #[test]
    fn test_missing_neighbor_propagates() {
        let mut dem = plane(7, 7, |r, c| (r + c) as f64);
        dem.set(3, 3, None).unwrap();
        let result = slope_aspect(&dem, SlopeParams::default()).unwrap();

        for r in 2..=4 {
            for c in 2..=4 {
                assert_eq!(result.slope.value(r, c), None, "({r},{c})");
                assert_eq!(result.aspect.value(r, c), None, "({r},{c})");
            }
        }
        assert!(result.slope.value(1, 1).is_some());
        assert!(result.slope.value(5, 5).is_some());
    }

    #[test]
    fn test_value_ranges() {
        let dem = plane(20, 20, |r, c| {
            let (x, y) = (c as f64 * 0.7, r as f64 * 0.4);
            50.0 * (x.sin() * y.cos()) + 3.0 * x * y
        });
        let result = slope_aspect(&dem, SlopeParams::default()).unwrap();

        for s in result.slope.valid_values() {
            assert!((0.0..=90.0).contains(&s), "slope {s}");
        }
        for a in result.aspect.valid_values() {
            assert!(a == FLAT_ASPECT || (0.0..360.0).contains(&a), "aspect {a}");
        }
    }

    #[test]
    fn test_shape_and_transform_preserved() {
        let dem = plane(4, 6, |r, c| (r * c) as f64).with_cell_size(30.0);
        let result = slope_aspect(&dem, SlopeParams::default()).unwrap();
        assert_eq!(result.slope.shape(), (4, 6));
        assert_eq!(result.aspect.transform(), dem.transform());
    }

    #[test]
    fn test_bad_z_factor() {
        let dem = plane(3, 3, |_, _| 0.0);
        let err = slope(&dem, SlopeParams { z_factor: 0.0 }).unwrap_err();
        assert!(matches!(err, Error::Config { name: "z_factor", .. }));
    }

    #[test]
    fn test_algorithm_trait() {
        let dem = plane(3, 3, |_, c| c as f64);
        let out = SlopeAspect.execute_default(&dem).unwrap();
        assert_relative_eq!(out.slope.value(1, 1).unwrap(), 45.0, epsilon = 1e-9);
        assert_eq!(SlopeAspect.name(), "SlopeAspect");
    }
}
