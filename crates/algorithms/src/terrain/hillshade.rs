//! Hillshade (shaded relief) calculation
//!
//! Lambertian reflectance of each cell for a light source at `azimuth`
//! (compass degrees) and `altitude` (degrees above the horizon):
//!
//! ```text
//! zenith = 90 - altitude
//! illum  = cos(zenith) * cos(slope) + sin(zenith) * sin(slope) * cos(azimuth - aspect)
//! ```
//!
//! Azimuth and aspect are both compass bearings, so their difference needs no
//! conversion to math angles.

use super::gradient::HornGradient;
use super::slope::{validate_cell_size, validate_z_factor};
use crate::maybe_rayon::map_cells;
use serde::{Deserialize, Serialize};
use terrashade_core::{Algorithm, ElevationGrid, Error, Result, ScalarGrid};
use tracing::debug;

/// Parameters for hillshade calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HillshadeParams {
    /// Light azimuth in degrees, [0, 360), 0 = north, clockwise
    pub azimuth: f64,
    /// Light altitude in degrees above the horizon, [0, 90]
    pub altitude: f64,
    /// Vertical exaggeration
    pub z_factor: f64,
}

impl Default for HillshadeParams {
    fn default() -> Self {
        Self {
            azimuth: 315.0, // NW illumination (standard)
            altitude: 45.0,
            z_factor: 1.0,
        }
    }
}

impl HillshadeParams {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..360.0).contains(&self.azimuth) {
            return Err(Error::config("azimuth", self.azimuth, "must be in [0, 360)"));
        }
        if !(0.0..=90.0).contains(&self.altitude) {
            return Err(Error::config("altitude", self.altitude, "must be in [0, 90]"));
        }
        validate_z_factor(self.z_factor)
    }
}

/// Hillshade algorithm
#[derive(Debug, Clone, Default)]
pub struct Hillshade;

impl Algorithm for Hillshade {
    type Input = ElevationGrid;
    type Output = ScalarGrid;
    type Params = HillshadeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Hillshade"
    }

    fn description(&self) -> &'static str {
        "Shaded relief in [0, 1] from a DEM"
    }

    fn execute(&self, input: &Self::Input, params: Self::Params) -> Result<Self::Output> {
        hillshade(input, params)
    }
}

/// Calculate hillshade from a DEM.
///
/// Output is illumination in [0, 1]. Border cells and cells next to missing
/// data are missing. A flat cell receives `sin(altitude)`.
pub fn hillshade(dem: &ElevationGrid, params: HillshadeParams) -> Result<ScalarGrid> {
    params.validate()?;
    let cell_size = validate_cell_size(dem)?;
    let (rows, cols) = dem.shape();

    let zenith = (90.0 - params.altitude).to_radians();
    let (sin_zenith, cos_zenith) = zenith.sin_cos();
    let azimuth = params.azimuth.to_radians();

    let cells = map_cells(rows, cols, None, |row, col| {
        let w = dem.window(row, col)?;
        let g = HornGradient::from_window(&w, cell_size, params.z_factor);
        let slope = g.slope_radians();

        let directional = if g.is_flat() {
            0.0
        } else {
            let aspect = g.aspect_degrees().to_radians();
            sin_zenith * slope.sin() * (azimuth - aspect).cos()
        };
        let shade = cos_zenith * slope.cos() + directional;
        Some(shade.clamp(0.0, 1.0))
    });
    debug!(
        rows,
        cols,
        azimuth = params.azimuth,
        altitude = params.altitude,
        z_factor = params.z_factor,
        "hillshade computed"
    );

    dem.derive(cells)
}
