//! Horn (1981) surface gradients from a 3x3 window
//!
//! ```text
//! a b c
//! d e f
//! g h i
//! ```
//!
//! dz/dx = ((c + 2f + i) - (a + 2d + g)) / (8 * cellsize)
//! dz/dy = ((g + 2h + i) - (a + 2b + c)) / (8 * cellsize)
//!
//! Rows increase southward, so a positive dz/dy means the surface rises
//! toward the south.
//!
//! Reference: Horn, B.K.P. (1981). Hill shading and the reflectance map. IEEE.

use terrashade_core::raster::Window3x3;

/// Aspect written for cells with no downhill direction.
///
/// It lies outside [0, 360) so bearing thresholds never select flat ground.
pub const FLAT_ASPECT: f64 = -1.0;

/// Gradient magnitudes below this on both axes count as flat.
pub const FLAT_THRESHOLD: f64 = 1e-10;

/// First-order partial derivatives at one cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HornGradient {
    /// dz/dx, positive when the surface rises eastward
    pub dz_dx: f64,
    /// dz/dy, positive when the surface rises southward
    pub dz_dy: f64,
}

impl HornGradient {
    /// Gradient of `w` for square cells of `cell_size`, elevations scaled by `z_factor`
    #[inline]
    pub fn from_window(w: &Window3x3, cell_size: f64, z_factor: f64) -> Self {
        let (a, b, c) = (w.at(-1, -1), w.at(-1, 0), w.at(-1, 1));
        let (d, f) = (w.at(0, -1), w.at(0, 1));
        let (g, h, i) = (w.at(1, -1), w.at(1, 0), w.at(1, 1));

        let scale = z_factor / (8.0 * cell_size);
        Self {
            dz_dx: ((c + 2.0 * f + i) - (a + 2.0 * d + g)) * scale,
            dz_dy: ((g + 2.0 * h + i) - (a + 2.0 * b + c)) * scale,
        }
    }

    #[inline]
    pub fn is_flat(&self) -> bool {
        self.dz_dx.abs() < FLAT_THRESHOLD && self.dz_dy.abs() < FLAT_THRESHOLD
    }

    /// atan(sqrt(dz/dx² + dz/dy²)), in [0, π/2)
    #[inline]
    pub fn slope_radians(&self) -> f64 {
        self.dz_dx.hypot(self.dz_dy).atan()
    }

    #[inline]
    pub fn slope_degrees(&self) -> f64 {
        self.slope_radians().to_degrees()
    }

    /// Compass bearing of steepest descent in [0, 360), 0 = north, clockwise;
    /// [`FLAT_ASPECT`] for flat cells.
    ///
    /// `theta = atan2(dz/dy, -dz/dx)` is the math angle (counter-clockwise from
    /// east) of the downhill vector; the bearing is `90 - theta` wrapped.
    #[inline]
    pub fn aspect_degrees(&self) -> f64 {
        if self.is_flat() {
            return FLAT_ASPECT;
        }
        let theta = self.dz_dy.atan2(-self.dz_dx).to_degrees();
        let bearing = (90.0 - theta).rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        if bearing >= 360.0 {
            0.0
        } else {
            bearing
        }
    }
}
