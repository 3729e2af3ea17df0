//! Affine georeferencing for grids

use serde::{Deserialize, Serialize};

/// Affine transformation between pixel and map coordinates.
///
/// ```text
/// x = origin_x + col * pixel_width
/// y = origin_y + row * pixel_height
/// ```
///
/// Only north-up grids are represented; `pixel_height` is negative when rows
/// run southward, which is the case for every format the loader reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Cell size in X direction
    pub pixel_width: f64,
    /// Cell size in Y direction, usually negative
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// North-up transform with square cells of `cell_size`, upper-left at (0, 0).
    pub fn with_cell_size(cell_size: f64) -> Self {
        Self::new(0.0, 0.0, cell_size, -cell_size)
    }

    /// Map coordinates of the center of pixel (col, row)
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        self.pixel_to_geo_corner(col as f64 + 0.5, row as f64 + 0.5)
    }

    fn pixel_to_geo_corner(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin_x + col * self.pixel_width,
            self.origin_y + row * self.pixel_height,
        )
    }

    /// Fractional pixel coordinates (col, row) of a map position
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        if self.pixel_width == 0.0 || self.pixel_height == 0.0 {
            return (f64::NAN, f64::NAN);
        }
        (
            (x - self.origin_x) / self.pixel_width,
            (y - self.origin_y) / self.pixel_height,
        )
    }

    /// Cell size (x-axis resolution; grids are assumed square)
    pub fn cell_size(&self) -> f64 {
        self.pixel_width.abs()
    }

    /// Absolute (x, y) resolution
    pub fn resolution(&self) -> (f64, f64) {
        (self.pixel_width.abs(), self.pixel_height.abs())
    }

    /// Whether x and y resolution agree within a relative tolerance
    pub fn is_square(&self, rel_tolerance: f64) -> bool {
        let (rx, ry) = self.resolution();
        let scale = rx.max(ry);
        scale > 0.0 && (rx - ry).abs() <= rel_tolerance * scale
    }

    /// Transform of a window whose upper-left pixel is (col, row) of this one
    pub fn shifted(&self, col: usize, row: usize) -> Self {
        let (x, y) = self.pixel_to_geo_corner(col as f64, row as f64);
        Self::new(x, y, self.pixel_width, self.pixel_height)
    }

    /// Bounding box (min_x, min_y, max_x, max_y) for a grid of `cols` x `rows`
    pub fn bounds(&self, cols: usize, rows: usize) -> (f64, f64, f64, f64) {
        let (x0, y0) = self.pixel_to_geo_corner(0.0, 0.0);
        let (x1, y1) = self.pixel_to_geo_corner(cols as f64, rows as f64);
        (x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::with_cell_size(1.0)
    }
}
