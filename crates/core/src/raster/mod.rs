//! Grid data structures and operations

mod element;
mod geotransform;
mod grid;
mod window;

pub use element::GridElement;
pub use geotransform::GeoTransform;
pub use grid::{Grid, GridStatistics};
pub use window::Window3x3;

/// Elevation samples as loaded from a DEM.
pub type ElevationGrid = Grid<f64>;

/// A derived per-cell scalar (slope, aspect, illumination, mask).
pub type ScalarGrid = Grid<f64>;
