//! Reading and writing elevation grids

mod ascii;
mod geotiff;
mod loader;

pub use ascii::read_ascii_grid;
pub use geotiff::{read_geotiff, read_geotiff_from_buffer, write_geotiff, write_geotiff_to_buffer};
pub use loader::{load, mask_nodata, GridLoader, LoadOptions, NodataRule, RasterFormat};

/// A decoded single-band raster before any no-data handling.
#[derive(Debug, Clone)]
pub struct RawRaster {
    pub grid: crate::ElevationGrid,
    /// No-data sentinel declared by the file, if any
    pub declared_nodata: Option<f64>,
    /// Numeric type the samples were stored as
    pub sample: SampleFormat,
}

/// Storage type of the decoded samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    Float32,
    Float64,
    Integer,
}

impl SampleFormat {
    /// Round `value` to the nearest value a sample of this type can hold.
    ///
    /// A sentinel compared against f32 cells must first be rounded to f32.
    pub fn snap(self, value: f64) -> f64 {
        match self {
            SampleFormat::Float32 => value as f32 as f64,
            SampleFormat::Float64 | SampleFormat::Integer => value,
        }
    }
}
