//! # terrashade core
//!
//! Core types, traits and I/O shared by the terrashade crates.
//!
//! This crate provides:
//! - `Grid<T>`: row-major 2D grid with explicit missing cells
//! - `ElevationGrid` / `ScalarGrid`: the `f64` grids the pipeline passes around
//! - `GeoTransform`: affine transformation for georeferencing
//! - `GridLoader` and `mask_nodata` for reading DEMs
//! - The `Algorithm` trait implemented by the terrain engines

pub mod error;
pub mod io;
pub mod raster;

pub use error::{Error, Result};
pub use raster::{ElevationGrid, GeoTransform, Grid, GridElement, ScalarGrid};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::io::{load, mask_nodata, GridLoader, LoadOptions, NodataRule};
    pub use crate::raster::{ElevationGrid, GeoTransform, Grid, GridElement, ScalarGrid};
    pub use crate::Algorithm;
}

/// A named grid transform with typed parameters.
///
/// Implementors borrow their input and return a fresh output; calling
/// `execute` twice with the same arguments yields the same result.
pub trait Algorithm {
    type Input;
    type Output;
    /// Parameters, with defaults suitable for a typical DEM
    type Params: Default;
    type Error: std::error::Error;

    /// Short identifier, e.g. for log lines
    fn name(&self) -> &'static str;

    /// One-line summary of what is computed
    fn description(&self) -> &'static str;

    fn execute(
        &self,
        input: &Self::Input,
        params: Self::Params,
    ) -> std::result::Result<Self::Output, Self::Error>;

    /// [`execute`](Self::execute) with `Params::default()`
    fn execute_default(&self, input: &Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
