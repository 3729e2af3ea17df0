//! # terrashade algorithms
//!
//! Terrain attribute engines over [`ElevationGrid`](terrashade_core::ElevationGrid)s.
//!
//! - **terrain**: slope, aspect, hillshade
//!
//! Every function is a pure transform: inputs are borrowed read-only and a
//! fresh grid is returned. Cells are evaluated row-parallel when the
//! `parallel` feature is enabled (the default).

mod maybe_rayon;
pub mod terrain;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::terrain::{
        aspect, hillshade, slope, slope_aspect, Hillshade, HillshadeParams, SlopeAspect,
        SlopeAspectGrids, SlopeParams, FLAT_ASPECT,
    };
    pub use terrashade_core::prelude::*;
}
