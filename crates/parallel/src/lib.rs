//! # terrashade parallel
//!
//! Tiled processing for grids too large to handle in one pass.
//!
//! [`TiledProcessor`] cuts a grid into core tiles, pads each tile with a halo
//! so 3x3 kernels see complete neighborhoods, runs the kernel per tile
//! according to a [`ProcessingMode`] and stitches the core regions back
//! together.

pub mod strategy;
pub mod tiled;

pub use strategy::{num_threads, ProcessingMode};
pub use tiled::{Tile, TileIterator, TiledProcessor};
