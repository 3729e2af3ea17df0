//! # terrashade colormap
//!
//! Turns scalar grids into RGBA layers and composites them.
//!
//! - [`shade`] maps a [`ScalarGrid`](terrashade_core::ScalarGrid) through a
//!   [`ColorRamp`] with a [`How`] normalization rule and uniform alpha
//! - [`mask`] / [`Threshold`] turn a grid into a highlight layer
//! - [`stack`] alpha-blends layers bottom-to-top
//! - [`write_rgba_tiff`] saves the result
//!
//! ## Usage
//!
//! ```
//! use terrashade_colormap::{shade, stack, ColorScheme, How, ShadeParams};
//! use terrashade_core::Grid;
//!
//! let grid = Grid::from_vec(vec![0.0, 0.5, 1.0, f64::NAN], 2, 2).unwrap();
//! let base = shade(&grid, &ShadeParams::new(ColorScheme::Grayscale.ramp())).unwrap();
//! let tint = shade(&grid, &ShadeParams::new(ColorScheme::Terrain.ramp()).alpha(128)).unwrap();
//! let image = stack(&[base, tint]).unwrap();
//! assert_eq!(image.pixel(1, 1), Some([0, 0, 0, 0]));
//! ```

mod export;
mod image;
mod mask;
mod scheme;
mod shade;
mod stack;

pub use export::{encode_rgba_tiff, write_rgba_tiff};
pub use image::RgbaImage;
pub use mask::{mask, mask_with, Threshold, HIGHLIGHT};
pub use scheme::{ColorRamp, ColorScheme, ColorStop, Rgba};
pub use shade::{shade, ColorLayer, How, ShadeParams};
pub use stack::{blend_over, stack};
