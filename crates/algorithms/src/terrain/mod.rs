//! Terrain attributes derived from DEMs
//!
//! - Slope: steepness in degrees from horizontal
//! - Aspect: compass bearing of steepest descent
//! - Hillshade: Lambertian illumination for a configurable light source
//!
//! All three share the Horn (1981) 3x3 gradient in [`HornGradient`].

mod gradient;
mod hillshade;
mod slope;

pub use gradient::{HornGradient, FLAT_ASPECT, FLAT_THRESHOLD};
pub use hillshade::{hillshade, Hillshade, HillshadeParams};
pub use slope::{aspect, slope, slope_aspect, SlopeAspect, SlopeAspectGrids, SlopeParams};
