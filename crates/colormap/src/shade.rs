//! Scalar grid to RGBA shading.

use crate::image::RgbaImage;
use crate::scheme::ColorRamp;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use terrashade_core::{Error, Result, ScalarGrid};
use tracing::debug;

/// Normalization rule applied before the ramp lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum How {
    /// `(v - min) / (max - min)`
    #[default]
    Linear,
    /// `ln(1 + v - min) / ln(1 + max - min)`
    Log,
    /// `cbrt(v - min) / cbrt(max - min)`
    Cbrt,
    /// Histogram equalization: rank of the value among the valid cells
    EqHist,
}

impl FromStr for How {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "log" => Ok(Self::Log),
            "cbrt" | "cube_root" | "cube-root" => Ok(Self::Cbrt),
            "eq_hist" | "eqhist" | "eq-hist" => Ok(Self::EqHist),
            _ => Err(Error::config("how", s, "expected linear, log, cbrt or eq_hist")),
        }
    }
}

/// Parameters for [`shade`]
#[derive(Debug, Clone, PartialEq)]
pub struct ShadeParams {
    pub ramp: ColorRamp,
    pub how: How,
    /// Uniform opacity multiplier, 255 = ramp alpha unchanged
    pub alpha: u8,
    /// Value range mapped onto the ramp; `None` uses the observed range
    pub span: Option<(f64, f64)>,
}

impl ShadeParams {
    pub fn new(ramp: impl Into<ColorRamp>) -> Self {
        Self {
            ramp: ramp.into(),
            how: How::Linear,
            alpha: 255,
            span: None,
        }
    }

    pub fn how(mut self, how: How) -> Self {
        self.how = how;
        self
    }

    pub fn alpha(mut self, alpha: u8) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn span(mut self, min: f64, max: f64) -> Self {
        self.span = Some((min, max));
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some((lo, hi)) = self.span {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(Error::config(
                    "span",
                    format!("[{lo}, {hi}]"),
                    "must be finite with min < max",
                ));
            }
        }
        if self.ramp.stops().is_empty() {
            return Err(Error::config("cmap", "[]", "needs at least one color"));
        }
        Ok(())
    }
}

/// A shaded grid and the parameters that produced it.
///
/// `params.span` holds the range actually used, so a layer shaded with the
/// observed range records it.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorLayer {
    pub image: RgbaImage,
    pub params: ShadeParams,
}

impl ColorLayer {
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl AsRef<RgbaImage> for ColorLayer {
    fn as_ref(&self) -> &RgbaImage {
        &self.image
    }
}

/// Observed finite [min, max] of the valid cells.
fn observed_span(grid: &ScalarGrid) -> Option<(f64, f64)> {
    grid.valid_values()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

enum Normalizer {
    /// Degenerate range, everything maps to the ramp start
    Constant,
    Curve { f: fn(f64) -> f64, lo: f64, hi: f64, denom: f64 },
    Ranked { sorted: Vec<f64>, base: usize },
}

impl Normalizer {
    fn new(how: How, lo: f64, hi: f64, grid: &ScalarGrid) -> Self {
        if hi <= lo {
            return Self::Constant;
        }
        let f: fn(f64) -> f64 = match how {
            How::Linear => |x| x,
            How::Log => f64::ln_1p,
            How::Cbrt => f64::cbrt,
            How::EqHist => {
                let mut sorted: Vec<f64> = grid
                    .valid_values()
                    .filter(|v| v.is_finite())
                    .map(|v| v.clamp(lo, hi))
                    .collect();
                sorted.sort_by(f64::total_cmp);
                let base = match sorted.first() {
                    Some(&min) => sorted.partition_point(|&s| s <= min),
                    None => 0,
                };
                return Self::Ranked { sorted, base };
            }
        };
        Self::Curve { f, lo, hi, denom: f(hi - lo) }
    }

    fn apply(&self, v: f64) -> f64 {
        match self {
            Self::Constant => 0.0,
            Self::Curve { f, lo, hi, denom } => f(v.clamp(*lo, *hi) - lo) / denom,
            Self::Ranked { sorted, base } => {
                let n = sorted.len();
                if n <= *base {
                    return 0.0;
                }
                let rank = sorted.partition_point(|&s| s <= v);
                rank.saturating_sub(*base) as f64 / (n - base) as f64
            }
        }
    }
}

fn scale_alpha(stop_alpha: u8, alpha: u8) -> u8 {
    ((stop_alpha as u32 * alpha as u32 + 127) / 255) as u8
}

/// Color a scalar grid through a ramp.
///
/// Missing and non-finite cells are fully transparent. Values outside the
/// span are clamped to the ramp ends; a grid whose span is a single value
/// maps entirely to the ramp start.
pub fn shade(grid: &ScalarGrid, params: &ShadeParams) -> Result<ColorLayer> {
    params.validate()?;
    let (rows, cols) = grid.shape();
    let mut image = RgbaImage::new_transparent(rows, cols);

    let span = params.span.or_else(|| observed_span(grid));
    let Some((lo, hi)) = span else {
        debug!(rows, cols, "shade: no valid cells, layer is transparent");
        return Ok(ColorLayer {
            image,
            params: params.clone(),
        });
    };
    debug!(lo, hi, how = ?params.how, alpha = params.alpha, "shade");

    let normalizer = Normalizer::new(params.how, lo, hi, grid);
    for (cell, px) in grid.iter().zip(image.pixels_mut()) {
        let Some(v) = cell.filter(|v| v.is_finite()) else {
            continue;
        };
        let c = params.ramp.evaluate(normalizer.apply(v));
        px.copy_from_slice(&[c.r, c.g, c.b, scale_alpha(c.a, params.alpha)]);
    }

    Ok(ColorLayer {
        image,
        params: ShadeParams {
            span: Some((lo, hi)),
            ..params.clone()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::{ColorScheme, Rgba};
    use terrashade_core::Grid;

    fn row(values: &[f64]) -> ScalarGrid {
        Grid::from_vec(values.to_vec(), 1, values.len()).unwrap()
    }

    fn gray() -> ShadeParams {
        ShadeParams::new(ColorScheme::Grayscale)
    }

    fn reds(layer: &ColorLayer) -> Vec<u8> {
        let cols = layer.image.cols();
        (0..cols).map(|c| layer.image.pixel(0, c).unwrap()[0]).collect()
    }

    #[test]
    fn linear_grayscale() {
        let grid = Grid::from_vec(vec![0.0, 0.5, 1.0, f64::NAN], 2, 2).unwrap();
        let layer = shade(&grid, &gray()).unwrap();

        assert_eq!(layer.image.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(layer.image.pixel(0, 1), Some([128, 128, 128, 255]));
        assert_eq!(layer.image.pixel(1, 0), Some([255, 255, 255, 255]));
        assert_eq!(layer.image.pixel(1, 1), Some([0, 0, 0, 0]));
        assert_eq!(layer.params.span, Some((0.0, 1.0)));
    }

    #[test]
    fn uniform_alpha_scales_ramp_alpha() {
        let layer = shade(&row(&[0.0, 1.0]), &gray().alpha(128)).unwrap();
        assert_eq!(layer.image.pixel(0, 0).unwrap()[3], 128);

        let half = ColorRamp::from_colors([Rgba::new(255, 0, 0, 128)]).unwrap();
        let layer = shade(&row(&[3.0]), &ShadeParams::new(half).alpha(128)).unwrap();
        assert_eq!(layer.image.pixel(0, 0), Some([255, 0, 0, 64]));
    }

    #[test]
    fn constant_grid_maps_to_ramp_start() {
        let layer = shade(&row(&[7.0, 7.0, 7.0]), &ShadeParams::new(ColorScheme::Terrain)).unwrap();
        for c in 0..3 {
            assert_eq!(layer.image.pixel(0, c), Some([34, 139, 34, 255]));
        }
    }

    #[test]
    fn all_missing_is_transparent() {
        let grid: ScalarGrid = Grid::missing(2, 2);
        let layer = shade(&grid, &gray()).unwrap();
        assert!(layer.image.as_raw().iter().all(|&b| b == 0));
    }

    #[test]
    fn explicit_span_clamps() {
        let layer = shade(&row(&[-5.0, 5.0, 20.0]), &gray().span(0.0, 10.0)).unwrap();
        assert_eq!(reds(&layer), vec![0, 128, 255]);
    }

    #[test]
    fn invalid_span_is_config_error() {
        for (lo, hi) in [(1.0, 1.0), (2.0, 1.0), (f64::NAN, 1.0), (0.0, f64::INFINITY)] {
            let err = shade(&row(&[0.0]), &gray().span(lo, hi)).unwrap_err();
            assert!(matches!(err, Error::Config { name: "span", .. }));
        }
    }

    #[test]
    fn cube_root_rule() {
        let layer = shade(&row(&[0.0, 1.0, 8.0]), &gray().how(How::Cbrt)).unwrap();
        assert_eq!(reds(&layer), vec![0, 128, 255]);
    }

    #[test]
    fn log_rule_lifts_low_values() {
        let grid = row(&[0.0, 10.0, 100.0]);
        let linear = shade(&grid, &gray()).unwrap();
        let log = shade(&grid, &gray().how(How::Log)).unwrap();
        assert!(reds(&log)[1] > reds(&linear)[1]);
        assert_eq!(reds(&log)[2], 255);
    }

    #[test]
    fn histogram_equalization_uses_ranks() {
        let layer = shade(&row(&[1.0, 2.0, 3.0, 1000.0]), &gray().how(How::EqHist)).unwrap();
        assert_eq!(reds(&layer), vec![0, 85, 170, 255]);
    }

    #[test]
    fn how_from_str() {
        assert_eq!("CBRT".parse::<How>().unwrap(), How::Cbrt);
        assert_eq!("eq_hist".parse::<How>().unwrap(), How::EqHist);
        assert!("sqrt".parse::<How>().is_err());
    }
}
