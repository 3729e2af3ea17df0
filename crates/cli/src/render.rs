//! Layered rendering driven by a JSON configuration

use serde::{Deserialize, Serialize};
use terrashade_algorithms::terrain::{
    hillshade, slope_aspect, HillshadeParams, SlopeAspectGrids, SlopeParams, FLAT_ASPECT,
};
use terrashade_colormap::{
    shade, stack, ColorLayer, ColorRamp, ColorScheme, How, RgbaImage, ShadeParams, Threshold,
};
use terrashade_core::{ElevationGrid, Result, ScalarGrid};
use tracing::debug;

/// Grid a layer is shaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Elevation,
    Hillshade,
    Slope,
    Aspect,
}

/// Either a preset name or a list of colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CmapSpec {
    Scheme(String),
    Colors(Vec<String>),
}

impl CmapSpec {
    pub fn ramp(&self) -> Result<ColorRamp> {
        match self {
            CmapSpec::Scheme(name) => Ok(name.parse::<ColorScheme>()?.ramp()),
            CmapSpec::Colors(colors) => ColorRamp::parse(colors),
        }
    }
}

fn opaque() -> u8 {
    255
}

/// One entry of the layer stack, bottom first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerSpec {
    pub source: Source,
    /// Reduce the source to a highlight mask before shading
    #[serde(default)]
    pub threshold: Option<Threshold>,
    pub cmap: CmapSpec,
    #[serde(default)]
    pub how: How,
    #[serde(default = "opaque")]
    pub alpha: u8,
    #[serde(default)]
    pub span: Option<(f64, f64)>,
}

/// Full render configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub hillshade: HillshadeParams,
    pub slope: SlopeParams,
    pub layers: Vec<LayerSpec>,
}

impl Default for RenderConfig {
    /// Gray hillshade, translucent terrain tint, 25-50 degree slopes in red.
    fn default() -> Self {
        Self {
            hillshade: HillshadeParams::default(),
            slope: SlopeParams::default(),
            layers: vec![
                LayerSpec {
                    source: Source::Hillshade,
                    threshold: None,
                    cmap: CmapSpec::Scheme(ColorScheme::Grayscale.name().into()),
                    how: How::Linear,
                    alpha: 255,
                    span: Some((0.0, 1.0)),
                },
                LayerSpec {
                    source: Source::Elevation,
                    threshold: None,
                    cmap: CmapSpec::Scheme(ColorScheme::Terrain.name().into()),
                    how: How::Linear,
                    alpha: 96,
                    span: None,
                },
                LayerSpec {
                    source: Source::Slope,
                    threshold: Some(Threshold::Between(25.0, 50.0)),
                    cmap: CmapSpec::Colors(vec!["red".into()]),
                    how: How::Linear,
                    alpha: 160,
                    span: None,
                },
            ],
        }
    }
}

/// Derived grids, computed on first use
struct Sources<'a> {
    dem: &'a ElevationGrid,
    config: &'a RenderConfig,
    hillshade: Option<ScalarGrid>,
    slope_aspect: Option<SlopeAspectGrids>,
}

impl<'a> Sources<'a> {
    fn new(dem: &'a ElevationGrid, config: &'a RenderConfig) -> Self {
        Self {
            dem,
            config,
            hillshade: None,
            slope_aspect: None,
        }
    }

    fn get(&mut self, source: Source) -> Result<&ScalarGrid> {
        match source {
            Source::Elevation => Ok(self.dem),
            Source::Hillshade => {
                let grid = match self.hillshade.take() {
                    Some(grid) => grid,
                    None => hillshade(self.dem, self.config.hillshade)?,
                };
                Ok(&*self.hillshade.insert(grid))
            }
            Source::Slope | Source::Aspect => {
                let grids = match self.slope_aspect.take() {
                    Some(grids) => grids,
                    None => {
                        let mut grids = slope_aspect(self.dem, self.config.slope)?;
                        // flat cells have no bearing to threshold or color
                        grids.aspect = grids.aspect.map(|cell| cell.filter(|&a| a != FLAT_ASPECT));
                        grids
                    }
                };
                let grids = &*self.slope_aspect.insert(grids);
                Ok(if source == Source::Slope {
                    &grids.slope
                } else {
                    &grids.aspect
                })
            }
        }
    }
}

/// Shade every configured layer of `dem` and stack them bottom-to-top.
pub fn render(dem: &ElevationGrid, config: &RenderConfig) -> Result<RgbaImage> {
    let mut sources = Sources::new(dem, config);
    let mut layers: Vec<ColorLayer> = Vec::with_capacity(config.layers.len());

    for spec in &config.layers {
        let grid = sources.get(spec.source)?;
        let params = ShadeParams {
            ramp: spec.cmap.ramp()?,
            how: spec.how,
            alpha: spec.alpha,
            span: spec.span,
        };
        let layer = match &spec.threshold {
            Some(threshold) => shade(&threshold.mask(grid), &params)?,
            None => shade(grid, &params)?,
        };
        debug!(source = ?spec.source, span = ?layer.params.span, "layer shaded");
        layers.push(layer);
    }
    stack(&layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrashade_core::{Error, Grid};

    fn ramp_dem(rows: usize, cols: usize) -> ElevationGrid {
        // z = 2 * col: 63.4 degree slope facing west
        let data = (0..rows * cols).map(|k| 2.0 * (k % cols) as f64).collect();
        Grid::from_vec(data, rows, cols).unwrap().with_cell_size(1.0)
    }

    #[test]
    fn default_config_renders() {
        let dem = ramp_dem(5, 6);
        let image = render(&dem, &RenderConfig::default()).unwrap();
        assert_eq!(image.shape(), (5, 6));
        // interior cells are covered by the opaque hillshade base
        assert_eq!(image.pixel(2, 2).unwrap()[3], 255);
        // border cells have no hillshade, only the translucent elevation tint
        assert_eq!(image.pixel(0, 0).unwrap()[3], 96);
    }

    #[test]
    fn parse_json_config() {
        let json = r##"{
            "hillshade": {"azimuth": 90.0},
            "layers": [
                {"source": "hillshade", "cmap": "grayscale"},
                {"source": "slope", "cmap": ["#ffff00", "red"], "how": "cbrt", "alpha": 128},
                {"source": "aspect", "threshold": {"bearing": [315.0, 45.0]}, "cmap": ["blue"]}
            ]
        }"##;
        let config: RenderConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.hillshade.azimuth, 90.0);
        assert_eq!(config.hillshade.altitude, 45.0);
        assert_eq!(config.layers.len(), 3);
        assert_eq!(config.layers[0].alpha, 255);
        assert_eq!(config.layers[1].how, How::Cbrt);
        assert_eq!(
            config.layers[2].threshold,
            Some(Threshold::Bearing(315.0, 45.0))
        );

        let image = render(&ramp_dem(4, 4), &config).unwrap();
        assert_eq!(image.shape(), (4, 4));
    }

    #[test]
    fn threshold_layer_only_marks_selected_cells() {
        let dem = ramp_dem(4, 5);
        let config = RenderConfig {
            layers: vec![LayerSpec {
                source: Source::Slope,
                threshold: Some(Threshold::Above(80.0)),
                cmap: CmapSpec::Colors(vec!["red".into()]),
                how: How::Linear,
                alpha: 255,
                span: None,
            }],
            ..Default::default()
        };
        let image = render(&dem, &config).unwrap();
        assert!(image.as_raw().iter().all(|&b| b == 0));
    }

    fn aspect_layer(threshold: Option<Threshold>) -> RenderConfig {
        RenderConfig {
            layers: vec![LayerSpec {
                source: Source::Aspect,
                threshold,
                cmap: CmapSpec::Colors(vec!["red".into()]),
                how: How::Linear,
                alpha: 255,
                span: None,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn flat_cells_never_count_as_a_bearing() {
        let flat = Grid::filled(3, 3, 100.0).with_cell_size(1.0);
        for threshold in [
            Some(Threshold::Below(45.0)),
            Some(Threshold::Between(-5.0, 5.0)),
            Some(Threshold::Above(-10.0)),
            None,
        ] {
            let image = render(&flat, &aspect_layer(threshold)).unwrap();
            assert_eq!(image.pixel(1, 1), Some([0, 0, 0, 0]), "{threshold:?}");
        }
    }

    #[test]
    fn sloped_cells_keep_their_bearing() {
        let image = render(&ramp_dem(3, 3), &aspect_layer(Some(Threshold::Below(300.0)))).unwrap();
        assert_eq!(image.pixel(1, 1), Some([255, 0, 0, 255]));
    }

    #[test]
    fn unknown_scheme_is_config_error() {
        let config = RenderConfig {
            layers: vec![LayerSpec {
                source: Source::Elevation,
                threshold: None,
                cmap: CmapSpec::Scheme("plasma-ish".into()),
                how: How::Linear,
                alpha: 255,
                span: None,
            }],
            ..Default::default()
        };
        let err = render(&ramp_dem(3, 3), &config).unwrap_err();
        assert!(matches!(err, Error::Config { name: "cmap", .. }));
    }

    #[test]
    fn empty_layer_list_is_rejected() {
        let config = RenderConfig {
            layers: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(render(&ramp_dem(3, 3), &config), Err(Error::Config { .. })));
    }

    #[test]
    fn unknown_fields_rejected() {
        let json = r#"{"layers": [{"source": "slope", "cmap": "hot", "opacity": 3}]}"#;
        assert!(serde_json::from_str::<RenderConfig>(json).is_err());
    }
}
