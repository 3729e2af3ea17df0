//! DEM loading and no-data masking

use super::{ascii, geotiff, RawRaster, SampleFormat};
use crate::error::{Error, Result};
use crate::raster::ElevationGrid;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// How a cell is compared against the no-data sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodataRule {
    /// Cell equals the sentinel (within float tolerance)
    #[default]
    Equal,
    /// Cell is less than or equal to the sentinel, for DEMs that mark
    /// voids with any large negative number
    AtOrBelow,
}

impl NodataRule {
    pub fn matches(self, value: f64, nodata: f64) -> bool {
        match self {
            NodataRule::Equal => (value - nodata).abs() < f64::EPSILON * 100.0,
            NodataRule::AtOrBelow => value <= nodata,
        }
    }
}

impl std::str::FromStr for NodataRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "equal" | "eq" => Ok(NodataRule::Equal),
            "at-or-below" | "le" | "below" => Ok(NodataRule::AtOrBelow),
            _ => Err(Error::config("nodata_rule", s, "expected equal or at-or-below")),
        }
    }
}

/// Supported input containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    GeoTiff,
    AsciiGrid,
}

impl RasterFormat {
    /// Identify by file extension, then by the leading bytes
    pub fn detect(path: &Path, head: &[u8]) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("tif" | "tiff" | "gtiff") => return Some(RasterFormat::GeoTiff),
            Some("asc" | "grd") => return Some(RasterFormat::AsciiGrid),
            _ => {}
        }
        if head.starts_with(b"II*\0") || head.starts_with(b"MM\0*") {
            return Some(RasterFormat::GeoTiff);
        }
        let text_head = String::from_utf8_lossy(&head[..head.len().min(16)]).to_ascii_lowercase();
        if text_head.trim_start().starts_with("ncols") || text_head.trim_start().starts_with("nrows")
        {
            return Some(RasterFormat::AsciiGrid);
        }
        None
    }
}

/// Options controlling [`GridLoader`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Sentinel to use instead of the one declared by the file
    pub nodata: Option<f64>,
    /// Comparison used when masking
    pub rule: NodataRule,
    /// Largest relative difference between x and y resolution still treated
    /// as square cells
    pub anisotropy_tolerance: f64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            nodata: None,
            rule: NodataRule::Equal,
            anisotropy_tolerance: 1e-6,
        }
    }
}

/// Reads single-band DEMs into [`ElevationGrid`]s
#[derive(Debug, Clone, Default)]
pub struct GridLoader {
    options: LoadOptions,
}

impl GridLoader {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Read a DEM without masking.
    ///
    /// The returned grid carries the effective no-data sentinel (override or
    /// declared) in [`Grid::nodata`](crate::Grid::nodata). Resolution must be
    /// square within `anisotropy_tolerance`; the x-axis value is kept.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<ElevationGrid> {
        Ok(self.read(path.as_ref())?.0)
    }

    fn read(&self, path: &Path) -> Result<(ElevationGrid, SampleFormat)> {
        let bytes = std::fs::read(path)?;

        let raw: RawRaster = match RasterFormat::detect(path, &bytes) {
            Some(RasterFormat::GeoTiff) => geotiff::read_geotiff_from_buffer(&bytes)?,
            Some(RasterFormat::AsciiGrid) => {
                let text = std::str::from_utf8(&bytes)
                    .map_err(|e| Error::Format(format!("ASCII grid is not UTF-8: {e}")))?;
                ascii::read_ascii_grid(text)?
            }
            None => {
                return Err(Error::UnrecognizedFormat {
                    path: path.to_path_buf(),
                })
            }
        };

        let mut grid = raw.grid;
        let transform = *grid.transform();
        if !transform.is_square(self.options.anisotropy_tolerance) {
            let (rx, ry) = transform.resolution();
            return Err(Error::Format(format!(
                "anisotropic cells ({rx} x {ry}) are not supported"
            )));
        }
        // Snap y to x so downstream code sees exactly one cell size.
        grid.set_transform(crate::GeoTransform::new(
            transform.origin_x,
            transform.origin_y,
            transform.pixel_width,
            transform.pixel_width.abs() * transform.pixel_height.signum(),
        ));
        grid.set_nodata(self.options.nodata.or(raw.declared_nodata));

        debug!(
            path = %path.display(),
            rows = grid.rows(),
            cols = grid.cols(),
            cell_size = grid.cell_size(),
            nodata = ?grid.nodata(),
            "loaded elevation grid"
        );
        Ok((grid, raw.sample))
    }

    /// Read a DEM and mask its effective no-data sentinel, if any.
    ///
    /// The sentinel is compared in the precision the samples were stored in,
    /// so an f32 file declaring `-9999.9` masks its f32 `-9999.9` cells.
    pub fn load_masked<P: AsRef<Path>>(&self, path: P) -> Result<ElevationGrid> {
        let (grid, sample) = self.read(path.as_ref())?;
        Ok(match grid.nodata() {
            Some(nodata) => {
                let mut masked = mask_nodata(&grid, sample.snap(nodata), self.options.rule);
                masked.set_nodata(Some(nodata));
                masked
            }
            None => grid,
        })
    }
}

/// Read a DEM with default options, without masking
pub fn load<P: AsRef<Path>>(path: P) -> Result<ElevationGrid> {
    GridLoader::default().load(path)
}

/// Replace every cell matching `rule` against `nodata` with missing.
///
/// Returns a new grid; applying it twice with the same sentinel is a no-op the
/// second time.
pub fn mask_nodata(grid: &ElevationGrid, nodata: f64, rule: NodataRule) -> ElevationGrid {
    let mut masked = grid.map(|cell| cell.filter(|&v| !rule.matches(v, nodata)));
    masked.set_nodata(Some(nodata));
    masked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Grid;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn mask_equal_and_idempotent() {
        let grid = Grid::from_vec(vec![-9999.0, 10.0, 20.0, -9999.0], 2, 2).unwrap();
        let once = mask_nodata(&grid, -9999.0, NodataRule::Equal);
        assert_eq!(once.value(0, 0), None);
        assert_eq!(once.value(0, 1), Some(10.0));
        assert_eq!(once.value(1, 1), None);

        let twice = mask_nodata(&once, -9999.0, NodataRule::Equal);
        assert_eq!(once, twice);
        // the source grid is untouched
        assert_eq!(grid.value(0, 0), Some(-9999.0));
    }

    #[test]
    fn mask_at_or_below() {
        let grid = Grid::from_vec(vec![-32768.0, -10000.0, -9999.0, 0.0], 1, 4).unwrap();
        let masked = mask_nodata(&grid, -9999.0, NodataRule::AtOrBelow);
        assert_eq!(
            masked.iter().collect::<Vec<_>>(),
            vec![None, None, None, Some(0.0)]
        );
        assert!(masked.valid_values().all(|v| v > -9999.0));
    }

    #[test]
    fn rule_from_str() {
        assert_eq!("equal".parse::<NodataRule>().unwrap(), NodataRule::Equal);
        assert_eq!(
            "at_or_below".parse::<NodataRule>().unwrap(),
            NodataRule::AtOrBelow
        );
        assert!(matches!(
            "sideways".parse::<NodataRule>(),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn loads_ascii_grid_and_masks_declared_nodata() {
        let file = write_temp(
            ".asc",
            b"ncols 3\nnrows 3\nxllcorner 0\nyllcorner 0\ncellsize 2\nNODATA_value -9999\n1 2 3\n4 -9999 6\n7 8 9\n",
        );
        let loader = GridLoader::default();

        let raw = loader.load(file.path()).unwrap();
        assert_eq!(raw.nodata(), Some(-9999.0));
        assert_eq!(raw.value(1, 1), Some(-9999.0));
        assert_eq!(raw.cell_size(), 2.0);

        let masked = loader.load_masked(file.path()).unwrap();
        assert_eq!(masked.value(1, 1), None);
        assert_eq!(masked.statistics().valid_count, 8);
    }

    #[test]
    fn nodata_override_wins() {
        let file = write_temp(
            ".asc",
            b"ncols 2\nnrows 1\ncellsize 1\nNODATA_value -9999\n0 5\n",
        );
        let loader = GridLoader::new(LoadOptions {
            nodata: Some(0.0),
            ..LoadOptions::default()
        });
        let grid = loader.load_masked(file.path()).unwrap();
        assert_eq!(grid.value(0, 0), None);
        assert_eq!(grid.value(0, 1), Some(5.0));
    }

    #[test]
    fn anisotropic_resolution_is_rejected() {
        let file = write_temp(".asc", b"ncols 1\nnrows 1\ndx 10\ndy 20\n7\n");
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Format(_)), "{err}");
    }

    #[test]
    fn geotiff_roundtrip_through_loader() {
        let grid = Grid::from_vec((0..9).map(f64::from).collect(), 3, 3)
            .unwrap()
            .with_cell_size(5.0);
        let file = tempfile::Builder::new().suffix(".tif").tempfile().unwrap();
        crate::io::write_geotiff(&grid, file.path()).unwrap();

        let loaded = load(file.path()).unwrap();
        assert_eq!(loaded.shape(), (3, 3));
        assert_eq!(loaded.cell_size(), 5.0);
        assert_eq!(loaded.value(2, 2), Some(8.0));
    }

    #[test]
    fn f32_geotiff_masks_inexact_sentinels() {
        for sentinel in [-9999.9, -3.4028231e38] {
            let mut grid = Grid::from_vec(vec![sentinel, 1.0, 2.0, sentinel], 2, 2)
                .unwrap()
                .with_cell_size(1.0);
            grid.set_nodata(Some(sentinel));
            let file = tempfile::Builder::new().suffix(".tif").tempfile().unwrap();
            crate::io::write_geotiff(&grid, file.path()).unwrap();

            assert_eq!(load(file.path()).unwrap().nodata(), Some(sentinel));

            let masked = GridLoader::default().load_masked(file.path()).unwrap();
            assert_eq!(masked.value(0, 0), None, "sentinel {sentinel}");
            assert_eq!(masked.value(1, 1), None, "sentinel {sentinel}");
            assert_eq!(masked.value(0, 1), Some(1.0));
            assert_eq!(masked.nodata(), Some(sentinel));
        }
    }

    #[test]
    fn f32_geotiff_override_is_snapped_too() {
        let grid = Grid::from_vec(vec![-9999.9, 4.0], 1, 2)
            .unwrap()
            .with_cell_size(1.0);
        let file = tempfile::Builder::new().suffix(".tif").tempfile().unwrap();
        crate::io::write_geotiff(&grid, file.path()).unwrap();

        let loader = GridLoader::new(LoadOptions {
            nodata: Some(-9999.9),
            ..LoadOptions::default()
        });
        let masked = loader.load_masked(file.path()).unwrap();
        assert_eq!(masked.value(0, 0), None);
        assert_eq!(masked.value(0, 1), Some(4.0));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load("/definitely/not/here.tif").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_io());
    }

    #[test]
    fn unknown_format_is_io_class_error() {
        let file = write_temp(".bin", b"\x89PNG\r\n\x1a\n not a dem");
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, Error::UnrecognizedFormat { .. }));
        assert!(err.is_io());
    }

    #[test]
    fn sniffs_format_without_extension() {
        let file = write_temp("", b"ncols 1\nnrows 1\ncellsize 1\n3\n");
        assert_eq!(load(file.path()).unwrap().value(0, 0), Some(3.0));
    }
}
