//! Esri ASCII grid reader
//!
//! ```text
//! ncols        4
//! nrows        3
//! xllcorner    500000
//! yllcorner    4100000
//! cellsize     30
//! NODATA_value -9999
//! 12.0 13.5 ...
//! ```
//!
//! `xllcenter`/`yllcenter` and the non-standard `dx`/`dy` pair are accepted.

use super::{RawRaster, SampleFormat};
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Grid};

#[derive(Debug, Default)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    xll: Option<(f64, bool)>,
    yll: Option<(f64, bool)>,
    cellsize: Option<f64>,
    dx: Option<f64>,
    dy: Option<f64>,
    nodata: Option<f64>,
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Format(format!("invalid {key} value '{value}'")))
}

/// Parse an Esri ASCII grid from text
pub fn read_ascii_grid(text: &str) -> Result<RawRaster> {
    let mut header = Header::default();
    let mut tokens = text.split_whitespace().peekable();

    // Header entries are key/value pairs; the body starts at the first numeric token.
    while let Some(&key) = tokens.peek() {
        if key.parse::<f64>().is_ok() {
            break;
        }
        tokens.next();
        let value = tokens
            .next()
            .ok_or_else(|| Error::Format(format!("header key '{key}' has no value")))?;
        match key.to_ascii_lowercase().as_str() {
            "ncols" => header.ncols = Some(parse_number(key, value)?),
            "nrows" => header.nrows = Some(parse_number(key, value)?),
            "xllcorner" => header.xll = Some((parse_number(key, value)?, false)),
            "xllcenter" => header.xll = Some((parse_number(key, value)?, true)),
            "yllcorner" => header.yll = Some((parse_number(key, value)?, false)),
            "yllcenter" => header.yll = Some((parse_number(key, value)?, true)),
            "cellsize" => header.cellsize = Some(parse_number(key, value)?),
            "dx" => header.dx = Some(parse_number(key, value)?),
            "dy" => header.dy = Some(parse_number(key, value)?),
            "nodata_value" => header.nodata = Some(parse_number(key, value)?),
            _ => return Err(Error::Format(format!("unknown header key '{key}'"))),
        }
    }

    let ncols = header
        .ncols
        .ok_or_else(|| Error::Format("missing ncols".into()))?;
    let nrows = header
        .nrows
        .ok_or_else(|| Error::Format("missing nrows".into()))?;
    let (dx, dy) = match (header.cellsize, header.dx, header.dy) {
        (Some(cs), _, _) => (cs, cs),
        (None, Some(dx), Some(dy)) => (dx, dy),
        _ => {
            return Err(Error::Format(
                "resolution unknown: neither cellsize nor dx/dy given".into(),
            ))
        }
    };
    if !(dx > 0.0 && dy > 0.0) {
        return Err(Error::Format(format!("non-positive resolution ({dx}, {dy})")));
    }

    let (xll, x_center) = header.xll.unwrap_or((0.0, false));
    let (yll, y_center) = header.yll.unwrap_or((0.0, false));
    let origin_x = if x_center { xll - dx / 2.0 } else { xll };
    let lower_edge = if y_center { yll - dy / 2.0 } else { yll };
    let origin_y = lower_edge + nrows as f64 * dy;

    let values = tokens
        .map(|t| parse_number::<f64>("cell", t))
        .collect::<Result<Vec<_>>>()?;
    if values.len() != nrows * ncols {
        return Err(Error::Format(format!(
            "expected {} cell values, found {}",
            nrows * ncols,
            values.len()
        )));
    }

    let grid = Grid::from_vec(values, nrows, ncols)?
        .with_transform(GeoTransform::new(origin_x, origin_y, dx, -dy));
    Ok(RawRaster {
        grid,
        declared_nodata: header.nodata,
        sample: SampleFormat::Float64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE: &str = "ncols 3\nnrows 2\nxllcorner 100\nyllcorner 200\ncellsize 10\nNODATA_value -9999\n1 2 3\n4 -9999 6\n";

    #[test]
    fn parses_header_and_body() {
        let raw = read_ascii_grid(SAMPLE).unwrap();
        assert_eq!(raw.grid.shape(), (2, 3));
        assert_eq!(raw.declared_nodata, Some(-9999.0));
        assert_eq!(raw.grid.value(1, 1), Some(-9999.0));
        assert_eq!(raw.grid.value(1, 2), Some(6.0));
        assert_relative_eq!(raw.grid.cell_size(), 10.0);
        assert_relative_eq!(raw.grid.transform().origin_x, 100.0);
        assert_relative_eq!(raw.grid.transform().origin_y, 220.0);
    }

    #[test]
    fn center_registration_shifts_origin() {
        let text = "ncols 1\nnrows 1\nxllcenter 5\nyllcenter 5\ncellsize 10\n7\n";
        let raw = read_ascii_grid(text).unwrap();
        assert_relative_eq!(raw.grid.transform().origin_x, 0.0);
        assert_relative_eq!(raw.grid.transform().origin_y, 10.0);
    }

    #[test]
    fn dx_dy_are_kept_apart() {
        let text = "ncols 1\nnrows 1\ndx 10\ndy 20\n7\n";
        let raw = read_ascii_grid(text).unwrap();
        assert_eq!(raw.grid.transform().resolution(), (10.0, 20.0));
    }

    #[test]
    fn missing_resolution_is_format_error() {
        let err = read_ascii_grid("ncols 1\nnrows 1\n7\n").unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn wrong_cell_count_is_format_error() {
        let err = read_ascii_grid("ncols 2\nnrows 2\ncellsize 1\n1 2 3\n").unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }
}
