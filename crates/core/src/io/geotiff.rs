//! GeoTIFF reading/writing on top of the `tiff` crate.
//!
//! Only the tags a single-band DEM needs are handled: pixel scale, tiepoint
//! and the GDAL no-data string. Rotated or sheared transforms are not read.

use super::{RawRaster, SampleFormat};
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Grid};
use num_traits::NumCast;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;
use tiff::ColorType;

// The decoder maps these numbers to named variants, and `Tag` compares by
// variant, so lookups must not use `Tag::Unknown`.
const MODEL_PIXEL_SCALE: Tag = Tag::ModelPixelScaleTag;
const MODEL_TIEPOINT: Tag = Tag::ModelTiepointTag;
const GEO_KEY_DIRECTORY: Tag = Tag::GeoKeyDirectoryTag;
const GDAL_NODATA: Tag = Tag::GdalNodata;

/// Read a GeoTIFF file
pub fn read_geotiff<P: AsRef<Path>>(path: P) -> Result<RawRaster> {
    let file = File::open(path.as_ref())?;
    decode_geotiff(file)
}

/// Read a GeoTIFF from an in-memory buffer
pub fn read_geotiff_from_buffer(data: &[u8]) -> Result<RawRaster> {
    decode_geotiff(Cursor::new(data))
}

fn tiff_error(context: &str, e: tiff::TiffError) -> Error {
    match e {
        tiff::TiffError::IoError(io) => Error::Io(io),
        other => Error::Format(format!("{context}: {other}")),
    }
}

fn cast_all<S: NumCast + Copy>(buf: Vec<S>) -> Vec<f64> {
    buf.into_iter()
        .map(|v| num_traits::cast(v).unwrap_or(f64::NAN))
        .collect()
}

fn decode_geotiff<R: Read + Seek>(reader: R) -> Result<RawRaster> {
    let mut decoder = Decoder::new(reader).map_err(|e| tiff_error("TIFF decode error", e))?;

    match decoder.colortype().map_err(|e| tiff_error("Cannot read color type", e))? {
        ColorType::Gray(_) => {}
        other => {
            return Err(Error::UnsupportedDataType(format!(
                "expected a single-band raster, found {other:?}"
            )))
        }
    }

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| tiff_error("Cannot read dimensions", e))?;
    let (rows, cols) = (height as usize, width as usize);

    let transform = read_geotransform(&mut decoder)?;
    let declared_nodata = read_gdal_nodata(&mut decoder);

    let (data, sample) = match decoder
        .read_image()
        .map_err(|e| tiff_error("Cannot read image data", e))?
    {
        DecodingResult::F32(buf) => (cast_all(buf), SampleFormat::Float32),
        DecodingResult::F64(buf) => (buf, SampleFormat::Float64),
        DecodingResult::U8(buf) => (cast_all(buf), SampleFormat::Integer),
        DecodingResult::U16(buf) => (cast_all(buf), SampleFormat::Integer),
        DecodingResult::U32(buf) => (cast_all(buf), SampleFormat::Integer),
        DecodingResult::I8(buf) => (cast_all(buf), SampleFormat::Integer),
        DecodingResult::I16(buf) => (cast_all(buf), SampleFormat::Integer),
        DecodingResult::I32(buf) => (cast_all(buf), SampleFormat::Integer),
        _ => return Err(Error::UnsupportedDataType("Unsupported TIFF pixel format".into())),
    };

    let grid = Grid::from_vec(data, rows, cols)?.with_transform(transform);
    Ok(RawRaster {
        grid,
        declared_nodata,
        sample,
    })
}

/// Pixel scale + tiepoint; a DEM without them has no usable cell size.
fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<GeoTransform> {
    let scale = decoder
        .get_tag_f64_vec(MODEL_PIXEL_SCALE)
        .map_err(|_| Error::Format("missing ModelPixelScale tag, cell size unknown".into()))?;
    let tiepoint = decoder
        .get_tag_f64_vec(MODEL_TIEPOINT)
        .unwrap_or_else(|_| vec![0.0; 6]);

    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(Error::Format(format!(
            "short georeferencing tags: {} scale values, {} tiepoint values",
            scale.len(),
            tiepoint.len()
        )));
    }
    if !(scale[0] > 0.0 && scale[1] > 0.0) {
        return Err(Error::Format(format!(
            "non-positive pixel scale ({}, {})",
            scale[0], scale[1]
        )));
    }

    // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Ok(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

fn read_gdal_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let text = decoder.get_tag_ascii_string(GDAL_NODATA).ok()?;
    let trimmed = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    match trimmed.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(value = trimmed, "ignoring unparsable GDAL_NODATA tag");
            None
        }
    }
}

/// Write a grid to a 32-bit float GeoTIFF.
///
/// Missing cells are written as NaN. A grid carrying a no-data sentinel gets
/// it declared in the `GDAL_NODATA` tag.
pub fn write_geotiff<P: AsRef<Path>>(grid: &Grid<f64>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    encode_geotiff(grid, file)
}

/// Write a grid to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer(grid: &Grid<f64>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_geotiff(grid, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn encode_geotiff<W: Write + Seek>(grid: &Grid<f64>, writer: W) -> Result<()> {
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| tiff_error("TIFF encoder error", e))?;
    let (rows, cols) = grid.shape();

    let data: Vec<f32> = grid.to_nan_filled().into_iter().map(|v| v as f32).collect();

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(|e| tiff_error("Cannot create TIFF image", e))?;

    let gt = grid.transform();
    let scale = [gt.pixel_width.abs(), gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(MODEL_PIXEL_SCALE, &scale[..])
        .map_err(|e| tiff_error("Cannot write scale tag", e))?;

    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(MODEL_TIEPOINT, &tiepoint[..])
        .map_err(|e| tiff_error("Cannot write tiepoint tag", e))?;

    // Version 1.1.0 with two keys: GTModelTypeGeoKey = projected,
    // GTRasterTypeGeoKey = pixel is area.
    let geokeys: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 1, 1025, 0, 1, 1];
    image
        .encoder()
        .write_tag(GEO_KEY_DIRECTORY, &geokeys[..])
        .map_err(|e| tiff_error("Cannot write geokey tag", e))?;

    if let Some(nodata) = grid.nodata() {
        let text = nodata.to_string();
        image
            .encoder()
            .write_tag(GDAL_NODATA, text.as_str())
            .map_err(|e| tiff_error("Cannot write nodata tag", e))?;
    }

    image
        .write_data(&data)
        .map_err(|e| tiff_error("Cannot write image data", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn buffer_roundtrip_keeps_missing_and_transform() {
        let mut grid = Grid::from_vec((0..12).map(|v: i32| <f64 as From<i32>>::from(v)).collect(), 3, 4)
            .unwrap()
            .with_transform(GeoTransform::new(500.0, 900.0, 30.0, -30.0));
        grid.set(1, 1, None).unwrap();

        let bytes = write_geotiff_to_buffer(&grid).unwrap();
        let raw = read_geotiff_from_buffer(&bytes).unwrap();

        assert_eq!(raw.grid.shape(), (3, 4));
        assert_eq!(raw.grid.value(1, 1), None);
        assert_eq!(raw.grid.value(2, 3), Some(11.0));
        assert_relative_eq!(raw.grid.cell_size(), 30.0);
        assert_relative_eq!(raw.grid.transform().origin_x, 500.0);
        assert_relative_eq!(raw.grid.transform().origin_y, 900.0);
        assert_eq!(raw.declared_nodata, None);
        assert_eq!(raw.sample, SampleFormat::Float32);
    }

    #[test]
    fn declared_nodata_survives_roundtrip() {
        let mut grid = Grid::from_vec(vec![-9999.9, 1.5, 2.5, 3.5], 2, 2)
            .unwrap()
            .with_cell_size(2.0);
        grid.set_nodata(Some(-9999.9));

        let raw = read_geotiff_from_buffer(&write_geotiff_to_buffer(&grid).unwrap()).unwrap();
        assert_eq!(raw.declared_nodata, Some(-9999.9));
        // the cell holds the f32 value, not the f64 sentinel
        assert_eq!(raw.grid.value(0, 0), Some(-9999.9f32 as f64));
        assert_relative_eq!(raw.grid.cell_size(), 2.0);
    }

    #[test]
    fn garbage_is_a_format_error() {
        let err = read_geotiff_from_buffer(b"II*\0garbage").unwrap_err();
        assert!(matches!(err, Error::Format(_) | Error::Io(_)), "{err}");
    }
}
