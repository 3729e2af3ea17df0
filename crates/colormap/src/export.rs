//! RGBA TIFF output.

use crate::image::RgbaImage;
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;
use terrashade_core::{Error, Result};
use tiff::encoder::colortype::RGBA8;
use tiff::encoder::TiffEncoder;

fn tiff_error(e: tiff::TiffError) -> Error {
    match e {
        tiff::TiffError::IoError(io) => Error::Io(io),
        other => Error::Format(format!("Cannot encode RGBA TIFF: {other}")),
    }
}

fn encode<W: Write + Seek>(image: &RgbaImage, writer: W) -> Result<()> {
    let (rows, cols) = image.shape();
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions { width: cols, height: rows });
    }
    let mut encoder = TiffEncoder::new(writer).map_err(tiff_error)?;
    encoder
        .write_image::<RGBA8>(cols as u32, rows as u32, image.as_raw())
        .map_err(tiff_error)
}

/// Encode an image as an 8-bit RGBA TIFF in memory.
pub fn encode_rgba_tiff(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode(image, Cursor::new(&mut buf))?;
    Ok(buf)
}

/// Write an image to `path` as an 8-bit RGBA TIFF.
pub fn write_rgba_tiff<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    encode(image, &mut writer)?;
    writer.flush()?;
    Ok(())
}
