use terrashade_core::{Error, Result};

/// Row-major RGBA8 image, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

impl RgbaImage {
    /// Fully transparent image of the given shape.
    pub fn new_transparent(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0; rows * cols * 4],
        }
    }

    pub fn from_raw(rows: usize, cols: usize, data: Vec<u8>) -> Result<Self> {
        if data.len() != rows * cols * 4 {
            return Err(Error::Format(format!(
                "RGBA buffer holds {} bytes, {}x{} image needs {}",
                data.len(),
                rows,
                cols,
                rows * cols * 4
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Pixel at (row, col), or `None` outside the image.
    pub fn pixel(&self, row: usize, col: usize) -> Option<[u8; 4]> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let i = (row * self.cols + col) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[i..i + 4]);
        Some(px)
    }

    pub(crate) fn pixels_mut(&mut self) -> std::slice::ChunksExactMut<'_, u8> {
        self.data.chunks_exact_mut(4)
    }

    pub(crate) fn pixels(&self) -> std::slice::ChunksExact<'_, u8> {
        self.data.chunks_exact(4)
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

impl AsRef<RgbaImage> for RgbaImage {
    fn as_ref(&self) -> &RgbaImage {
        self
    }
}
