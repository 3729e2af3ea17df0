//! Main grid type

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, GridElement, Window3x3};
use ndarray::{s, Array2, ArrayView2};

/// A georeferenced 2D grid with explicit missing cells.
///
/// Cells are stored as `Option<T>` in row-major order. A missing cell is
/// `None`; floating point NaN is never stored; constructors taking raw values
/// turn it into `None`.
///
/// # Example
///
/// ```
/// use terrashade_core::Grid;
///
/// let mut grid: Grid<f64> = Grid::filled(3, 4, 100.0);
/// grid.set(1, 2, None).unwrap();
///
/// assert_eq!(grid.shape(), (3, 4));
/// assert_eq!(grid.value(1, 2), None);
/// assert_eq!(grid.value(0, 0), Some(100.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T: GridElement> {
    data: Array2<Option<T>>,
    transform: GeoTransform,
    /// Declared no-data sentinel of the source file, informational only.
    nodata: Option<T>,
}

impl<T: GridElement> Grid<T> {
    /// Create a grid where every cell is missing
    pub fn missing(rows: usize, cols: usize) -> Self {
        Self::from_array(Array2::from_elem((rows, cols), None))
    }

    /// Create a grid filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        let cell = if value.is_missing() { None } else { Some(value) };
        Self::from_array(Array2::from_elem((rows, cols), cell))
    }

    /// Create a grid from raw row-major values; NaN becomes missing
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        let cells = data
            .into_iter()
            .map(|v| if v.is_missing() { None } else { Some(v) })
            .collect();
        Self::from_cells(cells, rows, cols)
    }

    /// Create a grid from row-major cells
    pub fn from_cells(cells: Vec<Option<T>>, rows: usize, cols: usize) -> Result<Self> {
        if cells.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        let cells = cells
            .into_iter()
            .map(|c| c.filter(|v| !v.is_missing()))
            .collect();
        let data = Array2::from_shape_vec((rows, cols), cells).map_err(|_| {
            Error::InvalidDimensions {
                width: cols,
                height: rows,
            }
        })?;
        Ok(Self::from_array(data))
    }

    /// Create a grid from an ndarray of cells
    pub fn from_array(data: Array2<Option<T>>) -> Self {
        Self {
            data,
            transform: GeoTransform::default(),
            nodata: None,
        }
    }

    /// Builder: set square cells of `cell_size`, keeping the origin
    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.transform.pixel_width = cell_size;
        self.transform.pixel_height = -cell_size;
        self
    }

    /// Builder: set the geotransform
    pub fn with_transform(mut self, transform: GeoTransform) -> Self {
        self.transform = transform;
        self
    }

    /// A new grid of the same shape and georeferencing holding `cells`.
    ///
    /// Used by the engines to wrap a freshly computed row-major buffer.
    pub fn derive<U: GridElement>(&self, cells: Vec<Option<U>>) -> Result<Grid<U>> {
        let (rows, cols) = self.shape();
        Ok(Grid::from_cells(cells, rows, cols)?.with_transform(self.transform))
    }

    /// Apply `f` to every cell, keeping shape and georeferencing
    pub fn map<U, F>(&self, f: F) -> Grid<U>
    where
        U: GridElement,
        F: Fn(Option<T>) -> Option<U>,
    {
        Grid {
            data: self.data.mapv(|c| f(c).filter(|v| !v.is_missing())),
            transform: self.transform,
            nodata: None,
        }
    }

    // Dimensions

    /// Number of rows (height)
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns (width)
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Fails with [`Error::ShapeMismatch`] unless `other` has the same shape
    pub fn ensure_same_shape<U: GridElement>(&self, other: &Grid<U>) -> Result<()> {
        let (er, ec) = self.shape();
        let (ar, ac) = other.shape();
        if (er, ec) != (ar, ac) {
            return Err(Error::ShapeMismatch { er, ec, ar, ac });
        }
        Ok(())
    }

    // Data access

    /// Cell at (row, col); `Ok(None)` means the cell is missing
    pub fn get(&self, row: usize, col: usize) -> Result<Option<T>> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Value at (row, col), `None` when missing or out of bounds
    pub fn value(&self, row: usize, col: usize) -> Option<T> {
        self.data.get((row, col)).copied().flatten()
    }

    /// Set cell at (row, col); NaN is stored as missing
    pub fn set(&mut self, row: usize, col: usize, cell: Option<T>) -> Result<()> {
        let (rows, cols) = self.shape();
        let slot = self
            .data
            .get_mut((row, col))
            .ok_or(Error::IndexOutOfBounds { row, col, rows, cols })?;
        *slot = cell.filter(|v| !v.is_missing());
        Ok(())
    }

    /// Iterate cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = Option<T>> + '_ {
        self.data.iter().copied()
    }

    /// Iterate the valid (non-missing) values in row-major order
    pub fn valid_values(&self) -> impl Iterator<Item = T> + '_ {
        self.data.iter().filter_map(|c| *c)
    }

    /// A view of the underlying cells
    pub fn view(&self) -> ArrayView2<'_, Option<T>> {
        self.data.view()
    }

    /// Consume the grid and return the underlying cells
    pub fn into_array(self) -> Array2<Option<T>> {
        self.data
    }

    /// Copy of the rectangle starting at (row, col), with adjusted georeferencing
    pub fn subgrid(&self, row: usize, col: usize, rows: usize, cols: usize) -> Result<Self> {
        if row + rows > self.rows() || col + cols > self.cols() {
            return Err(Error::IndexOutOfBounds {
                row: row + rows,
                col: col + cols,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        Ok(Self {
            data: self
                .data
                .slice(s![row..row + rows, col..col + cols])
                .to_owned(),
            transform: self.transform.shifted(col, row),
            nodata: self.nodata,
        })
    }

    /// Copy `src` into this grid with its upper-left cell at (row, col)
    pub fn paste(&mut self, row: usize, col: usize, src: ArrayView2<'_, Option<T>>) -> Result<()> {
        let (rows, cols) = src.dim();
        if row + rows > self.rows() || col + cols > self.cols() {
            return Err(Error::IndexOutOfBounds {
                row: row + rows,
                col: col + cols,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data
            .slice_mut(s![row..row + rows, col..col + cols])
            .assign(&src);
        Ok(())
    }

    // Metadata

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    /// Declared no-data sentinel carried over from the source file
    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// Cell size (grids are square; see [`GeoTransform::cell_size`])
    pub fn cell_size(&self) -> f64 {
        self.transform.cell_size()
    }

    /// Map bounds (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.cols(), self.rows())
    }

    /// Basic statistics over valid cells
    pub fn statistics(&self) -> GridStatistics<T> {
        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut sum = 0.0;
        let mut count = 0usize;

        for value in self.valid_values() {
            if min.map_or(true, |m| value < m) {
                min = Some(value);
            }
            if max.map_or(true, |m| value > m) {
                max = Some(value);
            }
            if let Some(v) = value.to_f64() {
                sum += v;
            }
            count += 1;
        }

        GridStatistics {
            min,
            max,
            mean: (count > 0).then(|| sum / count as f64),
            valid_count: count,
            missing_count: self.len() - count,
        }
    }
}

impl Grid<f64> {
    /// The 3x3 neighborhood centered on (row, col).
    ///
    /// `None` on the grid border and whenever any of the nine cells is
    /// missing; kernels never see a partial neighborhood.
    pub fn window(&self, row: usize, col: usize) -> Option<Window3x3> {
        let (rows, cols) = self.shape();
        if row == 0 || col == 0 || row + 1 >= rows || col + 1 >= cols {
            return None;
        }
        let mut z = [0.0; 9];
        for (k, slot) in z.iter_mut().enumerate() {
            *slot = self.data[(row + k / 3 - 1, col + k % 3 - 1)]?;
        }
        Some(Window3x3::new(z))
    }

    /// Row-major values with missing cells written as NaN, for writers
    pub fn to_nan_filled(&self) -> Vec<f64> {
        self.data.iter().map(|c| c.unwrap_or(f64::NAN)).collect()
    }
}

/// Basic statistics for a grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub missing_count: usize,
}
