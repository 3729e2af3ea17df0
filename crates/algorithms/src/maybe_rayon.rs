//! Row-parallel cell evaluation with a sequential fallback.
//!
//! With the `parallel` feature each output row is filled on the rayon pool;
//! without it (e.g. for WASM builds) rows are filled in order. Every cell is
//! written exactly once, so both paths produce identical buffers.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Evaluate `f(row, col)` for every cell of a `rows` x `cols` grid, row-major.
#[cfg(feature = "parallel")]
pub(crate) fn map_cells<T, F>(rows: usize, cols: usize, fill: T, f: F) -> Vec<T>
where
    T: Clone + Send + Sync,
    F: Fn(usize, usize) -> T + Sync + Send,
{
    let mut out = vec![fill; rows * cols];
    if out.is_empty() {
        return out;
    }
    out.par_chunks_mut(cols)
        .enumerate()
        .for_each(|(row, line)| {
            for (col, slot) in line.iter_mut().enumerate() {
                *slot = f(row, col);
            }
        });
    out
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn map_cells<T, F>(rows: usize, cols: usize, fill: T, f: F) -> Vec<T>
where
    T: Clone + Send + Sync,
    F: Fn(usize, usize) -> T + Sync + Send,
{
    let mut out = vec![fill; rows * cols];
    if out.is_empty() {
        return out;
    }
    for (row, line) in out.chunks_mut(cols).enumerate() {
        for (col, slot) in line.iter_mut().enumerate() {
            *slot = f(row, col);
        }
    }
    out
}
