//! Complete 3x3 neighborhoods for kernel operations

/// Nine valid elevations around a center cell, row-major:
///
/// ```text
/// a b c      (NW) (N) (NE)
/// d e f  ->  (W)  (C) (E)
/// g h i      (SW) (S) (SE)
/// ```
///
/// Only built by [`Grid::window`](crate::Grid::window), which guarantees that
/// all nine cells exist and are valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window3x3 {
    z: [f64; 9],
}

impl Window3x3 {
    pub fn new(z: [f64; 9]) -> Self {
        Self { z }
    }

    /// Value at offset (dr, dc), each in -1..=1
    #[inline]
    pub fn at(&self, dr: isize, dc: isize) -> f64 {
        debug_assert!(dr.abs() <= 1 && dc.abs() <= 1);
        self.z[((dr + 1) * 3 + dc + 1) as usize]
    }

    #[inline]
    pub fn center(&self) -> f64 {
        self.z[4]
    }

    /// All nine values, row-major
    pub fn values(&self) -> &[f64; 9] {
        &self.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_row_major_layout() {
        let w = Window3x3::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(w.at(-1, -1), 1.0);
        assert_eq!(w.at(-1, 1), 3.0);
        assert_eq!(w.at(0, -1), 4.0);
        assert_eq!(w.at(1, 0), 8.0);
        assert_eq!(w.center(), 5.0);
    }
}
