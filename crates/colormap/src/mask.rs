//! Threshold masks: grids reduced to a single highlight value.

use serde::{Deserialize, Serialize};
use terrashade_core::ScalarGrid;

/// Value written to cells selected by a mask.
pub const HIGHLIGHT: f64 = 1.0;

/// Keep cells where `predicate` holds as [`HIGHLIGHT`], everything else missing.
///
/// ```
/// use terrashade_colormap::mask;
/// use terrashade_core::Grid;
///
/// let slope = Grid::from_vec(vec![10.0, 30.0, 60.0], 1, 3).unwrap();
/// let steep = mask(&slope, |v| 25.0 < v && v < 50.0);
/// assert_eq!(steep.iter().collect::<Vec<_>>(), vec![None, Some(1.0), None]);
/// ```
pub fn mask<F: Fn(f64) -> bool>(grid: &ScalarGrid, predicate: F) -> ScalarGrid {
    mask_with(grid, predicate, HIGHLIGHT)
}

/// Like [`mask`] with a caller-chosen highlight value.
pub fn mask_with<F: Fn(f64) -> bool>(grid: &ScalarGrid, predicate: F, value: f64) -> ScalarGrid {
    grid.map(|cell| cell.filter(|&v| predicate(v)).map(|_| value))
}

/// Reusable mask predicates, configurable from JSON.
///
/// Range bounds are exclusive. `Bearing` selects compass directions
/// clockwise from the first bearing to the second, wrapping through north,
/// and never selects the flat-aspect sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    Between(f64, f64),
    Above(f64),
    Below(f64),
    Bearing(f64, f64),
}

impl Threshold {
    pub fn contains(&self, v: f64) -> bool {
        match *self {
            Self::Between(lo, hi) => lo < v && v < hi,
            Self::Above(x) => v > x,
            Self::Below(x) => v < x,
            Self::Bearing(from, to) => {
                if !(0.0..360.0).contains(&v) {
                    return false;
                }
                let (from, to) = (from.rem_euclid(360.0), to.rem_euclid(360.0));
                if from <= to {
                    from <= v && v <= to
                } else {
                    v >= from || v <= to
                }
            }
        }
    }

    pub fn mask(&self, grid: &ScalarGrid) -> ScalarGrid {
        mask(grid, |v| self.contains(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrashade_core::Grid;

    fn row(values: &[f64]) -> ScalarGrid {
        Grid::from_vec(values.to_vec(), 1, values.len()).unwrap()
    }

    fn cells(grid: &ScalarGrid) -> Vec<Option<f64>> {
        grid.iter().collect()
    }

    #[test]
    fn between_is_exclusive() {
        let grid = row(&[10.0, 25.0, 30.0, 50.0, 60.0]);
        let out = Threshold::Between(25.0, 50.0).mask(&grid);
        assert_eq!(cells(&out), vec![None, None, Some(HIGHLIGHT), None, None]);
    }

    #[test]
    fn missing_stays_missing() {
        let grid = row(&[f64::NAN, 5.0]);
        let out = mask(&grid, |_| true);
        assert_eq!(cells(&out), vec![None, Some(1.0)]);
        assert_eq!(out.transform(), grid.transform());
    }

    #[test]
    fn custom_highlight() {
        let out = mask_with(&row(&[1.0, 2.0]), |v| v > 1.5, 7.0);
        assert_eq!(cells(&out), vec![None, Some(7.0)]);
    }

    #[test]
    fn above_below() {
        let grid = row(&[1.0, 2.0, 3.0]);
        assert_eq!(cells(&Threshold::Above(2.0).mask(&grid)), vec![None, None, Some(1.0)]);
        assert_eq!(cells(&Threshold::Below(2.0).mask(&grid)), vec![Some(1.0), None, None]);
    }

    #[test]
    fn bearing_wraps_through_north() {
        let north = Threshold::Bearing(315.0, 45.0);
        assert!(north.contains(0.0));
        assert!(north.contains(350.0));
        assert!(north.contains(30.0));
        assert!(!north.contains(90.0));
        assert!(!north.contains(-1.0));

        let south = Threshold::Bearing(135.0, 225.0);
        assert!(south.contains(180.0));
        assert!(!south.contains(0.0));
        assert!(!south.contains(-1.0));
    }

    #[test]
    fn json_form() {
        let t: Threshold = serde_json::from_str(r#"{"between": [25.0, 50.0]}"#).unwrap();
        assert_eq!(t, Threshold::Between(25.0, 50.0));
        let t: Threshold = serde_json::from_str(r#"{"above": 3}"#).unwrap();
        assert_eq!(t, Threshold::Above(3.0));
    }
}
