//! Element trait for grid cell values

use num_traits::NumCast;
use std::fmt::Debug;

/// Trait for types that can be stored in a grid cell.
///
/// Missing cells are stored as `None` in the grid itself, so implementors only
/// need to say which raw values can never be valid samples (NaN for floats).
pub trait GridElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Send + Sync + 'static
{
    /// Whether a raw value must be treated as missing regardless of any
    /// declared no-data sentinel.
    fn is_missing(&self) -> bool;

    /// Whether this type is a floating point type
    fn is_float() -> bool;

    /// Convert self to f64
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }

    /// Convert from f64, `None` if the value is not representable
    fn from_f64(value: f64) -> Option<Self> {
        NumCast::from(value)
    }
}

macro_rules! impl_grid_element_int {
    ($($t:ty),*) => {
        $(
            impl GridElement for $t {
                fn is_missing(&self) -> bool {
                    false
                }

                fn is_float() -> bool {
                    false
                }
            }
        )*
    };
}

macro_rules! impl_grid_element_float {
    ($($t:ty),*) => {
        $(
            impl GridElement for $t {
                fn is_missing(&self) -> bool {
                    self.is_nan()
                }

                fn is_float() -> bool {
                    true
                }
            }
        )*
    };
}

impl_grid_element_int!(i8, i16, i32, i64, u8, u16, u32, u64);
impl_grid_element_float!(f32, f64);
