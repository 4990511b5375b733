//! Untyped numeric inputs and their checked conversion to element types.

use crate::util::{ElementType, Error, Result};

/// A numeric value not yet bound to an element type.
///
/// Integers are held as `i128` so that inputs wider than `i64` can be
/// detected and rejected instead of silently wrapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i128),
    Float(f64),
}

/// Smallest f64 strictly above the i64 range (2^63).
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

impl Number {
    /// Convert to `i64`, failing if the value is out of range, non-finite
    /// or has a fractional part.
    pub fn to_i64(self) -> Result<i64> {
        match self {
            Self::Int(v) => i64::try_from(v).map_err(|_| self.range_error(ElementType::Int64)),
            Self::Float(v) => {
                if v.is_finite() && v.fract() == 0.0 && v >= -I64_UPPER && v < I64_UPPER {
                    Ok(v as i64)
                } else {
                    Err(self.range_error(ElementType::Int64))
                }
            }
        }
    }

    /// Convert to `f32`. Overflow rounds to infinity, as IEEE-754 does.
    pub fn to_f32(self) -> f32 {
        match self {
            Self::Int(v) => v as f32,
            Self::Float(v) => v as f32,
        }
    }

    fn range_error(self, ty: ElementType) -> Error {
        let value = match self {
            Self::Int(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
        };
        Error::Range { value, ty }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Number {
            #[inline]
            fn from(v: $t) -> Self {
                Self::Int(v as i128)
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64, isize, usize);

impl From<f32> for Number {
    #[inline]
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Number {
    #[inline]
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}
