//! Homogeneous element buffers.

use std::fmt;

use crate::util::{ElementType, Result};

use super::{Number, Scalar};

mod sealed {
    pub trait Sealed {}
    impl Sealed for i64 {}
    impl Sealed for f32 {}
}

/// Rust primitives that can be stored as dump elements.
///
/// Implemented for `i64` and `f32` only.
pub trait Element: sealed::Sealed + Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The corresponding ElementType.
    const ELEMENT_TYPE: ElementType;

    /// Size of this type in bytes.
    const SIZE: usize = std::mem::size_of::<Self>();

    #[doc(hidden)]
    fn into_scalar(self) -> Scalar;

    #[doc(hidden)]
    fn into_elements(data: Vec<Self>) -> Elements;

    #[doc(hidden)]
    fn slice(view: ElementsRef<'_>) -> Option<&[Self]>;
}

impl Element for i64 {
    const ELEMENT_TYPE: ElementType = ElementType::Int64;

    fn into_scalar(self) -> Scalar {
        Scalar::Int64(self)
    }

    fn into_elements(data: Vec<Self>) -> Elements {
        Elements::Int64(data)
    }

    fn slice(view: ElementsRef<'_>) -> Option<&[Self]> {
        match view {
            ElementsRef::Int64(v) => Some(v),
            ElementsRef::Float32(_) => None,
        }
    }
}

impl Element for f32 {
    const ELEMENT_TYPE: ElementType = ElementType::Float32;

    fn into_scalar(self) -> Scalar {
        Scalar::Float32(self)
    }

    fn into_elements(data: Vec<Self>) -> Elements {
        Elements::Float32(data)
    }

    fn slice(view: ElementsRef<'_>) -> Option<&[Self]> {
        match view {
            ElementsRef::Float32(v) => Some(v),
            ElementsRef::Int64(_) => None,
        }
    }
}

/// Owned, homogeneous element buffer in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub enum Elements {
    Int64(Vec<i64>),
    Float32(Vec<f32>),
}

/// Borrowed view of an element buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ElementsRef<'a> {
    Int64(&'a [i64]),
    Float32(&'a [f32]),
}

impl Elements {
    /// Element type of the buffer.
    pub fn element_type(&self) -> ElementType {
        self.view().element_type()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.view().len()
    }

    /// Check if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the buffer.
    pub fn view(&self) -> ElementsRef<'_> {
        match self {
            Self::Int64(v) => ElementsRef::Int64(v),
            Self::Float32(v) => ElementsRef::Float32(v),
        }
    }

    /// Convert every element to `ty` using the same rules as scalar
    /// construction. Buffers already of type `ty` are returned untouched.
    pub fn convert(self, ty: ElementType) -> Result<Self> {
        match (self, ty) {
            (same @ Self::Int64(_), ElementType::Int64) => Ok(same),
            (same @ Self::Float32(_), ElementType::Float32) => Ok(same),
            (Self::Int64(v), ElementType::Float32) => {
                Ok(Self::Float32(v.into_iter().map(|x| Number::from(x).to_f32()).collect()))
            }
            (Self::Float32(v), ElementType::Int64) => v
                .into_iter()
                .map(|x| Number::from(x).to_i64())
                .collect::<Result<Vec<_>>>()
                .map(Self::Int64),
        }
    }

    /// Build a buffer of type `ty` from untyped numbers.
    pub fn from_numbers(ty: ElementType, numbers: &[Number]) -> Result<Self> {
        match ty {
            ElementType::Int64 => numbers
                .iter()
                .map(|n| n.to_i64())
                .collect::<Result<Vec<_>>>()
                .map(Self::Int64),
            ElementType::Float32 => Ok(Self::Float32(numbers.iter().map(|n| n.to_f32()).collect())),
        }
    }
}

impl<'a> ElementsRef<'a> {
    /// Element type of the view.
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Int64(_) => ElementType::Int64,
            Self::Float32(_) => ElementType::Float32,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Int64(v) => v.len(),
            Self::Float32(v) => v.len(),
        }
    }

    /// Check if the view holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Payload size in bytes.
    pub fn num_bytes(&self) -> usize {
        self.len() * self.element_type().num_bytes()
    }

    /// Typed slice access. Returns None if `T` does not match.
    pub fn as_slice<T: Element>(&self) -> Option<&'a [T]> {
        T::slice(*self)
    }

    /// Compare two views element by element, floats by bit pattern.
    pub fn bitwise_eq(&self, other: &ElementsRef<'_>) -> bool {
        match (self, other) {
            (Self::Int64(a), ElementsRef::Int64(b)) => a == b,
            (Self::Float32(a), ElementsRef::Float32(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            _ => false,
        }
    }
}

impl<T: Element> From<Vec<T>> for Elements {
    fn from(v: Vec<T>) -> Self {
        T::into_elements(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Error;

    #[test]
    fn test_convert_int_to_float() {
        let e = Elements::from(vec![1i64, -2, 3]).convert(ElementType::Float32).unwrap();
        assert_eq!(e, Elements::Float32(vec![1.0, -2.0, 3.0]));
    }

    #[test]
    fn test_convert_float_to_int() {
        let e = Elements::from(vec![1.0f32, 2.0]).convert(ElementType::Int64).unwrap();
        assert_eq!(e, Elements::Int64(vec![1, 2]));

        let err = Elements::from(vec![1.0f32, 2.5]).convert(ElementType::Int64).unwrap_err();
        assert!(matches!(err, Error::Range { .. }));
    }

    #[test]
    fn test_from_numbers() {
        let nums = [Number::from(1), Number::from(2.0f64)];
        assert_eq!(
            Elements::from_numbers(ElementType::Int64, &nums).unwrap(),
            Elements::Int64(vec![1, 2])
        );
        assert!(Elements::from_numbers(ElementType::Int64, &[Number::from(u64::MAX)]).is_err());
    }

    #[test]
    fn test_bitwise_eq() {
        let a = [0.0f32, f32::NAN];
        let b = [-0.0f32, f32::NAN];
        let view_a = ElementsRef::Float32(&a);
        assert!(view_a.bitwise_eq(&ElementsRef::Float32(&a)));
        assert!(!view_a.bitwise_eq(&ElementsRef::Float32(&b)));
        assert!(!view_a.bitwise_eq(&ElementsRef::Int64(&[0, 0])));
    }

    #[test]
    fn test_element_sizes() {
        assert_eq!(<i64 as Element>::SIZE, ElementType::Int64.num_bytes());
        assert_eq!(<f32 as Element>::SIZE, ElementType::Float32.num_bytes());
    }

    #[test]
    fn test_typed_slice() {
        let e = Elements::from(vec![1.5f32]);
        assert_eq!(e.view().as_slice::<f32>(), Some(&[1.5f32][..]));
        assert_eq!(e.view().as_slice::<i64>(), None);
        assert_eq!(e.view().num_bytes(), 4);
    }
}
