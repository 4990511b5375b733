//! Value model - the in-memory unit handed to the encoder.
//!
//! A [`Value`] is either a [`Scalar`] or a dense row-major [`Array`].
//! Both carry an explicit [`ElementType`]; arrays also carry a [`Shape`]
//! whose element count always equals the buffer length. Values are
//! immutable once built.
//!
//! ```
//! use splatdump::value::Value;
//! use splatdump::util::ElementType;
//!
//! let w = Value::make_scalar(ElementType::Int64, 800).unwrap();
//! let xs = Value::array(3usize, vec![1.0f32, 2.0, 3.0]).unwrap();
//! assert_eq!(w.rank(), 0);
//! assert_eq!(xs.shape(), &[3]);
//! ```

mod elements;
mod number;
mod text;

pub use elements::{Element, Elements, ElementsRef};
pub use number::Number;

use crate::util::{ElementType, Error, Result, Shape};

/// A single element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    Int64(i64),
    Float32(f32),
}

impl Scalar {
    /// Element type of the scalar.
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Int64(_) => ElementType::Int64,
            Self::Float32(_) => ElementType::Float32,
        }
    }

    /// View the scalar as a one-element buffer.
    pub fn elements(&self) -> ElementsRef<'_> {
        match self {
            Self::Int64(v) => ElementsRef::Int64(std::slice::from_ref(v)),
            Self::Float32(v) => ElementsRef::Float32(std::slice::from_ref(v)),
        }
    }
}

/// Dense n-dimensional array with rank >= 1.
#[derive(Clone, Debug, PartialEq)]
pub struct Array {
    shape: Shape,
    data: Elements,
}

impl Array {
    /// Create an array, checking that `data` fills `shape` exactly.
    pub fn new(shape: Shape, data: Elements) -> Result<Self> {
        let expected = shape.num_elements();
        if data.len() as u64 != expected {
            return Err(Error::ShapeMismatch { expected, actual: data.len() });
        }
        Ok(Self { shape, data })
    }

    /// Array shape.
    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Flattened elements in row-major order.
    #[inline]
    pub fn elements(&self) -> ElementsRef<'_> {
        self.data.view()
    }

    /// Element type of the array.
    #[inline]
    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    /// Take the element buffer out of the array.
    pub fn into_elements(self) -> Elements {
        self.data
    }
}

/// A scalar or an array.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Array(Array),
}

impl Value {
    /// Build a scalar of type `ty`.
    ///
    /// Fails with [`Error::Range`] if `value` cannot be represented in `ty`.
    /// Float overflow to infinity is not an error.
    pub fn make_scalar(ty: ElementType, value: impl Into<Number>) -> Result<Self> {
        let value = value.into();
        let scalar = match ty {
            ElementType::Int64 => Scalar::Int64(value.to_i64()?),
            ElementType::Float32 => Scalar::Float32(value.to_f32()),
        };
        Ok(Self::Scalar(scalar))
    }

    /// Build an array of type `ty` from signed dimension sizes.
    ///
    /// Fails with [`Error::InvalidShape`] for an empty shape or a negative
    /// dimension, and with [`Error::ShapeMismatch`] if `data` does not hold
    /// exactly `product(shape)` elements. Elements of another numeric kind
    /// are converted to `ty` under the same rules as [`Value::make_scalar`].
    pub fn make_array(ty: ElementType, shape: &[i64], data: impl Into<Elements>) -> Result<Self> {
        let shape = Shape::new(shape)?;
        let data = data.into();
        let expected = shape.num_elements();
        if data.len() as u64 != expected {
            return Err(Error::ShapeMismatch { expected, actual: data.len() });
        }
        Ok(Self::Array(Array::new(shape, data.convert(ty)?)?))
    }

    /// Build a scalar from a typed element.
    pub fn scalar<T: Element>(value: T) -> Self {
        Self::Scalar(value.into_scalar())
    }

    /// Build an array from a typed buffer.
    pub fn array<T: Element>(shape: impl Into<Shape>, data: Vec<T>) -> Result<Self> {
        Array::new(shape.into(), T::into_elements(data)).map(Self::Array)
    }

    /// Element type tag.
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Scalar(s) => s.element_type(),
            Self::Array(a) => a.element_type(),
        }
    }

    /// Rank: 0 for scalars, the shape length for arrays.
    pub fn rank(&self) -> usize {
        match self {
            Self::Scalar(_) => 0,
            Self::Array(a) => a.shape().rank(),
        }
    }

    /// Shape; empty for scalars.
    pub fn shape(&self) -> &[u64] {
        match self {
            Self::Scalar(_) => &[],
            Self::Array(a) => a.shape().dims(),
        }
    }

    /// Flattened row-major elements; one element for scalars.
    pub fn elements(&self) -> ElementsRef<'_> {
        match self {
            Self::Scalar(s) => s.elements(),
            Self::Array(a) => a.elements(),
        }
    }

    /// Check if this is a scalar.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// Typed scalar access.
    pub fn as_scalar<T: Element>(&self) -> Option<T> {
        match self {
            Self::Scalar(s) => s.elements().as_slice::<T>().map(|v| v[0]),
            Self::Array(_) => None,
        }
    }

    /// Typed array access.
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        match self {
            Self::Scalar(_) => None,
            Self::Array(a) => a.elements().as_slice::<T>(),
        }
    }

    /// Structural equality with floats compared by bit pattern.
    pub fn bitwise_eq(&self, other: &Value) -> bool {
        self.is_scalar() == other.is_scalar()
            && self.shape() == other.shape()
            && self.elements().bitwise_eq(&other.elements())
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Self::Scalar(s)
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Self::Array(a)
    }
}
