//! Array shapes.
//!
//! A shape lists the size of every dimension of an array value, outermost
//! first. Shapes always have rank >= 1; scalars carry no shape at all.

use smallvec::SmallVec;

use super::{Error, Result};

/// Largest rank the wire format can express in its rank byte.
pub const MAX_RANK: usize = u8::MAX as usize;

/// Dimensions of an array value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    /// Size of each dimension. Never empty.
    dims: SmallVec<[u64; 4]>,
}

impl Shape {
    /// Create a shape from signed dimension sizes.
    ///
    /// Fails if the list is empty, longer than [`MAX_RANK`], or holds a
    /// negative size.
    pub fn new(dims: &[i64]) -> Result<Self> {
        if let Some(&neg) = dims.iter().find(|&&d| d < 0) {
            return Err(Error::InvalidShape(format!("negative dimension {}", neg)));
        }
        Self::from_dims(dims.iter().map(|&d| d as u64).collect())
    }

    /// Create a shape from unsigned dimension sizes.
    pub fn from_slice(dims: &[u64]) -> Result<Self> {
        Self::from_dims(SmallVec::from_slice(dims))
    }

    /// Create a 1D shape.
    pub fn d1(len: u64) -> Self {
        Self { dims: smallvec::smallvec![len] }
    }

    /// Create a 2D shape.
    pub fn d2(rows: u64, cols: u64) -> Self {
        Self { dims: smallvec::smallvec![rows, cols] }
    }

    fn from_dims(dims: SmallVec<[u64; 4]>) -> Result<Self> {
        if dims.is_empty() {
            return Err(Error::InvalidShape("array shape must have rank >= 1".into()));
        }
        if dims.len() > MAX_RANK {
            return Err(Error::InvalidShape(format!(
                "rank {} exceeds maximum of {}",
                dims.len(),
                MAX_RANK
            )));
        }
        let shape = Self { dims };
        shape.checked_num_elements()?;
        Ok(shape)
    }

    /// Get the rank (number of dimensions). Always in `1..=255`.
    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Get the size of a specific dimension.
    pub fn size(&self, dim: usize) -> Option<u64> {
        self.dims.get(dim).copied()
    }

    /// Get all dimension sizes as a slice.
    pub fn dims(&self) -> &[u64] {
        &self.dims
    }

    /// Total number of elements (product of all dimensions).
    pub fn num_elements(&self) -> u64 {
        // Overflow is rejected at construction.
        self.dims.iter().product()
    }

    fn checked_num_elements(&self) -> Result<u64> {
        self.dims
            .iter()
            .try_fold(1u64, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| Error::InvalidShape(format!("element count of {} overflows u64", self)))
    }
}

impl From<usize> for Shape {
    fn from(len: usize) -> Self {
        Self::d1(len as u64)
    }
}

impl From<(usize, usize)> for Shape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Self::d2(rows as u64, cols as u64)
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, s) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, " x ")?;
            }
            write!(f, "{}", s)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_1d() {
        let s = Shape::d1(10);
        assert_eq!(s.rank(), 1);
        assert_eq!(s.size(0), Some(10));
        assert_eq!(s.num_elements(), 10);
    }

    #[test]
    fn test_2d() {
        let s = Shape::new(&[8, 15]).unwrap();
        assert_eq!(s.rank(), 2);
        assert_eq!(s.dims(), &[8, 15]);
        assert_eq!(s.num_elements(), 120);
        assert_eq!(format!("{}", s), "[8 x 15]");
    }

    #[test]
    fn test_degenerate() {
        assert_eq!(Shape::new(&[1]).unwrap().num_elements(), 1);
        assert_eq!(Shape::new(&[0]).unwrap().num_elements(), 0);
        assert_eq!(Shape::new(&[4, 0, 3]).unwrap().num_elements(), 0);
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(Shape::new(&[]), Err(Error::InvalidShape(_))));
        assert!(matches!(Shape::new(&[3, -1]), Err(Error::InvalidShape(_))));
        assert!(matches!(Shape::from_slice(&[]), Err(Error::InvalidShape(_))));
        assert!(matches!(
            Shape::from_slice(&[u64::MAX, 2]),
            Err(Error::InvalidShape(_))
        ));
        let too_deep = vec![1u64; MAX_RANK + 1];
        assert!(matches!(Shape::from_slice(&too_deep), Err(Error::InvalidShape(_))));
        assert!(Shape::from_slice(&vec![1u64; MAX_RANK]).is_ok());
    }

    #[test]
    fn test_from_conversions() {
        let s: Shape = 100.into();
        assert_eq!(s.rank(), 1);
        let s: Shape = (8, 15).into();
        assert_eq!(s.dims(), &[8, 15]);
    }
}
