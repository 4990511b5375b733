//! Textual rendering of values.
//!
//! Values print the way the consuming runtime writes literals: every
//! element carries its type suffix and arrays nest in row-major order,
//! e.g. `800i64` or `[[0.0f32, 1.0f32], [2.0f32, 3.0f32]]`. Empty arrays
//! print as `empty([0]f32)`.

use std::fmt;

use super::{ElementsRef, Value};

impl ElementsRef<'_> {
    /// Write element `index` with its type suffix.
    pub(crate) fn fmt_element(&self, index: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int64(v) => write!(f, "{}i64", v[index]),
            Self::Float32(v) => fmt_f32(v[index], f),
        }
    }
}

fn fmt_f32(v: f32, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if v.is_nan() {
        write!(f, "f32.nan")
    } else if v.is_infinite() {
        write!(f, "{}f32.inf", if v < 0.0 { "-" } else { "" })
    } else {
        // Debug keeps a trailing ".0" on integral values.
        write!(f, "{:?}f32", v)
    }
}

fn fmt_nested(
    elems: &ElementsRef<'_>,
    dims: &[u64],
    offset: usize,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let (&outer, inner) = match dims.split_first() {
        Some(split) => split,
        None => return elems.fmt_element(offset, f),
    };
    let stride: u64 = inner.iter().product();
    write!(f, "[")?;
    for i in 0..outer {
        if i > 0 {
            write!(f, ", ")?;
        }
        fmt_nested(elems, inner, offset + (i * stride) as usize, f)?;
    }
    write!(f, "]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elems = self.elements();
        if self.is_scalar() {
            return elems.fmt_element(0, f);
        }
        if elems.is_empty() {
            write!(f, "empty(")?;
            for d in self.shape() {
                write!(f, "[{}]", d)?;
            }
            return write!(f, "{})", self.element_type());
        }
        fmt_nested(&elems, self.shape(), 0, f)
    }
}

impl Value {
    /// Short one-line rendering showing at most `max` leading elements.
    pub fn preview(&self, max: usize) -> String {
        let elems = self.elements();
        if self.is_scalar() || elems.len() <= max {
            return self.to_string();
        }
        struct Head<'a>(ElementsRef<'a>, usize);
        impl fmt::Display for Head<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                for i in 0..self.1 {
                    self.0.fmt_element(i, f)?;
                    write!(f, ", ")?;
                }
                write!(f, "...")
            }
        }
        format!("[{}] ({} elements)", Head(elems, max), elems.len())
    }
}
