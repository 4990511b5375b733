//! Gaussian splat point cloud in structure-of-arrays layout.

use crate::util::{Error, Result};

/// Spherical-harmonic coefficients per channel for degree 3 (excluding DC).
pub const SH_COEFFS: usize = 15;

/// Largest per-channel SH coefficient count accepted from configs and files.
pub const MAX_SH_COEFFS: usize = SH_COEFFS;

/// Per-point splat attributes, one column per renderer input.
///
/// Every column holds `len()` entries except the SH columns, which are
/// row-major `[len, sh_coeffs]`.
#[derive(Clone, Debug, PartialEq)]
pub struct SplatCloud {
    /// Positions x, y, z.
    pub positions: [Vec<f32>; 3],
    pub opacities: Vec<f32>,
    /// Log-space scales x, y, z.
    pub log_scales: [Vec<f32>; 3],
    /// Rotations w, x, y, z (unit quaternions).
    pub rotations: [Vec<f32>; 4],
    /// Base colors r, g, b.
    pub colors: [Vec<f32>; 3],
    /// SH coefficients r, g, b.
    pub sh: [Vec<f32>; 3],
    pub sh_coeffs: usize,
}

impl Default for SplatCloud {
    fn default() -> Self {
        Self::zeroed(0, SH_COEFFS)
    }
}

impl SplatCloud {
    /// All-zero cloud of `len` points.
    ///
    /// Panics if `len * sh_coeffs` overflows `usize`.
    pub fn zeroed(len: usize, sh_coeffs: usize) -> Self {
        let col = || vec![0.0f32; len];
        let sh = || vec![0.0f32; len * sh_coeffs];
        Self {
            positions: [col(), col(), col()],
            opacities: col(),
            log_scales: [col(), col(), col()],
            rotations: [col(), col(), col(), col()],
            colors: [col(), col(), col()],
            sh: [sh(), sh(), sh()],
            sh_coeffs,
        }
    }

    /// Empty cloud with room for `len` points.
    ///
    /// Panics if `len * sh_coeffs` overflows `usize`.
    pub fn with_capacity(len: usize, sh_coeffs: usize) -> Self {
        let col = || Vec::with_capacity(len);
        let sh = || Vec::with_capacity(len * sh_coeffs);
        Self {
            positions: [col(), col(), col()],
            opacities: col(),
            log_scales: [col(), col(), col()],
            rotations: [col(), col(), col(), col()],
            colors: [col(), col(), col()],
            sh: [sh(), sh(), sh()],
            sh_coeffs,
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.opacities.len()
    }

    /// Check if the cloud has no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check that every column agrees on the point count.
    pub fn validate(&self) -> Result<()> {
        let n = self.len();
        let columns = self
            .positions
            .iter()
            .chain(&self.log_scales)
            .chain(&self.rotations)
            .chain(&self.colors);
        for (i, col) in columns.enumerate() {
            if col.len() != n {
                return Err(Error::invalid(format!(
                    "column {} holds {} points, expected {}",
                    i,
                    col.len(),
                    n
                )));
            }
        }
        for (c, col) in self.sh.iter().enumerate() {
            if n.checked_mul(self.sh_coeffs) != Some(col.len()) {
                return Err(Error::invalid(format!(
                    "SH channel {} holds {} coefficients, expected {}x{}",
                    c,
                    col.len(),
                    n,
                    self.sh_coeffs
                )));
            }
        }
        Ok(())
    }

    /// Axis-aligned bounds of the positions, or None when empty.
    pub fn bounds(&self) -> Option<(glam::Vec3, glam::Vec3)> {
        if self.is_empty() {
            return None;
        }
        let [xs, ys, zs] = &self.positions;
        let mut min = glam::Vec3::splat(f32::MAX);
        let mut max = glam::Vec3::splat(f32::MIN);
        for i in 0..self.len() {
            let p = glam::Vec3::new(xs[i], ys[i], zs[i]);
            min = min.min(p);
            max = max.max(p);
        }
        Some((min, max))
    }
}
