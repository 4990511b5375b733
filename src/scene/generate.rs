//! Deterministic uniform-cube point generator.

use tracing::debug;

use super::{SceneConfig, SplatCloud};

/// Smallest `side` with `side^3 >= n`.
pub fn cube_side(n: usize) -> usize {
    let mut side = (n as f64).cbrt().round() as usize;
    while side.saturating_pow(3) < n {
        side += 1;
    }
    while side > 0 && (side - 1).pow(3) >= n {
        side -= 1;
    }
    side
}

/// `num` evenly spaced samples over `[start, stop]`, endpoint included.
///
/// Computed in f64 and rounded to f32 once per sample; the last sample is
/// exactly `stop`.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f32> {
    match num {
        0 => Vec::new(),
        1 => vec![start as f32],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut out: Vec<f32> = (0..num).map(|i| (i as f64 * step + start) as f32).collect();
            out[num - 1] = stop as f32;
            out
        }
    }
}

/// Generate `n` splats on a uniform grid filling the cube
/// `[-extent, extent]^3`.
///
/// Grid points are ordered with `y` slowest, then `x`, then `z` fastest,
/// and the first `n` are kept. Colors map each coordinate linearly onto
/// `[0, 1]`; rotations are identity; opacity, scale and SH coefficients
/// come from `config`.
pub fn uniform_cube(n: usize, config: &SceneConfig) -> SplatCloud {
    let side = cube_side(n);
    let extent = config.extent;
    let axis = linspace(-(extent as f64), extent as f64, side);
    debug!(n, side, "generating uniform cube");

    let mut cloud = SplatCloud::zeroed(0, config.sh_coeffs);
    for col in cloud.positions.iter_mut() {
        col.reserve_exact(n);
    }
    'grid: for &y in &axis {
        for &x in &axis {
            for &z in &axis {
                if cloud.positions[0].len() == n {
                    break 'grid;
                }
                cloud.positions[0].push(x);
                cloud.positions[1].push(y);
                cloud.positions[2].push(z);
            }
        }
    }

    let log_scale = config.log_scale();
    cloud.opacities = vec![config.opacity; n];
    cloud.log_scales = [vec![log_scale; n], vec![log_scale; n], vec![log_scale; n]];
    cloud.rotations = [vec![1.0; n], vec![0.0; n], vec![0.0; n], vec![0.0; n]];
    cloud.colors = [0, 1, 2].map(|a| {
        cloud.positions[a]
            .iter()
            .map(|&p| (p + extent) / (2.0 * extent))
            .collect()
    });
    cloud.sh = [0, 1, 2].map(|_| vec![0.0; n * config.sh_coeffs]);
    cloud
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_side() {
        assert_eq!(cube_side(0), 0);
        assert_eq!(cube_side(1), 1);
        assert_eq!(cube_side(2), 2);
        assert_eq!(cube_side(8), 2);
        assert_eq!(cube_side(9), 3);
        assert_eq!(cube_side(27), 3);
        assert_eq!(cube_side(28), 4);
        assert_eq!(cube_side(100_000), 47);
        assert_eq!(cube_side(1_000_000), 100);
        assert_eq!(cube_side(2_000_000), 126);
    }

    #[test]
    fn test_linspace() {
        assert!(linspace(-1.0, 1.0, 0).is_empty());
        assert_eq!(linspace(-1.0, 1.0, 1), vec![-1.0]);
        assert_eq!(linspace(-1.0, 1.0, 2), vec![-1.0, 1.0]);
        assert_eq!(linspace(-1.0, 1.0, 5), vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        let l = linspace(-1.0, 1.0, 47);
        assert_eq!(l[46], 1.0);
    }

    #[test]
    fn test_eight_points() {
        let cloud = uniform_cube(8, &SceneConfig::default());
        cloud.validate().unwrap();
        assert_eq!(cloud.len(), 8);
        assert_eq!(cloud.positions[0], vec![-1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0]);
        assert_eq!(cloud.positions[1], vec![-1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(cloud.positions[2], vec![-1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0]);
        assert_eq!(cloud.colors[0], vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0]);
        assert!(cloud.rotations[0].iter().all(|&w| w == 1.0));
        assert!(cloud.opacities.iter().all(|&o| o == 0.0));
        assert!(cloud.log_scales[2].iter().all(|&s| s == (0.01f64).ln() as f32));
        assert_eq!(cloud.sh[1].len(), 8 * 15);
    }

    #[test]
    fn test_truncation_and_colors() {
        let cloud = uniform_cube(10, &SceneConfig::default());
        assert_eq!(cloud.len(), 10);
        // side 3: third point is (x=-1, y=-1, z=1)
        assert_eq!(cloud.positions[2][2], 1.0);
        for c in &cloud.colors {
            assert!(c.iter().all(|&v| (0.0..=1.0).contains(&v)));
        }
    }

    #[test]
    fn test_extent() {
        let config = SceneConfig { extent: 2.0, ..Default::default() };
        let cloud = uniform_cube(27, &config);
        let (min, max) = cloud.bounds().unwrap();
        assert_eq!(min, glam::Vec3::splat(-2.0));
        assert_eq!(max, glam::Vec3::splat(2.0));
        assert_eq!(cloud.colors[0][0], 0.0);
        assert_eq!(cloud.colors[1][26], 1.0);
    }

    #[test]
    fn test_deterministic() {
        let a = uniform_cube(100, &SceneConfig::default());
        let b = uniform_cube(100, &SceneConfig::default());
        assert_eq!(a, b);
    }
}
