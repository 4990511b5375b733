//! The standard benchmark dataset suite.

use std::path::Path;

use rayon::prelude::*;
use tracing::info;

use super::{Fixture, SceneConfig, WriteStats};
use crate::util::Result;

/// Splat counts of the standard suite.
pub const DATASET_SIZES: [usize; 5] = [100_000, 500_000, 1_000_000, 1_500_000, 2_000_000];

/// Default output directory of the suite.
pub const DEFAULT_DIR: &str = "data";

/// File name for a dataset of `n` splats: `<n/1000>k.in`.
pub fn dataset_file_name(n: usize) -> String {
    format!("{}k.in", n / 1000)
}

/// Generate one fixture per size into `dir`.
///
/// Datasets are written in parallel, each to its own file. Results come
/// back in the order of `sizes`; the first failure is returned.
pub fn generate_suite(
    dir: impl AsRef<Path>,
    sizes: &[usize],
    config: &SceneConfig,
) -> Result<Vec<WriteStats>> {
    let dir = dir.as_ref();
    info!(dir = %dir.display(), datasets = sizes.len(), "generating suite");
    sizes
        .par_iter()
        .map(|&n| Fixture::generate(n, config).write(dir.join(dataset_file_name(n))))
        .collect()
}
