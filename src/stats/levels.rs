use std::f64::consts::PI;

use itertools::Itertools;
use thiserror::Error;
use tracing::debug;

use crate::data::PointCloud;

/// Probability mass enclosed by the 1σ, 2σ and 3σ contours.
pub const SIGMA_MASSES: [f64; 3] = [0.68, 0.95, 0.997];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LevelError {
    #[error("No densities to compute levels from")]
    Empty,

    #[error("Mass must lie in (0, 1], got {0}")]
    InvalidMass(f64),
}

/// Density of the standard bivariate normal.
pub fn standard_normal_pdf(x: f64, y: f64) -> f64 {
    (-(x * x + y * y) / 2.0).exp() / (2.0 * PI)
}

/// Density thresholds enclosing each of `masses`, estimated from densities evaluated at
/// samples of the same distribution.
///
/// The densities are sorted ascending and the level for mass `p` is the element at
/// `floor((1 - p) * N)`.
pub fn density_levels(densities: &[f64], masses: &[f64]) -> Result<Vec<f64>, LevelError> {
    if densities.is_empty() {
        return Err(LevelError::Empty);
    }
    if let Some(&bad) = masses.iter().find(|&&p| !(p > 0.0 && p <= 1.0)) {
        return Err(LevelError::InvalidMass(bad));
    }

    let sorted = densities.iter().copied().sorted_by(f64::total_cmp).collect_vec();
    let n = sorted.len();

    Ok(masses
        .iter()
        .map(|&p| {
            let idx = (((1.0 - p) * n as f64) as usize).min(n - 1);
            sorted[idx]
        })
        .collect())
}

/// Closed-form standard-normal density level enclosing `mass`.
///
/// The region `r^2 <= -2 ln(1 - p)` holds mass `p`, and the density on its boundary is
/// `(1 - p) / 2π`.
pub fn analytic_level(mass: f64) -> f64 {
    (1.0 - mass) / (2.0 * PI)
}

/// Removes the lowest-density points, one pass at a time.
///
/// Each pass drops every point whose density equals the current minimum.
pub fn prune_lowest_density<D>(cloud: PointCloud<f64>, passes: usize, density: D) -> PointCloud<f64>
where
    D: Fn(f64, f64) -> f64,
{
    let mut points = cloud.iter().collect_vec();

    for _ in 0..passes {
        if points.is_empty() {
            break;
        }
        let densities = points.iter().map(|&(x, y)| density(x, y)).collect_vec();
        let min = densities.iter().copied().fold(f64::INFINITY, f64::min);

        let before = points.len();
        points = points
            .into_iter()
            .zip(densities)
            .filter(|&(_, d)| d != min)
            .map(|(p, _)| p)
            .collect();
        debug!(removed = before - points.len(), min, "pruned lowest-density points");
    }

    PointCloud::from_points(points)
}
