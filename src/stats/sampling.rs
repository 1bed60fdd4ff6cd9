use std::f64::consts::PI;

use nalgebra as na;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use thiserror::Error;
use tracing::debug;

use crate::data::PointCloud;
use crate::math::Covariance2;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SamplingError {
    #[error("Covariance contains non-finite values")]
    NonFinite,

    #[error("Covariance is not positive definite")]
    NotPositiveDefinite,
}

/// A bivariate normal distribution, sampled through the Cholesky factor of its covariance.
#[derive(Debug, Clone)]
pub struct BivariateNormal {
    mean: na::Vector2<f64>,
    /// Lower-triangular factor `L` with `L L^T = covariance`
    l: na::Matrix2<f64>,
}

impl BivariateNormal {
    pub fn new(
        mean: na::Point2<f64>,
        covariance: &Covariance2<f64>,
    ) -> Result<Self, SamplingError> {
        if covariance.iter().any(|v| !v.is_finite()) {
            return Err(SamplingError::NonFinite);
        }
        let l = covariance
            .into_inner()
            .cholesky()
            .ok_or(SamplingError::NotPositiveDefinite)?
            .l();
        Ok(Self {
            mean: mean.coords,
            l,
        })
    }

    /// Zero mean, identity covariance.
    pub fn standard() -> Self {
        Self {
            mean: na::Vector2::zeros(),
            l: na::Matrix2::identity(),
        }
    }

    pub fn pdf(&self, point: &na::Point2<f64>) -> f64 {
        let diff = point.coords - self.mean;
        // Solve L w = diff; the quadratic form is |w|^2
        let w = self
            .l
            .solve_lower_triangular(&diff)
            .unwrap_or_else(|| na::Vector2::repeat(f64::NAN));
        let sqrt_det = self.l[(0, 0)] * self.l[(1, 1)];
        (-0.5 * w.norm_squared()).exp() / (2.0 * PI * sqrt_det)
    }

    /// Draws `n` samples into a point cloud.
    pub fn sample_cloud<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> PointCloud<f64> {
        debug!(n, "sampling bivariate normal");
        PointCloud::from_points((0..n).map(|_| {
            let p: na::Point2<f64> = self.sample(&mut *rng);
            (p.x, p.y)
        }))
    }
}

impl Distribution<na::Point2<f64>> for BivariateNormal {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> na::Point2<f64> {
        let z: na::Vector2<f64> = na::Vector2::new(
            StandardNormal.sample(&mut *rng),
            StandardNormal.sample(&mut *rng),
        );
        na::Point2::from(self.l * z + self.mean)
    }
}

/// Draws `n` samples from the bivariate normal with the given mean and covariance.
pub fn sample_bivariate_normal<R: Rng + ?Sized>(
    rng: &mut R,
    mean: na::Point2<f64>,
    covariance: &Covariance2<f64>,
    n: usize,
) -> Result<PointCloud<f64>, SamplingError> {
    Ok(BivariateNormal::new(mean, covariance)?.sample_cloud(rng, n))
}
