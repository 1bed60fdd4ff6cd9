use nalgebra as na;
use tracing::{debug, warn};

use crate::data::PointCloud;
use crate::error::ShapeMismatchError;
use crate::geom::resolved::ResolvedEllipse;
use crate::math::conic::ConicError;
use crate::math::{Affine2, Covariance2};
use crate::render::{EllipsePatch, EllipseRenderer, PatchStyle};

/// Number of standard deviations spanned by the ellipse unless configured otherwise.
pub const DEFAULT_N_STD: f64 = 3.0;

/// Rotation applied to the unit ellipse before scaling, in degrees.
pub const ROTATION_DEG: f64 = 45.0;

/// Where the covariance of a confidence ellipse comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CovarianceSource<F: na::RealField + Copy> {
    /// Sample covariance of the input points
    Sample,
    SmallPreset,
    LargePreset,
    Fixed(Covariance2<F>),
}

impl<F: na::RealField + Copy> Default for CovarianceSource<F> {
    fn default() -> Self {
        Self::SmallPreset
    }
}

impl<F: na::RealField + Copy> CovarianceSource<F> {
    pub fn from_flags(use_sample_covariance: bool, use_large_preset: bool) -> Self {
        match (use_sample_covariance, use_large_preset) {
            (true, _) => Self::Sample,
            (false, false) => Self::SmallPreset,
            (false, true) => Self::LargePreset,
        }
    }

    fn resolve(&self, x: &[F], y: &[F]) -> Covariance2<F> {
        match self {
            Self::Sample => {
                if x.len() < 2 {
                    warn!(n = x.len(), "sample covariance needs at least two points");
                }
                Covariance2::sample(x, y)
            }
            Self::SmallPreset => Covariance2::small_preset(),
            Self::LargePreset => Covariance2::large_preset(),
            Self::Fixed(cov) => *cov,
        }
    }
}

/// Computes covariance confidence ellipses.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipseEstimator<F: na::RealField + Copy> {
    source: CovarianceSource<F>,
    n_std: F,
}

impl<F: na::RealField + Copy> Default for EllipseEstimator<F> {
    fn default() -> Self {
        Self {
            source: CovarianceSource::default(),
            n_std: na::convert(DEFAULT_N_STD),
        }
    }
}

impl<F: na::RealField + Copy> EllipseEstimator<F> {
    pub fn new(source: CovarianceSource<F>, n_std: F) -> Self {
        Self { source, n_std }
    }

    pub fn with_source(mut self, source: CovarianceSource<F>) -> Self {
        self.source = source;
        self
    }

    pub fn with_n_std(mut self, n_std: F) -> Self {
        self.n_std = n_std;
        self
    }

    pub fn source(&self) -> &CovarianceSource<F> {
        &self.source
    }

    pub fn n_std(&self) -> F {
        self.n_std
    }

    /// Computes the confidence ellipse of the points `(x[i], y[i])`.
    ///
    /// The points only matter for [CovarianceSource::Sample], but their shapes are checked
    /// for every source. A degenerate covariance is not an error: NaN or infinity propagates
    /// into the result, see [ConfidenceEllipse::is_degenerate].
    pub fn estimate(&self, x: &[F], y: &[F]) -> Result<ConfidenceEllipse<F>, ShapeMismatchError> {
        ShapeMismatchError::check(x.len(), y.len())?;
        Ok(self.ellipse_for(self.source.resolve(x, y)))
    }

    /// Same as [Self::estimate]; the columns of a point cloud always match.
    pub fn estimate_cloud(&self, points: &PointCloud<F>) -> ConfidenceEllipse<F> {
        self.ellipse_for(self.source.resolve(points.x(), points.y()))
    }

    fn ellipse_for(&self, covariance: Covariance2<F>) -> ConfidenceEllipse<F> {
        let pearson = covariance.pearson();

        // Closed-form eigenvalues of the normalised 2x2 correlation matrix
        let radius_x = (F::one() + pearson).sqrt();
        let radius_y = (F::one() - pearson).sqrt();

        let scale_x = covariance.std_x() * self.n_std;
        let scale_y = covariance.std_y() * self.n_std;

        let ellipse = ConfidenceEllipse {
            covariance,
            pearson,
            radius_x,
            radius_y,
            scale_x,
            scale_y,
            n_std: self.n_std,
        };

        if ellipse.is_degenerate() {
            warn!(?covariance, "degenerate covariance, ellipse is undefined");
        } else {
            debug!(?pearson, ?radius_x, ?radius_y, ?scale_x, ?scale_y, "confidence ellipse");
        }

        ellipse
    }
}

/// Covariance confidence ellipse of `points`.
///
/// With `use_sample_covariance` the covariance is estimated from the points; otherwise the
/// small or large preset is used, depending on `use_large_preset`.
pub fn compute_ellipse<F: na::RealField + Copy>(
    points: &PointCloud<F>,
    use_sample_covariance: bool,
    use_large_preset: bool,
    num_std: F,
) -> Result<ConfidenceEllipse<F>, ShapeMismatchError> {
    EllipseEstimator::new(
        CovarianceSource::from_flags(use_sample_covariance, use_large_preset),
        num_std,
    )
    .estimate(points.x(), points.y())
}

/// Geometry of a covariance confidence ellipse.
///
/// The ellipse is the unit ellipse with radii `radius_x` and `radius_y`, rotated by
/// [ROTATION_DEG], then scaled by `(scale_x, scale_y)`. It is always centered at the origin;
/// the sample mean is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceEllipse<F: na::RealField + Copy> {
    pub covariance: Covariance2<F>,
    pub pearson: F,
    pub radius_x: F,
    pub radius_y: F,
    pub scale_x: F,
    pub scale_y: F,
    pub n_std: F,
}

impl<F: na::RealField + Copy> ConfidenceEllipse<F> {
    pub fn center(&self) -> na::Point2<F> {
        na::Point2::origin()
    }

    pub fn translation(&self) -> na::Vector2<F> {
        na::Vector2::zeros()
    }

    pub fn rotation_deg(&self) -> F {
        na::convert(ROTATION_DEG)
    }

    pub fn width(&self) -> F {
        self.radius_x + self.radius_x
    }

    pub fn height(&self) -> F {
        self.radius_y + self.radius_y
    }

    /// True when a zero or invalid variance made the geometry non-finite.
    pub fn is_degenerate(&self) -> bool {
        [
            self.pearson,
            self.radius_x,
            self.radius_y,
            self.scale_x,
            self.scale_y,
        ]
        .iter()
        .any(|v| !v.is_finite())
    }

    /// Rotate, scale, then translate.
    pub fn transform(&self) -> Affine2<F> {
        let translation = self.translation();
        Affine2::identity()
            .rotate_deg(self.rotation_deg())
            .scale(self.scale_x, self.scale_y)
            .translate(translation.x, translation.y)
    }

    pub fn patch(&self) -> EllipsePatch<F> {
        EllipsePatch {
            center: self.center(),
            width: self.width(),
            height: self.height(),
            rotation_deg: self.rotation_deg(),
            scale: na::Vector2::new(self.scale_x, self.scale_y),
            translation: self.translation(),
        }
    }

    /// Boundary points in final coordinates.
    pub fn outline(&self, num_points: usize) -> Vec<na::Point2<F>> {
        self.patch().outline(num_points)
    }

    /// Semi-axes, orientation and center of the ellipse as it is actually drawn.
    pub fn resolve(&self) -> Result<ResolvedEllipse<F>, ConicError> {
        ResolvedEllipse::from_patch(&self.patch())
    }

    pub fn draw<R: EllipseRenderer<F> + ?Sized>(
        &self,
        renderer: &mut R,
        style: &PatchStyle,
    ) -> Result<(), R::Error> {
        renderer.draw_ellipse(&self.patch(), style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingRenderer;
    use crate::stats::sample_bivariate_normal;
    use anyhow::Result;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    const SMALL_PEARSON: f64 = -0.075914056871;

    #[test]
    fn test_identity_covariance() {
        let estimator =
            EllipseEstimator::new(CovarianceSource::Fixed(Covariance2::identity()), 1.0);
        let ellipse = estimator.estimate(&[0.0, 1.0], &[1.0, 0.0]).unwrap();

        assert_eq!(ellipse.pearson, 0.0);
        assert_eq!(ellipse.radius_x, 1.0);
        assert_eq!(ellipse.radius_y, 1.0);
        assert_eq!(ellipse.scale_x, 1.0);
        assert_eq!(ellipse.scale_y, 1.0);
        assert!(!ellipse.is_degenerate());
    }

    #[test]
    fn test_small_preset() {
        let cloud = PointCloud::from_points([(0.0, 0.0), (1.0, 2.0)]);
        let ellipse = compute_ellipse(&cloud, false, false, 3.0).unwrap();

        assert_relative_eq!(ellipse.pearson, SMALL_PEARSON, epsilon = 1e-10);
        assert_relative_eq!(ellipse.radius_x, (1.0 + SMALL_PEARSON).sqrt(), epsilon = 1e-10);
        assert_relative_eq!(ellipse.radius_y, (1.0 - SMALL_PEARSON).sqrt(), epsilon = 1e-10);
        assert_relative_eq!(ellipse.radius_x, 0.96129389, epsilon = 1e-7);
        assert_relative_eq!(ellipse.radius_y, 1.03726277, epsilon = 1e-7);
        assert_relative_eq!(ellipse.scale_x, 1.27424495f64.sqrt() * 3.0, epsilon = 1e-12);
        assert_relative_eq!(ellipse.scale_y, 0.85767217f64.sqrt() * 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_large_preset_only_changes_scale() {
        let cloud = PointCloud::from_points([(0.0, 0.0), (1.0, 2.0)]);
        let small = compute_ellipse(&cloud, false, false, 3.0).unwrap();
        let large = compute_ellipse(&cloud, false, true, 3.0).unwrap();

        assert_relative_eq!(small.pearson, large.pearson, epsilon = 1e-12);
        assert_relative_eq!(small.radius_x, large.radius_x, epsilon = 1e-12);
        assert_relative_eq!(small.radius_y, large.radius_y, epsilon = 1e-12);
        assert_relative_eq!(large.scale_x / small.scale_x, 1.2f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(large.scale_y / small.scale_y, 1.2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_shape_mismatch() {
        for source in [
            CovarianceSource::Sample,
            CovarianceSource::SmallPreset,
            CovarianceSource::LargePreset,
        ] {
            let result = EllipseEstimator::default()
                .with_source(source)
                .estimate(&[1.0, 2.0, 3.0], &[1.0, 2.0]);
            assert_eq!(result, Err(ShapeMismatchError { x_len: 3, y_len: 2 }));
        }
    }

    #[test]
    fn test_n_std_is_linear() {
        let x = [0.3, -1.2, 2.2, 0.1, -0.7];
        let y = [1.1, 0.4, -0.9, 0.2, 0.8];
        let base = EllipseEstimator::default().with_source(CovarianceSource::Sample);

        let single = base.clone().with_n_std(1.7).estimate(&x, &y).unwrap();
        let double = base.with_n_std(3.4).estimate(&x, &y).unwrap();

        assert_eq!(double.scale_x, 2.0 * single.scale_x);
        assert_eq!(double.scale_y, 2.0 * single.scale_y);
        assert_eq!(double.radius_x, single.radius_x);
        assert_eq!(double.radius_y, single.radius_y);
        assert_eq!(double.pearson, single.pearson);
    }

    #[test]
    fn test_sample_covariance_of_standard_normal() -> Result<()> {
        let mut rng = Pcg64::seed_from_u64(2);
        let cloud = sample_bivariate_normal(
            &mut rng,
            na::Point2::origin(),
            &Covariance2::identity(),
            100_000,
        )?;
        let ellipse = compute_ellipse(&cloud, true, false, 3.4)?;

        assert!(ellipse.pearson.abs() < 0.05);
        assert_relative_eq!(ellipse.scale_x, 3.4, max_relative = 0.05);
        assert_relative_eq!(ellipse.scale_y, 3.4, max_relative = 0.05);
        Ok(())
    }

    #[test]
    fn test_mean_is_ignored() {
        let x = [10.0, 11.0, 12.0, 13.0];
        let y = [-5.0, -4.0, -6.0, -5.0];
        let ellipse = EllipseEstimator::default()
            .with_source(CovarianceSource::Sample)
            .estimate(&x, &y)
            .unwrap();

        assert_eq!(ellipse.center(), na::Point2::origin());
        let origin = ellipse.transform().transform_point(&na::Point2::origin());
        assert_relative_eq!(origin.coords.norm(), 0.0);
    }

    #[test]
    fn test_zero_variance_propagates_nan() {
        let ellipse = EllipseEstimator::<f64>::default()
            .with_source(CovarianceSource::Sample)
            .estimate(&[1.0, 1.0, 1.0], &[0.0, 1.0, 2.0])
            .unwrap();
        assert!(ellipse.pearson.is_nan());
        assert!(ellipse.radius_x.is_nan());
        assert!(ellipse.is_degenerate());
    }

    #[test]
    fn test_single_point_propagates_nan() {
        let cloud = PointCloud::<f64>::from_points([(1.0, 2.0)]);
        let ellipse = compute_ellipse(&cloud, true, false, DEFAULT_N_STD).unwrap();
        assert!(ellipse.is_degenerate());
    }

    #[test]
    fn test_not_positive_semi_definite_propagates_nan() {
        // |cov_xy| exceeds sqrt(var_x * var_y)
        let ellipse = EllipseEstimator::new(
            CovarianceSource::Fixed(Covariance2::<f64>::new(1.0, 2.0, 1.0)),
            3.0,
        )
        .estimate(&[], &[])
        .unwrap();
        assert_eq!(ellipse.pearson, 2.0);
        assert_relative_eq!(ellipse.radius_x, 3.0f64.sqrt());
        assert!(ellipse.radius_y.is_nan());
        assert!(ellipse.is_degenerate());

        let negative = EllipseEstimator::new(
            CovarianceSource::Fixed(Covariance2::<f64>::new(-1.0, 0.0, 1.0)),
            3.0,
        )
        .estimate(&[], &[])
        .unwrap();
        assert!(negative.scale_x.is_nan());
        assert_eq!(negative.scale_y, 3.0);
        assert!(negative.is_degenerate());
    }

    #[test]
    fn test_resolve_large_sample() -> Result<()> {
        let x = [-5000.0, 5000.0, 0.0, 3000.0, -3000.0];
        let y = [1000.0, -4000.0, 6000.0, -2000.0, 0.0];
        let ellipse = EllipseEstimator::<f64>::default()
            .with_source(CovarianceSource::Sample)
            .estimate(&x, &y)?;
        assert!(!ellipse.is_degenerate());

        let resolved = ellipse.resolve()?;
        assert_relative_eq!(
            resolved.area(),
            std::f64::consts::PI
                * ellipse.radius_x
                * ellipse.radius_y
                * ellipse.scale_x
                * ellipse.scale_y,
            max_relative = 1e-9
        );
        for point in ellipse.outline(16) {
            assert!(resolved.contains(&point, 1e-9));
        }
        Ok(())
    }

    #[test]
    fn test_estimate_cloud_matches_estimate() {
        let cloud = PointCloud::from_points([(0.0, 1.0), (2.0, 0.5), (-1.0, -1.0), (0.5, 0.0)]);
        let estimator = EllipseEstimator::default().with_source(CovarianceSource::Sample);
        assert_eq!(
            estimator.estimate_cloud(&cloud),
            estimator.estimate(cloud.x(), cloud.y()).unwrap()
        );
    }

    #[test]
    fn test_patch() {
        let ellipse = EllipseEstimator::<f64>::default().estimate(&[], &[]).unwrap();
        let patch = ellipse.patch();

        assert_eq!(patch.center, na::Point2::origin());
        assert_eq!(patch.width, 2.0 * ellipse.radius_x);
        assert_eq!(patch.height, 2.0 * ellipse.radius_y);
        assert_eq!(patch.rotation_deg, 45.0);
        assert_eq!(patch.scale, na::Vector2::new(ellipse.scale_x, ellipse.scale_y));
        assert_eq!(patch.translation, na::Vector2::zeros());
        assert_eq!(patch.transform(), ellipse.transform());
    }

    #[test]
    fn test_resolve_preset() -> Result<()> {
        let ellipse = EllipseEstimator::<f64>::default().estimate(&[], &[])?;
        let resolved = ellipse.resolve()?;

        assert_relative_eq!(
            resolved.area(),
            std::f64::consts::PI
                * ellipse.radius_x
                * ellipse.radius_y
                * ellipse.scale_x
                * ellipse.scale_y,
            epsilon = 1e-9
        );
        assert!(resolved.semi_major >= resolved.semi_minor);
        for point in ellipse.outline(24) {
            assert_relative_eq!(resolved.conic().evaluate(&point), 0.0, epsilon = 1e-10);
        }
        Ok(())
    }

    #[test]
    fn test_resolve_degenerate() {
        let ellipse = EllipseEstimator::new(
            CovarianceSource::Fixed(Covariance2::<f64>::new(0.0, 0.0, 1.0)),
            DEFAULT_N_STD,
        )
        .estimate(&[], &[])
        .unwrap();
        assert!(ellipse.resolve().is_err());
    }

    #[test]
    fn test_draw() {
        let mut recorder = RecordingRenderer::new();
        let ellipse = EllipseEstimator::<f64>::default().estimate(&[], &[]).unwrap();
        let style = PatchStyle::default().with_label("MultiNest ellipse");

        ellipse.draw(&mut recorder, &style).unwrap();

        assert_eq!(recorder.calls, vec![(ellipse.patch(), style)]);
    }
}
