use nalgebra as na;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConicError {
    #[error("Semi-axis must be positive, got {0}")]
    NonPositiveSemiAxis(f64),

    #[error("Transform is singular and cannot be applied to a conic")]
    SingularTransform,

    #[error("Matrix is degenerate, det={0}")]
    Degenerate(f64),

    #[error("Matrix does not define an ellipse, discriminant={0}")]
    NotAnEllipse(f64),

    #[error("Matrix describes an ellipse with no real points")]
    Imaginary,

    #[error("No center coordinates found: {0}")]
    NoCenter(&'static str),
}

/// Quadratic form of the axis-aligned ellipse `(x/a)^2 + (y/b)^2 = 1`.
pub fn axis_aligned<F: na::RealField + Copy>(a: F, b: F) -> Result<na::Matrix3<F>, ConicError> {
    for axis in [a, b] {
        // Also rejects NaN
        if !(axis > F::zero()) {
            return Err(ConicError::NonPositiveSemiAxis(axis.to_subset_unchecked()));
        }
    }
    Ok(na::Matrix3::from_diagonal(&na::Vector3::new(
        (a * a).recip(),
        (b * b).recip(),
        -F::one(),
    )))
}

/// Maps a conic through the point transform `m`: `M^-T Q M^-1`.
pub fn transformed<F: na::RealField + Copy>(
    q: &na::Matrix3<F>,
    m: &na::Matrix3<F>,
) -> Result<na::Matrix3<F>, ConicError> {
    let m_inv = m.try_inverse().ok_or(ConicError::SingularTransform)?;
    Ok(m_inv.transpose() * q * m_inv)
}

/// Checks that `matrix` describes a real, non-degenerate ellipse.
///
/// Uses `k = -det(Q) / det(A33)`, whose ratio to the eigenvalues of the upper-left block gives
/// the squared semi-axes. Both tests are invariant to scaling `Q`.
pub(crate) fn check_ellipse_conditions<F: na::RealField + Copy>(
    matrix: &na::Matrix3<F>,
) -> Result<(), ConicError> {
    let det = matrix.determinant();
    if !det.is_finite() {
        return Err(ConicError::Degenerate(det.to_subset_unchecked()));
    }

    // Upper-left 2x2 block must be definite for an ellipse
    let block = matrix.fixed_view::<2, 2>(0, 0);
    let discriminant = block.determinant();
    if !(discriminant > F::zero()) {
        return Err(ConicError::NotAnEllipse(discriminant.to_subset_unchecked()));
    }

    let k = -det / discriminant;
    if !k.is_finite() || k == F::zero() {
        return Err(ConicError::Degenerate(det.to_subset_unchecked()));
    }
    // Opposite signs leave no real points on the curve
    if !(k * block.trace() > F::zero()) {
        return Err(ConicError::Imaginary);
    }

    Ok(())
}

/// A validated ellipse conic.
#[derive(Debug, Clone, PartialEq)]
pub struct Conic<F: na::RealField + Copy>(na::Matrix3<F>);

impl<F: na::RealField + Copy> Conic<F> {
    pub fn try_from_matrix(matrix: na::Matrix3<F>) -> Result<Self, ConicError> {
        check_ellipse_conditions(&matrix)?;
        Ok(Self(matrix))
    }

    /// Semi-axis lengths as `(major, minor)`.
    pub fn semi_axes(&self) -> (F, F) {
        let block = self.0.fixed_view::<2, 2>(0, 0).into_owned();
        let det_33 = block.determinant();
        let det_q = self.0.determinant();
        let k = -det_q / det_33;

        let eigvals = block.symmetric_eigenvalues();
        let (a1, a2) = ((k / eigvals[0]).sqrt(), (k / eigvals[1]).sqrt());

        if a1 >= a2 {
            (a1, a2)
        } else {
            (a2, a1)
        }
    }

    /// Angle of the major axis in radians, measured from the x-axis.
    pub fn rotation(&self) -> F {
        let two = F::one() + F::one();
        let m = &self.0;
        -F::atan2(two * m[(0, 1)], m[(1, 1)] - m[(0, 0)]) / two
    }

    pub fn center(&self) -> Result<na::Point2<F>, ConicError> {
        let a_33_inv = self
            .0
            .fixed_view::<2, 2>(0, 0)
            .try_inverse()
            .ok_or(ConicError::NoCenter("Matrix is not invertible."))?;
        let b = na::Vector2::new(self.0[(0, 2)], self.0[(1, 2)]);

        Ok(na::Point2::from(-(a_33_inv * b)))
    }

    /// Evaluates `p^T Q p` in homogeneous coordinates; zero on the boundary.
    pub fn evaluate(&self, point: &na::Point2<F>) -> F {
        let p = point.to_homogeneous();
        (p.transpose() * self.0 * p)[(0, 0)]
    }

    pub fn matrix(&self) -> &na::Matrix3<F> {
        &self.0
    }
}
