use nalgebra as na;
use std::ops::Deref;

/// Elements of the "small" preset covariance used for the illustrative MultiNest ellipses.
const SMALL_PRESET: [f64; 3] = [1.27424495, -0.0793614, 0.85767217];

/// Factor by which the "large" preset expands the small one.
pub const LARGE_PRESET_FACTOR: f64 = 1.2;

/// A symmetric 2x2 covariance matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Covariance2<F: na::RealField + Copy>(na::Matrix2<F>);

impl<F: na::RealField + Copy> Covariance2<F> {
    /// Builds the matrix from its three distinct elements.
    pub fn new(var_x: F, cov_xy: F, var_y: F) -> Self {
        Self(na::Matrix2::new(var_x, cov_xy, cov_xy, var_y))
    }

    pub fn identity() -> Self {
        Self(na::Matrix2::identity())
    }

    /// The small literal preset.
    pub fn small_preset() -> Self {
        let [a11, a12, a22] = SMALL_PRESET.map(na::convert::<f64, F>);
        Self::new(a11, a12, a22)
    }

    /// The large literal preset, [LARGE_PRESET_FACTOR] times the small one elementwise.
    pub fn large_preset() -> Self {
        Self::small_preset().scaled(na::convert(LARGE_PRESET_FACTOR))
    }

    /// Two-variable sample covariance with an `N - 1` denominator.
    ///
    /// Both slices are expected to have the same length; only the common prefix is used.
    /// Fewer than two samples produce non-finite entries.
    pub fn sample(x: &[F], y: &[F]) -> Self {
        let n = x.len().min(y.len());
        let count = na::convert::<f64, F>(n as f64);
        let mean = |v: &[F]| v.iter().take(n).fold(F::zero(), |acc, &e| acc + e) / count;
        let (mean_x, mean_y) = (mean(x), mean(y));

        let (sxx, sxy, syy) = x.iter().zip(y).fold(
            (F::zero(), F::zero(), F::zero()),
            |(sxx, sxy, syy), (&xi, &yi)| {
                let dx = xi - mean_x;
                let dy = yi - mean_y;
                (sxx + dx * dx, sxy + dx * dy, syy + dy * dy)
            },
        );

        let dof = count - F::one();
        Self::new(sxx / dof, sxy / dof, syy / dof)
    }

    pub fn var_x(&self) -> F {
        self.0[(0, 0)]
    }

    pub fn var_y(&self) -> F {
        self.0[(1, 1)]
    }

    pub fn cov_xy(&self) -> F {
        self.0[(0, 1)]
    }

    pub fn std_x(&self) -> F {
        self.var_x().sqrt()
    }

    pub fn std_y(&self) -> F {
        self.var_y().sqrt()
    }

    /// Pearson correlation coefficient, `cov_xy / sqrt(var_x * var_y)`.
    ///
    /// Zero variance yields NaN or infinity; no correction is applied.
    pub fn pearson(&self) -> F {
        self.cov_xy() / (self.var_x() * self.var_y()).sqrt()
    }

    /// Elementwise scaling by `factor`.
    pub fn scaled(&self, factor: F) -> Self {
        Self(self.0 * factor)
    }

    pub fn is_positive_semi_definite(&self) -> bool {
        self.var_x() >= F::zero()
            && self.var_y() >= F::zero()
            && self.cov_xy().abs() <= (self.var_x() * self.var_y()).sqrt()
    }

    pub fn into_inner(self) -> na::Matrix2<F> {
        self.0
    }
}

impl<F: na::RealField + Copy> Deref for Covariance2<F> {
    type Target = na::Matrix2<F>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<F: na::RealField + Copy> AsRef<na::Matrix2<F>> for Covariance2<F> {
    fn as_ref(&self) -> &na::Matrix2<F> {
        &self.0
    }
}

impl<F: na::RealField + Copy> From<na::Matrix2<F>> for Covariance2<F> {
    /// Symmetrises the input by averaging the off-diagonal elements.
    fn from(mat: na::Matrix2<F>) -> Self {
        let two = F::one() + F::one();
        Self::new(mat[(0, 0)], (mat[(0, 1)] + mat[(1, 0)]) / two, mat[(1, 1)])
    }
}
