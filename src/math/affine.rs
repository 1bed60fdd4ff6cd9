use nalgebra as na;

/// A 2D affine transform in homogeneous coordinates, built as a pipeline.
///
/// Every step is applied *after* the steps before it, so
/// `Affine2::identity().rotate_deg(45.).scale(sx, sy)` first rotates, then scales.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2<F: na::RealField + Copy>(na::Matrix3<F>);

impl<F: na::RealField + Copy> Affine2<F> {
    pub fn identity() -> Self {
        Self(na::Matrix3::identity())
    }

    /// Counter-clockwise rotation about the origin, in degrees.
    pub fn rotate_deg(self, degrees: F) -> Self {
        self.rotate(degrees * F::pi() / na::convert::<f64, F>(180.0))
    }

    /// Counter-clockwise rotation about the origin, in radians.
    pub fn rotate(self, radians: F) -> Self {
        self.then(na::Matrix3::new_rotation(radians))
    }

    pub fn scale(self, sx: F, sy: F) -> Self {
        self.then(na::Matrix3::new_nonuniform_scaling(&na::Vector2::new(sx, sy)))
    }

    pub fn translate(self, tx: F, ty: F) -> Self {
        self.then(na::Matrix3::new_translation(&na::Vector2::new(tx, ty)))
    }

    fn then(self, step: na::Matrix3<F>) -> Self {
        Self(step * self.0)
    }

    pub fn transform_point(&self, point: &na::Point2<F>) -> na::Point2<F> {
        self.0.transform_point(point)
    }

    pub fn try_inverse(&self) -> Option<na::Matrix3<F>> {
        self.0.try_inverse()
    }

    pub fn matrix(&self) -> &na::Matrix3<F> {
        &self.0
    }
}

impl<F: na::RealField + Copy> Default for Affine2<F> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<F: na::RealField + Copy> From<Affine2<F>> for na::Matrix3<F> {
    fn from(value: Affine2<F>) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_point_eq(a: &na::Point2<f64>, b: &na::Point2<f64>) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-12);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation() {
        let t = Affine2::identity().rotate_deg(90.0);
        let p = t.transform_point(&na::Point2::new(1.0, 0.0));
        assert_point_eq(&p, &na::Point2::new(0.0, 1.0));
    }

    #[test]
    fn test_pipeline_order() {
        // Rotating first then scaling is not the same as scaling then rotating
        let rotate_then_scale = Affine2::identity().rotate_deg(90.0).scale(2.0, 1.0);
        let scale_then_rotate = Affine2::identity().scale(2.0, 1.0).rotate_deg(90.0);

        let p = na::Point2::new(1.0, 0.0);
        assert_point_eq(
            &rotate_then_scale.transform_point(&p),
            &na::Point2::new(0.0, 1.0),
        );
        assert_point_eq(
            &scale_then_rotate.transform_point(&p),
            &na::Point2::new(0.0, 2.0),
        );
    }

    #[test]
    fn test_translation_applied_last() {
        let t = Affine2::identity()
            .rotate_deg(45.0)
            .scale(2.0, 3.0)
            .translate(1.0, -1.0);
        let origin = t.transform_point(&na::Point2::origin());
        assert_point_eq(&origin, &na::Point2::new(1.0, -1.0));
    }

    #[test]
    fn test_inverse() {
        let t = Affine2::identity().rotate_deg(30.0).scale(2.0, 0.5);
        let inv = t.try_inverse().unwrap();
        assert_relative_eq!(inv * t.matrix(), na::Matrix3::identity(), epsilon = 1e-12);

        let singular = Affine2::identity().scale(0.0, 1.0);
        assert!(singular.try_inverse().is_none());
    }
}
