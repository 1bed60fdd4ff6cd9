use nalgebra as na;

use crate::math::conic::{self, Conic, ConicError};
use crate::render::EllipsePatch;

/// The true geometry of an ellipse after its placement transform.
///
/// A rotate-then-scale pipeline with unequal scales does not keep the axes at the rotation
/// angle, so the drawn ellipse generally differs from what `rotation_deg` suggests.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEllipse<F: na::RealField + Copy> {
    pub semi_major: F,
    pub semi_minor: F,
    /// Angle of the major axis from the x-axis, in radians
    pub rotation: F,
    pub center: na::Point2<F>,
    conic: Conic<F>,
}

impl<F: na::RealField + Copy> ResolvedEllipse<F> {
    pub fn from_patch(patch: &EllipsePatch<F>) -> Result<Self, ConicError> {
        let (a, b) = patch.semi_axes();
        let local = conic::axis_aligned(a, b)?;
        let placed = conic::transformed(&local, patch.placement().matrix())?;
        // Unit norm gives `contains` a tolerance independent of the placement scale
        let conic = Conic::try_from_matrix(placed.normalize())?;

        let (semi_major, semi_minor) = conic.semi_axes();
        Ok(Self {
            semi_major,
            semi_minor,
            rotation: conic.rotation(),
            center: conic.center()?,
            conic,
        })
    }

    pub fn area(&self) -> F {
        F::pi() * self.semi_major * self.semi_minor
    }

    /// Whether `point` lies inside or on the ellipse, up to `tolerance` in the normalised
    /// quadratic form.
    pub fn contains(&self, point: &na::Point2<F>, tolerance: F) -> bool {
        self.conic.evaluate(point) <= tolerance
    }

    pub fn conic(&self) -> &Conic<F> {
        &self.conic
    }
}
