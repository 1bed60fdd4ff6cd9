use nalgebra as na;

use crate::render::EllipsePatch;

/// Helper function to create points along an ellipse patch for visualization
///
/// Points are laid out counter-clockwise around the patch center, then mapped through the
/// patch transform. The first point is not repeated at the end.
pub fn sample_patch_outline<F: na::RealField + Copy>(
    patch: &EllipsePatch<F>,
    num_points: usize,
) -> Vec<na::Point2<F>> {
    let placement = patch.placement();
    let (half_w, half_h) = patch.semi_axes();
    let n = na::convert::<f64, F>(num_points as f64);

    (0..num_points)
        .map(|i| {
            let t = na::convert::<f64, F>(i as f64) * F::two_pi() / n;
            let local = na::Point2::new(half_w * t.cos(), half_h * t.sin());
            placement.transform_point(&local)
        })
        .collect()
}
