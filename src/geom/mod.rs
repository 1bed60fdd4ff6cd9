pub mod confidence;
pub mod resolved;

pub use confidence::{
    compute_ellipse, ConfidenceEllipse, CovarianceSource, EllipseEstimator, DEFAULT_N_STD,
};
pub use resolved::ResolvedEllipse;
