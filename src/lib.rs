pub mod config;
pub mod data;
mod error;
pub mod geom;
pub mod math;
pub mod render;
pub mod stats;
pub mod utils;

pub use config::PlotConfig;
pub use data::PointCloud;
pub use error::{Error, ShapeMismatchError};
pub use geom::{
    compute_ellipse, ConfidenceEllipse, CovarianceSource, EllipseEstimator, ResolvedEllipse,
};
pub use math::Covariance2;
pub use render::{Color, EllipsePatch, EllipseRenderer, LineStyle, PatchStyle};
