pub mod affine;
pub mod conic;
pub mod covariance;

pub use affine::Affine2;
pub use covariance::Covariance2;
