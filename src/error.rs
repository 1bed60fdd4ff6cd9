use crate::config::ConfigError;
use crate::data::PointCloudError;
use crate::math::conic::ConicError;
use crate::stats::{LevelError, SamplingError};
use thiserror::Error;

/// The x and y columns of a point cloud differ in length.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("x and y must be the same size, got {x_len} and {y_len}")]
pub struct ShapeMismatchError {
    pub x_len: usize,
    pub y_len: usize,
}

impl ShapeMismatchError {
    /// Returns an error when `x_len != y_len`.
    pub fn check(x_len: usize, y_len: usize) -> Result<(), Self> {
        if x_len == y_len {
            Ok(())
        } else {
            Err(Self { x_len, y_len })
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    ShapeMismatch(#[from] ShapeMismatchError),

    #[error(transparent)]
    Conic(#[from] ConicError),

    #[error(transparent)]
    PointCloud(#[from] PointCloudError),

    #[error(transparent)]
    Sampling(#[from] SamplingError),

    #[error(transparent)]
    Level(#[from] LevelError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Unknown error: {0}")]
    Unknown(#[from] anyhow::Error),
}
