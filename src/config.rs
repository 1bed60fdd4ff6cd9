use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::geom::{CovarianceSource, EllipseEstimator, DEFAULT_N_STD};
use crate::render::Color;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Palette must contain at least one color")]
    EmptyPalette,

    #[error("n_std must be positive and finite, got {0}")]
    InvalidNStd(f64),
}

/// Plot-wide settings, passed explicitly to whatever draws a figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Colors cycled through by [PlotConfig::palette_color]
    pub palette: Vec<Color>,
    /// Standard deviations spanned by confidence ellipses
    pub n_std: f64,
    /// Points used when a renderer draws an ellipse as a polyline
    pub outline_points: usize,
    /// Use the large preset covariance rather than the small one
    pub large_preset: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            palette: vec![
                Color::from_rgb(0x1f, 0x77, 0xb4),
                Color::from_rgb(0xff, 0x7f, 0x0e),
                Color::from_rgb(0x2c, 0xa0, 0x2c),
                Color::from_rgb(0xd6, 0x27, 0x28),
            ],
            n_std: DEFAULT_N_STD,
            outline_points: 100,
            large_preset: false,
        }
    }
}

impl PlotConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading plot config");
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        if !(self.n_std.is_finite() && self.n_std > 0.0) {
            return Err(ConfigError::InvalidNStd(self.n_std));
        }
        Ok(())
    }

    /// The `i`-th palette color, wrapping around. Black for an empty palette.
    pub fn palette_color(&self, i: usize) -> Color {
        if self.palette.is_empty() {
            return Color::BLACK;
        }
        self.palette[i % self.palette.len()]
    }

    /// Estimator using the configured preset and `n_std`.
    pub fn estimator(&self) -> EllipseEstimator<f64> {
        EllipseEstimator::new(
            CovarianceSource::from_flags(false, self.large_preset),
            self.n_std,
        )
    }
}
