use std::io::BufRead;
use std::num::ParseFloatError;
use std::str::FromStr;

use itertools::Itertools;
use nalgebra as na;
use thiserror::Error;
use tracing::{debug, trace};

use crate::error::ShapeMismatchError;

#[derive(Debug, Error)]
pub enum PointCloudError {
    #[error(transparent)]
    ShapeMismatch(#[from] ShapeMismatchError),

    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: column {column} is missing")]
    MissingColumn { line: usize, column: usize },

    #[error("Line {line}: could not parse {value:?} as a number")]
    Parse {
        line: usize,
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

/// An ordered collection of 2D points, stored column-wise.
///
/// Both columns always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud<F: na::RealField + Copy> {
    x: Vec<F>,
    y: Vec<F>,
}

impl<F: na::RealField + Copy> PointCloud<F> {
    pub fn from_columns(x: Vec<F>, y: Vec<F>) -> Result<Self, ShapeMismatchError> {
        ShapeMismatchError::check(x.len(), y.len())?;
        Ok(Self { x, y })
    }

    pub fn from_points<I: IntoIterator<Item = (F, F)>>(points: I) -> Self {
        let (x, y) = points.into_iter().unzip();
        Self { x, y }
    }

    /// Returns a new cloud with `points` appended.
    pub fn with_points<I: IntoIterator<Item = (F, F)>>(self, points: I) -> Self {
        let Self { mut x, mut y } = self;
        for (px, py) in points {
            x.push(px);
            y.push(py);
        }
        Self { x, y }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &[F] {
        &self.x
    }

    pub fn y(&self) -> &[F] {
        &self.y
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, F)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    pub fn points(&self) -> impl Iterator<Item = na::Point2<F>> + '_ {
        self.iter().map(|(x, y)| na::Point2::new(x, y))
    }

    /// Arithmetic mean of each column; `None` when empty.
    pub fn mean(&self) -> Option<na::Point2<F>> {
        if self.is_empty() {
            return None;
        }
        let n = na::convert::<f64, F>(self.len() as f64);
        let sum = self
            .points()
            .fold(na::Vector2::zeros(), |acc, p| acc + p.coords);
        Some(na::Point2::from(sum / n))
    }
}

impl<F: na::RealField + Copy + FromStr<Err = ParseFloatError>> PointCloud<F> {
    /// Reads two columns of delimited numeric text.
    ///
    /// Fields are separated by whitespace and/or commas. Blank lines and lines starting with
    /// `#` are skipped. Columns are zero-based.
    pub fn from_delimited<R: BufRead>(
        reader: R,
        x_col: usize,
        y_col: usize,
    ) -> Result<Self, PointCloudError> {
        let mut points = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                trace!(line = line_no, "skipping line");
                continue;
            }

            let fields = trimmed
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|f| !f.is_empty())
                .collect_vec();

            let parse = |column: usize| -> Result<F, PointCloudError> {
                let value = fields.get(column).ok_or(PointCloudError::MissingColumn {
                    line: line_no,
                    column,
                })?;
                value.parse().map_err(|source| PointCloudError::Parse {
                    line: line_no,
                    value: value.to_string(),
                    source,
                })
            };

            points.push((parse(x_col)?, parse(y_col)?));
        }

        debug!(points = points.len(), "read point cloud");
        Ok(Self::from_points(points))
    }
}

impl<F: na::RealField + Copy> TryFrom<(Vec<F>, Vec<F>)> for PointCloud<F> {
    type Error = ShapeMismatchError;

    fn try_from((x, y): (Vec<F>, Vec<F>)) -> Result<Self, Self::Error> {
        Self::from_columns(x, y)
    }
}

impl<F: na::RealField + Copy> FromIterator<(F, F)> for PointCloud<F> {
    fn from_iter<I: IntoIterator<Item = (F, F)>>(iter: I) -> Self {
        Self::from_points(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    #[test]
    fn test_from_columns_shape_mismatch() {
        let err = PointCloud::from_columns(vec![1.0, 2.0, 3.0], vec![1.0, 2.0]).unwrap_err();
        assert_eq!(err, ShapeMismatchError { x_len: 3, y_len: 2 });
        assert_eq!(err.to_string(), "x and y must be the same size, got 3 and 2");
    }

    #[test]
    fn test_with_points_appends() {
        let cloud = PointCloud::from_points([(0.0, 0.0), (1.0, 1.0)]).with_points([(-3.3, 1.0)]);
        assert_eq!(cloud.len(), 3);
        assert_eq!(cloud.x(), &[0.0, 1.0, -3.3]);
        assert_eq!(cloud.y(), &[0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_mean() {
        let cloud: PointCloud<f64> = [(1.0, 2.0), (3.0, 6.0)].into_iter().collect();
        let mean = cloud.mean().unwrap();
        assert_relative_eq!(mean.x, 2.0);
        assert_relative_eq!(mean.y, 4.0);

        assert!(PointCloud::<f64>::from_points([]).mean().is_none());
    }

    #[test]
    fn test_from_delimited() -> Result<()> {
        let text = "# x y logL\n1.0 2.0 -3\n\n 4.5,\t-1e-2 , 0\n";
        let cloud = PointCloud::<f64>::from_delimited(Cursor::new(text), 0, 1)?;
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.x(), &[1.0, 4.5]);
        assert_eq!(cloud.y(), &[2.0, -0.01]);

        let cloud = PointCloud::<f64>::from_delimited(Cursor::new(text), 2, 0)?;
        assert_eq!(cloud.x(), &[-3.0, 0.0]);
        Ok(())
    }

    #[test]
    fn test_from_delimited_errors() {
        let missing = PointCloud::<f64>::from_delimited(Cursor::new("1 2\n3\n"), 0, 1);
        assert!(matches!(
            missing,
            Err(PointCloudError::MissingColumn { line: 2, column: 1 })
        ));

        let bad = PointCloud::<f32>::from_delimited(Cursor::new("1 2\n3 abc\n"), 0, 1);
        match bad {
            Err(PointCloudError::Parse { line, value, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
