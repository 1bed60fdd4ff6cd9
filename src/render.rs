//! The seam between ellipse geometry and whatever draws it.
//!
//! A renderer receives an [EllipsePatch], i.e. an ellipse of `width` x `height` around
//! `center`, followed by the pipeline rotate → scale → translate, together with a
//! [PatchStyle] holding purely cosmetic attributes.

use std::convert::Infallible;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use nalgebra as na;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Affine2;
use crate::utils::sampling::sample_patch_outline;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid color {0:?}, expected #rrggbb")]
pub struct ParseColorError(pub String);

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::from_rgb(0, 0, 0);
    pub const WHITE: Self = Self::from_rgb(255, 255, 255);
    pub const RED: Self = Self::from_rgb(255, 0, 0);
    pub const BLUE: Self = Self::from_rgb(0, 0, 255);
    pub const ORANGE: Self = Self::from_rgb(255, 165, 0);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        // `from_str_radix` alone would accept a leading sign
        if hex.len() != 6 || !hex.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Self::from_rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    DashDot,
    Dotted,
}

/// Cosmetic attributes of a drawn ellipse. None of them affect the geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchStyle {
    pub edge_color: Option<Color>,
    /// `None` leaves the ellipse unfilled
    pub face_color: Option<Color>,
    pub line_style: LineStyle,
    pub alpha: f32,
    pub label: Option<String>,
    pub z_order: i32,
}

impl Default for PatchStyle {
    fn default() -> Self {
        Self {
            edge_color: Some(Color::BLACK),
            face_color: None,
            line_style: LineStyle::Solid,
            alpha: 1.0,
            label: None,
            z_order: 0,
        }
    }
}

impl PatchStyle {
    pub fn with_edge_color(mut self, color: Color) -> Self {
        self.edge_color = Some(color);
        self
    }

    pub fn with_face_color(mut self, color: Color) -> Self {
        self.face_color = Some(color);
        self
    }

    pub fn with_line_style(mut self, line_style: LineStyle) -> Self {
        self.line_style = line_style;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_z_order(mut self, z_order: i32) -> Self {
        self.z_order = z_order;
        self
    }
}

/// Geometric description of an ellipse patch.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipsePatch<F: na::RealField + Copy> {
    pub center: na::Point2<F>,
    pub width: F,
    pub height: F,
    /// Rotation applied first in the pipeline, in degrees
    pub rotation_deg: F,
    pub scale: na::Vector2<F>,
    pub translation: na::Vector2<F>,
}

impl<F: na::RealField + Copy> EllipsePatch<F> {
    /// The pipeline applied after the patch is laid out around its center.
    pub fn transform(&self) -> Affine2<F> {
        Affine2::identity()
            .rotate_deg(self.rotation_deg)
            .scale(self.scale.x, self.scale.y)
            .translate(self.translation.x, self.translation.y)
    }

    /// Maps the patch's own frame, where the ellipse is axis-aligned at the origin, to final
    /// coordinates: translate to `center`, then [Self::transform].
    pub fn placement(&self) -> Affine2<F> {
        Affine2::identity()
            .translate(self.center.x, self.center.y)
            .rotate_deg(self.rotation_deg)
            .scale(self.scale.x, self.scale.y)
            .translate(self.translation.x, self.translation.y)
    }

    pub fn semi_axes(&self) -> (F, F) {
        let two = F::one() + F::one();
        (self.width / two, self.height / two)
    }

    /// `num_points` points on the boundary, in final coordinates.
    pub fn outline(&self, num_points: usize) -> Vec<na::Point2<F>> {
        sample_patch_outline(self, num_points)
    }
}

/// Anything able to draw an ellipse patch.
pub trait EllipseRenderer<F: na::RealField + Copy> {
    type Error;

    fn draw_ellipse(&mut self, patch: &EllipsePatch<F>, style: &PatchStyle)
        -> Result<(), Self::Error>;
}

impl<F: na::RealField + Copy, R: EllipseRenderer<F> + ?Sized> EllipseRenderer<F> for &mut R {
    type Error = R::Error;

    fn draw_ellipse(
        &mut self,
        patch: &EllipsePatch<F>,
        style: &PatchStyle,
    ) -> Result<(), Self::Error> {
        (**self).draw_ellipse(patch, style)
    }
}

/// Keeps every draw call, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer<F: na::RealField + Copy> {
    pub calls: Vec<(EllipsePatch<F>, PatchStyle)>,
}

impl<F: na::RealField + Copy> RecordingRenderer<F> {
    pub fn new() -> Self {
        Self { calls: Vec::new() }
    }
}

impl<F: na::RealField + Copy> EllipseRenderer<F> for RecordingRenderer<F> {
    type Error = Infallible;

    fn draw_ellipse(
        &mut self,
        patch: &EllipsePatch<F>,
        style: &PatchStyle,
    ) -> Result<(), Self::Error> {
        self.calls.push((patch.clone(), style.clone()));
        Ok(())
    }
}
