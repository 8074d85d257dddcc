//! Ellipse ROI descriptors.

use serde::Serialize;

use crate::error::AnnotationError;

/// Stroke width of every emitted ROI, in pixels.
pub const STROKE_WIDTH: f64 = 2.0;

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a `#RRGGBB` color, using `alpha` for the alpha channel.
    pub fn from_hex(color_hex: &str, alpha: u8) -> Result<Self, AnnotationError> {
        let invalid = || AnnotationError::InvalidColor(color_hex.to_string());

        let digits = color_hex.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 {
            return Err(invalid());
        }

        let mut rgb = [0u8; 3];
        hex::decode_to_slice(digits, &mut rgb).map_err(|_| invalid())?;

        Ok(Rgba::new(rgb[0], rgb[1], rgb[2], alpha))
    }
}

/// Alpha channel applied to the stroke color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeAlpha {
    /// Alpha 0, as the historical importer wrote it. Some viewers render
    /// such ROIs invisible.
    #[default]
    SourceParity,

    /// Fully opaque stroke
    Opaque,
}

impl StrokeAlpha {
    pub fn value(&self) -> u8 {
        match self {
            StrokeAlpha::SourceParity => 0,
            StrokeAlpha::Opaque => u8::MAX,
        }
    }
}

/// An ellipse ROI in image pixel space, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EllipseShape {
    pub label: String,
    pub center_x_px: f64,
    pub center_y_px: f64,
    pub radius_x_px: f64,
    pub radius_y_px: f64,
    pub fill_color: Rgba,
    pub stroke_color: Rgba,
    pub stroke_width: f64,

    /// Z plane; `None` shows the ROI on every plane
    pub z_plane: Option<u32>,
}

/// Build a circular ellipse descriptor with the default stroke alpha.
pub fn build_shape(
    label: &str,
    x_px: f64,
    y_px: f64,
    radius_px: f64,
    color_hex: &str,
) -> Result<EllipseShape, AnnotationError> {
    build_shape_with_alpha(label, x_px, y_px, radius_px, color_hex, StrokeAlpha::default())
}

/// Build a circular ellipse descriptor with an explicit stroke alpha policy.
pub fn build_shape_with_alpha(
    label: &str,
    x_px: f64,
    y_px: f64,
    radius_px: f64,
    color_hex: &str,
    alpha: StrokeAlpha,
) -> Result<EllipseShape, AnnotationError> {
    let stroke_color = Rgba::from_hex(color_hex, alpha.value())?;

    Ok(EllipseShape {
        label: label.to_string(),
        center_x_px: x_px,
        center_y_px: y_px,
        radius_x_px: radius_px,
        radius_y_px: radius_px,
        fill_color: Rgba::TRANSPARENT,
        stroke_color,
        stroke_width: STROKE_WIDTH,
        z_plane: None,
    })
}
