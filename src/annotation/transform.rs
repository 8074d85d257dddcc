//! nm → µm → px conversion of annotation circles.

use std::f64::consts::PI;

use serde::Serialize;

use crate::calibration::{ConversionFactors, PhysicalCalibration, PixelOffset};

/// Area of a circle in square micrometers, rounded up to a whole number.
///
/// Kept as `f64` so very large radii stay exact in magnitude instead of
/// saturating an integer type.
pub fn area_um2(radius_um: f64) -> f64 {
    (PI * radius_um * radius_um).ceil()
}

/// A circle expressed both in micrometers and in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransformedCircle {
    pub x_um: f64,
    pub y_um: f64,
    pub radius_um: f64,

    /// Informational; not carried onto the ROI
    pub area_um2: f64,

    pub x_px: f64,
    pub y_px: f64,
    pub radius_px: f64,
}

/// Everything needed to place an annotation circle on the image.
///
/// Built once per image and shared by every annotation of that image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    pub factors: ConversionFactors,
    pub pixel_size_x: f64,
    pub pixel_size_y: f64,
    pub offset: PixelOffset,
}

impl CoordinateTransform {
    pub fn new(
        calibration: &PhysicalCalibration,
        factors: ConversionFactors,
        offset: PixelOffset,
    ) -> Self {
        Self {
            factors,
            pixel_size_x: calibration.pixel_size_x,
            pixel_size_y: calibration.pixel_size_y,
            offset,
        }
    }

    /// Convert one circle given in annotation units.
    ///
    /// The radius is divided by the X factor only, then by the mean pixel
    /// size so the result stays a circle on anisotropic pixels.
    pub fn apply(&self, x_nm: f64, y_nm: f64, radius_nm: f64) -> TransformedCircle {
        let x_um = x_nm / self.factors.factor_x;
        let y_um = y_nm / self.factors.factor_y;
        let radius_um = radius_nm / self.factors.factor_x;

        let x_px = x_um / self.pixel_size_x + self.offset.offset_x_px;
        let y_px = y_um / self.pixel_size_y + self.offset.offset_y_px;
        let radius_px = radius_um / self.mean_pixel_size();

        TransformedCircle {
            x_um,
            y_um,
            radius_um,
            area_um2: area_um2(radius_um),
            x_px,
            y_px,
            radius_px,
        }
    }

    fn mean_pixel_size(&self) -> f64 {
        (self.pixel_size_x + self.pixel_size_y) / 2.0
    }
}
