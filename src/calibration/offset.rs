use serde::Serialize;

use crate::error::CalibrationError;

use super::physical::PhysicalCalibration;
use super::units::ConversionFactors;

/// Pixel position of the annotation coordinate origin in image space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PixelOffset {
    pub offset_x_px: f64,
    pub offset_y_px: f64,
}

impl PixelOffset {
    pub const ZERO: PixelOffset = PixelOffset {
        offset_x_px: 0.0,
        offset_y_px: 0.0,
    };

    pub fn new(offset_x_px: f64, offset_y_px: f64) -> Self {
        Self {
            offset_x_px,
            offset_y_px,
        }
    }
}

/// Compute the offset that maps the physical slide center onto the
/// geometric center of the image.
///
/// Per axis: `size / 2 - center / (factor * pixel_size)`.
pub fn compute_offset(
    calibration: &PhysicalCalibration,
    factors: &ConversionFactors,
) -> Result<PixelOffset, CalibrationError> {
    calibration.validate()?;

    Ok(PixelOffset {
        offset_x_px: axis_offset(
            calibration.image_width_px,
            calibration.slide_center_x,
            factors.factor_x,
            calibration.pixel_size_x,
        ),
        offset_y_px: axis_offset(
            calibration.image_height_px,
            calibration.slide_center_y,
            factors.factor_y,
            calibration.pixel_size_y,
        ),
    })
}

fn axis_offset(size_px: u32, center: f64, factor: f64, pixel_size: f64) -> f64 {
    let center_px = center / (factor * pixel_size);
    f64::from(size_px) / 2.0 - center_px
}
