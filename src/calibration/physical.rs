use serde::Serialize;
use tracing::warn;

use crate::error::CalibrationError;

use super::metadata::{ImageMetadata, PhysicalSize, SlideCenter, SlideCenterSource};
use super::units::LengthUnit;

/// Per-image facts needed to map annotation coordinates onto pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhysicalCalibration {
    /// Physical size of a pixel along X
    pub pixel_size_x: f64,

    /// Physical size of a pixel along Y
    pub pixel_size_y: f64,

    /// Unit of `pixel_size_x`
    pub pixel_size_unit_x: LengthUnit,

    /// Unit of `pixel_size_y`
    pub pixel_size_unit_y: LengthUnit,

    /// Physical X position of the slide center, in `slide_center_unit_x`
    pub slide_center_x: f64,

    /// Physical Y position of the slide center, in `slide_center_unit_y`
    pub slide_center_y: f64,

    pub slide_center_unit_x: LengthUnit,
    pub slide_center_unit_y: LengthUnit,

    /// Where the slide center came from
    pub slide_center_source: SlideCenterSource,

    /// Image width in pixels
    pub image_width_px: u32,

    /// Image height in pixels
    pub image_height_px: u32,
}

impl PhysicalCalibration {
    /// Build and validate a calibration from platform metadata.
    ///
    /// Missing or non-positive pixel sizes and empty image dimensions are
    /// fatal. A missing slide center is not: it is defaulted to zero and
    /// flagged through `slide_center_source`.
    pub fn from_image_metadata(metadata: &ImageMetadata) -> Result<Self, CalibrationError> {
        let size_x = required_pixel_size(metadata.pixel_size_x.as_ref(), 'X')?;
        let size_y = required_pixel_size(metadata.pixel_size_y.as_ref(), 'Y')?;

        let center = SlideCenter::from_original_metadata(&metadata.original_metadata)?;

        let calibration = PhysicalCalibration {
            pixel_size_x: size_x.value,
            pixel_size_y: size_y.value,
            pixel_size_unit_x: size_x.length_unit(),
            pixel_size_unit_y: size_y.length_unit(),
            slide_center_x: center.x,
            slide_center_y: center.y,
            slide_center_unit_x: center.unit_x,
            slide_center_unit_y: center.unit_y,
            slide_center_source: center.source,
            image_width_px: metadata.size_x,
            image_height_px: metadata.size_y,
        };

        calibration.validate()?;

        if calibration.pixel_size_unit_x == LengthUnit::Unknown
            || calibration.pixel_size_unit_y == LengthUnit::Unknown
        {
            warn!(
                "Unrecognised pixel size unit ({}, {}); slide center will not be converted",
                size_x.unit, size_y.unit
            );
        }

        Ok(calibration)
    }

    /// Check the invariants: strictly positive, finite pixel sizes and
    /// non-empty image dimensions.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        check_pixel_size(self.pixel_size_x, 'X')?;
        check_pixel_size(self.pixel_size_y, 'Y')?;

        if self.image_width_px == 0 {
            return Err(CalibrationError::InvalidImageDimension {
                axis: 'X',
                value: self.image_width_px,
            });
        }
        if self.image_height_px == 0 {
            return Err(CalibrationError::InvalidImageDimension {
                axis: 'Y',
                value: self.image_height_px,
            });
        }

        Ok(())
    }

    pub fn is_slide_center_defaulted(&self) -> bool {
        self.slide_center_source == SlideCenterSource::Defaulted
    }
}

fn required_pixel_size(
    size: Option<&PhysicalSize>,
    axis: char,
) -> Result<&PhysicalSize, CalibrationError> {
    let size = size.ok_or(CalibrationError::MissingPixelSize { axis })?;
    check_pixel_size(size.value, axis)?;
    Ok(size)
}

fn check_pixel_size(value: f64, axis: char) -> Result<(), CalibrationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CalibrationError::InvalidPixelSize { axis, value })
    }
}

// =============================================================================
// Tests
// =============================================================================
