//! Length units and the nm → µm conversion factors.
//!
//! Slide center positions come out of free-text metadata keys such as
//! `"Slide center X (nm)"`, while physical pixel sizes come with a proper
//! unit from the image platform. Both are mapped onto [`LengthUnit`] here so
//! the rest of the pipeline never does string matching.

use serde::{Deserialize, Serialize};

/// Factor converting nanometers to micrometers.
pub const NANOMETERS_PER_MICROMETER: f64 = 1000.0;

/// Physical length unit recognised by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LengthUnit {
    Nanometer,
    Micrometer,
    #[default]
    Unknown,
}

impl LengthUnit {
    /// Classify a free-text unit label.
    ///
    /// Any label containing `nm` (case-sensitive) is nanometers. Unrecognised
    /// labels map to [`LengthUnit::Unknown`], which never triggers a
    /// conversion.
    pub fn from_label(label: &str) -> Self {
        if label.contains("nm") {
            return LengthUnit::Nanometer;
        }

        match label.trim().to_lowercase().as_str() {
            "µm" | "μm" | "um" | "micron" | "microns" | "micrometer" | "micrometers"
            | "micrometre" | "micrometres" => LengthUnit::Micrometer,
            _ => LengthUnit::Unknown,
        }
    }

    /// Parse the platform's enum name for a unit (e.g. `MICROMETER`).
    ///
    /// Falls back to [`LengthUnit::from_label`] so symbols are accepted too.
    pub fn from_platform_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "MICROMETER" | "MICROMETRE" => LengthUnit::Micrometer,
            "NANOMETER" | "NANOMETRE" => LengthUnit::Nanometer,
            _ => LengthUnit::from_label(name),
        }
    }

    /// Unit symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            LengthUnit::Nanometer => "nm",
            LengthUnit::Micrometer => "µm",
            LengthUnit::Unknown => "?",
        }
    }
}

/// Extract the first parenthesised substring of a metadata key.
///
/// `"Slide center X (nm)"` yields `Some("nm")`.
pub fn extract_unit_label(key: &str) -> Option<&str> {
    let start = key.find('(')?;
    let rest = &key[start + 1..];
    let end = rest.find(')')?;
    Some(rest[..end].trim())
}

/// Factor dividing a slide center coordinate to express it in pixel-size units.
///
/// Only a nanometer slide center on a micrometer pixel size is converted
/// (`1000.0`). Every other combination is taken as already matching (`1.0`).
pub fn factor_between(pixel_size_unit: LengthUnit, slide_center_unit: LengthUnit) -> f64 {
    match (pixel_size_unit, slide_center_unit) {
        (LengthUnit::Micrometer, LengthUnit::Nanometer) => NANOMETERS_PER_MICROMETER,
        _ => 1.0,
    }
}

/// Resolve the conversion factor from a pixel-size unit and a raw unit label.
pub fn resolve_factor(pixel_size_unit: LengthUnit, slide_center_unit_text: &str) -> f64 {
    factor_between(pixel_size_unit, LengthUnit::from_label(slide_center_unit_text))
}

/// Per-axis conversion factors from annotation units to pixel-size units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConversionFactors {
    pub factor_x: f64,
    pub factor_y: f64,
}

impl ConversionFactors {
    /// Factors that leave coordinates untouched.
    pub const IDENTITY: ConversionFactors = ConversionFactors {
        factor_x: 1.0,
        factor_y: 1.0,
    };

    pub fn new(factor_x: f64, factor_y: f64) -> Self {
        Self { factor_x, factor_y }
    }

    /// Derive the factors from a calibration's unit pairs.
    pub fn resolve(calibration: &super::PhysicalCalibration) -> Self {
        Self {
            factor_x: factor_between(
                calibration.pixel_size_unit_x,
                calibration.slide_center_unit_x,
            ),
            factor_y: factor_between(
                calibration.pixel_size_unit_y,
                calibration.slide_center_unit_y,
            ),
        }
    }

    /// Whether both axes use the same factor.
    ///
    /// Radii are always scaled by the X factor, so anisotropic factors
    /// distort them.
    pub fn is_isotropic(&self) -> bool {
        self.factor_x == self.factor_y
    }
}

impl Default for ConversionFactors {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// =============================================================================
// Tests
// =============================================================================
