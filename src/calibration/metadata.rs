//! Image metadata supplied by the image-management platform.
//!
//! The platform exposes typed pixel sizes and dimensions, plus a flat list of
//! "original metadata" key/value pairs copied from the scanner file. The
//! slide center lives only in the latter, under keys like
//! `"Slide center X (nm)"`.
//!
//! # Metadata document
//!
//! ```json
//! {
//!   "image_id": 1234,
//!   "size_x": 86016,
//!   "size_y": 41728,
//!   "pixel_size_x": { "value": 0.2265, "unit": "MICROMETER" },
//!   "pixel_size_y": { "value": 0.2265, "unit": "MICROMETER" },
//!   "original_metadata": [
//!     ["Slide center X (nm)", 1849000],
//!     ["Slide center Y (nm)", "-3110000"]
//!   ]
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CalibrationError;

use super::units::{extract_unit_label, LengthUnit};

/// Key fragment identifying slide center entries in the original metadata.
pub const SLIDE_CENTER_KEY: &str = "Slide center";

// =============================================================================
// Metadata Document
// =============================================================================

/// A physical length as reported by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalSize {
    pub value: f64,

    /// Platform unit name (e.g. `MICROMETER`) or symbol
    pub unit: String,
}

impl PhysicalSize {
    pub fn micrometers(value: f64) -> Self {
        Self {
            value,
            unit: "MICROMETER".to_string(),
        }
    }

    pub fn length_unit(&self) -> LengthUnit {
        LengthUnit::from_platform_name(&self.unit)
    }
}

/// A value in the original metadata table. Scanners store numbers as either
/// JSON numbers or strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Number(f64),
    Text(String),
}

impl MetadataValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Number(n) => Some(*n),
            MetadataValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Number(n) => write!(f, "{}", n),
            MetadataValue::Text(s) => f.write_str(s),
        }
    }
}

/// Everything the platform knows about one image that the converter needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Platform identifier of the image
    pub image_id: i64,

    /// Image width in pixels
    pub size_x: u32,

    /// Image height in pixels
    pub size_y: u32,

    /// Physical size of a pixel along X
    #[serde(default)]
    pub pixel_size_x: Option<PhysicalSize>,

    /// Physical size of a pixel along Y
    #[serde(default)]
    pub pixel_size_y: Option<PhysicalSize>,

    /// Original scanner metadata as key/value pairs
    #[serde(default)]
    pub original_metadata: Vec<(String, MetadataValue)>,
}

impl ImageMetadata {
    /// Decode a metadata document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// =============================================================================
// Slide Center
// =============================================================================

/// Where the slide center values came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideCenterSource {
    /// Read from the original metadata
    Metadata,

    /// No slide center keys were found; all values are zero
    Defaulted,
}

/// The physical position of the slide center, with per-axis units.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideCenter {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub unit_x: LengthUnit,
    pub unit_y: LengthUnit,
    pub unit_z: LengthUnit,
    pub source: SlideCenterSource,
}

impl SlideCenter {
    /// A zero slide center, used when the metadata has none.
    pub fn defaulted() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            unit_x: LengthUnit::Unknown,
            unit_y: LengthUnit::Unknown,
            unit_z: LengthUnit::Unknown,
            source: SlideCenterSource::Defaulted,
        }
    }

    /// Find the slide center in the original metadata table.
    ///
    /// Each key containing [`SLIDE_CENTER_KEY`] is assigned to an axis by the
    /// first `X`, `Y` or `Z` after the key fragment; the unit comes from the
    /// parenthesised part of the key. Missing axes stay at zero. If no key
    /// matches at all, a warning is emitted and a defaulted center is
    /// returned, since every ROI will then be misplaced by the slide offset.
    pub fn from_original_metadata(
        entries: &[(String, MetadataValue)],
    ) -> Result<Self, CalibrationError> {
        let mut center = SlideCenter::defaulted();
        let mut found = false;

        for (key, value) in entries {
            let Some(axis) = slide_center_axis(key) else {
                continue;
            };

            let number = value
                .as_f64()
                .ok_or_else(|| CalibrationError::InvalidSlideCenter {
                    axis,
                    value: value.to_string(),
                })?;
            let unit = extract_unit_label(key)
                .map(LengthUnit::from_label)
                .unwrap_or_default();

            debug!(key = %key, value = number, unit = unit.symbol(), "Slide center entry");

            match axis {
                'X' => {
                    center.x = number;
                    center.unit_x = unit;
                }
                'Y' => {
                    center.y = number;
                    center.unit_y = unit;
                }
                _ => {
                    center.z = number;
                    center.unit_z = unit;
                }
            }
            found = true;
        }

        if found {
            center.source = SlideCenterSource::Metadata;
        } else {
            warn!(
                "No '{}' entries in original metadata; assuming a zero slide offset",
                SLIDE_CENTER_KEY
            );
        }

        Ok(center)
    }
}

/// Axis letter of a slide center key, or `None` if the key is unrelated.
fn slide_center_axis(key: &str) -> Option<char> {
    let start = key.find(SLIDE_CENTER_KEY)?;
    let rest = &key[start + SLIDE_CENTER_KEY.len()..];
    let rest = rest.split('(').next().unwrap_or(rest);

    rest.chars().find(|c| matches!(c, 'X' | 'Y' | 'Z'))
}

// =============================================================================
// Tests
// =============================================================================
