//! Calibration layer.
//!
//! Turns the platform's view of an image (pixel sizes, dimensions, original
//! scanner metadata) into the numbers the annotation transform needs.
//!
//! ```text
//! ImageMetadata ──► PhysicalCalibration ──► ConversionFactors
//!                            │                     │
//!                            └──────────┬──────────┘
//!                                       ▼
//!                                  PixelOffset
//! ```
//!
//! # Example
//!
//! ```
//! use ndpa_import::calibration::{
//!     compute_offset, ConversionFactors, ImageMetadata, MetadataValue, PhysicalCalibration,
//!     PhysicalSize,
//! };
//!
//! let metadata = ImageMetadata {
//!     image_id: 1,
//!     size_x: 4000,
//!     size_y: 2000,
//!     pixel_size_x: Some(PhysicalSize::micrometers(0.5)),
//!     pixel_size_y: Some(PhysicalSize::micrometers(0.5)),
//!     original_metadata: vec![
//!         ("Slide center X (nm)".into(), MetadataValue::Number(0.0)),
//!         ("Slide center Y (nm)".into(), MetadataValue::Number(0.0)),
//!     ],
//! };
//!
//! let calibration = PhysicalCalibration::from_image_metadata(&metadata).unwrap();
//! let factors = ConversionFactors::resolve(&calibration);
//! let offset = compute_offset(&calibration, &factors).unwrap();
//!
//! assert_eq!(factors.factor_x, 1000.0);
//! assert_eq!(offset.offset_x_px, 2000.0);
//! ```

mod metadata;
mod offset;
mod physical;
mod units;

pub use metadata::{
    ImageMetadata, MetadataValue, PhysicalSize, SlideCenter, SlideCenterSource, SLIDE_CENTER_KEY,
};
pub use offset::{compute_offset, PixelOffset};
pub use physical::PhysicalCalibration;
pub use units::{
    extract_unit_label, factor_between, resolve_factor, ConversionFactors, LengthUnit,
    NANOMETERS_PER_MICROMETER,
};
