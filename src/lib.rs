//! # NDPA Import
//!
//! Converts NDP.view annotation files (`.ndpa`) into elliptical regions of
//! interest in the pixel space of the matching whole slide image.
//!
//! NDPA circles are stored in nanometers relative to the physical slide
//! center. Placing them on the digitized image takes three steps:
//!
//! 1. Resolve units: slide center metadata is usually in nanometers while the
//!    image's pixel size is in micrometers
//! 2. Compute the pixel offset that puts the slide center at the image center
//! 3. Convert every circle nm → µm → px and emit an ellipse ROI
//!
//! ## Architecture
//!
//! - [`calibration`] - Units, slide center lookup, pixel offset
//! - [`annotation`] - NDPA parsing, coordinate transform, ROI shapes
//! - [`import`] - Orchestration and the [`RoiSink`] persistence seam
//! - [`config`] - CLI configuration
//!
//! ## Example
//!
//! ```
//! use ndpa_import::{convert, ConvertOptions, ImageMetadata, MetadataValue, PhysicalSize};
//!
//! let metadata = ImageMetadata {
//!     image_id: 1,
//!     size_x: 40_000,
//!     size_y: 20_000,
//!     pixel_size_x: Some(PhysicalSize::micrometers(0.5)),
//!     pixel_size_y: Some(PhysicalSize::micrometers(0.5)),
//!     original_metadata: vec![
//!         ("Slide center X (nm)".into(), MetadataValue::Number(0.0)),
//!         ("Slide center Y (nm)".into(), MetadataValue::Number(0.0)),
//!     ],
//! };
//!
//! let xml = r##"<annotations><ndpviewstate><title>spot</title>
//!     <annotation type="circle" color="#ff0000">
//!         <x>0</x><y>0</y><radius>50000</radius>
//!     </annotation>
//! </ndpviewstate></annotations>"##;
//!
//! let conversion = convert(&metadata, xml, ConvertOptions::default()).unwrap();
//! let shape = &conversion.report.shapes[0];
//!
//! assert_eq!(shape.center_x_px, 20_000.0);
//! assert_eq!(shape.radius_x_px, 100.0);
//! ```

pub mod annotation;
pub mod calibration;
pub mod config;
pub mod error;
pub mod import;

// Re-export commonly used types
pub use annotation::{
    area_um2, build_shape, build_shape_with_alpha, parse_annotations, AnnotationParser,
    AnnotationRecord, CoordinateTransform, EllipseShape, ParseReport, Rgba, SkippedAnnotation,
    StrokeAlpha, TransformedCircle, STROKE_WIDTH,
};
pub use calibration::{
    compute_offset, extract_unit_label, resolve_factor, ConversionFactors, ImageMetadata,
    LengthUnit, MetadataValue, PhysicalCalibration, PhysicalSize, PixelOffset, SlideCenter,
    SlideCenterSource,
};
pub use config::{Cli, Command, ConvertConfig, InspectConfig};
pub use error::{AnnotationError, CalibrationError, ImportError, SinkError};
pub use import::{
    convert, load_metadata, resolve_calibration, Attachment, Conversion, ConvertOptions,
    DirectorySink, ImportReport, ImportRequest, ImportService, RoiSink,
};
