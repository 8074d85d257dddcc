//! Annotation conversion layer.
//!
//! Reads circle annotations out of NDPA documents and turns them into
//! ellipse ROIs in image pixel space.
//!
//! # Components
//!
//! - [`AnnotationParser`]: walks the document, skipping broken entries
//! - [`CoordinateTransform`]: nm → µm → px conversion of a single circle
//! - [`build_shape`]: assembles the final [`EllipseShape`]

mod parser;
mod shape;
mod transform;

pub use parser::{
    parse_annotations, AnnotationParser, AnnotationRecord, ParseReport, SkippedAnnotation,
    CIRCLE_TYPE, SUMMARY_REASON_LIMIT, VIEW_STATE_TAG,
};
pub use shape::{
    build_shape, build_shape_with_alpha, EllipseShape, Rgba, StrokeAlpha, STROKE_WIDTH,
};
pub use transform::{area_um2, CoordinateTransform, TransformedCircle};
