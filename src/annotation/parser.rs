//! NDPA annotation document parser.
//!
//! NDPA files are XML documents written by NDP.view. Each annotation is an
//! `ndpviewstate` element under the root; only those holding an
//! `annotation type="circle"` child are converted:
//!
//! ```xml
//! <annotations>
//!   <ndpviewstate id="1">
//!     <title>tumor</title>
//!     <annotation type="circle" color="#ff0000">
//!       <x>1849000</x>
//!       <y>-3110000</y>
//!       <radius>250000</radius>
//!     </annotation>
//!   </ndpviewstate>
//! </annotations>
//! ```
//!
//! Coordinates are in nanometers relative to the slide center.
//!
//! A broken entry never aborts the file: it is recorded as a
//! [`SkippedAnnotation`] and parsing continues with the next one.

use roxmltree::{Document, Node};
use tracing::{debug, warn};

use crate::calibration::{ConversionFactors, PhysicalCalibration, PixelOffset};
use crate::error::{AnnotationError, ImportError};

use super::shape::{build_shape_with_alpha, EllipseShape, StrokeAlpha};
use super::transform::CoordinateTransform;

/// Element name of one annotation entry.
pub const VIEW_STATE_TAG: &str = "ndpviewstate";

/// `type` attribute value of circle annotations.
pub const CIRCLE_TYPE: &str = "circle";

/// Number of skip reasons listed by [`ParseReport::summary`].
pub const SUMMARY_REASON_LIMIT: usize = 5;

// =============================================================================
// Annotation Record
// =============================================================================

/// One circular annotation as written in the NDPA file.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub label: String,
    pub center_x_nm: f64,
    pub center_y_nm: f64,
    pub radius_nm: f64,
    pub color_hex: String,
}

impl AnnotationRecord {
    /// Read the circle held by a view-state element.
    ///
    /// Returns `Ok(None)` when the element has no circle annotation.
    pub fn from_view_state(view_state: Node<'_, '_>) -> Result<Option<Self>, AnnotationError> {
        let Some(circle) = find_circle(view_state) else {
            return Ok(None);
        };

        let center_x_nm = child_number(circle, "x")?;
        let center_y_nm = child_number(circle, "y")?;
        let radius_nm = child_number(circle, "radius")?;
        let color_hex = circle
            .attribute("color")
            .ok_or(AnnotationError::MissingColor)?
            .trim()
            .to_string();
        let label = title(view_state)
            .ok_or(AnnotationError::MissingElement("title"))?
            .to_string();

        Ok(Some(AnnotationRecord {
            label,
            center_x_nm,
            center_y_nm,
            radius_nm,
            color_hex,
        }))
    }
}

fn find_circle<'a, 'input>(view_state: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    view_state
        .children()
        .find(|node| node.has_tag_name("annotation") && node.attribute("type") == Some(CIRCLE_TYPE))
}

/// Title text of a view state. An empty `<title/>` yields an empty label.
fn title<'a>(view_state: Node<'a, '_>) -> Option<&'a str> {
    view_state
        .children()
        .find(|node| node.has_tag_name("title"))
        .map(|node| node.text().unwrap_or("").trim())
}

fn child_number(parent: Node<'_, '_>, name: &'static str) -> Result<f64, AnnotationError> {
    let text = parent
        .children()
        .find(|node| node.has_tag_name(name))
        .ok_or(AnnotationError::MissingElement(name))?
        .text()
        .unwrap_or("")
        .trim();

    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(AnnotationError::InvalidNumber {
            field: name,
            value: text.to_string(),
        }),
    }
}

// =============================================================================
// Parse Report
// =============================================================================

/// An annotation that could not be converted.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedAnnotation {
    /// Position of the view state among all view states (0-based)
    pub index: usize,

    /// Title, if it could be read
    pub label: Option<String>,

    pub reason: AnnotationError,
}

/// Result of parsing one annotation document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    /// Converted shapes, in document order
    pub shapes: Vec<EllipseShape>,

    /// Circle entries that were skipped
    pub skipped: Vec<SkippedAnnotation>,

    /// Total number of view states in the document
    pub view_states: usize,

    /// View states without a circle annotation
    pub ignored: usize,
}

impl ParseReport {
    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }

    /// One-paragraph summary of skipped entries: the count and the first
    /// [`SUMMARY_REASON_LIMIT`] reasons.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} shape(s) converted, {} skipped, {} non-circle view state(s) ignored",
            self.shapes.len(),
            self.skipped.len(),
            self.ignored
        );

        for skipped in self.skipped.iter().take(SUMMARY_REASON_LIMIT) {
            let label = skipped.label.as_deref().unwrap_or("<untitled>");
            summary.push_str(&format!(
                "\n  #{} {:?}: {}",
                skipped.index, label, skipped.reason
            ));
        }
        if self.skipped.len() > SUMMARY_REASON_LIMIT {
            summary.push_str(&format!(
                "\n  ... and {} more",
                self.skipped.len() - SUMMARY_REASON_LIMIT
            ));
        }

        summary
    }
}

// =============================================================================
// Parser
// =============================================================================

/// Parses NDPA documents into pixel-space ROIs for one image.
#[derive(Debug, Clone)]
pub struct AnnotationParser {
    transform: CoordinateTransform,
    stroke_alpha: StrokeAlpha,
}

impl AnnotationParser {
    pub fn new(transform: CoordinateTransform) -> Self {
        Self {
            transform,
            stroke_alpha: StrokeAlpha::default(),
        }
    }

    /// Set the stroke alpha policy for emitted shapes.
    pub fn with_stroke_alpha(mut self, stroke_alpha: StrokeAlpha) -> Self {
        self.stroke_alpha = stroke_alpha;
        self
    }

    /// Parse an NDPA document from text.
    ///
    /// Only a document that is not well-formed XML fails as a whole.
    pub fn parse_str(&self, xml: &str) -> Result<ParseReport, ImportError> {
        let document = Document::parse(xml).map_err(|e| ImportError::Xml(e.to_string()))?;
        Ok(self.parse_document(&document))
    }

    /// Convert every circle annotation of a parsed document.
    pub fn parse_document(&self, document: &Document<'_>) -> ParseReport {
        let mut report = ParseReport::default();

        let view_states = document
            .root_element()
            .children()
            .filter(|node| node.has_tag_name(VIEW_STATE_TAG));

        for (index, view_state) in view_states.enumerate() {
            report.view_states += 1;

            match self.convert_view_state(view_state) {
                Ok(Some(shape)) => report.shapes.push(shape),
                Ok(None) => report.ignored += 1,
                Err(reason) => {
                    let label = title(view_state).map(str::to_string);
                    warn!(index, label = ?label, "Skipping annotation: {}", reason);
                    report.skipped.push(SkippedAnnotation {
                        index,
                        label,
                        reason,
                    });
                }
            }
        }

        report
    }

    fn convert_view_state(
        &self,
        view_state: Node<'_, '_>,
    ) -> Result<Option<EllipseShape>, AnnotationError> {
        let Some(record) = AnnotationRecord::from_view_state(view_state)? else {
            return Ok(None);
        };

        let circle = self
            .transform
            .apply(record.center_x_nm, record.center_y_nm, record.radius_nm);

        debug!(
            label = %record.label,
            x_nm = record.center_x_nm,
            y_nm = record.center_y_nm,
            radius_nm = record.radius_nm,
            area_um2 = circle.area_um2,
            "ROI"
        );
        debug!(
            x_um = circle.x_um,
            y_um = circle.y_um,
            radius_um = circle.radius_um,
            x_px = circle.x_px,
            y_px = circle.y_px,
            radius_px = circle.radius_px,
            "Converted"
        );

        let shape = build_shape_with_alpha(
            &record.label,
            circle.x_px,
            circle.y_px,
            circle.radius_px,
            &record.color_hex,
            self.stroke_alpha,
        )?;

        Ok(Some(shape))
    }
}

/// Convert every circle annotation of `document` for one image.
pub fn parse_annotations(
    document: &Document<'_>,
    calibration: &PhysicalCalibration,
    offset: PixelOffset,
    factors: ConversionFactors,
) -> ParseReport {
    AnnotationParser::new(CoordinateTransform::new(calibration, factors, offset))
        .parse_document(document)
}

// =============================================================================
// Tests
// =============================================================================
