//! Import orchestration.
//!
//! [`convert`] is the pure core: image metadata and NDPA text in, ROIs out.
//! [`ImportService`] wraps it with file reading and the persistence backend.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use crate::annotation::{AnnotationParser, CoordinateTransform, ParseReport, StrokeAlpha};
use crate::calibration::{
    compute_offset, ConversionFactors, ImageMetadata, PhysicalCalibration, PixelOffset,
};
use crate::error::ImportError;

use super::sink::{Attachment, RoiSink, NDPA_MIME_TYPE};

// =============================================================================
// Conversion
// =============================================================================

/// Options affecting how shapes are built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub stroke_alpha: StrokeAlpha,
}

/// Output of a conversion for one image.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub calibration: PhysicalCalibration,
    pub factors: ConversionFactors,
    pub offset: PixelOffset,
    pub report: ParseReport,
}

impl Conversion {
    /// Whether the slide offset was assumed to be zero.
    pub fn offset_defaulted(&self) -> bool {
        self.calibration.is_slide_center_defaulted()
    }
}

/// Resolve the calibration chain for an image.
///
/// Fails on any calibration problem; nothing is converted in that case.
pub fn resolve_calibration(
    metadata: &ImageMetadata,
) -> Result<(PhysicalCalibration, ConversionFactors, PixelOffset), ImportError> {
    let calibration = PhysicalCalibration::from_image_metadata(metadata)?;
    let factors = ConversionFactors::resolve(&calibration);

    if !factors.is_isotropic() {
        warn!(
            factor_x = factors.factor_x,
            factor_y = factors.factor_y,
            "Slide center axes use different units; radii are scaled by the X factor only"
        );
    }

    let offset = compute_offset(&calibration, &factors)?;

    info!(
        image_id = metadata.image_id,
        factor_x = factors.factor_x,
        factor_y = factors.factor_y,
        offset_x_px = offset.offset_x_px,
        offset_y_px = offset.offset_y_px,
        "Resolved calibration"
    );

    Ok((calibration, factors, offset))
}

/// Convert the circles of an NDPA document into ROIs for one image.
pub fn convert(
    metadata: &ImageMetadata,
    xml: &str,
    options: ConvertOptions,
) -> Result<Conversion, ImportError> {
    let (calibration, factors, offset) = resolve_calibration(metadata)?;

    let parser = AnnotationParser::new(CoordinateTransform::new(&calibration, factors, offset))
        .with_stroke_alpha(options.stroke_alpha);
    let report = parser.parse_str(xml)?;

    if report.has_skipped() {
        warn!("{}", report.summary());
    }

    Ok(Conversion {
        calibration,
        factors,
        offset,
        report,
    })
}

// =============================================================================
// Import Service
// =============================================================================

/// One image's import job.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub metadata: ImageMetadata,
    pub annotation_path: PathBuf,
}

/// What an import run did.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub image_id: i64,
    pub offset: PixelOffset,
    pub factors: ConversionFactors,

    /// True when no slide center was found and a zero offset was used
    pub offset_defaulted: bool,

    /// ROI ids returned by the sink, in document order
    pub stored: Vec<String>,

    /// Number of circle entries that could not be converted
    pub skipped: usize,

    /// Human-readable summary of the parse
    pub summary: String,

    /// SHA-256 of the attached annotation file, if attached
    pub attachment_sha256: Option<String>,
}

/// Runs imports against an ROI sink.
#[derive(Debug)]
pub struct ImportService<S> {
    sink: S,
    options: ConvertOptions,
    attach_source: bool,
}

impl<S: RoiSink> ImportService<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            options: ConvertOptions::default(),
            attach_source: true,
        }
    }

    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Whether to attach the original annotation file to the image.
    pub fn with_attach_source(mut self, attach_source: bool) -> Self {
        self.attach_source = attach_source;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Convert the annotation file and store the result.
    ///
    /// Shapes are stored one call each. The annotation file is attached
    /// afterwards, byte-for-byte, when enabled.
    pub async fn import(&self, request: &ImportRequest) -> Result<ImportReport, ImportError> {
        let (data, xml) = read_annotation_text(&request.annotation_path).await?;

        let conversion = convert(&request.metadata, &xml, self.options)?;
        let image_id = request.metadata.image_id;

        let mut stored = Vec::with_capacity(conversion.report.shapes.len());
        for shape in &conversion.report.shapes {
            stored.push(self.sink.store_roi(image_id, shape).await?);
        }

        let attachment_sha256 = if self.attach_source {
            let attachment = Attachment::new(
                attachment_name(&request.annotation_path),
                NDPA_MIME_TYPE,
                data,
            );
            self.sink.attach_file(image_id, &attachment).await?;
            Some(attachment.sha256())
        } else {
            None
        };

        info!(
            image_id,
            stored = stored.len(),
            skipped = conversion.report.skipped.len(),
            "Import complete"
        );

        Ok(ImportReport {
            image_id,
            offset: conversion.offset,
            factors: conversion.factors,
            offset_defaulted: conversion.offset_defaulted(),
            stored,
            skipped: conversion.report.skipped.len(),
            summary: conversion.report.summary(),
            attachment_sha256,
        })
    }
}

/// Read a file fully, mapping errors to [`ImportError::Io`].
pub async fn read_file(path: &Path) -> Result<Bytes, ImportError> {
    tokio::fs::read(path)
        .await
        .map(Bytes::from)
        .map_err(|e| ImportError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Read an annotation file, returning its raw bytes and its UTF-8 text.
///
/// The bytes are kept so the file can be attached unmodified.
pub async fn read_annotation_text(path: &Path) -> Result<(Bytes, String), ImportError> {
    let data = read_file(path).await?;
    let xml = std::str::from_utf8(&data)
        .map_err(|e| ImportError::Encoding(format!("{}: {}", path.display(), e)))?
        .to_string();
    Ok((data, xml))
}

/// Load an [`ImageMetadata`] JSON document from disk.
pub async fn load_metadata(path: &Path) -> Result<ImageMetadata, ImportError> {
    let data = read_file(path).await?;
    serde_json::from_slice(&data).map_err(|e| ImportError::Metadata(e.to_string()))
}

fn attachment_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "annotations.ndpa".to_string())
}

// =============================================================================
// Tests
// =============================================================================
