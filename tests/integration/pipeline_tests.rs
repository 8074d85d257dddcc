//! Conversion pipeline tests.
//!
//! Tests verify:
//! - A circle at the slide center lands on the image center
//! - Reference nm → px conversion values
//! - Non-circle view states are dropped and order is kept
//! - One broken annotation does not discard the others
//! - Calibration errors are fatal and precise

use ndpa_import::{
    area_um2, convert, AnnotationError, CalibrationError, ConvertOptions, ImportError,
    PhysicalSize, Rgba, StrokeAlpha,
};

use super::test_utils::{image_metadata, NdpaBuilder};

const TOLERANCE: f64 = 1e-6;

// =============================================================================
// Placement
// =============================================================================

#[test]
fn test_circle_at_slide_center_maps_to_image_center() {
    let center = (1_849_000.0, -3_110_000.0);
    let metadata = image_metadata(1, (86_016, 41_728), (0.2265, 0.2265), Some(center));
    let xml = NdpaBuilder::new()
        .circle("center", center.0, center.1, 250_000.0, "#ff0000")
        .build();

    let conversion = convert(&metadata, &xml, ConvertOptions::default()).unwrap();

    let shape = &conversion.report.shapes[0];
    assert!((shape.center_x_px - 43_008.0).abs() < TOLERANCE);
    assert!((shape.center_y_px - 20_864.0).abs() < TOLERANCE);
}

#[test]
fn test_circle_at_slide_center_anisotropic_pixels() {
    let center = (500_000.0, 250_000.0);
    let metadata = image_metadata(1, (1001, 777), (0.25, 0.5), Some(center));
    let xml = NdpaBuilder::new()
        .circle("c", center.0, center.1, 1_000.0, "#000000")
        .build();

    let conversion = convert(&metadata, &xml, ConvertOptions::default()).unwrap();

    let shape = &conversion.report.shapes[0];
    assert!((shape.center_x_px - 500.5).abs() < TOLERANCE);
    assert!((shape.center_y_px - 388.5).abs() < TOLERANCE);
    // 1 µm over a mean pixel size of 0.375 µm
    assert!((shape.radius_x_px - 1.0 / 0.375).abs() < TOLERANCE);
    assert_eq!(shape.radius_x_px, shape.radius_y_px);
}

#[test]
fn test_reference_values_relative_to_slide_center() {
    // Slide center at the origin: offset is the image center.
    let metadata = image_metadata(1, (40_000, 20_000), (0.5, 0.5), Some((0.0, 0.0)));
    let xml = NdpaBuilder::new()
        .circle("ref", 10_000_000.0, 5_000_000.0, 500_000.0, "#FF0000")
        .build();

    let conversion = convert(&metadata, &xml, ConvertOptions::default()).unwrap();

    assert_eq!(conversion.factors.factor_x, 1000.0);
    assert_eq!(conversion.factors.factor_y, 1000.0);

    let shape = &conversion.report.shapes[0];
    assert!((shape.center_x_px - (20_000.0 + 20_000.0)).abs() < TOLERANCE);
    assert!((shape.center_y_px - (10_000.0 + 10_000.0)).abs() < TOLERANCE);
    assert!((shape.radius_x_px - 1_000.0).abs() < TOLERANCE);
    assert_eq!(area_um2(500.0), 785_399.0);
}

#[test]
fn test_colors() {
    let metadata = image_metadata(1, (100, 100), (1.0, 1.0), Some((0.0, 0.0)));
    let xml = NdpaBuilder::new()
        .circle("red", 0.0, 0.0, 1_000.0, "#FF0000")
        .build();

    let parity = convert(&metadata, &xml, ConvertOptions::default()).unwrap();
    let shape = &parity.report.shapes[0];
    assert_eq!(shape.stroke_color, Rgba::new(255, 0, 0, 0));
    assert_eq!(shape.fill_color, Rgba::new(0, 0, 0, 0));
    assert_eq!(shape.stroke_width, 2.0);
    assert_eq!(shape.z_plane, None);

    let opaque = convert(
        &metadata,
        &xml,
        ConvertOptions {
            stroke_alpha: StrokeAlpha::Opaque,
        },
    )
    .unwrap();
    assert_eq!(opaque.report.shapes[0].stroke_color, Rgba::new(255, 0, 0, 255));
    assert_eq!(opaque.report.shapes[0].fill_color, Rgba::TRANSPARENT);
}

// =============================================================================
// Filtering and Error Tolerance
// =============================================================================

#[test]
fn test_only_circles_in_document_order() {
    let metadata = image_metadata(1, (100, 100), (1.0, 1.0), Some((0.0, 0.0)));
    let xml = NdpaBuilder::new()
        .freehand("f1")
        .circle("first", 0.0, 0.0, 1_000.0, "#000000")
        .circle("second", 0.0, 0.0, 1_000.0, "#000000")
        .freehand("f2")
        .circle("third", 0.0, 0.0, 1_000.0, "#000000")
        .build();

    let conversion = convert(&metadata, &xml, ConvertOptions::default()).unwrap();

    let labels: Vec<_> = conversion
        .report
        .shapes
        .iter()
        .map(|s| s.label.as_str())
        .collect();
    assert_eq!(labels, vec!["first", "second", "third"]);
    assert_eq!(conversion.report.view_states, 5);
    assert_eq!(conversion.report.ignored, 2);
}

#[test]
fn test_one_malformed_annotation_is_skipped() {
    let metadata = image_metadata(1, (100, 100), (1.0, 1.0), Some((0.0, 0.0)));
    let xml = NdpaBuilder::new()
        .circle("a", 0.0, 0.0, 1_000.0, "#000000")
        .circle("b", 0.0, 0.0, 1_000.0, "#000000")
        .raw_circle("broken", "0", "0", "big", "#000000")
        .circle("c", 0.0, 0.0, 1_000.0, "#000000")
        .build();

    let conversion = convert(&metadata, &xml, ConvertOptions::default()).unwrap();

    assert_eq!(conversion.report.shapes.len(), 3);
    assert_eq!(conversion.report.skipped.len(), 1);

    let skipped = &conversion.report.skipped[0];
    assert_eq!(skipped.index, 2);
    assert_eq!(skipped.label.as_deref(), Some("broken"));
    assert_eq!(
        skipped.reason,
        AnnotationError::InvalidNumber {
            field: "radius",
            value: "big".to_string()
        }
    );
    assert!(conversion.report.summary().contains("broken"));
}

#[test]
fn test_empty_document() {
    let metadata = image_metadata(1, (100, 100), (1.0, 1.0), Some((0.0, 0.0)));

    let conversion = convert(&metadata, &NdpaBuilder::new().build(), ConvertOptions::default())
        .unwrap();

    assert!(conversion.report.shapes.is_empty());
    assert!(!conversion.report.has_skipped());
}

#[test]
fn test_malformed_document_is_fatal() {
    let metadata = image_metadata(1, (100, 100), (1.0, 1.0), Some((0.0, 0.0)));

    let result = convert(&metadata, "<annotations>", ConvertOptions::default());

    assert!(matches!(result, Err(ImportError::Xml(_))));
}

// =============================================================================
// Calibration
// =============================================================================

#[test]
fn test_missing_pixel_size_is_fatal() {
    let mut metadata = image_metadata(1, (100, 100), (1.0, 1.0), Some((0.0, 0.0)));
    metadata.pixel_size_x = None;
    let xml = NdpaBuilder::new()
        .circle("a", 0.0, 0.0, 1_000.0, "#000000")
        .build();

    let err = convert(&metadata, &xml, ConvertOptions::default()).unwrap_err();

    assert!(matches!(
        err,
        ImportError::Calibration(CalibrationError::MissingPixelSize { axis: 'X' })
    ));
    assert!(err.to_string().contains("pixel size X"));
}

#[test]
fn test_zero_pixel_size_is_fatal() {
    let mut metadata = image_metadata(1, (100, 100), (1.0, 1.0), Some((0.0, 0.0)));
    metadata.pixel_size_y = Some(PhysicalSize::micrometers(0.0));

    let err = convert(&metadata, &NdpaBuilder::new().build(), ConvertOptions::default())
        .unwrap_err();

    assert!(matches!(
        err,
        ImportError::Calibration(CalibrationError::InvalidPixelSize { axis: 'Y', .. })
    ));
}

#[test]
fn test_missing_slide_center_degrades_to_zero_offset() {
    let metadata = image_metadata(1, (2000, 1000), (0.5, 0.5), None);
    let xml = NdpaBuilder::new()
        .circle("a", 0.0, 0.0, 1_000.0, "#000000")
        .build();

    let conversion = convert(&metadata, &xml, ConvertOptions::default()).unwrap();

    assert!(conversion.offset_defaulted());
    // No unit information: coordinates are taken as micrometers.
    assert_eq!(conversion.factors.factor_x, 1.0);
    let shape = &conversion.report.shapes[0];
    assert_eq!(shape.center_x_px, 1000.0);
    assert_eq!(shape.center_y_px, 500.0);
}

#[test]
fn test_micrometer_slide_center_is_not_rescaled() {
    let mut metadata = image_metadata(1, (2000, 1000), (0.5, 0.5), None);
    metadata.original_metadata = vec![
        (
            "Slide center X (µm)".to_string(),
            ndpa_import::MetadataValue::Number(100.0),
        ),
        (
            "Slide center Y (µm)".to_string(),
            ndpa_import::MetadataValue::Number(50.0),
        ),
    ];

    let conversion = convert(&metadata, &NdpaBuilder::new().build(), ConvertOptions::default())
        .unwrap();

    assert_eq!(conversion.factors.factor_x, 1.0);
    assert_eq!(conversion.factors.factor_y, 1.0);
    assert_eq!(conversion.offset.offset_x_px, 1000.0 - 200.0);
    assert_eq!(conversion.offset.offset_y_px, 500.0 - 100.0);
}
