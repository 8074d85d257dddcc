//! Test utilities: NDPA document builders, metadata builders and an
//! in-memory ROI sink.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use ndpa_import::{
    Attachment, EllipseShape, ImageMetadata, MetadataValue, PhysicalSize, RoiSink, SinkError,
};

// =============================================================================
// NDPA Documents
// =============================================================================

/// Builds NDPA documents one view state at a time.
#[derive(Debug, Default)]
pub struct NdpaBuilder {
    states: Vec<String>,
}

impl NdpaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a circle annotation with coordinates in nanometers.
    pub fn circle(self, title: &str, x_nm: f64, y_nm: f64, radius_nm: f64, color: &str) -> Self {
        self.raw_circle(
            title,
            &x_nm.to_string(),
            &y_nm.to_string(),
            &radius_nm.to_string(),
            color,
        )
    }

    /// Add a circle annotation with raw field text.
    pub fn raw_circle(mut self, title: &str, x: &str, y: &str, radius: &str, color: &str) -> Self {
        let id = self.states.len() + 1;
        self.states.push(format!(
            r#"  <ndpviewstate id="{id}">
    <title>{title}</title>
    <details/>
    <coordformat>nanometers</coordformat>
    <lens>2.5</lens>
    <x>0</x>
    <y>0</y>
    <z>0</z>
    <showtitle>0</showtitle>
    <showhistogram>0</showhistogram>
    <showlineprofile>0</showlineprofile>
    <annotation type="circle" displayname="AnnotateCircle" color="{color}">
      <x>{x}</x>
      <y>{y}</y>
      <radius>{radius}</radius>
      <measuretype>3</measuretype>
    </annotation>
  </ndpviewstate>
"#
        ));
        self
    }

    /// Add a freehand annotation, which the converter ignores.
    pub fn freehand(mut self, title: &str) -> Self {
        let id = self.states.len() + 1;
        self.states.push(format!(
            r##"  <ndpviewstate id="{id}">
    <title>{title}</title>
    <annotation type="freehand" displayname="AnnotateFreehand" color="#00ff00">
      <measuretype>0</measuretype>
      <closed>1</closed>
      <pointlist>
        <point><x>100</x><y>200</y></point>
        <point><x>300</x><y>400</y></point>
      </pointlist>
    </annotation>
  </ndpviewstate>
"##
        ));
        self
    }

    pub fn build(&self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<annotations>\n{}</annotations>\n",
            self.states.concat()
        )
    }
}

// =============================================================================
// Image Metadata
// =============================================================================

/// Metadata for a micrometer-calibrated image with a nanometer slide center.
pub fn image_metadata(
    image_id: i64,
    size: (u32, u32),
    pixel_size_um: (f64, f64),
    slide_center_nm: Option<(f64, f64)>,
) -> ImageMetadata {
    let mut original_metadata = vec![(
        "Objective lens magnification".to_string(),
        MetadataValue::Number(40.0),
    )];

    if let Some((x, y)) = slide_center_nm {
        original_metadata.push((
            "Slide center X (nm)".to_string(),
            MetadataValue::Text(x.to_string()),
        ));
        original_metadata.push((
            "Slide center Y (nm)".to_string(),
            MetadataValue::Number(y),
        ));
    }

    ImageMetadata {
        image_id,
        size_x: size.0,
        size_y: size.1,
        pixel_size_x: Some(PhysicalSize::micrometers(pixel_size_um.0)),
        pixel_size_y: Some(PhysicalSize::micrometers(pixel_size_um.1)),
        original_metadata,
    }
}

// =============================================================================
// In-memory Sink
// =============================================================================

/// Records every call made by the import service.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    rois: Arc<RwLock<Vec<(i64, EllipseShape)>>>,
    attachments: Arc<RwLock<Vec<(i64, Attachment)>>>,
    fail_on_store: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose `store_roi` always fails.
    pub fn failing() -> Self {
        Self {
            fail_on_store: true,
            ..Self::default()
        }
    }

    pub async fn rois(&self) -> Vec<(i64, EllipseShape)> {
        self.rois.read().await.clone()
    }

    pub async fn attachments(&self) -> Vec<(i64, Attachment)> {
        self.attachments.read().await.clone()
    }
}

#[async_trait]
impl RoiSink for MemorySink {
    async fn store_roi(&self, image_id: i64, shape: &EllipseShape) -> Result<String, SinkError> {
        if self.fail_on_store {
            return Err(SinkError::Io("connection refused".to_string()));
        }

        let mut rois = self.rois.write().await;
        rois.push((image_id, shape.clone()));
        Ok(format!("mem-{}", rois.len()))
    }

    async fn attach_file(&self, image_id: i64, attachment: &Attachment) -> Result<(), SinkError> {
        self.attachments
            .write()
            .await
            .push((image_id, attachment.clone()));
        Ok(())
    }
}

/// Write `contents` to a file inside a fresh temporary directory.
pub fn write_temp_file(name: &str, contents: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}
