//! ROI persistence backends.
//!
//! The image-management platform is reached through [`RoiSink`]. Each shape
//! is stored with its own call, and the original annotation file is attached
//! to the image verbatim.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::annotation::EllipseShape;
use crate::error::SinkError;

/// MIME type used for NDPA attachments.
pub const NDPA_MIME_TYPE: &str = "text/xml";

/// A file to attach to an image, byte-for-byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    /// File name shown on the platform
    pub name: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl Attachment {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Hex-encoded SHA-256 digest of the content.
    pub fn sha256(&self) -> String {
        hex::encode(Sha256::digest(&self.data))
    }
}

/// Storage for converted ROIs.
#[async_trait]
pub trait RoiSink: Send + Sync {
    /// Store one shape as its own ROI on the image. Returns a backend ROI id.
    async fn store_roi(&self, image_id: i64, shape: &EllipseShape) -> Result<String, SinkError>;

    /// Attach a file to the image without modifying it.
    async fn attach_file(&self, image_id: i64, attachment: &Attachment) -> Result<(), SinkError>;
}

// =============================================================================
// DirectorySink
// =============================================================================

/// Writes ROIs and attachments under a local directory.
///
/// Layout: `<root>/image-<id>/roi-0001.json`, ... plus the attachment under
/// its own name and `<name>.sha256` holding its digest.
#[derive(Debug)]
pub struct DirectorySink {
    root: PathBuf,
    next_roi: AtomicUsize,
}

#[derive(Serialize)]
struct StoredRoi<'a> {
    image_id: i64,
    roi_id: &'a str,
    #[serde(flatten)]
    shape: &'a EllipseShape,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            next_roi: AtomicUsize::new(1),
        }
    }

    /// Directory holding everything stored for one image.
    pub fn image_dir(&self, image_id: i64) -> PathBuf {
        self.root.join(format!("image-{}", image_id))
    }

    async fn ensure_dir(&self, dir: &Path) -> Result<(), SinkError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| SinkError::Io(format!("{}: {}", dir.display(), e)))
    }
}

#[async_trait]
impl RoiSink for DirectorySink {
    async fn store_roi(&self, image_id: i64, shape: &EllipseShape) -> Result<String, SinkError> {
        let dir = self.image_dir(image_id);
        self.ensure_dir(&dir).await?;

        let roi_id = format!("roi-{:04}", self.next_roi.fetch_add(1, Ordering::SeqCst));
        let record = StoredRoi {
            image_id,
            roi_id: &roi_id,
            shape,
        };
        let json = serde_json::to_vec_pretty(&record)
            .map_err(|e| SinkError::Serialization(e.to_string()))?;

        let path = dir.join(format!("{}.json", roi_id));
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| SinkError::Io(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "Stored ROI");
        Ok(roi_id)
    }

    async fn attach_file(&self, image_id: i64, attachment: &Attachment) -> Result<(), SinkError> {
        let dir = self.image_dir(image_id);
        self.ensure_dir(&dir).await?;

        // Never let the attachment name escape the image directory.
        let name = Path::new(&attachment.name)
            .file_name()
            .ok_or_else(|| SinkError::Io(format!("invalid attachment name {:?}", attachment.name)))?;

        let path = dir.join(name);
        tokio::fs::write(&path, &attachment.data)
            .await
            .map_err(|e| SinkError::Io(format!("{}: {}", path.display(), e)))?;

        let digest_path = dir.join(format!("{}.sha256", name.to_string_lossy()));
        tokio::fs::write(&digest_path, format!("{}\n", attachment.sha256()))
            .await
            .map_err(|e| SinkError::Io(format!("{}: {}", digest_path.display(), e)))?;

        debug!(path = %path.display(), bytes = attachment.data.len(), "Attached file");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
