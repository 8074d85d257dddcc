//! Import pipeline and ROI persistence.
//!
//! ```text
//! NDPA file ──┐
//!             ├──► convert() ──► EllipseShape* ──► RoiSink::store_roi (one per shape)
//! metadata ───┘                                    RoiSink::attach_file (source file)
//! ```

mod service;
mod sink;

pub use service::{
    convert, load_metadata, read_annotation_text, read_file, resolve_calibration, Conversion, ConvertOptions,
    ImportReport, ImportRequest, ImportService,
};
pub use sink::{Attachment, DirectorySink, RoiSink, NDPA_MIME_TYPE};
