use thiserror::Error;

/// Errors affecting a single annotation entry.
///
/// These never abort a conversion: the offending entry is skipped and the
/// error is kept as a diagnostic on the parse report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnnotationError {
    /// A required child element is absent or has no text
    #[error("Missing required element: {0}")]
    MissingElement(&'static str),

    /// A numeric field could not be parsed as a float
    #[error("Invalid number for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    /// The circle has no `color` attribute
    #[error("Missing color attribute")]
    MissingColor,

    /// The color attribute is not of the form `#RRGGBB`
    #[error("Invalid color: {0:?} (expected #RRGGBB)")]
    InvalidColor(String),
}

/// Errors in the per-image calibration. Fatal to the whole conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    /// The image carries no physical pixel size for this axis
    #[error("Physical pixel size {axis} is not available")]
    MissingPixelSize { axis: char },

    /// Pixel size is zero, negative or not finite
    #[error("Invalid physical pixel size {axis}: {value} (must be > 0)")]
    InvalidPixelSize { axis: char, value: f64 },

    /// Image width or height is zero
    #[error("Invalid image size {axis}: {value} pixels (must be > 0)")]
    InvalidImageDimension { axis: char, value: u32 },

    /// Slide center metadata is present but not numeric
    #[error("Invalid slide center {axis} value: {value:?}")]
    InvalidSlideCenter { axis: char, value: String },
}

/// Errors raised by an ROI persistence backend.
#[derive(Debug, Clone, Error)]
pub enum SinkError {
    /// Filesystem or network failure
    #[error("I/O error: {0}")]
    Io(String),

    /// The shape or attachment could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Top-level errors of an import run.
#[derive(Debug, Clone, Error)]
pub enum ImportError {
    /// The annotation or metadata file could not be read
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// The annotation file is not valid UTF-8
    #[error("Annotation file is not valid UTF-8: {0}")]
    Encoding(String),

    /// The annotation file is not well-formed XML
    #[error("Malformed annotation document: {0}")]
    Xml(String),

    /// The image metadata document could not be decoded
    #[error("Invalid image metadata: {0}")]
    Metadata(String),

    /// Calibration error
    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),

    /// Persistence error
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}
