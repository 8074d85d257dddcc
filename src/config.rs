//! Command-line configuration for the NDPA importer.
//!
//! Options can be given as flags or through environment variables with the
//! `NDPA_` prefix:
//!
//! - `NDPA_ANNOTATIONS` - NDPA annotation file to convert
//! - `NDPA_METADATA` - Image metadata JSON document
//! - `NDPA_OUTPUT` - Output directory for stored ROIs
//! - `NDPA_NO_ATTACH` - Do not attach the annotation file (default: false)
//! - `NDPA_OPAQUE_STROKE` - Write opaque stroke colors (default: false)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::annotation::StrokeAlpha;
use crate::import::ConvertOptions;

/// NDPA Import - Convert NDP.view circle annotations into image ROIs.
#[derive(Parser, Debug, Clone)]
#[command(name = "ndpa-import")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Convert an annotation file and store the ROIs.
    Convert(ConvertConfig),

    /// Show the calibration resolved for an image.
    Inspect(InspectConfig),
}

// =============================================================================
// Convert Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ConvertConfig {
    /// NDPA annotation file.
    #[arg(short, long, env = "NDPA_ANNOTATIONS")]
    pub annotations: PathBuf,

    /// Image metadata JSON (pixel sizes, dimensions, original metadata).
    #[arg(short, long, env = "NDPA_METADATA")]
    pub metadata: PathBuf,

    /// Directory to store ROIs and the attached annotation file in.
    #[arg(short, long, env = "NDPA_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Do not attach the original annotation file to the image.
    #[arg(long, default_value_t = false, env = "NDPA_NO_ATTACH")]
    pub no_attach: bool,

    /// Write fully opaque stroke colors instead of alpha 0.
    #[arg(long, default_value_t = false, env = "NDPA_OPAQUE_STROKE")]
    pub opaque_stroke: bool,

    /// Print the converted shapes as JSON instead of storing them.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl ConvertConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.annotations.as_os_str().is_empty() {
            return Err("Annotation file is required. Set --annotations or NDPA_ANNOTATIONS".to_string());
        }
        if self.metadata.as_os_str().is_empty() {
            return Err("Metadata file is required. Set --metadata or NDPA_METADATA".to_string());
        }
        if !self.dry_run && self.output.is_none() {
            return Err(
                "Output directory is required unless --dry-run is given. Set --output or NDPA_OUTPUT"
                    .to_string(),
            );
        }
        Ok(())
    }

    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            stroke_alpha: if self.opaque_stroke {
                StrokeAlpha::Opaque
            } else {
                StrokeAlpha::SourceParity
            },
        }
    }
}

// =============================================================================
// Inspect Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct InspectConfig {
    /// Image metadata JSON.
    #[arg(short, long, env = "NDPA_METADATA")]
    pub metadata: PathBuf,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

// =============================================================================
// Tests
// =============================================================================
