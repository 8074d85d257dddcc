//! NDPA Import - convert NDP.view circle annotations into image ROIs.
//!
//! This binary wires the CLI to the import pipeline.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ndpa_import::{
    config::{Cli, Command, ConvertConfig, InspectConfig},
    import::{convert, load_metadata, read_annotation_text, resolve_calibration},
    DirectorySink, ImportRequest, ImportService,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Convert(config) => run_convert(config).await,
        Command::Inspect(config) => run_inspect(config).await,
    }
}

// =============================================================================
// Convert Command
// =============================================================================

async fn run_convert(config: ConvertConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let metadata = match load_metadata(&config.metadata).await {
        Ok(m) => m,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Image: {}", metadata.image_id);
    info!("Annotations: {}", config.annotations.display());

    if config.dry_run {
        return run_dry_convert(&config, &metadata).await;
    }

    let Some(output) = config.output.clone() else {
        error!("Configuration error: no output directory");
        return ExitCode::FAILURE;
    };

    let service = ImportService::new(DirectorySink::new(&output))
        .with_options(config.convert_options())
        .with_attach_source(!config.no_attach);

    let request = ImportRequest {
        metadata,
        annotation_path: config.annotations.clone(),
    };

    let report = match service.import(&request).await {
        Ok(report) => report,
        Err(e) => {
            error!("Import failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if report.offset_defaulted {
        warn!("Slide center metadata was missing; ROIs were placed with a zero slide offset");
    }

    info!("{}", report.summary);
    info!(
        "Stored {} ROI(s) under {}",
        report.stored.len(),
        service.sink().image_dir(report.image_id).display()
    );
    if let Some(ref digest) = report.attachment_sha256 {
        info!("Attached annotation file (sha256 {})", digest);
    }

    ExitCode::SUCCESS
}

/// Convert without storing anything and print the shapes to stdout.
async fn run_dry_convert(
    config: &ConvertConfig,
    metadata: &ndpa_import::ImageMetadata,
) -> ExitCode {
    let xml = match read_annotation_text(&config.annotations).await {
        Ok((_, xml)) => xml,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let conversion = match convert(metadata, &xml, config.convert_options()) {
        Ok(c) => c,
        Err(e) => {
            error!("Conversion failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("{}", conversion.report.summary());

    match serde_json::to_string_pretty(&conversion.report.shapes) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to encode shapes: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "ndpa_import=debug"
    } else {
        "ndpa_import=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// Inspect Command
// =============================================================================

async fn run_inspect(config: InspectConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    println!("NDPA Import Calibration Check");
    println!("═════════════════════════════");
    println!();

    let metadata = match load_metadata(&config.metadata).await {
        Ok(m) => {
            println!("✓ Metadata: {}", config.metadata.display());
            m
        }
        Err(e) => {
            println!("✗ Metadata: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("  Image: {}", metadata.image_id);
    println!("  Size: {} x {} px", metadata.size_x, metadata.size_y);
    println!();

    let (calibration, factors, offset) = match resolve_calibration(&metadata) {
        Ok(resolved) => resolved,
        Err(e) => {
            println!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "✓ Pixel size: {} {} x {} {}",
        calibration.pixel_size_x,
        calibration.pixel_size_unit_x.symbol(),
        calibration.pixel_size_y,
        calibration.pixel_size_unit_y.symbol()
    );

    if calibration.is_slide_center_defaulted() {
        println!("! Slide center: not found in original metadata, assuming 0");
    } else {
        println!(
            "✓ Slide center: {} {}, {} {}",
            calibration.slide_center_x,
            calibration.slide_center_unit_x.symbol(),
            calibration.slide_center_y,
            calibration.slide_center_unit_y.symbol()
        );
    }

    println!(
        "✓ Conversion factors: x = {}, y = {}",
        factors.factor_x, factors.factor_y
    );
    if !factors.is_isotropic() {
        println!("! Axes use different units; radii follow the X factor");
    }

    println!(
        "✓ Pixel offset: x = {:.3} px, y = {:.3} px",
        offset.offset_x_px, offset.offset_y_px
    );

    println!();
    println!("═════════════════════════════");
    println!("✓ Calibration resolved");

    ExitCode::SUCCESS
}
