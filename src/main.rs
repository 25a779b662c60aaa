//! Image to PDF Converter CLI
//!
//! Command-line driver for bundling images into a PDF.

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use image2pdf::{
    format_megabytes, loader::is_supported_file_name, ConvertOptions, PageEncoding,
    QualityPreset, Session, UploadedImage, OUTPUT_FILE_NAME,
};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Quality {
    High,
    Medium,
    Low,
}

impl From<Quality> for QualityPreset {
    fn from(q: Quality) -> Self {
        match q {
            Quality::High => QualityPreset::High,
            Quality::Medium => QualityPreset::Medium,
            Quality::Low => QualityPreset::Low,
        }
    }
}

/// Bundle images into a single multi-page PDF
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input image files (PNG, JPEG, BMP, TIFF)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output PDF file path
    #[arg(short, long, default_value = OUTPUT_FILE_NAME)]
    output: PathBuf,

    /// Quality preset
    #[arg(short, long, value_enum, default_value = "high")]
    preset: Quality,

    /// JPEG quality for page images (1-100)
    #[arg(short = 'j', long, default_value = "75")]
    jpeg_quality: u8,

    /// Store page images losslessly instead of as JPEG
    #[arg(long)]
    lossless: bool,

    /// Compress PDF content streams (pass `false` to disable)
    #[arg(short, long, action = clap::ArgAction::Set, default_value_t = true)]
    compress_streams: bool,

    /// Print size estimates and exit without converting
    #[arg(long)]
    estimate_only: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let encoding = if args.lossless {
        PageEncoding::Flate
    } else {
        PageEncoding::Jpeg {
            quality: args.jpeg_quality,
        }
    };
    let mut session = Session::with_options(ConvertOptions {
        preset: args.preset.into(),
        encoding,
        compress_streams: args.compress_streams,
    });

    let mut uploads = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        if !is_supported_file_name(&name) {
            warn!("Skipping {}: not a PNG, JPEG, BMP or TIFF file name", name);
            continue;
        }
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
        uploads.push(UploadedImage::new(name, bytes));
    }

    let failed = session.load(&uploads).len();
    info!(
        "Loaded {} image(s), {} failed ({} bytes)",
        session.image_count(),
        failed,
        session.total_bytes()
    );

    println!("Estimated output size:");
    for (preset, bytes) in session.estimates() {
        let marker = if preset == session.preset() { "*" } else { " " };
        println!("  {} {:<18} {}", marker, preset.label(), format_megabytes(bytes));
    }

    if args.estimate_only {
        return Ok(());
    }

    if !session.can_convert() {
        bail!("Upload at least one image to enable conversion");
    }

    let result = session.convert().context("Conversion failed")?;
    std::fs::write(&args.output, &result.bytes)
        .with_context(|| format!("Failed to write {:?}", args.output))?;

    println!(
        "\nDone! {} page(s), {} bytes ({} Quality)",
        result.page_count,
        result.bytes.len(),
        result.preset.short_name()
    );
    println!("Output saved to: {:?}", args.output);

    Ok(())
}
