//! Image to PDF Converter Library
//!
//! Core logic for bundling raster images into a single multi-page PDF.
//! Shared between the CLI and WASM targets.
//!
//! The pipeline is: decode uploads into RGB bitmaps ([`loader`]), pick a
//! [`QualityPreset`], downscale with [`resample`], then serialize one page
//! per bitmap with [`assemble`]. [`Session`] wraps the pipeline with the
//! per-interaction state a page needs (uploads, selection, stage).

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub mod assemble;
pub mod error;
pub mod estimate;
pub mod inspect;
pub mod loader;
pub mod preset;
pub mod resample;
pub mod session;

use std::borrow::Borrow;

use log::info;

pub use assemble::{assemble_document, AssembleOptions, PageEncoding};
pub use error::{
    AssemblyError, ConvertError, DecodeError, InspectError, PresetError, UploadError,
};
pub use estimate::{estimate, estimate_all, format_megabytes};
pub use inspect::{inspect_pdf, PageSummary};
pub use loader::{load_batch, Bitmap, LoadFailure, LoadReport, UploadedImage};
pub use preset::QualityPreset;
pub use resample::resample;
pub use session::{Session, Stage};

/// Suggested file name for the produced document.
pub const OUTPUT_FILE_NAME: &str = "converted_images.pdf";
/// Content type of the produced document.
pub const OUTPUT_CONTENT_TYPE: &str = "application/pdf";

/// Options for a conversion
#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    /// Quality preset (scale factor and resolution tag)
    pub preset: QualityPreset,
    /// How page images are encoded
    pub encoding: PageEncoding,
    /// Compress PDF content streams
    pub compress_streams: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            preset: QualityPreset::default(),
            encoding: PageEncoding::default(),
            compress_streams: true,
        }
    }
}

/// A finished document, ready to be offered for download.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub bytes: Vec<u8>,
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub page_count: usize,
    pub preset: QualityPreset,
}

impl ConversionResult {
    /// Caption for the download control, e.g. `"Download PDF (Medium Quality)"`.
    pub fn download_label(&self) -> String {
        format!("Download PDF ({} Quality)", self.preset.short_name())
    }
}

/// Resample every bitmap for the preset and assemble them into one PDF.
///
/// Inputs are borrowed and left untouched. Either the whole document is
/// produced or an error is returned.
pub fn convert<P: Borrow<Bitmap>>(
    bitmaps: &[P],
    options: &ConvertOptions,
) -> Result<ConversionResult, ConvertError> {
    let preset = options.preset;
    if bitmaps.is_empty() {
        return Err(AssemblyError::EmptyInput.into());
    }

    let pages: Vec<_> = bitmaps
        .iter()
        .map(|bitmap| resample(bitmap.borrow(), preset.scale()))
        .collect();

    let assemble_options = AssembleOptions {
        dpi: preset.dpi(),
        encoding: options.encoding,
        compress_streams: options.compress_streams,
    };
    let bytes = assemble_document(&pages, &assemble_options)?;

    info!(
        "Converted {} image(s) with preset {}",
        pages.len(),
        preset.label()
    );

    Ok(ConversionResult {
        bytes,
        file_name: OUTPUT_FILE_NAME,
        content_type: OUTPUT_CONTENT_TYPE,
        page_count: pages.len(),
        preset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn bitmap(w: u32, h: u32) -> Bitmap {
        Bitmap::new("img.png", RgbImage::from_pixel(w, h, Rgb([1, 2, 3])))
    }

    #[test]
    fn convert_rejects_empty() {
        let none: Vec<Bitmap> = Vec::new();
        assert!(matches!(
            convert(&none, &ConvertOptions::default()),
            Err(ConvertError::Assembly(AssemblyError::EmptyInput))
        ));
    }

    #[test]
    fn convert_fills_result_metadata() {
        let options = ConvertOptions {
            preset: QualityPreset::Low,
            ..Default::default()
        };
        let result = convert(&[bitmap(40, 40)], &options).unwrap();
        assert_eq!(result.file_name, "converted_images.pdf");
        assert_eq!(result.content_type, "application/pdf");
        assert_eq!(result.page_count, 1);
        assert_eq!(result.download_label(), "Download PDF (Low Quality)");
    }

    #[test]
    fn convert_does_not_touch_inputs() {
        let input = vec![bitmap(100, 60)];
        let options = ConvertOptions {
            preset: QualityPreset::Medium,
            ..Default::default()
        };
        convert(&input, &options).unwrap();
        assert_eq!((input[0].width(), input[0].height()), (100, 60));
    }

    #[test]
    fn convert_propagates_assembly_errors() {
        let options = ConvertOptions {
            encoding: PageEncoding::Jpeg { quality: 0 },
            ..Default::default()
        };
        assert!(matches!(
            convert(&[bitmap(2, 2)], &options),
            Err(ConvertError::Assembly(AssemblyError::InvalidQuality(0)))
        ));
    }
}
