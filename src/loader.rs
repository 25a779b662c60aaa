//! Decoding uploads into RGB bitmaps.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, ImageReader, RgbImage};
use log::{debug, warn};

use crate::error::{DecodeError, UploadError};

/// Containers accepted from uploads.
pub const ACCEPTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
];

/// File extensions a host may offer in its file picker.
pub const ACCEPTED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Raw upload as received from the host.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Size of the upload in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Decoded image in 8-bit RGB.
///
/// Holding the pixels as an [`RgbImage`] keeps every bitmap on the same
/// 3-channel model, which the document assembler relies on.
#[derive(Debug, Clone)]
pub struct Bitmap {
    name: String,
    pixels: RgbImage,
}

impl Bitmap {
    pub fn new(name: impl Into<String>, pixels: RgbImage) -> Self {
        Self {
            name: name.into(),
            pixels,
        }
    }

    /// Display name of the upload this bitmap came from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}

/// An upload that could not be decoded.
#[derive(Debug)]
pub struct LoadFailure {
    pub name: String,
    pub error: DecodeError,
}

/// Outcome of loading a batch of uploads.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Successfully decoded bitmaps, in upload order.
    pub bitmaps: Vec<Bitmap>,
    /// Uploads that were skipped, in upload order.
    pub failures: Vec<LoadFailure>,
    /// Sum of the sizes of the successfully decoded uploads.
    pub total_bytes: u64,
}

/// Pair display names with file contents, one upload per position.
pub fn pair_uploads(
    names: Vec<String>,
    contents: Vec<Vec<u8>>,
) -> Result<Vec<UploadedImage>, UploadError> {
    if names.len() != contents.len() {
        return Err(UploadError::CountMismatch {
            names: names.len(),
            files: contents.len(),
        });
    }
    Ok(names
        .into_iter()
        .zip(contents)
        .map(|(name, bytes)| UploadedImage::new(name, bytes))
        .collect())
}

/// Whether a file name carries one of the accepted extensions.
pub fn is_supported_file_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Decode a single upload and normalize it to RGB.
pub fn decode_upload(upload: &UploadedImage) -> Result<Bitmap, DecodeError> {
    let reader = ImageReader::new(Cursor::new(&upload.bytes[..]))
        .with_guessed_format()
        .map_err(|e| DecodeError::Corrupt(e.to_string()))?;

    let format = match reader.format() {
        Some(format) if ACCEPTED_FORMATS.contains(&format) => format,
        Some(other) => return Err(DecodeError::UnsupportedFormat(format!("{:?}", other))),
        None => {
            return Err(DecodeError::UnsupportedFormat(
                "unrecognized container".to_string(),
            ))
        }
    };

    let img = reader
        .decode()
        .map_err(|e| DecodeError::Corrupt(e.to_string()))?;

    if img.width() == 0 || img.height() == 0 {
        return Err(DecodeError::EmptyImage {
            width: img.width(),
            height: img.height(),
        });
    }

    debug!(
        "Decoded {} ({:?}, {}x{}, {:?})",
        upload.name,
        format,
        img.width(),
        img.height(),
        img.color()
    );

    Ok(Bitmap::new(upload.name.clone(), to_rgb(img)))
}

/// Convert any decoded color type to 8-bit RGB, dropping alpha.
fn to_rgb(img: DynamicImage) -> RgbImage {
    match img {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    }
}

/// Decode uploads in order, handing each bitmap and its upload size to
/// `on_loaded`. Failures are logged and returned; they never stop the batch.
pub fn load_each<F>(uploads: &[UploadedImage], mut on_loaded: F) -> Vec<LoadFailure>
where
    F: FnMut(Bitmap, u64),
{
    let mut failures = Vec::new();

    for upload in uploads {
        match decode_upload(upload) {
            Ok(bitmap) => on_loaded(bitmap, upload.size()),
            Err(error) => {
                warn!("Error loading image {}: {}", upload.name, error);
                failures.push(LoadFailure {
                    name: upload.name.clone(),
                    error,
                });
            }
        }
    }

    failures
}

/// Decode every upload, collecting failures instead of stopping at the first.
pub fn load_batch(uploads: &[UploadedImage]) -> LoadReport {
    let mut bitmaps = Vec::with_capacity(uploads.len());
    let mut total_bytes = 0;
    let failures = load_each(uploads, |bitmap, size| {
        total_bytes += size;
        bitmaps.push(bitmap);
    });

    LoadReport {
        bitmaps,
        failures,
        total_bytes,
    }
}
