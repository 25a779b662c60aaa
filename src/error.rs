//! Error types for loading, assembling and inspecting documents.

use thiserror::Error;

/// Why a single upload could not be turned into a bitmap.
///
/// Decode errors are per-file: they are collected next to the successful
/// bitmaps and never abort the rest of the batch.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("corrupt image data: {0}")]
    Corrupt(String),
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Uploads handed over as separate name and content lists that do not line up.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("got {names} name(s) for {files} file(s)")]
    CountMismatch { names: usize, files: usize },
}

/// Failure while serializing bitmaps into the output document.
///
/// Assembly is all-or-nothing, so any of these means no bytes were produced.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("no images to convert")]
    EmptyInput,
    #[error("JPEG quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),
    #[error("resolution must be positive")]
    InvalidResolution,
    #[error("failed to encode page {page}: {reason}")]
    PageEncoding { page: usize, reason: String },
    #[error("failed to write PDF: {0}")]
    Save(String),
}

/// Error returned by the conversion pipeline.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

/// A preset name that is not in the registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PresetError {
    #[error("unknown quality preset: {0:?}")]
    Unknown(String),
}

/// Failure while reading a produced PDF back.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("failed to load PDF: {0}")]
    Load(String),
    #[error("page {page} is malformed: {reason}")]
    MalformedPage { page: u32, reason: String },
}
