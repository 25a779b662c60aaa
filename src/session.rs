//! Per-interaction conversion state.
//!
//! A [`Session`] belongs to exactly one user interaction. It owns the decoded
//! bitmaps and the selected preset; nothing in it is shared with other
//! sessions. Each call to [`Session::convert`] is an independent run over the
//! current working set.

use log::{debug, info, warn};

use crate::error::{AssemblyError, ConvertError};
use crate::estimate::estimate_all;
use crate::loader::{load_each, Bitmap, LoadFailure, UploadedImage};
use crate::preset::QualityPreset;
use crate::{convert, ConversionResult, ConvertOptions, PageEncoding};

/// Where a session stands between user actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Nothing loaded yet.
    Idle,
    /// At least one upload decoded; the default preset applies.
    Loaded,
    /// The user picked a preset explicitly.
    PresetSelected,
    /// The last conversion produced a document.
    Converted,
    /// The last conversion failed; the working set is kept for a retry.
    Failed,
}

#[derive(Debug)]
struct Entry {
    bitmap: Bitmap,
    size: u64,
}

#[derive(Debug)]
pub struct Session {
    entries: Vec<Entry>,
    failures: Vec<LoadFailure>,
    options: ConvertOptions,
    stage: Stage,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_options(ConvertOptions::default())
    }

    pub fn with_options(options: ConvertOptions) -> Self {
        Self {
            entries: Vec::new(),
            failures: Vec::new(),
            options,
            stage: Stage::Idle,
        }
    }

    /// Decode uploads into the working set.
    ///
    /// Returns the failures from this call only; earlier ones stay available
    /// through [`Session::failures`].
    pub fn load(&mut self, uploads: &[UploadedImage]) -> &[LoadFailure] {
        debug!("Loading {} upload(s)", uploads.len());
        let first_new_failure = self.failures.len();

        let entries = &mut self.entries;
        let failures = load_each(uploads, |bitmap, size| entries.push(Entry { bitmap, size }));
        self.failures.extend(failures);

        if !self.entries.is_empty() && self.stage == Stage::Idle {
            self.stage = Stage::Loaded;
        }

        &self.failures[first_new_failure..]
    }

    /// Choose the preset used by the next conversion.
    pub fn select(&mut self, preset: QualityPreset) {
        debug!("Selected preset {}", preset.label());
        self.options.preset = preset;
        if !self.entries.is_empty() {
            self.stage = Stage::PresetSelected;
        }
    }

    pub fn preset(&self) -> QualityPreset {
        self.options.preset
    }

    pub fn set_encoding(&mut self, encoding: PageEncoding) {
        self.options.encoding = encoding;
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Whether the convert trigger should be enabled.
    pub fn can_convert(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn bitmaps(&self) -> impl Iterator<Item = &Bitmap> {
        self.entries.iter().map(|e| &e.bitmap)
    }

    pub fn image_count(&self) -> usize {
        self.entries.len()
    }

    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    /// Total size of the uploads currently in the working set.
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }

    /// Size estimate for every preset, in registry order.
    pub fn estimates(&self) -> Vec<(QualityPreset, f64)> {
        estimate_all(self.total_bytes())
    }

    /// Drop every loaded image with the given name. Returns whether any was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.bitmap.name() != name);
        let removed = self.entries.len() != before;
        if self.entries.is_empty() {
            self.stage = Stage::Idle;
        }
        removed
    }

    /// Forget all uploads and failures. The selected preset is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.failures.clear();
        self.stage = Stage::Idle;
    }

    /// Run the pipeline over the current working set.
    pub fn convert(&mut self) -> Result<ConversionResult, ConvertError> {
        if !self.can_convert() {
            return Err(AssemblyError::EmptyInput.into());
        }

        let bitmaps: Vec<&Bitmap> = self.bitmaps().collect();
        match convert(&bitmaps, &self.options) {
            Ok(result) => {
                info!(
                    "Conversion successful: {} page(s), {} bytes",
                    result.page_count,
                    result.bytes.len()
                );
                self.stage = Stage::Converted;
                Ok(result)
            }
            Err(e) => {
                warn!("Conversion failed: {}", e);
                self.stage = Stage::Failed;
                Err(e)
            }
        }
    }
}
