//! WebAssembly bindings for the Image to PDF Converter

use js_sys::{Array, Uint8Array};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::loader::pair_uploads;
use crate::{
    estimate, format_megabytes, ConversionResult, PageEncoding, QualityPreset, Session,
    UploadedImage,
};

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PresetView {
    label: &'static str,
    short_name: &'static str,
    scale: f64,
    dpi: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EstimateView {
    label: &'static str,
    bytes: f64,
    display: String,
}

#[derive(Serialize)]
struct FailureView {
    name: String,
    error: String,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}

/// All quality presets as a JSON array, highest quality first
#[wasm_bindgen]
pub fn quality_presets() -> String {
    let presets: Vec<PresetView> = QualityPreset::ALL
        .iter()
        .map(|p| PresetView {
            label: p.label(),
            short_name: p.short_name(),
            scale: p.scale(),
            dpi: p.dpi(),
        })
        .collect();
    to_json(&presets)
}

/// Rough output size in bytes for `total_bytes` of input at `scale`
#[wasm_bindgen]
pub fn estimate_size(total_bytes: f64, scale: f64) -> f64 {
    estimate(total_bytes.max(0.0) as u64, scale)
}

fn page_encoding(jpeg_quality: Option<u8>, lossless: Option<bool>) -> PageEncoding {
    if lossless.unwrap_or(false) {
        PageEncoding::Flate
    } else {
        PageEncoding::Jpeg {
            quality: jpeg_quality.unwrap_or(75),
        }
    }
}

/// Conversion state for one page visit
#[wasm_bindgen]
pub struct ConverterSession {
    inner: Session,
}

#[wasm_bindgen]
impl ConverterSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ConverterSession {
        ConverterSession {
            inner: Session::new(),
        }
    }

    /// Add one uploaded file
    ///
    /// Returns the error message if the file could not be decoded; the file
    /// is then left out and the session stays usable.
    pub fn add_image(&mut self, name: String, bytes: &[u8]) -> Option<String> {
        let upload = UploadedImage::new(name, bytes.to_vec());
        let failure = self
            .inner
            .load(std::slice::from_ref(&upload))
            .first()
            .map(|f| format!("Error loading image {}: {}", f.name, f.error));

        if let Some(ref msg) = failure {
            web_sys::console::warn_1(&JsValue::from_str(msg));
        }
        failure
    }

    /// Select a preset by label or short name
    pub fn select_preset(&mut self, preset: &str) -> Result<(), JsError> {
        let preset: QualityPreset = preset
            .parse()
            .map_err(|e: crate::PresetError| JsError::new(&e.to_string()))?;
        self.inner.select(preset);
        Ok(())
    }

    /// Label of the selected preset
    #[wasm_bindgen(getter)]
    pub fn preset(&self) -> String {
        self.inner.preset().label().to_string()
    }

    /// Whether the convert button should be enabled
    #[wasm_bindgen(getter)]
    pub fn can_convert(&self) -> bool {
        self.inner.can_convert()
    }

    #[wasm_bindgen(getter)]
    pub fn image_count(&self) -> usize {
        self.inner.image_count()
    }

    /// Per-preset size estimates as a JSON array
    pub fn estimates_json(&self) -> String {
        let views: Vec<EstimateView> = self
            .inner
            .estimates()
            .into_iter()
            .map(|(preset, bytes)| EstimateView {
                label: preset.label(),
                bytes,
                display: format_megabytes(bytes),
            })
            .collect();
        to_json(&views)
    }

    /// Files that could not be loaded, as a JSON array
    pub fn failures_json(&self) -> String {
        let views: Vec<FailureView> = self
            .inner
            .failures()
            .iter()
            .map(|f| FailureView {
                name: f.name.clone(),
                error: f.error.to_string(),
            })
            .collect();
        to_json(&views)
    }

    /// Remove a loaded file by name
    pub fn remove(&mut self, name: &str) -> bool {
        self.inner.remove(name)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Convert the loaded images into a PDF
    ///
    /// # Arguments
    /// * `jpeg_quality` - JPEG quality 1-100 (default: 75)
    /// * `lossless` - Store pages losslessly instead of as JPEG (default: false)
    pub fn convert(
        &mut self,
        jpeg_quality: Option<u8>,
        lossless: Option<bool>,
    ) -> Result<ConversionResultJs, JsError> {
        self.inner.set_encoding(page_encoding(jpeg_quality, lossless));
        let result = self
            .inner
            .convert()
            .map_err(|e| JsError::new(&format!("Conversion failed: {}", e)))?;
        Ok(result.into())
    }
}

impl Default for ConverterSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a set of files in one call
///
/// # Arguments
/// * `names` - Display names, one per file
/// * `files` - `Uint8Array` contents, one per file
/// * `preset` - Preset label or short name (default: High)
///
/// # Returns
/// The document, or throws if `names` and `files` differ in length, no file
/// could be loaded, or assembly fails
#[wasm_bindgen]
pub fn convert_images(
    names: Array,
    files: Array,
    preset: Option<String>,
) -> Result<ConversionResultJs, JsError> {
    let names: Vec<String> = names
        .iter()
        .map(|name| name.as_string().unwrap_or_default())
        .collect();
    let contents: Vec<Vec<u8>> = files
        .iter()
        .map(|file| Uint8Array::new(&file).to_vec())
        .collect();
    let uploads = pair_uploads(names, contents).map_err(|e| JsError::new(&e.to_string()))?;

    let mut session = ConverterSession::new();
    if let Some(preset) = preset {
        session.select_preset(&preset)?;
    }

    for upload in uploads {
        session.add_image(upload.name, &upload.bytes);
    }

    session.convert(None, None)
}

/// A finished document
#[wasm_bindgen]
pub struct ConversionResultJs {
    pdf_bytes: Vec<u8>,
    file_name: String,
    content_type: String,
    page_count: usize,
    download_label: String,
}

impl From<ConversionResult> for ConversionResultJs {
    fn from(result: ConversionResult) -> Self {
        Self {
            download_label: result.download_label(),
            file_name: result.file_name.to_string(),
            content_type: result.content_type.to_string(),
            page_count: result.page_count,
            pdf_bytes: result.bytes,
        }
    }
}

#[wasm_bindgen]
impl ConversionResultJs {
    /// Get the PDF bytes
    #[wasm_bindgen(getter)]
    pub fn pdf_bytes(&self) -> Vec<u8> {
        self.pdf_bytes.clone()
    }

    /// Suggested download file name
    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.file_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn content_type(&self) -> String {
        self.content_type.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Caption for the download button
    #[wasm_bindgen(getter)]
    pub fn download_label(&self) -> String {
        self.download_label.clone()
    }
}
