//! Reading a produced document back into per-page summaries.

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::assemble::POINTS_PER_INCH;
use crate::error::InspectError;

/// Geometry of one page and the image drawn on it.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSummary {
    /// 1-based page number
    pub page_number: u32,
    /// Width of the page image in pixels
    pub pixel_width: u32,
    /// Height of the page image in pixels
    pub pixel_height: u32,
    /// Page width in points (72 points = 1 inch)
    pub width_points: f32,
    /// Page height in points
    pub height_points: f32,
}

impl PageSummary {
    /// Horizontal resolution implied by the page and image sizes
    pub fn effective_dpi_x(&self) -> f32 {
        let inches = self.width_points / POINTS_PER_INCH;
        if inches > 0.0 {
            self.pixel_width as f32 / inches
        } else {
            0.0
        }
    }

    pub fn effective_dpi_y(&self) -> f32 {
        let inches = self.height_points / POINTS_PER_INCH;
        if inches > 0.0 {
            self.pixel_height as f32 / inches
        } else {
            0.0
        }
    }

    /// Resolution tag of the page, rounded to whole DPI.
    pub fn resolution(&self) -> u32 {
        self.effective_dpi_x().max(self.effective_dpi_y()).round() as u32
    }
}

fn get_num(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(n) => Some(*n as f32),
        Object::Real(n) => Some(*n),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        _ => Some(obj),
    }
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, obj)? {
        Object::Dictionary(d) => Some(d),
        _ => None,
    }
}

/// Width and height of the first image XObject on a page
fn page_image_dimensions(doc: &Document, page: &Dictionary) -> Option<(u32, u32)> {
    let resources = resolve_dict(doc, page.get(b"Resources").ok()?)?;
    let xobjects = resolve_dict(doc, resources.get(b"XObject").ok()?)?;

    xobjects.iter().find_map(|(_, value)| {
        let stream = match resolve(doc, value)? {
            Object::Stream(s) => s,
            _ => return None,
        };
        if stream.dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }
        let width = stream.dict.get(b"Width").ok()?.as_i64().ok()?;
        let height = stream.dict.get(b"Height").ok()?.as_i64().ok()?;
        Some((u32::try_from(width).ok()?, u32::try_from(height).ok()?))
    })
}

fn summarize_page(
    doc: &Document,
    page_number: u32,
    page_id: ObjectId,
) -> Result<PageSummary, InspectError> {
    let malformed = |reason: &str| InspectError::MalformedPage {
        page: page_number,
        reason: reason.to_string(),
    };

    let page = doc
        .get_dictionary(page_id)
        .map_err(|_| malformed("page object is not a dictionary"))?;

    let media_box = page
        .get(b"MediaBox")
        .ok()
        .and_then(|m| resolve(doc, m))
        .and_then(|m| match m {
            Object::Array(arr) if arr.len() == 4 => {
                let nums: Option<Vec<f32>> = arr.iter().map(get_num).collect();
                nums
            }
            _ => None,
        })
        .ok_or_else(|| malformed("missing or invalid MediaBox"))?;

    let (pixel_width, pixel_height) =
        page_image_dimensions(doc, page).ok_or_else(|| malformed("no image on page"))?;

    Ok(PageSummary {
        page_number,
        pixel_width,
        pixel_height,
        width_points: (media_box[2] - media_box[0]).abs(),
        height_points: (media_box[3] - media_box[1]).abs(),
    })
}

/// Summarize every page of a PDF, in page order.
pub fn inspect_pdf(pdf_bytes: &[u8]) -> Result<Vec<PageSummary>, InspectError> {
    let doc = Document::load_mem(pdf_bytes).map_err(|e| InspectError::Load(e.to_string()))?;

    doc.get_pages()
        .into_iter()
        .map(|(page_number, page_id)| summarize_page(&doc, page_number, page_id))
        .collect()
}
