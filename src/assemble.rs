//! Serializing bitmaps into a multi-page PDF.
//!
//! Every bitmap becomes one page whose MediaBox is the image size at the
//! requested resolution, so a 300 px wide image at 150 DPI lands on a
//! 144 pt (2 inch) wide page. The image is drawn to fill the page.

use std::borrow::Borrow;
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbImage;
use log::{debug, info};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};

use crate::error::AssemblyError;
use crate::loader::Bitmap;

/// PDF user space units per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Resource name of the page image inside each page.
const PAGE_IMAGE_NAME: &[u8] = b"Im0";

const PRODUCER: &str = concat!("image2pdf ", env!("CARGO_PKG_VERSION"));

/// How page images are stored in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEncoding {
    /// Baseline JPEG (`DCTDecode`) at the given quality, 1-100.
    Jpeg { quality: u8 },
    /// Lossless zlib-compressed RGB (`FlateDecode`).
    Flate,
}

impl Default for PageEncoding {
    fn default() -> Self {
        PageEncoding::Jpeg { quality: 75 }
    }
}

/// Options for document assembly
#[derive(Debug, Clone, Copy)]
pub struct AssembleOptions {
    /// Resolution tag for every page, in DPI
    pub dpi: u32,
    /// Page image encoding
    pub encoding: PageEncoding,
    /// Compress content streams
    pub compress_streams: bool,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            dpi: 300,
            encoding: PageEncoding::default(),
            compress_streams: true,
        }
    }
}

/// Page size in points for an image of `width`x`height` pixels at `dpi`.
pub fn page_size_points(width: u32, height: u32, dpi: u32) -> (f32, f32) {
    let to_points = |px: u32| px as f32 * POINTS_PER_INCH / dpi as f32;
    (to_points(width), to_points(height))
}

/// Encode an RGB image as a JPEG image XObject
fn encode_jpeg_stream(rgb: &RgbImage, quality: u8, dpi: u32) -> Result<Stream, String> {
    let (width, height) = rgb.dimensions();
    let (w16, h16) = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(format!(
                "{}x{} exceeds the JPEG limit of {} pixels per side",
                width,
                height,
                u16::MAX
            ))
        }
    };
    let density = u16::try_from(dpi).unwrap_or(u16::MAX);

    let mut jpeg_bytes = Vec::new();
    let mut encoder = jpeg_encoder::Encoder::new(&mut jpeg_bytes, quality);
    encoder.set_sampling_factor(jpeg_encoder::SamplingFactor::R_4_2_0);
    encoder.set_density(jpeg_encoder::PixelDensity::dpi(density));
    encoder
        .encode(rgb.as_raw(), w16, h16, jpeg_encoder::ColorType::Rgb)
        .map_err(|e| format!("Failed to encode JPEG: {}", e))?;

    Ok(image_stream(width, height, "DCTDecode", jpeg_bytes))
}

/// Encode an RGB image as a lossless Flate image XObject
fn encode_flate_stream(rgb: &RgbImage) -> Result<Stream, String> {
    let (width, height) = rgb.dimensions();

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(rgb.as_raw())
        .map_err(|e| format!("Failed to compress RGB data: {}", e))?;
    let compressed = encoder
        .finish()
        .map_err(|e| format!("Failed to finish compression: {}", e))?;

    Ok(image_stream(width, height, "FlateDecode", compressed))
}

fn image_stream(width: u32, height: u32, filter: &str, data: Vec<u8>) -> Stream {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(filter.as_bytes().to_vec()));
    dict.set("Length", Object::Integer(data.len() as i64));
    Stream::new(dict, data)
}

/// Content stream drawing the page image over the whole MediaBox
fn page_content(width_pt: f32, height_pt: f32) -> Result<Vec<u8>, String> {
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(width_pt),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(height_pt),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(PAGE_IMAGE_NAME.to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    content
        .encode()
        .map_err(|e| format!("Failed to encode page content: {}", e))
}

/// Build a PDF with one page per bitmap, in order.
///
/// Returns the serialized document. Nothing is returned unless every page
/// encodes successfully.
pub fn assemble_document<P: Borrow<Bitmap>>(
    pages: &[P],
    options: &AssembleOptions,
) -> Result<Vec<u8>, AssemblyError> {
    if pages.is_empty() {
        return Err(AssemblyError::EmptyInput);
    }
    if options.dpi == 0 {
        return Err(AssemblyError::InvalidResolution);
    }
    if let PageEncoding::Jpeg { quality } = options.encoding {
        if quality == 0 || quality > 100 {
            return Err(AssemblyError::InvalidQuality(quality));
        }
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(pages.len());

    for (index, page) in pages.iter().enumerate() {
        let bitmap = page.borrow();
        let page_number = index + 1;
        let (width, height) = (bitmap.width(), bitmap.height());

        let stream = match options.encoding {
            PageEncoding::Jpeg { quality } => {
                encode_jpeg_stream(bitmap.pixels(), quality, options.dpi)
            }
            PageEncoding::Flate => encode_flate_stream(bitmap.pixels()),
        }
        .map_err(|reason| AssemblyError::PageEncoding {
            page: page_number,
            reason,
        })?;
        let image_id = doc.add_object(Object::Stream(stream));

        let (width_pt, height_pt) = page_size_points(width, height, options.dpi);
        let content = page_content(width_pt, height_pt).map_err(|reason| {
            AssemblyError::PageEncoding {
                page: page_number,
                reason,
            }
        })?;
        let content_id = doc.add_object(Object::Stream(Stream::new(Dictionary::new(), content)));

        let mut xobjects = Dictionary::new();
        xobjects.set(PAGE_IMAGE_NAME.to_vec(), Object::Reference(image_id));
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(pages_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width_pt),
                Object::Real(height_pt),
            ]),
        );
        page_dict.set("Resources", Object::Dictionary(resources));
        page_dict.set("Contents", Object::Reference(content_id));
        let page_id = doc.add_object(Object::Dictionary(page_dict));
        kids.push(Object::Reference(page_id));

        debug!(
            "Page {}: {} {}x{} px -> {:.2}x{:.2} pt @ {} DPI",
            page_number, bitmap.name(), width, height, width_pt, height_pt, options.dpi
        );
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Count", Object::Integer(kids.len() as i64));
    pages_dict.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut info = Dictionary::new();
    info.set("Producer", Object::string_literal(PRODUCER));
    let info_id = doc.add_object(Object::Dictionary(info));
    doc.trailer.set("Info", Object::Reference(info_id));

    if options.compress_streams {
        doc.compress();
    }

    let mut output_bytes = Vec::new();
    doc.save_to(&mut output_bytes)
        .map_err(|e| AssemblyError::Save(e.to_string()))?;

    info!(
        "Assembled {} page(s) at {} DPI ({} bytes)",
        pages.len(),
        options.dpi,
        output_bytes.len()
    );

    Ok(output_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use image::Rgb;
    use std::io::Read;

    fn bitmap(name: &str, w: u32, h: u32) -> Bitmap {
        Bitmap::new(name, RgbImage::from_pixel(w, h, Rgb([200, 100, 50])))
    }

    fn page_image(doc: &Document, page_id: lopdf::ObjectId) -> Stream {
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let image_id = xobjects.get(PAGE_IMAGE_NAME).unwrap().as_reference().unwrap();
        doc.get_object(image_id).unwrap().as_stream().unwrap().clone()
    }

    #[test]
    fn empty_input_is_rejected() {
        let pages: Vec<Bitmap> = Vec::new();
        assert!(matches!(
            assemble_document(&pages, &AssembleOptions::default()),
            Err(AssemblyError::EmptyInput)
        ));
    }

    #[test]
    fn zero_dpi_is_rejected() {
        let options = AssembleOptions {
            dpi: 0,
            ..Default::default()
        };
        assert!(matches!(
            assemble_document(&[bitmap("a", 2, 2)], &options),
            Err(AssemblyError::InvalidResolution)
        ));
    }

    #[test]
    fn invalid_quality_is_rejected() {
        for quality in [0, 101] {
            let options = AssembleOptions {
                encoding: PageEncoding::Jpeg { quality },
                ..Default::default()
            };
            assert!(matches!(
                assemble_document(&[bitmap("a", 2, 2)], &options),
                Err(AssemblyError::InvalidQuality(q)) if q == quality
            ));
        }
    }

    #[test]
    fn pages_follow_input_order() {
        let pages = vec![bitmap("a", 30, 10), bitmap("b", 20, 20), bitmap("c", 10, 40)];
        let bytes = assemble_document(&pages, &AssembleOptions::default()).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let page_ids = doc.get_pages();
        assert_eq!(page_ids.len(), 3);

        let dims: Vec<_> = page_ids
            .values()
            .map(|&id| {
                let stream = page_image(&doc, id);
                (
                    stream.dict.get(b"Width").unwrap().as_i64().unwrap(),
                    stream.dict.get(b"Height").unwrap().as_i64().unwrap(),
                )
            })
            .collect();
        assert_eq!(dims, vec![(30, 10), (20, 20), (10, 40)]);
    }

    #[test]
    fn media_box_reflects_resolution() {
        assert_eq!(page_size_points(300, 150, 150), (144.0, 72.0));
        assert_eq!(page_size_points(72, 72, 72), (72.0, 72.0));
    }

    #[test]
    fn jpeg_pages_use_dct() {
        let bytes = assemble_document(&[bitmap("a", 16, 16)], &AssembleOptions::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let stream = page_image(&doc, page_id);
        assert_eq!(stream.dict.get(b"Filter").unwrap().as_name().unwrap(), b"DCTDecode");
        assert!(stream.content.starts_with(&[0xFF, 0xD8]));

        // JFIF APP0: units at 13, X/Y density at 14..18
        let jfif = &stream.content;
        assert_eq!(&jfif[2..4], &[0xFF, 0xE0]);
        assert_eq!(&jfif[6..11], b"JFIF\0");
        assert_eq!(jfif[13], 1);
        assert_eq!(u16::from_be_bytes([jfif[14], jfif[15]]), 300);
        assert_eq!(u16::from_be_bytes([jfif[16], jfif[17]]), 300);
    }

    #[test]
    fn oversized_jpeg_page_fails_whole_document() {
        let pages = vec![bitmap("ok", 4, 4), bitmap("wide", 65536, 1)];
        assert!(matches!(
            assemble_document(&pages, &AssembleOptions::default()),
            Err(AssemblyError::PageEncoding { page: 2, .. })
        ));
    }

    #[test]
    fn flate_pages_are_lossless() {
        let mut pixels = RgbImage::new(5, 3);
        for (x, y, px) in pixels.enumerate_pixels_mut() {
            *px = Rgb([x as u8 * 40, y as u8 * 80, 7]);
        }
        let expected = pixels.as_raw().clone();
        let options = AssembleOptions {
            encoding: PageEncoding::Flate,
            ..Default::default()
        };

        let bytes = assemble_document(&[Bitmap::new("p", pixels)], &options).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let stream = page_image(&doc, page_id);
        assert_eq!(stream.dict.get(b"Filter").unwrap().as_name().unwrap(), b"FlateDecode");

        let mut decoded = Vec::new();
        ZlibDecoder::new(&stream.content[..])
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn output_is_deterministic() {
        let pages = vec![bitmap("a", 8, 8), bitmap("b", 4, 4)];
        let first = assemble_document(&pages, &AssembleOptions::default()).unwrap();
        let second = assemble_document(&pages, &AssembleOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn accepts_borrowed_pages() {
        let a = bitmap("a", 3, 3);
        let b = bitmap("b", 3, 3);
        let pages = vec![&a, &b];
        let bytes = assemble_document(&pages, &AssembleOptions::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
    }
}
