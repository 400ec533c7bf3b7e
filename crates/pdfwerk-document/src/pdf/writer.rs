// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: build new documents page by page using `lopdf`. Image pages
// carry one JPEG each; other page kinds supply their own content stream.
//
// The XObject and content-stream helpers here are shared with the lossy
// compression path, which swaps existing page content for a single bitmap.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdfwerk_core::error::PdfwerkError;
use tracing::{debug, info, instrument};

use crate::image::processor::EncodedImage;

/// Resource name under which a page's bitmap is registered.
pub(crate) const IMAGE_RESOURCE: &str = "Im0";

/// Build a DCTDecode image XObject carrying `image` verbatim.
pub(crate) fn jpeg_xobject(image: &EncodedImage) -> Stream {
    let color_space = if image.grayscale {
        "DeviceGray"
    } else {
        "DeviceRGB"
    };
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(i64::from(image.width)));
    dict.set("Height", Object::Integer(i64::from(image.height)));
    dict.set("ColorSpace", Object::Name(color_space.as_bytes().to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
    // Already JPEG; deflating it again only costs time.
    Stream::new(dict, image.jpeg.clone()).with_compression(false)
}

/// Content stream drawing [`IMAGE_RESOURCE`] stretched over `rect`
/// (`[x0, y0, x1, y1]` in user space).
pub(crate) fn image_content(rect: [f32; 4]) -> Result<Vec<u8>, PdfwerkError> {
    let [x0, y0, x1, y1] = rect;
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(x1 - x0),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(y1 - y0),
                    Object::Real(x0),
                    Object::Real(y0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_RESOURCE.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    content
        .encode()
        .map_err(|err| PdfwerkError::PdfError(format!("failed to encode page content: {}", err)))
}

/// A resource dictionary exposing `image_id` as [`IMAGE_RESOURCE`].
pub(crate) fn image_resources(image_id: ObjectId) -> Dictionary {
    let mut xobjects = Dictionary::new();
    xobjects.set(IMAGE_RESOURCE, Object::Reference(image_id));
    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));
    resources
}

/// Assembles a new PDF one page at a time.
pub struct PdfWriter {
    document: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Append a page showing `image` full-bleed. Page size follows the
    /// image: one pixel maps to one point.
    #[instrument(skip_all, fields(width = image.width, height = image.height))]
    pub fn add_image_page(&mut self, image: &EncodedImage) -> Result<(), PdfwerkError> {
        let (width, height) = (image.width as f32, image.height as f32);
        let image_id = self.document.add_object(jpeg_xobject(image));
        self.add_page(
            [width, height],
            image_content([0.0, 0.0, width, height])?,
            image_resources(image_id),
        );
        Ok(())
    }

    /// Append a page of `size` (`[width, height]` in points) drawing
    /// `content` against `resources`.
    pub(crate) fn add_page(&mut self, size: [f32; 2], content: Vec<u8>, resources: Dictionary) {
        let content_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), content));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(self.pages_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(size[0]),
                Object::Real(size[1]),
            ]),
        );
        page.set("Resources", Object::Dictionary(resources));
        page.set("Contents", Object::Reference(content_id));

        let page_id = self.document.add_object(page);
        self.kids.push(Object::Reference(page_id));
        debug!(page = self.kids.len(), "Page added");
    }

    /// Register a shared object, e.g. a font used by several pages.
    pub(crate) fn add_object(&mut self, object: impl Into<Object>) -> ObjectId {
        self.document.add_object(object)
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Close the page tree and serialise the document.
    pub fn finish(mut self) -> Result<Vec<u8>, PdfwerkError> {
        if self.kids.is_empty() {
            return Err(PdfwerkError::NothingExtracted(
                "a PDF needs at least one page".to_string(),
            ));
        }

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Count", Object::Integer(self.kids.len() as i64));
        pages.set("Kids", Object::Array(self.kids));
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(self.pages_id));
        let catalog_id = self.document.add_object(catalog);
        self.document
            .trailer
            .set("Root", Object::Reference(catalog_id));

        self.document.compress();

        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            PdfwerkError::PdfError(format!("failed to serialise PDF: {}", err))
        })?;
        Ok(output)
    }

    /// Serialise the document straight to `path`.
    pub fn write_to_file(self, path: impl AsRef<Path>) -> Result<(), PdfwerkError> {
        let pages = self.page_count();
        let bytes = self.finish()?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!(pages, "Wrote PDF to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::processor::ImageProcessor;
    use image::{Rgb, RgbImage};

    fn encoded(width: u32, height: u32) -> EncodedImage {
        ImageProcessor::from_rgb(RgbImage::from_pixel(width, height, Rgb([200, 30, 30])))
            .encode_jpeg(80)
            .unwrap()
    }

    #[test]
    fn one_page_per_image() {
        let mut writer = PdfWriter::new();
        writer.add_image_page(&encoded(40, 20)).unwrap();
        writer.add_image_page(&encoded(10, 30)).unwrap();
        assert_eq!(writer.page_count(), 2);

        let bytes = writer.finish().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn page_size_follows_image_pixels() {
        let mut writer = PdfWriter::new();
        writer.add_image_page(&encoded(64, 48)).unwrap();
        let doc = Document::load_mem(&writer.finish().unwrap()).unwrap();

        let page_id = doc.get_pages()[&1];
        let page = doc.get_dictionary(page_id).unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        let dims: Vec<f32> = media_box.iter().map(|v| v.as_float().unwrap()).collect();
        assert_eq!(dims, vec![0.0, 0.0, 64.0, 48.0]);
    }

    #[test]
    fn image_stream_is_stored_as_jpeg() {
        let image = encoded(16, 16);
        let stream = jpeg_xobject(&image);
        assert_eq!(stream.dict.get(b"Filter").unwrap().as_name().unwrap(), b"DCTDecode");
        assert_eq!(stream.content, image.jpeg);
    }

    #[test]
    fn empty_writer_refuses_to_finish() {
        let err = PdfWriter::new().finish().unwrap_err();
        assert!(matches!(err, PdfwerkError::NothingExtracted(_)));
    }
}
