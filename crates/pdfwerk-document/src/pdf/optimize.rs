// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lopdf-backed document codec: page counting, lossless restructuring, and
// bitmap page replacement.

use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdfwerk_core::error::{PdfwerkError, Result};
use tracing::{debug, info, instrument, warn};

use super::writer::{image_content, image_resources, jpeg_xobject};
use crate::codec::{DocumentCodec, EncodedPage};

/// US Letter, used when a page and its ancestors carry no usable box.
const LETTER_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Bounds the /Parent walk on malformed page trees.
const MAX_TREE_DEPTH: usize = 32;

/// Boxes that must not outlive the content they clip.
const STALE_BOXES: [&[u8]; 4] = [b"CropBox", b"TrimBox", b"BleedBox", b"ArtBox"];

/// [`DocumentCodec`] implemented with `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfCodec;

impl LopdfCodec {
    pub fn new() -> Self {
        Self
    }
}

fn load(path: &Path) -> Result<Document> {
    Document::load(path).map_err(|err| {
        PdfwerkError::PdfError(format!("failed to open {}: {}", path.display(), err))
    })
}

/// Drop unreachable objects, deflate every stream, and write to `output`.
fn finish_and_save(mut doc: Document, output: &Path) -> Result<()> {
    let pruned = doc.prune_objects();
    let emptied = doc.delete_zero_length_streams();
    doc.renumber_objects();
    doc.compress();
    debug!(
        pruned = pruned.len(),
        empty_streams = emptied.len(),
        "Document restructured"
    );
    doc.save(output).map_err(|err| {
        PdfwerkError::PdfError(format!("failed to save {}: {}", output.display(), err))
    })?;
    Ok(())
}

impl DocumentCodec for LopdfCodec {
    fn page_count(&self, path: &Path) -> Result<u32> {
        let doc = Document::load(path).map_err(|err| PdfwerkError::Probe(err.to_string()))?;
        Ok(doc.get_pages().len() as u32)
    }

    #[instrument(skip(self), fields(input = %input.display(), output = %output.display()))]
    fn save_lossless(&self, input: &Path, output: &Path) -> Result<()> {
        let doc = load(input)?;
        finish_and_save(doc, output)?;
        info!("Lossless pass written");
        Ok(())
    }

    #[instrument(skip(self, pages), fields(input = %input.display(), replaced = pages.len()))]
    fn replace_with_bitmaps(&self, input: &Path, output: &Path, pages: &[EncodedPage]) -> Result<()> {
        let mut doc = load(input)?;
        let page_ids = doc.get_pages();

        for page in pages {
            let Some(&page_id) = page_ids.get(&page.page_number) else {
                warn!(page = page.page_number, "Page vanished between render and replace");
                continue;
            };
            replace_page(&mut doc, page_id, page)?;
        }

        finish_and_save(doc, output)
    }
}

/// Point `page_id` at a fresh image XObject and a content stream that paints
/// it over the page's visible area.
fn replace_page(doc: &mut Document, page_id: ObjectId, page: &EncodedPage) -> Result<()> {
    let visible = effective_box(doc, page_id);
    let rotation = inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|rotate| rotate.as_i64().ok())
        .unwrap_or(0)
        .rem_euclid(360);

    // The rendered bitmap already shows the page upright, so a rotated page
    // becomes an unrotated one with its width and height swapped.
    let [x0, y0, x1, y1] = visible;
    let (width, height) = ((x1 - x0).abs(), (y1 - y0).abs());
    let media_box = match rotation {
        0 => visible,
        90 | 270 => [0.0, 0.0, height, width],
        _ => [0.0, 0.0, width, height],
    };

    let image_id = doc.add_object(jpeg_xobject(&page.image));
    let content_id = doc.add_object(Stream::new(Dictionary::new(), image_content(media_box)?));

    let dict = doc.get_dictionary_mut(page_id).map_err(|err| {
        PdfwerkError::PdfError(format!("page {} is not a dictionary: {}", page.page_number, err))
    })?;
    for key in STALE_BOXES {
        dict.remove(key);
    }
    dict.remove(b"Rotate");
    dict.set(
        "MediaBox",
        Object::Array(media_box.iter().copied().map(Object::Real).collect()),
    );
    dict.set("Resources", Object::Dictionary(image_resources(image_id)));
    dict.set("Contents", Object::Reference(content_id));

    debug!(page = page.page_number, rotation, ?media_box, "Page replaced with bitmap");
    Ok(())
}

/// The page's CropBox, else its MediaBox, else US Letter. Both boxes are
/// inheritable from ancestor /Pages nodes.
fn effective_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    [b"CropBox".as_slice(), b"MediaBox".as_slice()]
        .into_iter()
        .find_map(|key| inherited_attribute(doc, page_id, key).and_then(|obj| parse_box(doc, obj)))
        .unwrap_or(LETTER_BOX)
}

/// Look `key` up on the node and then on each /Parent, returning the first
/// hit with references resolved.
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    node_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = node_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_dictionary(current).ok()?;
        if let Ok(value) = dict.get(key) {
            return resolve(doc, value);
        }
        current = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn parse_box(doc: &Document, object: &Object) -> Option<[f32; 4]> {
    let values = object.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let mut rect = [0.0f32; 4];
    for (slot, value) in rect.iter_mut().zip(values) {
        *slot = resolve(doc, value)?.as_float().ok()?;
    }
    Some(rect)
}
