// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: open, inspect, cut page ranges from, read text out of, and
// merge existing PDF documents using the `lopdf` crate.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdfwerk_core::PageRange;
use pdfwerk_core::error::PdfwerkError;
use tracing::{debug, info, instrument, warn};

use super::optimize::inherited_attribute;

/// Page attributes a page may inherit from its ancestors. They are copied
/// onto each page when it moves into another document's tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Reads and manipulates existing PDF files.
///
/// Wraps `lopdf::Document` and provides higher-level operations such as
/// page-range extraction, per-page text, and merging.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PdfwerkError> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            PdfwerkError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Return the source path the reader was opened from.
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    fn label(&self) -> &str {
        self.source_path().unwrap_or("<memory>")
    }

    // -- Extraction -----------------------------------------------------------

    /// Copy the pages selected by `range` into a new standalone PDF.
    ///
    /// The range is clamped to the pages present; a range selecting nothing
    /// is an error rather than an empty document.
    #[instrument(skip(self), fields(range = %range))]
    pub fn extract_range(&self, range: &PageRange) -> Result<Vec<u8>, PdfwerkError> {
        let total = self.page_count();
        let keep = range.indices(total);
        if keep.is_empty() {
            return Err(PdfwerkError::InvalidRequest(format!(
                "pages {} select nothing from a {} page document",
                range, total
            )));
        }

        let discard: Vec<u32> = (1..=total)
            .filter(|number| !keep.contains(&(number - 1)))
            .collect();

        let mut doc = self.document.clone();
        if !discard.is_empty() {
            doc.delete_pages(&discard);
        }
        doc.prune_objects();
        doc.renumber_objects();
        doc.compress();

        let mut output = Vec::new();
        doc.save_to(&mut output).map_err(|err| {
            PdfwerkError::PdfError(format!("failed to serialise page range: {}", err))
        })?;

        info!(kept = keep.len(), total, output_bytes = output.len(), "Page range extracted");
        Ok(output)
    }

    /// Text of the 1-based page `page_number`.
    pub fn page_text(&self, page_number: u32) -> Result<String, PdfwerkError> {
        if page_number == 0 || page_number > self.page_count() {
            return Err(PdfwerkError::InvalidRequest(format!(
                "page {} out of range (document has {} pages)",
                page_number,
                self.page_count()
            )));
        }
        self.document.extract_text(&[page_number]).map_err(|err| {
            PdfwerkError::PdfError(format!(
                "text extraction failed on page {} of {}: {}",
                page_number,
                self.label(),
                err
            ))
        })
    }

    // -- Merging --------------------------------------------------------------

    /// Merge this document with `others`, producing a combined PDF. Pages
    /// appear in the order: self, then each supplied document in order.
    #[instrument(skip_all, fields(additional_count = others.len()))]
    pub fn merge(&self, others: &[PdfReader]) -> Result<Vec<u8>, PdfwerkError> {
        info!(
            base_pages = self.page_count(),
            additional_documents = others.len(),
            "Merging PDFs"
        );

        let mut merged = self.document.clone();
        let pages_id = page_tree_root(&merged)?;

        let mut appended = Vec::new();
        for other in others {
            let mut importer = Importer::new(&other.document);
            for (_, page_id) in other.document.get_pages() {
                appended.push(Object::Reference(importer.import_page(
                    &mut merged,
                    page_id,
                    pages_id,
                )?));
            }
            debug!(source = other.label(), imported = importer.imported(), "Document appended");
        }

        let root = merged.get_dictionary_mut(pages_id).map_err(|err| {
            PdfwerkError::PdfError(format!("page tree root unreadable: {}", err))
        })?;
        let count = root.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        let mut kids = match root.get(b"Kids") {
            Ok(Object::Array(kids)) => kids.clone(),
            _ => Vec::new(),
        };
        let added = appended.len() as i64;
        kids.extend(appended);
        root.set("Kids", Object::Array(kids));
        root.set("Count", Object::Integer(count + added));

        merged.prune_objects();
        merged.renumber_objects();
        merged.compress();

        let mut output = Vec::new();
        merged.save_to(&mut output).map_err(|err| {
            PdfwerkError::PdfError(format!("failed to serialise merged PDF: {}", err))
        })?;

        debug!(output_bytes = output.len(), "Merge complete");
        Ok(output)
    }
}

/// The object ID of the catalog's /Pages node.
fn page_tree_root(doc: &Document) -> Result<ObjectId, PdfwerkError> {
    doc.catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|err| PdfwerkError::PdfError(format!("no usable /Pages: {}", err)))
}

/// Copies objects from one document into another, each source object at
/// most once, so shared fonts and images stay shared and cycles terminate.
struct Importer<'a> {
    source: &'a Document,
    mapped: BTreeMap<ObjectId, ObjectId>,
}

impl<'a> Importer<'a> {
    fn new(source: &'a Document) -> Self {
        Self {
            source,
            mapped: BTreeMap::new(),
        }
    }

    fn imported(&self) -> usize {
        self.mapped.len()
    }

    /// Import a page under `parent`, giving it its own copy of every
    /// attribute it used to inherit.
    fn import_page(
        &mut self,
        target: &mut Document,
        page_id: ObjectId,
        parent: ObjectId,
    ) -> Result<ObjectId, PdfwerkError> {
        let page = self.source.get_dictionary(page_id).map_err(|err| {
            PdfwerkError::PdfError(format!("cannot read page object {:?}: {}", page_id, err))
        })?;

        let new_id = target.new_object_id();
        self.mapped.insert(page_id, new_id);

        let mut dict = Dictionary::new();
        for (key, value) in page.iter() {
            if key.as_slice() == b"Parent" {
                continue;
            }
            dict.set(key.clone(), self.import_object(target, value));
        }
        for key in INHERITABLE {
            if dict.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(self.source, page_id, key) {
                dict.set(key.to_vec(), self.import_object(target, value));
            }
        }
        dict.set("Parent", Object::Reference(parent));

        target.objects.insert(new_id, Object::Dictionary(dict));
        Ok(new_id)
    }

    fn import_reference(&mut self, target: &mut Document, id: ObjectId) -> ObjectId {
        if let Some(&existing) = self.mapped.get(&id) {
            return existing;
        }
        let new_id = target.new_object_id();
        self.mapped.insert(id, new_id);

        let object = match self.source.get_object(id) {
            Ok(object) => self.import_object(target, object),
            Err(err) => {
                warn!(?id, %err, "Cannot resolve reference, using Null");
                Object::Null
            }
        };
        target.objects.insert(new_id, object);
        new_id
    }

    fn import_dictionary(&mut self, target: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            copy.set(key.clone(), self.import_object(target, value));
        }
        copy
    }

    fn import_object(&mut self, target: &mut Document, object: &Object) -> Object {
        match object {
            Object::Reference(id) => Object::Reference(self.import_reference(target, *id)),
            Object::Dictionary(dict) => Object::Dictionary(self.import_dictionary(target, dict)),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.import_object(target, item))
                    .collect(),
            ),
            Object::Stream(stream) => {
                let dict = self.import_dictionary(target, &stream.dict);
                Object::Stream(Stream::new(dict, stream.content.clone()))
            }
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures;

    fn in_memory(document: Document) -> PdfReader {
        PdfReader {
            document,
            source_path: None,
        }
    }

    fn reader(pages: u32) -> PdfReader {
        in_memory(fixtures::document(pages))
    }

    fn texts(bytes: &[u8]) -> Vec<String> {
        let doc = in_memory(Document::load_mem(bytes).unwrap());
        (1..=doc.page_count())
            .map(|n| doc.page_text(n).unwrap().trim().to_string())
            .collect()
    }

    #[test]
    fn open_reports_source_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write_pdf(dir.path(), "doc.pdf", 2);
        let reader = PdfReader::open(&path).unwrap();
        assert_eq!(reader.page_count(), 2);
        assert!(reader.source_path().unwrap().ends_with("doc.pdf"));
    }

    #[test]
    fn garbage_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-nope").unwrap();
        assert!(matches!(PdfReader::open(&path), Err(PdfwerkError::PdfError(_))));
    }

    #[test]
    fn extract_range_keeps_selected_pages_in_order() {
        let bytes = reader(6).extract_range(&PageRange::new(2, Some(4)).unwrap()).unwrap();
        assert_eq!(texts(&bytes), vec!["Page 2", "Page 3", "Page 4"]);
    }

    #[test]
    fn extract_range_clamps_past_the_end() {
        let bytes = reader(3).extract_range(&PageRange::new(2, Some(50)).unwrap()).unwrap();
        assert_eq!(texts(&bytes), vec!["Page 2", "Page 3"]);
    }

    #[test]
    fn extract_range_selecting_nothing_is_an_error() {
        let err = reader(3)
            .extract_range(&PageRange::new(7, None).unwrap())
            .unwrap_err();
        assert!(matches!(err, PdfwerkError::InvalidRequest(_)));
    }

    #[test]
    fn page_text_rejects_page_zero() {
        assert!(reader(2).page_text(0).is_err());
        assert!(reader(2).page_text(3).is_err());
    }

    #[test]
    fn merge_concatenates_in_order() {
        let merged = reader(2).merge(&[reader(1), reader(3)]).unwrap();
        assert_eq!(
            texts(&merged),
            vec!["Page 1", "Page 2", "Page 1", "Page 1", "Page 2", "Page 3"]
        );
    }

    #[test]
    fn merged_pages_carry_inherited_geometry() {
        let merged = reader(1).merge(&[reader(1)]).unwrap();
        let doc = Document::load_mem(&merged).unwrap();
        let pages = doc.get_pages();
        let imported = doc.get_dictionary(pages[&2]).unwrap();
        assert!(imported.has(b"MediaBox"));
        assert!(imported.has(b"Resources"));
    }
}
