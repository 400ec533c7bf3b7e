// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Toolkit: the user-facing operations, each composed from the probe, range
// selection, compression, batch, codec, and office building blocks.

use std::path::{Path, PathBuf};

use pdfwerk_core::error::{PdfwerkError, Result};
use pdfwerk_core::{
    AppConfig, BatchResult, CompressionOutcome, CompressionRequest, DocumentInfo, DocumentType,
    OutputSuffix, PageRange, derive_output_path,
};
use tracing::{info, instrument, warn};

use crate::batch::{collect_batch, run_batch};
use crate::codec::{DocumentCodec, PageRasterizer};
use crate::compress::CompressionStrategy;
use crate::image::processor::ImageProcessor;
use crate::pdf::{LopdfCodec, PdfReader, PdfWriter};
use crate::probe::{inspect, probe_page_count};
use crate::range::{PromptProvider, select_range};
use crate::render::PdfiumRasterizer;
use crate::sheets::{read_workbook, write_sheets_pdf};
use crate::tables::{Table, detect_tables, write_workbook};
use crate::word::write_docx;

/// Page separator in extracted text files.
const PAGE_BREAK: &str = "\u{c}";

/// Codec, rasterizer, and settings shared by every operation.
pub struct Toolkit<C = LopdfCodec, R = PdfiumRasterizer> {
    codec: C,
    rasterizer: R,
    config: AppConfig,
}

impl Toolkit {
    /// The production toolkit: lopdf for structure, pdfium for rendering.
    pub fn new(config: AppConfig) -> Self {
        Self::with_parts(LopdfCodec::new(), PdfiumRasterizer::new(), config)
    }
}

impl<C: DocumentCodec, R: PageRasterizer> Toolkit<C, R> {
    pub fn with_parts(codec: C, rasterizer: R, config: AppConfig) -> Self {
        Self {
            codec,
            rasterizer,
            config,
        }
    }

    fn strategy(&self) -> CompressionStrategy<'_, C, R> {
        CompressionStrategy::new(&self.codec, &self.rasterizer)
    }

    pub fn inspect(&self, path: &Path) -> DocumentInfo {
        inspect(&self.codec, path)
    }

    // -- Compression ----------------------------------------------------------

    /// Compress one PDF to `<stem>_compressed.pdf`.
    pub fn compress_pdf(
        &self,
        path: &Path,
        request: &CompressionRequest,
    ) -> Result<CompressionOutcome> {
        self.strategy().compress_file(path, request)
    }

    /// Compress each PDF to `<stem>_batch_compressed.pdf`, best effort.
    pub fn batch_compress<P: AsRef<Path>>(
        &self,
        paths: &[P],
        request: &CompressionRequest,
    ) -> BatchResult<CompressionOutcome> {
        run_batch(&self.strategy(), paths, request)
    }

    // -- Page-range operations ------------------------------------------------

    /// Render pages of `path` to `out_dir/page_{n}.png` at the export DPI.
    ///
    /// Long documents ask for a range first; cancelling leaves the
    /// filesystem untouched.
    #[instrument(skip(self, prompt), fields(path = %path.display()))]
    pub fn export_images<P: PromptProvider + ?Sized>(
        &self,
        path: &Path,
        out_dir: &Path,
        prompt: &mut P,
    ) -> Result<Vec<PathBuf>> {
        let range = select_range(
            probe_page_count(&self.codec, path),
            self.config.export_ceiling,
            "Converting",
            prompt,
        )?;

        std::fs::create_dir_all(out_dir)?;
        let mut written = Vec::new();
        self.rasterizer.rasterize(
            path,
            range,
            self.config.export_dpi,
            &mut |page_number, bitmap| {
                let target = out_dir.join(format!("page_{page_number}.png"));
                ImageProcessor::from_rgb(bitmap).save_png(&target)?;
                written.push(target);
                Ok(())
            },
        )?;

        info!(images = written.len(), "Pages exported as images");
        Ok(written)
    }

    /// Copy a page range of `path` into a new PDF at `output`.
    ///
    /// With `range` unset the range is chosen by the usual ceiling policy.
    #[instrument(skip(self, prompt), fields(path = %path.display()))]
    pub fn export_pages<P: PromptProvider + ?Sized>(
        &self,
        path: &Path,
        output: &Path,
        range: Option<PageRange>,
        prompt: &mut P,
    ) -> Result<u32> {
        let range = match range {
            Some(range) => range,
            None => select_range(
                probe_page_count(&self.codec, path),
                self.config.export_ceiling,
                "Exporting",
                prompt,
            )?,
        };

        let reader = PdfReader::open(path)?;
        let bytes = reader.extract_range(&range)?;
        std::fs::write(output, &bytes)?;

        let exported = range.indices(reader.page_count()).len() as u32;
        info!(exported, output = %output.display(), "Pages exported");
        Ok(exported)
    }

    /// Convert the text of `path` to a Word document at `<stem>.docx`.
    ///
    /// Long documents ask for a range first, as for image export.
    #[instrument(skip(self, prompt), fields(path = %path.display()))]
    pub fn export_document<P: PromptProvider + ?Sized>(
        &self,
        path: &Path,
        prompt: &mut P,
    ) -> Result<PathBuf> {
        let range = select_range(
            probe_page_count(&self.codec, path),
            self.config.export_ceiling,
            "Converting",
            prompt,
        )?;

        let pages = range_text(path, &range)?;
        let output = path.with_extension("docx");
        write_docx(&pages, &output)?;
        Ok(output)
    }

    /// Write the text of `path` to `<stem>_extracted.txt`, pages separated
    /// by form feeds.
    #[instrument(skip(self, prompt), fields(path = %path.display()))]
    pub fn extract_text<P: PromptProvider + ?Sized>(
        &self,
        path: &Path,
        prompt: &mut P,
    ) -> Result<PathBuf> {
        let range = select_range(
            probe_page_count(&self.codec, path),
            self.config.extraction_ceiling,
            "Extracting text from",
            prompt,
        )?;

        let pages = range_text(path, &range)?;
        let output = derive_output_path(path, OutputSuffix::Extracted, Some("txt"));
        let texts: Vec<&str> = pages.iter().map(|(_, text)| text.as_str()).collect();
        std::fs::write(&output, texts.join(PAGE_BREAK))?;
        info!(pages = pages.len(), output = %output.display(), "Text extracted");
        Ok(output)
    }

    /// Detect tables in `path` and write them to `<stem>_tables.xlsx`, one
    /// sheet per table.
    #[instrument(skip(self, prompt), fields(path = %path.display()))]
    pub fn extract_tables<P: PromptProvider + ?Sized>(
        &self,
        path: &Path,
        prompt: &mut P,
    ) -> Result<(PathBuf, usize)> {
        let range = select_range(
            probe_page_count(&self.codec, path),
            self.config.table_ceiling,
            "Extracting tables from",
            prompt,
        )?;

        let reader = PdfReader::open(path)?;
        let mut tables: Vec<Table> = Vec::new();
        for index in range.indices(reader.page_count()) {
            match reader.page_text(index + 1) {
                Ok(text) => tables.extend(detect_tables(index + 1, &text)),
                Err(err) => warn!(page = index + 1, %err, "Page skipped during table detection"),
            }
        }

        if tables.is_empty() {
            return Err(PdfwerkError::NothingExtracted(format!(
                "no tables could be extracted from {}",
                path.display()
            )));
        }

        let output = derive_output_path(path, OutputSuffix::Tables, Some("xlsx"));
        write_workbook(&tables, &output)?;
        info!(tables = tables.len(), output = %output.display(), "Tables extracted");
        Ok((output, tables.len()))
    }

    // -- Multi-file operations ------------------------------------------------

    /// Concatenate `paths` in order into `output`.
    #[instrument(skip(self, paths), fields(inputs = paths.len()))]
    pub fn merge_pdfs<P: AsRef<Path>>(&self, paths: &[P], output: &Path) -> Result<u32> {
        let (first, rest) = paths
            .split_first()
            .ok_or_else(|| PdfwerkError::NoInput("no PDFs to merge".into()))?;

        let base = PdfReader::open(first)?;
        let others = rest
            .iter()
            .map(PdfReader::open)
            .collect::<Result<Vec<_>>>()?;
        let bytes = base.merge(&others)?;
        std::fs::write(output, &bytes)?;

        let pages = base.page_count() + others.iter().map(PdfReader::page_count).sum::<u32>();
        info!(pages, output = %output.display(), "PDFs merged");
        Ok(pages)
    }

    /// Re-encode each image as `<stem>_compressed.jpg`, best effort.
    pub fn compress_images<P: AsRef<Path>>(&self, paths: &[P]) -> BatchResult<PathBuf> {
        collect_batch(paths, |input| {
            ensure_image(input)?;
            let output = derive_output_path(input, OutputSuffix::Compressed, Some("jpg"));
            ImageProcessor::open(input)?
                .normalize_color()
                .scale_percent(self.config.image_scale_percent)
                .save_jpeg(&output, self.config.image_quality)?;
            Ok(output)
        })
    }

    /// Build one PDF with a page per readable image. Unreadable images are
    /// recorded in the returned batch and skipped.
    #[instrument(skip(self, paths), fields(inputs = paths.len()))]
    pub fn images_to_pdf<P: AsRef<Path>>(
        &self,
        paths: &[P],
        output: &Path,
    ) -> Result<BatchResult<u32>> {
        if paths.is_empty() {
            return Err(PdfwerkError::NoInput("no images to combine".into()));
        }

        let mut writer = PdfWriter::new();
        let batch = collect_batch(paths, |input| {
            ensure_image(input)?;
            let encoded = ImageProcessor::open(input)?
                .normalize_color()
                .encode_jpeg(self.config.embed_quality)?;
            writer.add_image_page(&encoded)?;
            Ok(writer.page_count() as u32)
        });

        if batch.success_count() == 0 {
            return Err(PdfwerkError::NothingExtracted(
                "none of the selected images could be read".into(),
            ));
        }
        writer.write_to_file(output)?;
        Ok(batch)
    }

    // -- Office conversions ---------------------------------------------------

    /// Lay every sheet of the workbook at `path` out as `<stem>.pdf`.
    /// Returns the output path and its page count.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn excel_to_pdf(&self, path: &Path) -> Result<(PathBuf, u32)> {
        if DocumentType::from_path(path) != Some(DocumentType::Spreadsheet) {
            return Err(PdfwerkError::UnsupportedDocument(extension_of(path)));
        }
        let sheets = read_workbook(path)?;
        let output = path.with_extension("pdf");
        let pages = write_sheets_pdf(&sheets, &output)?;
        Ok((output, pages))
    }
}

/// Text of each page in `range`, numbered from 1. Unreadable pages come
/// back empty; a range with no text at all is [`PdfwerkError::NothingExtracted`].
fn range_text(path: &Path, range: &PageRange) -> Result<Vec<(u32, String)>> {
    let reader = PdfReader::open(path)?;
    let pages: Vec<(u32, String)> = range
        .indices(reader.page_count())
        .map(|index| {
            let text = reader.page_text(index + 1).unwrap_or_else(|err| {
                warn!(page = index + 1, %err, "Page text unavailable");
                String::new()
            });
            (index + 1, text)
        })
        .collect();

    if pages.iter().all(|(_, text)| text.trim().is_empty()) {
        return Err(PdfwerkError::NothingExtracted(format!(
            "no extractable text found in {}",
            path.display()
        )));
    }
    Ok(pages)
}

/// Reject files the raster codec has no decoder for.
fn ensure_image(path: &Path) -> Result<()> {
    match DocumentType::from_path(path) {
        Some(kind) if kind.is_image() => Ok(()),
        _ => Err(PdfwerkError::UnsupportedDocument(extension_of(path))),
    }
}

fn extension_of(path: &Path) -> String {
    path.extension().map_or_else(
        || "no extension".to_string(),
        |ext| ext.to_string_lossy().into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::testing::{FakeCodec, FakeRasterizer};
    use crate::pdf::fixtures;
    use image::{Rgb, RgbImage};

    fn toolkit(pages: u32) -> Toolkit<LopdfCodec, FakeRasterizer> {
        Toolkit::with_parts(LopdfCodec, FakeRasterizer::new(pages), AppConfig::default())
    }

    fn never_called(_: &str, _: &str, _: u32, _: u32) -> Option<u32> {
        panic!("no prompt expected")
    }

    fn cancel(_: &str, _: &str, _: u32, _: u32) -> Option<u32> {
        None
    }

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(width, height, Rgb([10, 200, 90]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn export_images_writes_one_png_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = fixtures::write_pdf(dir.path(), "doc.pdf", 3);
        let out = dir.path().join("images");

        let written = toolkit(3).export_images(&pdf, &out, &mut never_called).unwrap();

        assert_eq!(
            written,
            vec![out.join("page_1.png"), out.join("page_2.png"), out.join("page_3.png")]
        );
        assert!(written.iter().all(|path| path.is_file()));
    }

    #[test]
    fn cancelled_export_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = fixtures::write_pdf(dir.path(), "long.pdf", 101);
        let out = dir.path().join("images");

        let err = toolkit(101).export_images(&pdf, &out, &mut cancel).unwrap_err();

        assert!(err.is_cancelled());
        assert!(!out.exists());
    }

    #[test]
    fn long_export_covers_only_the_chosen_range() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = fixtures::write_pdf(dir.path(), "long.pdf", 120);
        let out = dir.path().join("images");
        let mut answers = vec![Some(119), Some(118)].into_iter();
        let mut prompt = |_: &str, _: &str, _: u32, _: u32| answers.next().flatten();

        let written = toolkit(120).export_images(&pdf, &out, &mut prompt).unwrap();
        // End is raised to the start page.
        assert_eq!(written, vec![out.join("page_119.png")]);
    }

    #[test]
    fn export_pages_writes_the_requested_range() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = fixtures::write_pdf(dir.path(), "doc.pdf", 5);
        let output = dir.path().join("part.pdf");
        let range = PageRange::new(2, Some(3)).unwrap();

        let exported = toolkit(5)
            .export_pages(&pdf, &output, Some(range), &mut never_called)
            .unwrap();

        assert_eq!(exported, 2);
        let part = PdfReader::open(&output).unwrap();
        assert_eq!(part.page_count(), 2);
        assert_eq!(part.page_text(1).unwrap().trim(), "Page 2");
    }

    #[test]
    fn export_document_writes_docx_next_to_the_input() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = fixtures::write_pdf(dir.path(), "notes.pdf", 2);

        let output = toolkit(2).export_document(&pdf, &mut never_called).unwrap();

        assert_eq!(output, dir.path().join("notes.docx"));
        let bytes = std::fs::read(&output).unwrap();
        assert!(docx_rs::read_docx(&bytes).is_ok());
    }

    #[test]
    fn cancelled_document_export_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = fixtures::write_pdf(dir.path(), "long.pdf", 101);

        let err = toolkit(101).export_document(&pdf, &mut cancel).unwrap_err();

        assert!(err.is_cancelled());
        assert!(!dir.path().join("long.docx").exists());
    }

    #[test]
    fn excel_to_pdf_lays_out_the_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Inventory").unwrap();
        sheet.write_string(0, 0, "Item").unwrap();
        sheet.write_string(1, 0, "Washer").unwrap();
        workbook.save(&path).unwrap();

        let (output, pages) = toolkit(0).excel_to_pdf(&path).unwrap();

        assert_eq!(output, dir.path().join("stock.pdf"));
        assert_eq!(pages, 1);
        let text = PdfReader::open(&output).unwrap().page_text(1).unwrap();
        assert!(text.contains("Inventory"));
        assert!(text.contains("Washer"));
    }

    #[test]
    fn excel_to_pdf_needs_a_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = fixtures::write_pdf(dir.path(), "doc.pdf", 1);
        let err = toolkit(0).excel_to_pdf(&pdf).unwrap_err();
        assert!(matches!(err, PdfwerkError::UnsupportedDocument(ext) if ext == "pdf"));
    }

    #[test]
    fn extract_text_joins_pages_with_form_feeds() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = fixtures::write_pdf(dir.path(), "notes.pdf", 2);

        let output = toolkit(2).extract_text(&pdf, &mut never_called).unwrap();

        assert_eq!(output, dir.path().join("notes_extracted.txt"));
        let text = std::fs::read_to_string(&output).unwrap();
        let pages: Vec<&str> = text.split(PAGE_BREAK).map(str::trim).collect();
        assert_eq!(pages, vec!["Page 1", "Page 2"]);
    }

    #[test]
    fn text_free_pages_report_nothing_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_png(dir.path(), "scan.png", 4, 4);
        let pdf = dir.path().join("scan.pdf");
        toolkit(1).images_to_pdf(&[&image], &pdf).unwrap();

        let err = toolkit(1).extract_text(&pdf, &mut never_called).unwrap_err();
        assert!(matches!(err, PdfwerkError::NothingExtracted(_)));
        assert!(!dir.path().join("scan_extracted.txt").exists());
    }

    #[test]
    fn pages_without_tables_report_nothing_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = fixtures::write_pdf(dir.path(), "plain.pdf", 2);

        let err = toolkit(2).extract_tables(&pdf, &mut never_called).unwrap_err();
        assert!(matches!(err, PdfwerkError::NothingExtracted(_)));
        assert!(!dir.path().join("plain_tables.xlsx").exists());
    }

    #[test]
    fn cancelled_table_extraction_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = fixtures::write_pdf(dir.path(), "long.pdf", 150);

        let err = toolkit(150).extract_tables(&pdf, &mut cancel).unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn merge_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = fixtures::write_pdf(dir.path(), "a.pdf", 2);
        let b = fixtures::write_pdf(dir.path(), "b.pdf", 1);
        let output = dir.path().join("merged.pdf");

        let pages = toolkit(0).merge_pdfs(&[&b, &a], &output).unwrap();

        assert_eq!(pages, 3);
        let merged = PdfReader::open(&output).unwrap();
        let texts: Vec<String> = (1..=3)
            .map(|n| merged.page_text(n).unwrap().trim().to_string())
            .collect();
        assert_eq!(texts, vec!["Page 1", "Page 1", "Page 2"]);
    }

    #[test]
    fn merge_without_inputs_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = toolkit(0)
            .merge_pdfs::<PathBuf>(&[], &dir.path().join("out.pdf"))
            .unwrap_err();
        assert!(matches!(err, PdfwerkError::NoInput(_)));
    }

    #[test]
    fn compress_images_skips_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_png(dir.path(), "photo.png", 32, 32);
        let bad = dir.path().join("broken.png");
        std::fs::write(&bad, b"not an image").unwrap();

        let batch = toolkit(0).compress_images(&[&good, &bad]);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.success_count(), 1);
        let (_, output) = batch.succeeded().next().unwrap();
        assert_eq!(*output, dir.path().join("photo_compressed.jpg"));
        assert_eq!(image::open(output).unwrap().width(), 32);
    }

    #[test]
    fn non_images_are_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, b"hello").unwrap();

        let batch = toolkit(0).compress_images(&[&notes]);
        let (_, err) = batch.failed().next().unwrap();
        assert!(matches!(err, PdfwerkError::UnsupportedDocument(ext) if ext == "txt"));
        assert!(!dir.path().join("notes_compressed.jpg").exists());
    }

    #[test]
    fn compress_images_applies_scale() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_png(dir.path(), "photo.png", 40, 20);
        let config = AppConfig {
            image_scale_percent: 50,
            ..AppConfig::default()
        };
        let toolkit = Toolkit::with_parts(LopdfCodec, FakeRasterizer::new(0), config);

        let batch = toolkit.compress_images(&[&good]);
        let (_, output) = batch.succeeded().next().unwrap();
        let image = image::open(output).unwrap();
        assert_eq!((image.width(), image.height()), (20, 10));
    }

    #[test]
    fn images_to_pdf_makes_a_page_per_readable_image() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_png(dir.path(), "1.png", 30, 40);
        let missing = dir.path().join("2.png");
        let third = write_png(dir.path(), "3.png", 50, 20);
        let output = dir.path().join("album.pdf");

        let batch = toolkit(0)
            .images_to_pdf(&[&first, &missing, &third], &output)
            .unwrap();

        assert_eq!(batch.failure_count(), 1);
        assert_eq!(PdfReader::open(&output).unwrap().page_count(), 2);
    }

    #[test]
    fn images_to_pdf_needs_one_readable_image() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("album.pdf");
        let err = toolkit(0)
            .images_to_pdf(&[dir.path().join("missing.png")], &output)
            .unwrap_err();
        assert!(matches!(err, PdfwerkError::NothingExtracted(_)));
        assert!(!output.exists());
    }

    #[test]
    fn batch_compress_runs_through_the_strategy() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("x.pdf");
        std::fs::write(&input, vec![b'P'; 300]).unwrap();
        let codec = FakeCodec {
            pages: Some(1),
            lossless_bytes: 100,
            ..Default::default()
        };
        let toolkit = Toolkit::with_parts(codec, FakeRasterizer::new(1), AppConfig::default());

        let batch = toolkit.batch_compress(&[&input], &CompressionRequest::default());
        let (_, outcome) = batch.succeeded().next().unwrap();
        assert_eq!(outcome.output_path, dir.path().join("x_batch_compressed.pdf"));
        assert_eq!(toolkit.inspect(&input).page_count, Some(1));
    }
}
