// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Adaptive PDF compression: a lossless restructuring pass first, escalating
// to rasterise-and-recompress only when the lossless pass did not shrink the
// file and the document is short enough to rasterise safely.

use std::path::{Path, PathBuf};

use pdfwerk_core::error::{PdfwerkError, Result};
use pdfwerk_core::{
    CompressionOutcome, CompressionRequest, OutputSuffix, PageRange, derive_output_path,
};
use tracing::{debug, info, instrument, warn};

use crate::codec::{DocumentCodec, EncodedPage, PageRasterizer};
use crate::image::processor::ImageProcessor;
use crate::probe::probe_page_count;

/// The lossless-then-lossy compression policy over a codec and rasterizer.
pub struct CompressionStrategy<'a, C: ?Sized, R: ?Sized> {
    codec: &'a C,
    rasterizer: &'a R,
}

impl<'a, C, R> CompressionStrategy<'a, C, R>
where
    C: DocumentCodec + ?Sized,
    R: PageRasterizer + ?Sized,
{
    pub fn new(codec: &'a C, rasterizer: &'a R) -> Self {
        Self { codec, rasterizer }
    }

    /// Compress `input` next to itself as `<stem>_compressed.pdf`.
    pub fn compress_file(
        &self,
        input: &Path,
        request: &CompressionRequest,
    ) -> Result<CompressionOutcome> {
        let output = derive_output_path(input, OutputSuffix::Compressed, Some("pdf"));
        self.compress(input, &output, request)
    }

    /// Compress `input` into `output`.
    ///
    /// The input is only ever read. Any codec failure aborts the whole
    /// document and removes whatever was written to `output`.
    #[instrument(skip(self, request), fields(input = %input.display(), quality = request.quality(), dpi = request.dpi()))]
    pub fn compress(
        &self,
        input: &Path,
        output: &Path,
        request: &CompressionRequest,
    ) -> Result<CompressionOutcome> {
        if same_file(input, output) {
            return Err(PdfwerkError::InvalidRequest(format!(
                "refusing to overwrite the input {}",
                input.display()
            )));
        }

        let input_bytes = std::fs::metadata(input)?.len();
        self.run_passes(input, output, input_bytes, request)
            .inspect_err(|err| {
                warn!(%err, output = %output.display(), "Compression failed, discarding output");
                if let Err(remove_err) = std::fs::remove_file(output) {
                    debug!(%remove_err, "No output to discard");
                }
            })
    }

    fn run_passes(
        &self,
        input: &Path,
        output: &Path,
        input_bytes: u64,
        request: &CompressionRequest,
    ) -> Result<CompressionOutcome> {
        self.codec.save_lossless(input, output)?;
        let lossless_bytes = std::fs::metadata(output)?.len();
        debug!(input_bytes, lossless_bytes, "Lossless pass measured");

        let mut outcome = CompressionOutcome {
            output_path: output.to_path_buf(),
            input_bytes,
            output_bytes: lossless_bytes,
            used_lossy: false,
            skipped_lossy_reason: None,
        };

        if lossless_bytes < input_bytes {
            info!(saved = outcome.saved_bytes(), "Lossless pass sufficient");
            return Ok(outcome);
        }

        // An unreadable page count does not block escalation.
        if let Some(pages) = probe_page_count(self.codec, input) {
            if pages > request.max_pages_for_lossy() {
                info!(pages, limit = request.max_pages_for_lossy(), "Lossy pass skipped");
                outcome.skipped_lossy_reason = Some(format!(
                    "The PDF has {pages} pages. Lossy compression was skipped to avoid memory issues."
                ));
                return Ok(outcome);
            }
        }

        let pages = self.encode_pages(input, request)?;
        self.codec.replace_with_bitmaps(input, output, &pages)?;

        outcome.output_bytes = std::fs::metadata(output)?.len();
        outcome.used_lossy = true;
        info!(
            pages = pages.len(),
            output_bytes = outcome.output_bytes,
            "Lossy pass written"
        );
        Ok(outcome)
    }

    /// Render every page of `input` and re-encode it as JPEG.
    fn encode_pages(&self, input: &Path, request: &CompressionRequest) -> Result<Vec<EncodedPage>> {
        let mut pages = Vec::new();
        self.rasterizer
            .rasterize(input, PageRange::ALL, request.dpi(), &mut |page_number, bitmap| {
                let image = ImageProcessor::from_rgb(bitmap).encode_jpeg(request.quality())?;
                debug!(page_number, jpeg_bytes = image.jpeg.len(), "Page re-encoded");
                pages.push(EncodedPage { page_number, image });
                Ok(())
            })?;
        Ok(pages)
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    fn canonical(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
    }
    a == b || canonical(a) == canonical(b)
}


#[cfg(test)]
mod tests {
    use super::testing::{FakeCodec, FakeRasterizer};
    use super::*;

    const MB: usize = 1_000_000;

    fn input_of(dir: &Path, bytes: usize) -> PathBuf {
        let path = dir.join("report.pdf");
        std::fs::write(&path, vec![b'P'; bytes]).unwrap();
        path
    }

    fn request() -> CompressionRequest {
        CompressionRequest::new(80, 150).unwrap()
    }

    #[test]
    fn smaller_lossless_result_is_final() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_of(dir.path(), 2 * MB);
        let codec = FakeCodec {
            pages: Some(10),
            lossless_bytes: 1_800_000,
            ..Default::default()
        };
        let rasterizer = FakeRasterizer::new(10);

        let outcome = CompressionStrategy::new(&codec, &rasterizer)
            .compress_file(&input, &request())
            .unwrap();

        assert!(!outcome.used_lossy);
        assert_eq!(outcome.output_bytes, 1_800_000);
        assert_eq!(outcome.input_bytes, 2_000_000);
        assert_eq!(outcome.output_path, dir.path().join("report_compressed.pdf"));
        assert_eq!(*codec.calls.borrow(), vec!["save_lossless"]);
        assert!(rasterizer.dpi_seen.borrow().is_empty());
    }

    #[test]
    fn larger_lossless_result_escalates_to_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_of(dir.path(), 2 * MB);
        let codec = FakeCodec {
            pages: Some(10),
            lossless_bytes: 2_100_000,
            lossy_bytes: 700_000,
            ..Default::default()
        };
        let rasterizer = FakeRasterizer::new(10);

        let outcome = CompressionStrategy::new(&codec, &rasterizer)
            .compress_file(&input, &request())
            .unwrap();

        assert!(outcome.used_lossy);
        assert_eq!(outcome.output_bytes, 700_000);
        assert_eq!(outcome.skipped_lossy_reason, None);
        assert_eq!(*rasterizer.dpi_seen.borrow(), vec![150]);
        assert_eq!(
            *codec.calls.borrow(),
            vec!["save_lossless", "page_count", "replace_with_bitmaps"]
        );
    }

    #[test]
    fn equal_size_counts_as_not_smaller() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_of(dir.path(), 4096);
        let codec = FakeCodec {
            pages: Some(1),
            lossless_bytes: 4096,
            lossy_bytes: 1024,
            ..Default::default()
        };

        let outcome = CompressionStrategy::new(&codec, &FakeRasterizer::new(1))
            .compress_file(&input, &request())
            .unwrap();
        assert!(outcome.used_lossy);
    }

    #[test]
    fn lossy_result_is_accepted_even_if_larger() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_of(dir.path(), 1000);
        let codec = FakeCodec {
            pages: Some(2),
            lossless_bytes: 1200,
            lossy_bytes: 5000,
            ..Default::default()
        };

        let outcome = CompressionStrategy::new(&codec, &FakeRasterizer::new(2))
            .compress_file(&input, &request())
            .unwrap();
        assert!(outcome.used_lossy);
        assert_eq!(outcome.output_bytes, 5000);
    }

    #[test]
    fn long_documents_skip_the_lossy_pass() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_of(dir.path(), 1000);
        let codec = FakeCodec {
            pages: Some(501),
            lossless_bytes: 1000,
            ..Default::default()
        };
        let rasterizer = FakeRasterizer::new(501);

        let outcome = CompressionStrategy::new(&codec, &rasterizer)
            .compress_file(&input, &request())
            .unwrap();

        assert!(!outcome.used_lossy);
        assert_eq!(outcome.output_bytes, 1000);
        let reason = outcome.skipped_lossy_reason.unwrap();
        assert_eq!(
            reason,
            "The PDF has 501 pages. Lossy compression was skipped to avoid memory issues."
        );
        assert!(rasterizer.dpi_seen.borrow().is_empty());
    }

    #[test]
    fn guard_is_inclusive_at_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_of(dir.path(), 100);
        let codec = FakeCodec {
            pages: Some(500),
            lossless_bytes: 100,
            lossy_bytes: 10,
            ..Default::default()
        };

        let outcome = CompressionStrategy::new(&codec, &FakeRasterizer::new(500))
            .compress_file(&input, &request())
            .unwrap();
        assert!(outcome.used_lossy);
        assert_eq!(outcome.skipped_lossy_reason, None);
    }

    #[test]
    fn unknown_page_count_still_escalates() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_of(dir.path(), 100);
        let codec = FakeCodec {
            pages: None,
            lossless_bytes: 150,
            lossy_bytes: 60,
            ..Default::default()
        };

        let outcome = CompressionStrategy::new(&codec, &FakeRasterizer::new(4))
            .compress_file(&input, &request())
            .unwrap();
        assert!(outcome.used_lossy);
        assert_eq!(outcome.output_bytes, 60);
    }

    #[test]
    fn codec_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_of(dir.path(), 100);
        let codec = FakeCodec {
            broken: [input.clone()].into_iter().collect(),
            ..Default::default()
        };

        let err = CompressionStrategy::new(&codec, &FakeRasterizer::new(1))
            .compress_file(&input, &request())
            .unwrap_err();
        assert!(matches!(err, PdfwerkError::PdfError(_)));
    }

    #[test]
    fn failed_lossy_pass_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_of(dir.path(), 100);
        let codec = FakeCodec {
            pages: Some(2),
            lossless_bytes: 120,
            replace_fails: true,
            ..Default::default()
        };

        let err = CompressionStrategy::new(&codec, &FakeRasterizer::new(2))
            .compress_file(&input, &request())
            .unwrap_err();

        assert!(matches!(err, PdfwerkError::PdfError(_)));
        assert!(!dir.path().join("report_compressed.pdf").exists());
        assert_eq!(std::fs::read(&input).unwrap().len(), 100);
    }

    #[test]
    fn input_is_never_the_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_of(dir.path(), 100);
        let codec = FakeCodec::default();

        let err = CompressionStrategy::new(&codec, &FakeRasterizer::new(1))
            .compress(&input, &input, &request())
            .unwrap_err();
        assert!(matches!(err, PdfwerkError::InvalidRequest(_)));
        assert!(codec.calls.borrow().is_empty());
        assert_eq!(std::fs::read(&input).unwrap().len(), 100);
    }

    #[test]
    fn real_codec_keeps_a_shrinking_lossless_pass() {
        use crate::pdf::{LopdfCodec, fixtures};

        let dir = tempfile::tempdir().unwrap();
        // Uncompressed, unpruned source: the lossless pass always shrinks it.
        let mut doc = fixtures::document(3);
        doc.add_object(lopdf::Object::string_literal(vec![b'x'; 64 * 1024]));
        let input = dir.path().join("bloated.pdf");
        doc.save(&input).unwrap();

        let rasterizer = FakeRasterizer::new(3);
        let outcome = CompressionStrategy::new(&LopdfCodec, &rasterizer)
            .compress_file(&input, &request())
            .unwrap();

        assert!(!outcome.used_lossy);
        assert!(outcome.output_bytes < outcome.input_bytes);
        assert_eq!(LopdfCodec.page_count(&outcome.output_path).unwrap(), 3);
    }

    #[test]
    fn real_codec_lossy_pass_replaces_every_page() {
        use crate::pdf::{LopdfCodec, fixtures};

        let dir = tempfile::tempdir().unwrap();
        let input = fixtures::write_pdf(dir.path(), "tiny.pdf", 2);
        let output = dir.path().join("tiny_out.pdf");

        let codec = LopdfCodec;
        let rasterizer = FakeRasterizer::new(2);
        let strategy = CompressionStrategy::new(&codec, &rasterizer);
        let pages = strategy.encode_pages(&input, &request()).unwrap();
        assert_eq!(
            pages.iter().map(|p| p.page_number).collect::<Vec<_>>(),
            vec![1, 2]
        );
        codec.replace_with_bitmaps(&input, &output, &pages).unwrap();

        let doc = lopdf::Document::load(&output).unwrap();
        for (_, page_id) in doc.get_pages() {
            let page = doc.get_dictionary(page_id).unwrap();
            let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
            assert!(resources.get(b"Font").is_err());
        }
    }
}
