// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Codec seams. The pipeline decides *what* to do with a document; these
// traits are the narrow interfaces through which the actual PDF and raster
// work is delegated (lopdf and pdfium in production, fakes in tests).

use std::path::Path;

use image::RgbImage;
use pdfwerk_core::PageRange;
use pdfwerk_core::error::Result;

use crate::image::processor::EncodedImage;

/// A re-encoded bitmap destined to become the sole content of a page.
#[derive(Debug, Clone)]
pub struct EncodedPage {
    /// 1-based page number in the source document.
    pub page_number: u32,
    pub image: EncodedImage,
}

/// Structural PDF operations: counting, restructuring, and page replacement.
pub trait DocumentCodec {
    /// Open `path` read-only and report its page count.
    fn page_count(&self, path: &Path) -> Result<u32>;

    /// Re-save `input` to `output` with unused objects removed and every
    /// stream deflated. Visual content is untouched.
    fn save_lossless(&self, input: &Path, output: &Path) -> Result<()>;

    /// Write `input` to `output` with each listed page's content and
    /// resources replaced by its bitmap, keeping the page's geometry.
    /// Pages not listed are copied unchanged.
    fn replace_with_bitmaps(&self, input: &Path, output: &Path, pages: &[EncodedPage]) -> Result<()>;
}

/// Renders PDF pages to RGB bitmaps.
pub trait PageRasterizer {
    /// Render the pages of `path` selected by `range` at `dpi`, handing each
    /// bitmap to `sink` together with its 1-based page number, in page order.
    ///
    /// The range is clamped to the pages actually present.
    fn rasterize(
        &self,
        path: &Path,
        range: PageRange,
        dpi: u32,
        sink: &mut dyn FnMut(u32, RgbImage) -> Result<()>,
    ) -> Result<()>;
}
