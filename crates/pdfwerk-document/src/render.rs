// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterisation through pdfium. The native library is bound on first
// use, so constructing a rasterizer never fails and operations that do not
// render pages work on machines without pdfium installed.

use std::path::Path;
use std::sync::OnceLock;

use image::RgbImage;
use pdfium_render::prelude::*;
use pdfwerk_core::PageRange;
use pdfwerk_core::error::{PdfwerkError, Result};
use tracing::{debug, info, instrument};

use crate::codec::PageRasterizer;

/// Points per inch in PDF user space.
const POINTS_PER_INCH: f32 = 72.0;

/// [`PageRasterizer`] backed by a lazily bound pdfium library.
#[derive(Default)]
pub struct PdfiumRasterizer {
    pdfium: OnceLock<Pdfium>,
}

impl PdfiumRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn pdfium(&self) -> Result<&Pdfium> {
        if let Some(pdfium) = self.pdfium.get() {
            return Ok(pdfium);
        }
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|err| {
                PdfwerkError::RenderError(format!("failed to load pdfium library: {}", err))
            })?;
        info!("pdfium library bound");
        Ok(self.pdfium.get_or_init(|| Pdfium::new(bindings)))
    }
}

impl PageRasterizer for PdfiumRasterizer {
    #[instrument(skip(self, sink), fields(path = %path.display(), range = %range, dpi))]
    fn rasterize(
        &self,
        path: &Path,
        range: PageRange,
        dpi: u32,
        sink: &mut dyn FnMut(u32, RgbImage) -> Result<()>,
    ) -> Result<()> {
        let pdfium = self.pdfium()?;
        let document = pdfium.load_pdf_from_file(path, None).map_err(|err| {
            PdfwerkError::RenderError(format!("failed to load {}: {}", path.display(), err))
        })?;

        let available = document.pages().len() as u32;
        let zoom = dpi as f32 / POINTS_PER_INCH;
        debug!(available, zoom, "Rendering pages");

        for index in range.indices(available) {
            let page_number = index + 1;
            let page_index = page_index(index)?;
            let page = document.pages().get(page_index).map_err(|err| {
                PdfwerkError::RenderError(format!("failed to get page {}: {}", page_number, err))
            })?;

            let width = (page.width().value * zoom).round().max(1.0) as i32;
            let height = (page.height().value * zoom).round().max(1.0) as i32;
            let config = PdfRenderConfig::new()
                .set_target_width(width)
                .set_target_height(height);

            let bitmap = page.render_with_config(&config).map_err(|err| {
                PdfwerkError::RenderError(format!(
                    "failed to render page {}: {}",
                    page_number, err
                ))
            })?;

            sink(page_number, bitmap.as_image().into_rgb8())?;
        }
        Ok(())
    }
}

/// Convert a 0-based page index to the renderer's index type.
fn page_index(index: u32) -> Result<u16> {
    u16::try_from(index).map_err(|_| {
        PdfwerkError::RenderError(format!(
            "page {} is beyond what the renderer can address",
            u64::from(index) + 1
        ))
    })
}
