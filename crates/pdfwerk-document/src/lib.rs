// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdfwerk-document — Document processing for pdfwerk.
//
// Provides the adaptive compression pipeline (lossless pass, guarded lossy
// fallback), page-range selection for long documents, best-effort batches,
// intake classification, and the PDF, image and office operations built on
// top of them.

pub mod batch;
pub mod codec;
pub mod compress;
pub mod image;
pub mod intake;
pub mod pdf;
pub mod probe;
pub mod range;
pub mod render;
pub mod sheets;
pub mod tables;
pub mod toolkit;
pub mod word;

// Re-export the primary types so callers can use `pdfwerk_document::Toolkit` etc.
pub use batch::{collect_batch, run_batch};
pub use codec::{DocumentCodec, EncodedPage, PageRasterizer};
pub use compress::CompressionStrategy;
pub use self::image::processor::{EncodedImage, ImageProcessor};
pub use intake::{IntakeContext, classify};
pub use pdf::{LopdfCodec, PdfReader, PdfWriter};
pub use probe::{inspect, probe_page_count};
pub use range::{PromptProvider, select_range};
pub use render::PdfiumRasterizer;
pub use toolkit::Toolkit;
