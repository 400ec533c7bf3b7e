// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: the lopdf codec, page-range extraction, merging, text, and
// image-page document creation.

pub mod optimize;
pub mod reader;
pub mod writer;

pub use optimize::LopdfCodec;
pub use reader::PdfReader;
pub use writer::PdfWriter;
