// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Size probing. A document whose page count cannot be read is treated as
// "unknown size", never as an error.

use std::path::Path;

use pdfwerk_core::DocumentInfo;
use tracing::debug;

use crate::codec::DocumentCodec;

/// Page count of `path`, or `None` when the codec cannot open it.
pub fn probe_page_count<C: DocumentCodec + ?Sized>(codec: &C, path: &Path) -> Option<u32> {
    match codec.page_count(path) {
        Ok(count) => Some(count),
        Err(err) => {
            debug!(path = %path.display(), %err, "Page count unavailable");
            None
        }
    }
}

/// Page count and on-disk size of `path`. A missing file reports zero bytes.
pub fn inspect<C: DocumentCodec + ?Sized>(codec: &C, path: &Path) -> DocumentInfo {
    DocumentInfo {
        path: path.to_path_buf(),
        page_count: probe_page_count(codec, path),
        byte_size: std::fs::metadata(path).map(|meta| meta.len()).unwrap_or(0),
    }
}
