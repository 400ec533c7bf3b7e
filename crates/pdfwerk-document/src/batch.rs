// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Best-effort processing of many files: one failure is recorded and the
// batch moves on.

use std::path::{Path, PathBuf};

use pdfwerk_core::error::Result;
use pdfwerk_core::{BatchResult, CompressionOutcome, CompressionRequest, OutputSuffix, derive_output_path};
use tracing::{info, warn};

use crate::codec::{DocumentCodec, PageRasterizer};
use crate::compress::CompressionStrategy;

/// Apply `job` to each path in order, recording every result.
///
/// Never short-circuits: the returned batch has exactly one entry per input,
/// in input order.
pub fn collect_batch<T, P, F>(paths: &[P], mut job: F) -> BatchResult<T>
where
    P: AsRef<Path>,
    F: FnMut(&Path) -> Result<T>,
{
    let mut batch = BatchResult::new();
    for path in paths {
        let path = path.as_ref();
        let result = job(path);
        if let Err(err) = &result {
            warn!(path = %path.display(), %err, "Batch item failed");
        }
        batch.push(path.to_path_buf(), result);
    }
    info!(
        total = batch.len(),
        succeeded = batch.success_count(),
        failed = batch.failure_count(),
        "Batch finished"
    );
    batch
}

/// Where a batch writes the compressed copy of `input`.
pub fn batch_output_path(input: &Path) -> PathBuf {
    derive_output_path(input, OutputSuffix::BatchCompressed, Some("pdf"))
}

/// Compress every PDF in `paths` to `<stem>_batch_compressed.pdf`.
pub fn run_batch<C, R, P>(
    strategy: &CompressionStrategy<'_, C, R>,
    paths: &[P],
    request: &CompressionRequest,
) -> BatchResult<CompressionOutcome>
where
    C: DocumentCodec + ?Sized,
    R: PageRasterizer + ?Sized,
    P: AsRef<Path>,
{
    collect_batch(paths, |input| {
        strategy.compress(input, &batch_output_path(input), request)
    })
}
