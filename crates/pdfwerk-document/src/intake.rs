// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Intake classification. Paths from a dialog, a drop, or the command line
// are filtered the same way before any operation sees them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use pdfwerk_core::Operation;
use tracing::debug;

/// Keep the regular files among `paths` whose extension is in `accepted`.
///
/// Extensions compare case-insensitively, with or without a leading dot.
/// Order is preserved and duplicates are dropped. With `want_multiple` unset
/// only the first match is returned. `None` means nothing qualified and the
/// caller should fall back to asking the user.
pub fn classify<P: AsRef<Path>>(
    paths: &[P],
    accepted: &[&str],
    want_multiple: bool,
) -> Option<Vec<PathBuf>> {
    let accepted: HashSet<String> = accepted
        .iter()
        .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
        .collect();

    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let extension_ok = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| accepted.contains(&ext.to_ascii_lowercase()));
        if !extension_ok || !path.is_file() || !seen.insert(path.to_path_buf()) {
            continue;
        }
        matched.push(path.to_path_buf());
        if !want_multiple {
            break;
        }
    }

    debug!(offered = paths.len(), matched = matched.len(), "Intake classified");
    if matched.is_empty() { None } else { Some(matched) }
}

/// Files handed to the application ahead of an operation, e.g. by a drop
/// or on the command line. Consumed by the next operation that accepts them.
#[derive(Debug, Default, Clone)]
pub struct IntakeContext {
    dropped: Vec<PathBuf>,
}

impl IntakeContext {
    pub fn with_dropped(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            dropped: paths.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dropped.is_empty()
    }

    /// Classify the pending files for `operation` and clear them.
    pub fn take_for(&mut self, operation: Operation) -> Option<Vec<PathBuf>> {
        let dropped = std::mem::take(&mut self.dropped);
        classify(
            &dropped,
            operation.accepted_extensions(),
            operation.wants_multiple(),
        )
    }
}
