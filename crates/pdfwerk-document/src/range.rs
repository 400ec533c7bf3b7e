// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page-range selection for page-indexed operations. Documents at or under a
// ceiling are processed whole; longer ones ask the user which pages to cover.

use pdfwerk_core::PageRange;
use pdfwerk_core::error::{PdfwerkError, Result};
use tracing::{debug, info};

/// Supplies bounded integers from the user. `None` means the user cancelled.
pub trait PromptProvider {
    fn ask_page(&mut self, title: &str, message: &str, min: u32, max: u32) -> Option<u32>;
}

impl<F> PromptProvider for F
where
    F: FnMut(&str, &str, u32, u32) -> Option<u32>,
{
    fn ask_page(&mut self, title: &str, message: &str, min: u32, max: u32) -> Option<u32> {
        self(title, message, min, max)
    }
}

/// Decide which pages an operation covers.
///
/// `activity` completes the sentence "… all pages may take a long time",
/// e.g. `"Exporting"`. Returns [`PdfwerkError::Cancelled`] if either prompt
/// is declined; in that case the caller must not touch any file.
pub fn select_range<P: PromptProvider + ?Sized>(
    page_count: Option<u32>,
    ceiling: u32,
    activity: &str,
    prompt: &mut P,
) -> Result<PageRange> {
    let total = match page_count {
        Some(total) if total > ceiling => total,
        _ => {
            debug!(?page_count, ceiling, "Processing whole document");
            return Ok(PageRange::full(page_count));
        }
    };

    let message = format!(
        "This PDF has {total} pages. {activity} all pages may take a long time.\n\
         Enter the starting and ending pages.\n\nStart page:"
    );
    let start = prompt
        .ask_page("Start Page", &message, 1, total)
        .ok_or(PdfwerkError::Cancelled)?
        .clamp(1, total);

    let message = format!("End page (between {start} and {total}):");
    let end = prompt
        .ask_page("End Page", &message, start, total)
        .ok_or(PdfwerkError::Cancelled)?
        .clamp(start, total);

    info!(start, end, total, "Page range selected");
    PageRange::new(start, Some(end))
}
