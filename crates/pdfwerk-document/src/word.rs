// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word export: page text laid out as a DOCX with docx-rs, one paragraph per
// non-blank line and a page break between source pages.

use std::fs::File;
use std::path::Path;

use docx_rs::{BreakType, Docx, Paragraph, Run};
use pdfwerk_core::error::{PdfwerkError, Result};
use tracing::info;

/// Build the document for `pages`, given as `(page_number, text)` in order.
fn document_for(pages: &[(u32, String)]) -> Docx {
    let mut docx = Docx::new();
    for (index, (_, text)) in pages.iter().enumerate() {
        if index > 0 {
            docx = docx.add_paragraph(
                Paragraph::new().add_run(Run::new().add_break(BreakType::Page)),
            );
        }
        for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)));
        }
    }
    docx
}

/// Write `pages` to a DOCX at `output`.
pub fn write_docx(pages: &[(u32, String)], output: &Path) -> Result<()> {
    let file = File::create(output)?;
    document_for(pages).build().pack(file).map_err(|err| {
        PdfwerkError::OfficeError(format!(
            "failed to write {}: {}",
            output.display(),
            err
        ))
    })?;
    info!(pages = pages.len(), output = %output.display(), "Word document written");
    Ok(())
}
