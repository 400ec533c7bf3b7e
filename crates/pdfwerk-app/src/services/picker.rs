// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native file dialogs, the fallback when the command line names no usable
// file. Closing a dialog without choosing counts as cancelling.

use std::path::{Path, PathBuf};

use pdfwerk_core::Operation;
use pdfwerk_core::error::{PdfwerkError, Result};
use tracing::debug;

/// Opens `rfd` dialogs, or refuses when dialogs are disabled.
#[derive(Debug, Clone, Copy)]
pub struct Picker {
    dialogs: bool,
}

impl Picker {
    pub fn new(dialogs: bool) -> Self {
        Self { dialogs }
    }

    fn ensure_enabled(&self, missing: &str) -> Result<()> {
        if self.dialogs {
            Ok(())
        } else {
            Err(PdfwerkError::NoInput(format!(
                "{missing} not given and dialogs are disabled"
            )))
        }
    }

    /// Ask for the input files of `operation`.
    pub fn pick_inputs(&self, operation: Operation) -> Result<Vec<PathBuf>> {
        self.ensure_enabled("input files")?;
        let extensions = operation.accepted_extensions();
        let label = filter_label(operation);
        let dialog = rfd::FileDialog::new()
            .set_title(title_for(operation))
            .add_filter(label, extensions);

        let picked = if operation.wants_multiple() {
            dialog.pick_files()
        } else {
            dialog.pick_file().map(|path| vec![path])
        };
        debug!(?operation, picked = picked.as_ref().map_or(0, Vec::len), "dialog closed");
        picked
            .filter(|paths| !paths.is_empty())
            .ok_or(PdfwerkError::Cancelled)
    }

    /// Ask for a folder to write into.
    pub fn pick_folder(&self, title: &str) -> Result<PathBuf> {
        self.ensure_enabled("output folder")?;
        rfd::FileDialog::new()
            .set_title(title)
            .pick_folder()
            .ok_or(PdfwerkError::Cancelled)
    }

    /// Ask where to save a PDF, suggesting `file_name` next to `near`.
    pub fn save_pdf(&self, title: &str, near: &Path, file_name: &str) -> Result<PathBuf> {
        self.ensure_enabled("output file")?;
        let mut dialog = rfd::FileDialog::new()
            .set_title(title)
            .add_filter("PDF files", &["pdf"])
            .set_file_name(file_name);
        if let Some(dir) = near.parent() {
            dialog = dialog.set_directory(dir);
        }
        dialog
            .save_file()
            .map(|path| with_pdf_extension(&path))
            .ok_or(PdfwerkError::Cancelled)
    }
}

fn title_for(operation: Operation) -> &'static str {
    match operation {
        Operation::Inspect => "Select PDFs to inspect",
        Operation::CompressPdf => "Select a PDF to compress",
        Operation::BatchCompress => "Select PDFs to compress",
        Operation::ExportImages => "Select a PDF to convert to images",
        Operation::ExportPages => "Select a PDF to export pages from",
        Operation::ExportDocument => "Select a PDF to convert to Word",
        Operation::ExtractTables => "Select a PDF to extract tables from",
        Operation::ExtractText => "Select a PDF to extract text from",
        Operation::MergePdfs => "Select PDFs to merge",
        Operation::CompressImages => "Select images to compress",
        Operation::ImagesToPdf => "Select images to combine into a PDF",
        Operation::ExcelToPdf => "Select a workbook to convert to PDF",
    }
}

fn filter_label(operation: Operation) -> &'static str {
    match operation {
        Operation::CompressImages | Operation::ImagesToPdf => "Images",
        Operation::ExcelToPdf => "Spreadsheets",
        _ => "PDF files",
    }
}

/// Append `.pdf` when the chosen name has no extension.
fn with_pdf_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_dialogs_report_missing_input() {
        let picker = Picker::new(false);
        let err = picker.pick_inputs(Operation::MergePdfs).unwrap_err();
        assert!(matches!(err, PdfwerkError::NoInput(_)));
        assert!(matches!(
            picker.pick_folder("Out").unwrap_err(),
            PdfwerkError::NoInput(_)
        ));
        assert!(matches!(
            picker.save_pdf("Save", Path::new("a.pdf"), "b.pdf").unwrap_err(),
            PdfwerkError::NoInput(_)
        ));
    }

    #[test]
    fn dialogs_describe_the_operation() {
        assert_eq!(title_for(Operation::Inspect), "Select PDFs to inspect");
        assert_eq!(filter_label(Operation::ExcelToPdf), "Spreadsheets");
        assert_eq!(filter_label(Operation::Inspect), "PDF files");
    }

    #[test]
    fn saved_names_get_a_pdf_extension() {
        assert_eq!(
            with_pdf_extension(Path::new("/tmp/merged")),
            PathBuf::from("/tmp/merged.pdf")
        );
        assert_eq!(
            with_pdf_extension(Path::new("/tmp/out.PDF")),
            PathBuf::from("/tmp/out.PDF")
        );
    }
}
