// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable messages for errors and informational outcomes.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Cancellation maps to nothing at all: the user already knows they cancelled.

use crate::error::PdfwerkError;
use crate::types::CompressionOutcome;

/// Severity of a message from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Not a failure: something worth knowing about the result.
    Info,
    /// The user can fix this (pick another file, change a setting).
    ActionRequired,
    /// The file itself is the problem; retrying will not help.
    Permanent,
}

/// A human-readable message with plain English summary and suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Severity level (drives icon/colour in the shell).
    pub severity: Severity,
}

/// Convert a `PdfwerkError` into something a non-technical user understands.
///
/// Returns `None` for cancellation, which is always silent.
pub fn humanize_error(err: &PdfwerkError) -> Option<HumanError> {
    let human = match err {
        PdfwerkError::Cancelled => return None,

        PdfwerkError::UnsupportedDocument(detail) => HumanError {
            message: "This type of file isn't supported here.".into(),
            suggestion: format!("Choose a file of the right type for this tool. (File type: {detail})"),
            severity: Severity::ActionRequired,
        },

        PdfwerkError::NoInput(_) => HumanError {
            message: "No suitable files were selected.".into(),
            suggestion: "Pick or drop files with the right extension for this tool.".into(),
            severity: Severity::ActionRequired,
        },

        PdfwerkError::InvalidRequest(detail) => HumanError {
            message: "One of the settings is out of range.".into(),
            suggestion: format!("Adjust the setting and try again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        PdfwerkError::Probe(_) => HumanError {
            message: "We couldn't count the pages in this PDF.".into(),
            suggestion: "The whole document will be processed.".into(),
            severity: Severity::Info,
        },

        PdfwerkError::PdfError(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "The file may be damaged or password-protected. Try opening it in a PDF viewer first to check it works.".into(),
            severity: Severity::Permanent,
        },

        PdfwerkError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            severity: Severity::Permanent,
        },

        PdfwerkError::RenderError(detail) => {
            if detail.contains("library") {
                HumanError {
                    message: "The page renderer isn't installed.".into(),
                    suggestion: "Install the pdfium library next to the application or in a system library folder.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "A page of this PDF couldn't be drawn.".into(),
                    suggestion: "The file may be damaged. Try a lower DPI or a smaller page range.".into(),
                    severity: Severity::Permanent,
                }
            }
        }

        PdfwerkError::OfficeError(_) => HumanError {
            message: "The spreadsheet or Word document couldn't be processed.".into(),
            suggestion: "Check the workbook opens in a spreadsheet program, and that the output folder is writable.".into(),
            severity: Severity::Permanent,
        },

        PdfwerkError::NothingExtracted(_) => HumanError {
            message: "Nothing could be extracted.".into(),
            suggestion: "The document may only contain scanned images, or none of the selected files were readable.".into(),
            severity: Severity::Info,
        },

        PdfwerkError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "The app doesn't have permission to use that file.".into(),
                suggestion: "Check the file permissions, or copy the file to a different folder first.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                severity: Severity::Permanent,
            },
        },

        PdfwerkError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Delete config.json in the app's data folder to restore the defaults.".into(),
            severity: Severity::ActionRequired,
        },
    };
    Some(human)
}

/// Informational notice for a compression outcome, if any.
///
/// Only a skipped lossy fallback produces one.
pub fn notice_for_outcome(outcome: &CompressionOutcome) -> Option<HumanError> {
    outcome
        .skipped_lossy_reason
        .as_ref()
        .map(|reason| HumanError {
            message: "Stronger compression was skipped.".into(),
            suggestion: reason.clone(),
            severity: Severity::Info,
        })
}
