// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for pdfwerk.

use thiserror::Error;

/// Top-level error type for all pdfwerk operations.
#[derive(Debug, Error)]
pub enum PdfwerkError {
    // -- Intake errors --
    #[error("unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error("no usable input files: {0}")]
    NoInput(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    // -- Codec errors --
    #[error("could not read page count: {0}")]
    Probe(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("page rendering failed: {0}")]
    RenderError(String),

    #[error("office document operation failed: {0}")]
    OfficeError(String),

    #[error("nothing to extract: {0}")]
    NothingExtracted(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of a [`PdfwerkError`], used to decide how a failure
/// is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document could not be opened for page counting. Never fatal.
    ProbeFailure,
    /// The user declined a required prompt. Aborts silently.
    CancelledByUser,
    /// A codec raised while opening, saving, rendering, or encoding.
    CodecFailure,
    /// Bad arguments or unusable input files.
    InvalidInput,
}

impl PdfwerkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Probe(_) => ErrorKind::ProbeFailure,
            Self::Cancelled => ErrorKind::CancelledByUser,
            Self::UnsupportedDocument(_) | Self::NoInput(_) | Self::InvalidRequest(_) => {
                ErrorKind::InvalidInput
            }
            Self::PdfError(_)
            | Self::ImageError(_)
            | Self::RenderError(_)
            | Self::OfficeError(_)
            | Self::NothingExtracted(_)
            | Self::Io(_)
            | Self::Serialization(_) => ErrorKind::CodecFailure,
        }
    }

    /// Whether this error is a user cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PdfwerkError>;
