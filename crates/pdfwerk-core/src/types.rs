// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the pdfwerk toolkit.

use std::fmt;
use std::ops::{Range, RangeInclusive};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PdfwerkError, Result};

/// Default JPEG quality for the lossy compression pass.
pub const DEFAULT_QUALITY: u8 = 80;
/// Default rasterisation DPI for the lossy compression pass.
pub const DEFAULT_DPI: u32 = 150;
/// Documents with more pages than this never escalate to the lossy pass.
pub const MAX_PAGES_FOR_LOSSY: u32 = 500;
/// Page count above which page-indexed operations ask for a sub-range.
pub const FULL_PROCESSING_CEILING: u32 = 100;

/// Accepted JPEG quality values.
pub const QUALITY_RANGE: RangeInclusive<u8> = 1..=100;
/// Accepted rasterisation DPI values.
pub const DPI_RANGE: RangeInclusive<u32> = 72..=300;

/// Supported input document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Pdf,
    Jpeg,
    Png,
    Bmp,
    Tiff,
    Gif,
    Ico,
    Webp,
    /// Workbooks calamine can read (XLSX, XLSM, XLS, ODS).
    Spreadsheet,
}

impl DocumentType {
    /// Infer document type from a file extension (with or without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            "gif" => Some(Self::Gif),
            "ico" => Some(Self::Ico),
            "webp" => Some(Self::Webp),
            "xlsx" | "xlsm" | "xls" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    /// Infer document type from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Whether the raster codec can decode this type.
    pub fn is_image(&self) -> bool {
        matches!(
            self,
            Self::Jpeg | Self::Png | Self::Bmp | Self::Tiff | Self::Gif | Self::Ico | Self::Webp
        )
    }
}

/// Image extensions accepted by the image operations.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "tiff", "tif", "gif", "ico", "webp",
];

/// Workbook extensions accepted by Excel-to-PDF.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Toolkit operations a set of input files can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Inspect,
    CompressPdf,
    BatchCompress,
    ExportImages,
    ExportPages,
    ExportDocument,
    ExtractTables,
    ExtractText,
    MergePdfs,
    CompressImages,
    ImagesToPdf,
    ExcelToPdf,
}

impl Operation {
    /// Extensions this operation accepts as input.
    pub fn accepted_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::CompressImages | Self::ImagesToPdf => IMAGE_EXTENSIONS,
            Self::ExcelToPdf => SPREADSHEET_EXTENSIONS,
            _ => &["pdf"],
        }
    }

    /// Whether the operation consumes several files at once.
    pub fn wants_multiple(&self) -> bool {
        matches!(
            self,
            Self::Inspect
                | Self::BatchCompress
                | Self::MergePdfs
                | Self::CompressImages
                | Self::ImagesToPdf
        )
    }
}

/// A range of pages, 1-based and inclusive.
///
/// `end == None` means "through the last page".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: Option<u32>,
}

impl PageRange {
    /// Every page of the document.
    pub const ALL: Self = Self {
        start: 1,
        end: None,
    };

    /// Build a validated range. `start` must be at least 1 and `end`, when
    /// present, must not precede `start`.
    pub fn new(start: u32, end: Option<u32>) -> Result<Self> {
        if start == 0 {
            return Err(PdfwerkError::InvalidRequest(
                "page numbers start at 1".into(),
            ));
        }
        match end {
            Some(end) if end < start => Err(PdfwerkError::InvalidRequest(format!(
                "end page {end} precedes start page {start}"
            ))),
            _ => Ok(Self { start, end }),
        }
    }

    /// The whole document. An unknown (or zero) page count leaves the end open.
    pub fn full(page_count: Option<u32>) -> Self {
        Self {
            start: 1,
            end: page_count.filter(|count| *count > 0),
        }
    }

    /// Zero-based, end-exclusive page indices, clamped to the pages actually
    /// available. Never fails: a range entirely past the end is empty.
    pub fn indices(&self, available: u32) -> Range<u32> {
        let end = self.end.unwrap_or(available).min(available);
        let start = self.start.saturating_sub(1).min(end);
        start..end
    }
}

impl Default for PageRange {
    fn default() -> Self {
        Self::ALL
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}-{}", self.start, end),
            None => write!(f, "{}-end", self.start),
        }
    }
}

/// Parameters for one compression call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionRequest {
    quality: u8,
    dpi: u32,
    max_pages_for_lossy: u32,
}

impl CompressionRequest {
    /// Build a validated request. The large-document guard is always
    /// [`MAX_PAGES_FOR_LOSSY`].
    pub fn new(quality: u8, dpi: u32) -> Result<Self> {
        if !QUALITY_RANGE.contains(&quality) {
            return Err(PdfwerkError::InvalidRequest(format!(
                "quality must be between 1 and 100, got {quality}"
            )));
        }
        if !DPI_RANGE.contains(&dpi) {
            return Err(PdfwerkError::InvalidRequest(format!(
                "DPI must be between 72 and 300, got {dpi}"
            )));
        }
        Ok(Self {
            quality,
            dpi,
            max_pages_for_lossy: MAX_PAGES_FOR_LOSSY,
        })
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    pub fn max_pages_for_lossy(&self) -> u32 {
        self.max_pages_for_lossy
    }
}

impl Default for CompressionRequest {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            dpi: DEFAULT_DPI,
            max_pages_for_lossy: MAX_PAGES_FOR_LOSSY,
        }
    }
}

/// Result of compressing one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionOutcome {
    pub output_path: PathBuf,
    pub input_bytes: u64,
    pub output_bytes: u64,
    /// Whether the rasterise-and-recompress pass produced the final output.
    pub used_lossy: bool,
    /// Set when the lossy pass was needed but skipped by the page-count guard.
    pub skipped_lossy_reason: Option<String>,
}

impl CompressionOutcome {
    /// Bytes saved relative to the input (zero if the output grew).
    pub fn saved_bytes(&self) -> u64 {
        self.input_bytes.saturating_sub(self.output_bytes)
    }

    /// Output size as a fraction of the input size.
    pub fn ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            return 1.0;
        }
        self.output_bytes as f64 / self.input_bytes as f64
    }
}

/// Cheap facts about a document gathered without decoding its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub path: PathBuf,
    /// `None` when probing failed; callers proceed without a ceiling check.
    pub page_count: Option<u32>,
    pub byte_size: u64,
}

/// One input of a batch and what became of it.
#[derive(Debug)]
pub struct BatchEntry<T> {
    pub input: PathBuf,
    pub result: Result<T>,
}

/// Ordered per-item results of a batch. One entry per input, in input order.
#[derive(Debug)]
pub struct BatchResult<T> {
    entries: Vec<BatchEntry<T>>,
}

impl<T> BatchResult<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, input: PathBuf, result: Result<T>) {
        self.entries.push(BatchEntry { input, result });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BatchEntry<T>> {
        self.entries.iter()
    }

    /// Successful outcomes, in input order.
    pub fn succeeded(&self) -> impl Iterator<Item = (&Path, &T)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.result.as_ref().ok().map(|ok| (entry.input.as_path(), ok)))
    }

    /// Failures, in input order.
    pub fn failed(&self) -> impl Iterator<Item = (&Path, &PdfwerkError)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.result.as_ref().err().map(|err| (entry.input.as_path(), err)))
    }

    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a BatchResult<T> {
    type Item = &'a BatchEntry<T>;
    type IntoIter = std::slice::Iter<'a, BatchEntry<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Fixed suffixes appended to an input's stem to name derived outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputSuffix {
    Compressed,
    BatchCompressed,
    Tables,
    Extracted,
}

impl OutputSuffix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compressed => "_compressed",
            Self::BatchCompressed => "_batch_compressed",
            Self::Tables => "_tables",
            Self::Extracted => "_extracted",
        }
    }
}

/// Derive `<dir>/<stem><suffix><ext>` from an input path.
///
/// `extension` overrides the input's own extension (given without the dot).
/// Deterministic: the same input always maps to the same output.
pub fn derive_output_path(input: &Path, suffix: OutputSuffix, extension: Option<&str>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let ext = extension
        .map(str::to_string)
        .or_else(|| input.extension().map(|e| e.to_string_lossy().into_owned()));

    let mut name = format!("{stem}{}", suffix.as_str());
    if let Some(ext) = ext {
        name.push('.');
        name.push_str(&ext);
    }
    input.with_file_name(name)
}
