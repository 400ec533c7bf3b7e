// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pdfwerk_core::PageRange;

#[derive(Debug, Parser)]
#[command(name = "pdfwerk")]
#[command(version)]
#[command(about = "Compress, split, merge, extract and convert PDFs, images and spreadsheets", long_about = None)]
pub struct Cli {
    /// Never open file dialogs; fail when an input or output is missing
    #[arg(long, global = true)]
    pub no_dialogs: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Files named on the command line. Files of the wrong type are ignored.
#[derive(Debug, Args)]
pub struct Inputs {
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

/// One-run overrides for the configured compression settings.
#[derive(Debug, Args)]
pub struct Tuning {
    /// JPEG quality for the lossy pass (1-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Rendering DPI for the lossy pass (72-300)
    #[arg(long, value_parser = clap::value_parser!(u32).range(72..=300))]
    pub dpi: Option<u32>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show page count and size of PDFs
    Inspect {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// Compress a PDF to <name>_compressed.pdf
    Compress {
        #[command(flatten)]
        inputs: Inputs,
        #[command(flatten)]
        tuning: Tuning,
    },

    /// Compress several PDFs, each to <name>_batch_compressed.pdf
    BatchCompress {
        #[command(flatten)]
        inputs: Inputs,
        #[command(flatten)]
        tuning: Tuning,
    },

    /// Render PDF pages as PNG images
    ExportImages {
        #[command(flatten)]
        inputs: Inputs,

        /// Folder for page_<n>.png files
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Copy a range of pages into a new PDF
    ExportPages {
        #[command(flatten)]
        inputs: Inputs,

        /// Pages to copy, e.g. "3-10" or "7" (asked for long documents if omitted)
        #[arg(long, value_parser = parse_page_range)]
        pages: Option<PageRange>,

        /// Output PDF
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert PDF text to a Word document, <name>.docx
    ExportDocument {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// Extract text to <name>_extracted.txt
    ExtractText {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// Extract tables to <name>_tables.xlsx, a sheet per table
    ExtractTables {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// Merge PDFs in the order given
    Merge {
        #[command(flatten)]
        inputs: Inputs,

        /// Output PDF
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Re-encode images as <name>_compressed.jpg
    CompressImages {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// Combine images into one PDF, a page per image
    ImagesToPdf {
        #[command(flatten)]
        inputs: Inputs,

        /// Output PDF
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert every sheet of a workbook to <name>.pdf
    ExcelToPdf {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// Show or change the saved settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the current settings as JSON
    Show,
    /// Change one setting, e.g. `config set quality 60`
    Set { key: String, value: String },
    /// Restore the defaults
    Reset,
}

/// Parse "N" or "N-M" (1-based, inclusive). "N-" runs to the last page.
pub fn parse_page_range(text: &str) -> Result<PageRange, String> {
    let page = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|_| format!("`{}` is not a page number", part.trim()))
    };

    let (start, end) = match text.split_once('-') {
        Some((start, end)) if end.trim().is_empty() => (page(start)?, None),
        Some((start, end)) => (page(start)?, Some(page(end)?)),
        None => {
            let single = page(text)?;
            (single, Some(single))
        }
    };
    PageRange::new(start, end).map_err(|e| e.to_string())
}
