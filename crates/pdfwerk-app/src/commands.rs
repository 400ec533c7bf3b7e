// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command dispatch. Every command resolves its inputs the same way: files
// from the command line first, a native dialog when none of them fit.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pdfwerk_core::error::{PdfwerkError, Result};
use pdfwerk_core::{AppConfig, CompressionRequest, Operation};
use pdfwerk_document::IntakeContext;
use tracing::{info, warn};

use crate::cli::{Command, ConfigAction, Tuning};
use crate::prompt::DialoguerPrompt;
use crate::report;
use crate::services::app_services::AppServices;
use crate::services::picker::Picker;

/// Run one command to completion.
pub fn run(command: Command, services: &mut AppServices, picker: Picker) -> Result<ExitCode> {
    let toolkit = services.toolkit();
    let mut prompt = DialoguerPrompt;

    match command {
        Command::Inspect { inputs } => {
            let paths = resolve_inputs(inputs.files, Operation::Inspect, picker)?;
            for path in &paths {
                report::print_info(&toolkit.inspect(path));
            }
        }

        Command::Compress { inputs, tuning } => {
            let path = single(resolve_inputs(inputs.files, Operation::CompressPdf, picker)?)?;
            let request = request_for(services.config(), &tuning)?;
            report::print_outcome(&toolkit.compress_pdf(&path, &request)?);
        }

        Command::BatchCompress { inputs, tuning } => {
            let paths = resolve_inputs(inputs.files, Operation::BatchCompress, picker)?;
            let request = request_for(services.config(), &tuning)?;
            let batch = toolkit.batch_compress(&paths, &request);
            for (_, outcome) in batch.succeeded() {
                if let Some(notice) = pdfwerk_core::human_errors::notice_for_outcome(outcome) {
                    report::print_message(&notice);
                }
            }
            let clean = report::print_batch(&batch, |_, outcome| report::describe_outcome(outcome));
            return Ok(exit_code(clean));
        }

        Command::ExportImages { inputs, output_dir } => {
            let path = single(resolve_inputs(inputs.files, Operation::ExportImages, picker)?)?;
            let out_dir = match output_dir {
                Some(dir) => dir,
                None => picker.pick_folder("Select a folder for the page images")?,
            };
            let written = toolkit.export_images(&path, &out_dir, &mut prompt)?;
            println!("{} page images written to {}", written.len(), out_dir.display());
        }

        Command::ExportPages {
            inputs,
            pages,
            output,
        } => {
            let path = single(resolve_inputs(inputs.files, Operation::ExportPages, picker)?)?;
            let output = match output {
                Some(output) => output,
                None => picker.save_pdf(
                    "Save exported pages",
                    &path,
                    &suggested_name(&path, "_pages.pdf"),
                )?,
            };
            let exported = toolkit.export_pages(&path, &output, pages, &mut prompt)?;
            println!("{exported} pages written to {}", output.display());
        }

        Command::ExportDocument { inputs } => {
            let path = single(resolve_inputs(inputs.files, Operation::ExportDocument, picker)?)?;
            let output = toolkit.export_document(&path, &mut prompt)?;
            println!("Word document written to {}", output.display());
        }

        Command::ExtractText { inputs } => {
            let path = single(resolve_inputs(inputs.files, Operation::ExtractText, picker)?)?;
            let output = toolkit.extract_text(&path, &mut prompt)?;
            println!("Text written to {}", output.display());
        }

        Command::ExtractTables { inputs } => {
            let path = single(resolve_inputs(inputs.files, Operation::ExtractTables, picker)?)?;
            let (output, tables) = toolkit.extract_tables(&path, &mut prompt)?;
            println!("{tables} tables written to {}", output.display());
        }

        Command::Merge { inputs, output } => {
            let paths = resolve_inputs(inputs.files, Operation::MergePdfs, picker)?;
            let output = match output {
                Some(output) => output,
                None => picker.save_pdf("Save merged PDF", &paths[0], "merged.pdf")?,
            };
            let pages = toolkit.merge_pdfs(&paths, &output)?;
            println!("{} PDFs merged into {} ({pages} pages)", paths.len(), output.display());
        }

        Command::CompressImages { inputs } => {
            let paths = resolve_inputs(inputs.files, Operation::CompressImages, picker)?;
            let batch = toolkit.compress_images(&paths);
            let clean = report::print_batch(&batch, |input, output| {
                format!("{} -> {}", input.display(), output.display())
            });
            return Ok(exit_code(clean));
        }

        Command::ImagesToPdf { inputs, output } => {
            let paths = resolve_inputs(inputs.files, Operation::ImagesToPdf, picker)?;
            let output = match output {
                Some(output) => output,
                None => picker.save_pdf("Save PDF", &paths[0], "images.pdf")?,
            };
            let batch = toolkit.images_to_pdf(&paths, &output)?;
            let clean = report::print_batch(&batch, |input, page| {
                format!("{} -> page {page}", input.display())
            });
            println!("PDF written to {}", output.display());
            return Ok(exit_code(clean));
        }

        Command::ExcelToPdf { inputs } => {
            let path = single(resolve_inputs(inputs.files, Operation::ExcelToPdf, picker)?)?;
            let (output, pages) = toolkit.excel_to_pdf(&path)?;
            println!("PDF written to {} ({pages} pages)", output.display());
        }

        Command::Config { action } => match action {
            ConfigAction::Show => {
                eprintln!("{}", services.config_path().display());
                println!("{}", serde_json::to_string_pretty(services.config())?);
            }
            ConfigAction::Set { key, value } => services.set_config_value(&key, &value)?,
            ConfigAction::Reset => {
                services.reset_config()?;
                info!("settings reset to defaults");
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

/// Classify the command-line files for `operation`, falling back to a
/// dialog when none qualify.
fn resolve_inputs(files: Vec<PathBuf>, operation: Operation, picker: Picker) -> Result<Vec<PathBuf>> {
    let mut intake = IntakeContext::with_dropped(files);
    let offered = !intake.is_empty();
    match intake.take_for(operation) {
        Some(paths) => Ok(paths),
        None => {
            if offered {
                warn!(?operation, "none of the given files can be used");
            }
            picker.pick_inputs(operation)
        }
    }
}

fn single(paths: Vec<PathBuf>) -> Result<PathBuf> {
    paths
        .into_iter()
        .next()
        .ok_or_else(|| PdfwerkError::NoInput("no file selected".into()))
}

/// The configured compression request with this run's overrides applied.
fn request_for(config: &AppConfig, tuning: &Tuning) -> Result<CompressionRequest> {
    AppConfig {
        quality: tuning.quality.unwrap_or(config.quality),
        dpi: tuning.dpi.unwrap_or(config.dpi),
        ..config.clone()
    }
    .compression_request()
}

fn suggested_name(input: &Path, suffix: &str) -> String {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".into());
    format!("{stem}{suffix}")
}

fn exit_code(clean: bool) -> ExitCode {
    if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
