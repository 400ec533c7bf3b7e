// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// User-facing output. Results go to stdout, messages and errors to stderr.

use std::path::Path;

use pdfwerk_core::error::PdfwerkError;
use pdfwerk_core::human_errors::{HumanError, Severity, humanize_error, notice_for_outcome};
use pdfwerk_core::{BatchResult, CompressionOutcome, DocumentInfo};

/// Print an error in plain English. Cancellation prints nothing.
pub fn print_error(err: &PdfwerkError) {
    if let Some(human) = humanize_error(err) {
        print_message(&human);
        tracing::debug!(error = %err, "operation failed");
    }
}

pub fn print_message(human: &HumanError) {
    let label = match human.severity {
        Severity::Info => "note",
        Severity::ActionRequired | Severity::Permanent => "error",
    };
    eprintln!("{label}: {}", human.message);
    eprintln!("  {}", human.suggestion);
}

pub fn print_outcome(outcome: &CompressionOutcome) {
    println!("{}", describe_outcome(outcome));
    if let Some(notice) = notice_for_outcome(outcome) {
        print_message(&notice);
    }
}

pub fn print_info(info: &DocumentInfo) {
    let pages = info
        .page_count
        .map_or_else(|| "unknown".to_string(), |count| count.to_string());
    println!(
        "{}: {pages} pages, {}",
        info.path.display(),
        format_bytes(info.byte_size)
    );
}

/// One line per item, failures explained. Returns whether every item
/// succeeded.
pub fn print_batch<T>(batch: &BatchResult<T>, describe: impl Fn(&Path, &T) -> String) -> bool {
    for entry in batch.iter() {
        match &entry.result {
            Ok(value) => println!("{}", describe(&entry.input, value)),
            Err(err) => {
                let reason = humanize_error(err).map_or_else(|| err.to_string(), |h| h.message);
                eprintln!("failed: {}: {reason}", entry.input.display());
            }
        }
    }
    println!(
        "{} of {} succeeded",
        batch.success_count(),
        batch.len()
    );
    batch.failure_count() == 0
}

pub fn describe_outcome(outcome: &CompressionOutcome) -> String {
    let method = if outcome.used_lossy { "lossy" } else { "lossless" };
    format!(
        "{}: {} -> {} ({method}, {:.0}% of original)",
        outcome.output_path.display(),
        format_bytes(outcome.input_bytes),
        format_bytes(outcome.output_bytes),
        outcome.ratio() * 100.0
    )
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_are_humanised() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2 * 1024 * 1024), "2.0 MB");
        assert_eq!(format_bytes(1536), "1.5 KB");
    }

    #[test]
    fn outcome_line_names_method_and_ratio() {
        let outcome = CompressionOutcome {
            output_path: "scan_compressed.pdf".into(),
            input_bytes: 2 * 1024 * 1024,
            output_bytes: 512 * 1024,
            used_lossy: true,
            skipped_lossy_reason: None,
        };
        assert_eq!(
            describe_outcome(&outcome),
            "scan_compressed.pdf: 2.0 MB -> 512.0 KB (lossy, 25% of original)"
        );
    }

    #[test]
    fn batch_reports_partial_failure() {
        let mut batch = BatchResult::new();
        batch.push("a.pdf".into(), Ok(1u32));
        batch.push("b.pdf".into(), Err(PdfwerkError::PdfError("bad xref".into())));
        assert!(!print_batch(&batch, |path, pages| format!("{}: {pages}", path.display())));

        let mut clean = BatchResult::new();
        clean.push("a.pdf".into(), Ok(1u32));
        assert!(print_batch(&clean, |_, _| String::new()));
    }
}
