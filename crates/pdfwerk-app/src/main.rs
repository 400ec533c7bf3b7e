// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdfwerk — desktop PDF toolkit
//
// Entry point. Initialises logging, loads settings, and runs one command.

mod cli;
mod commands;
mod prompt;
mod report;
mod services;

use std::process::ExitCode;

use clap::Parser;
use pdfwerk_core::ErrorKind;

use cli::Cli;
use services::app_services::AppServices;
use services::picker::Picker;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("pdfwerk starting");

    let mut services = AppServices::init();
    match commands::run(cli.command, &mut services, Picker::new(!cli.no_dialogs)) {
        Ok(code) => code,
        Err(err) if err.is_cancelled() => {
            tracing::info!("operation cancelled");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report::print_error(&err);
            match err.kind() {
                ErrorKind::InvalidInput => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}
