// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Terminal page prompts for long documents.

use dialoguer::Input;
use pdfwerk_document::PromptProvider;
use tracing::debug;

/// Asks for page numbers on the terminal. An empty answer cancels, and so
/// does a terminal that cannot be prompted.
#[derive(Debug, Default)]
pub struct DialoguerPrompt;

impl PromptProvider for DialoguerPrompt {
    fn ask_page(&mut self, title: &str, message: &str, min: u32, max: u32) -> Option<u32> {
        let (context, question) = message.rsplit_once('\n').unwrap_or(("", message));
        eprintln!("{title}");
        if !context.trim().is_empty() {
            eprintln!("{}", context.trim_end());
        }

        let answer = Input::<String>::new()
            .with_prompt(format!("{question} [{min}-{max}, empty to cancel]"))
            .allow_empty(true)
            .validate_with(move |input: &String| validate_page(input, min, max))
            .interact_text();

        match answer {
            Ok(text) => parse_answer(&text),
            Err(err) => {
                debug!(%err, "page prompt unavailable");
                None
            }
        }
    }
}

fn validate_page(input: &str, min: u32, max: u32) -> Result<(), String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(());
    }
    match input.parse::<u32>() {
        Ok(page) if (min..=max).contains(&page) => Ok(()),
        Ok(_) => Err(format!("Enter a page between {min} and {max}.")),
        Err(_) => Err("Enter a whole page number.".into()),
    }
}

fn parse_answer(text: &str) -> Option<u32> {
    text.trim().parse().ok()
}
