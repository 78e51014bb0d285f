// UI layer: terminal progress reporting with `indicatif` and the one
// interactive prompt (the API key) with `dialoguer`. Nothing here talks to
// the network; the scraper owns the flow and calls into these helpers.

use anyhow::Result;
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;

/// Bar for the search phase: counts video ids found against the target.
pub fn search_bar(target: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(target);
    let style = ProgressStyle::with_template("{spinner} Found {pos}/{len} videos... {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// Bar for the detail phase: processed videos with a percentage.
pub fn detail_bar(total: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template(
        "Progress: [{bar:30}] {pos}/{len} videos processed ({percent}%) {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=> ");
    pb.set_style(style);
    pb
}

/// Spinner shown while a single blocking call is in flight.
pub fn spinner(message: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

/// Ask for the API key without echoing it. Returns `None` when stdin is
/// not a terminal, since there is nobody to ask.
pub fn prompt_api_key() -> Result<Option<String>> {
    if !std::io::stdin().is_terminal() {
        return Ok(None);
    }
    // `Password` hides input in terminal.
    let key: String = Password::new()
        .with_prompt("Data API key")
        .allow_empty_password(true)
        .interact()?;
    Ok(Some(key))
}
