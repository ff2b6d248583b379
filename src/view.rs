//! Terminal status reporting.
//!
//! Progress goes to stderr as a single spinner line, keeping stdout clean
//! for the report text so runs can be piped.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// One-line activity indicator for a research run.
#[derive(Debug)]
pub struct StatusLine {
    spinner: ProgressBar,
}

impl StatusLine {
    /// A spinner rendered on stderr.
    pub fn new() -> Self {
        Self::build(false)
    }

    /// A spinner that renders nowhere. For tests and `--quiet` output.
    pub fn hidden() -> Self {
        Self::build(true)
    }

    fn build(hidden: bool) -> Self {
        let spinner = ProgressBar::new_spinner();
        if hidden {
            spinner.set_draw_target(ProgressDrawTarget::hidden());
        }
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("valid template"),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));

        Self { spinner }
    }

    /// Replace the status message.
    pub fn update(&self, message: impl Into<String>) {
        self.spinner.set_message(message.into());
    }

    /// Show the latest reasoning summary, condensed to fit the line.
    pub fn thought(&self, text: &str) {
        self.spinner.set_message(condense(text));
    }

    /// Print a line above the spinner without disturbing it.
    pub fn println(&self, line: impl AsRef<str>) {
        self.spinner.println(line);
    }

    /// Stop the spinner and erase the line.
    pub fn done(&self) {
        self.spinner.finish_and_clear();
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}

const MAX_STATUS_CHARS: usize = 80;

/// First line of `text`, capped at [`MAX_STATUS_CHARS`] characters.
fn condense(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or("").trim();
    if first_line.chars().count() <= MAX_STATUS_CHARS {
        return first_line.to_string();
    }
    let mut out: String = first_line.chars().take(MAX_STATUS_CHARS - 1).collect();
    out.push('…');
    out
}
