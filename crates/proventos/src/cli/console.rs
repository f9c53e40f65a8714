//! Human-readable progress lines for an extraction run.

use crate::cli::output::Styled;
use crate::gate::GateOutcome;
use crate::pipeline::{RunObserver, RunOutcome};
use crate::table::DividendTable;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Prints run progress to stderr and the final path to stdout.
pub struct Console {
    s: Styled,
    quiet: bool,
    spinner: Option<ProgressBar>,
}

impl Console {
    pub fn new(quiet: bool) -> Self {
        Self {
            s: Styled::new(),
            quiet,
            spinner: None,
        }
    }

    fn line(&self, symbol: &str, msg: &str) {
        if !self.quiet {
            eprintln!("  {symbol} {msg}");
        }
    }
}

/// Spinner shown while the user logs in through the browser window.
fn login_spinner(timeout_secs: u64) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg} {elapsed}") {
        bar.set_style(style.tick_chars("\u{25b8}\u{25b9}\u{25b8}\u{25b9}\u{25b8}"));
    }
    bar.set_message(format!("Waiting up to {timeout_secs}s for the dividends table..."));
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

impl RunObserver for Console {
    fn navigating(&mut self, url: &str) {
        self.line(self.s.info_sym(), &format!("Navigating to {}", self.s.bold(url)));
    }

    fn login_required(&mut self, timeout_secs: u64) {
        if self.quiet {
            return;
        }
        eprintln!();
        eprintln!("  {} {}", self.s.warn_sym(), self.s.yellow("Login appears to be required."));
        eprintln!("    Sign in through the browser window that just opened.");
        self.spinner = Some(login_spinner(timeout_secs));
    }

    fn login_resolved(&mut self, outcome: GateOutcome) {
        if let Some(bar) = self.spinner.take() {
            bar.finish_and_clear();
        }
        if outcome == GateOutcome::TimedOut {
            self.line(
                self.s.fail_sym(),
                "Timed out waiting for login or for the table to load.",
            );
        }
    }

    fn table_found(&mut self, index: usize, table: &DividendTable) {
        self.line(
            self.s.ok_sym(),
            &format!(
                "Table detected (#{index}, {} columns, {} rows). Extracting...",
                table.headers.len(),
                table.len()
            ),
        );
    }

    fn table_not_found(&mut self) {
        self.line(self.s.fail_sym(), "Could not find the dividends table.");
    }

    fn saving(&mut self, path: &Path) {
        self.line(self.s.info_sym(), &format!("Saving to {}...", path.display()));
    }

    fn finished(&mut self, outcome: &RunOutcome) {
        if let RunOutcome::Exported { path, rows } = outcome {
            if !self.quiet {
                eprintln!();
                eprintln!(
                    "  {} {}",
                    self.s.ok_sym(),
                    self.s.green(&format!("Done. {rows} rows written."))
                );
            }
            println!("{}", path.display());
        }
    }
}
