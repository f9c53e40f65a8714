//! Run configuration.
//!
//! Every knob defaults to the value the extractor has always used, so a run
//! with `ExtractorConfig::default()` behaves like the plain `proventos` command.

use crate::error::{ExtractError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Dividends page of the tracked portfolio.
pub const DEFAULT_PORTFOLIO_URL: &str = "https://investidor10.com.br/carteiras/proventos/541619/";

/// Spreadsheet written on success, relative to the working directory.
pub const DEFAULT_OUTPUT_FILE: &str = "dividendos_carteira.xlsx";

/// How long to wait for a table after a login prompt was detected.
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

/// Pause after the login gate so client-side rendering can finish.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Pause before closing the window after a successful export.
pub const DEFAULT_LINGER_DELAY: Duration = Duration::from_secs(5);

/// Navigation timeout handed to the renderer.
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 60_000;

/// Where the extracted records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Single-sheet `.xlsx` workbook at the output path.
    #[default]
    Xlsx,
    /// Pretty-printed JSON on stdout; nothing is written to disk.
    Json,
}

/// Configuration for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub url: String,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub navigation_timeout_ms: u64,
    pub login_timeout: Duration,
    pub settle_delay: Duration,
    pub linger_delay: Duration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PORTFOLIO_URL.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            format: OutputFormat::Xlsx,
            navigation_timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            linger_delay: DEFAULT_LINGER_DELAY,
        }
    }
}

impl ExtractorConfig {
    /// Check the URL before anything is launched.
    pub fn validate(&self) -> Result<url::Url> {
        url::Url::parse(&self.url).map_err(|source| ExtractError::InvalidUrl {
            url: self.url.clone(),
            source,
        })
    }

    /// Zero out the fixed sleeps. Used for offline runs against saved pages.
    pub fn without_delays(mut self) -> Self {
        self.settle_delay = Duration::ZERO;
        self.linger_delay = Duration::ZERO;
        self
    }
}
