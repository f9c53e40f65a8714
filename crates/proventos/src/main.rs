//! `proventos` — export a portfolio's dividends table to a spreadsheet.

use anyhow::{Context, Result};
use clap::Parser;
use proventos::cli::console::Console;
use proventos::cli::output;
use proventos::config::{self, ExtractorConfig, OutputFormat};
use proventos::renderer::{ChromiumRenderer, Renderer, StaticRenderer};
use proventos::{Extractor, HeaderMatcher, RunOutcome};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "proventos", version, about)]
struct Cli {
    /// Dividends page to scrape
    #[arg(long, default_value = config::DEFAULT_PORTFOLIO_URL)]
    url: String,

    /// Spreadsheet to write (overwritten on every run)
    #[arg(short, long, default_value = config::DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Xlsx)]
    format: OutputFormat,

    /// Seconds to wait for the table after a login prompt
    #[arg(long, default_value_t = config::DEFAULT_LOGIN_TIMEOUT.as_secs())]
    login_timeout: u64,

    /// Seconds to let the page settle before reading tables
    #[arg(long, default_value_t = config::DEFAULT_SETTLE_DELAY.as_secs())]
    settle: u64,

    /// Seconds to keep the window open after a successful export
    #[arg(long, default_value_t = config::DEFAULT_LINGER_DELAY.as_secs())]
    linger: u64,

    /// Run the browser without a window
    #[arg(long)]
    headless: bool,

    /// Chromium or Chrome executable (searched for when omitted)
    #[arg(long, env = "PROVENTOS_CHROMIUM_PATH")]
    chromium: Option<PathBuf>,

    /// Read a saved HTML page instead of launching a browser
    #[arg(long, value_name = "FILE")]
    html: Option<PathBuf>,

    /// Header keyword identifying the asset column (repeatable)
    #[arg(long = "asset-header", value_name = "TEXT")]
    asset_headers: Vec<String>,

    /// Header keyword identifying the value column (repeatable)
    #[arg(long = "value-header", value_name = "TEXT")]
    value_headers: Vec<String>,

    /// Only print the output path
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn extractor_config(&self) -> ExtractorConfig {
        let format = if output::is_json() {
            OutputFormat::Json
        } else {
            self.format
        };
        let cfg = ExtractorConfig {
            url: self.url.clone(),
            output: self.output.clone(),
            format,
            login_timeout: Duration::from_secs(self.login_timeout),
            settle_delay: Duration::from_secs(self.settle),
            linger_delay: Duration::from_secs(self.linger),
            ..Default::default()
        };
        if self.html.is_some() {
            cfg.without_delays()
        } else {
            cfg
        }
    }

    fn matcher(&self) -> HeaderMatcher {
        let mut matcher = HeaderMatcher::default();
        if !self.asset_headers.is_empty() {
            matcher.asset_keywords = self.asset_headers.clone();
        }
        if !self.value_headers.is_empty() {
            matcher.value_keywords = self.value_headers.clone();
        }
        matcher
    }

    fn renderer(&self) -> Result<Box<dyn Renderer>> {
        if let Some(path) = &self.html {
            let renderer = StaticRenderer::from_file(path)
                .with_context(|| format!("reading {}", path.display()))?;
            return Ok(Box::new(renderer));
        }
        let renderer = ChromiumRenderer::discover(self.chromium.clone(), self.headless)?;
        Ok(Box::new(renderer))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("proventos=warn")),
        )
        .init();

    info!("proventos v{}", env!("CARGO_PKG_VERSION"));

    let cfg = cli.extractor_config();
    let renderer = cli.renderer()?;
    let mut console = Console::new(cli.quiet || output::is_quiet());

    let outcome = Extractor::new(&cfg)
        .with_matcher(cli.matcher())
        .run(renderer.as_ref(), &mut console)
        .await
        .context("extraction failed")?;

    if let RunOutcome::Printed { json, .. } = &outcome {
        output::print_json(json);
    }

    Ok(())
}
