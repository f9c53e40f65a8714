//! Scrape the dividends table of an investment-portfolio page into a
//! spreadsheet.
//!
//! A run opens a browser page on the portfolio, waits for the user to log in
//! if the site asks for it, picks the first table whose headers name an asset
//! column ("Ativo"/"Ticker") and a value column ("Valor") and writes the raw
//! cell text to a single-sheet workbook.

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod gate;
pub mod locator;
pub mod pipeline;
pub mod renderer;
pub mod table;

pub use config::{ExtractorConfig, OutputFormat};
pub use error::{ExtractError, Result};
pub use locator::HeaderMatcher;
pub use pipeline::{Extractor, RunObserver, RunOutcome};
pub use table::DividendTable;
