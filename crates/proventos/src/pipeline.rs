//! One extraction run: navigate, pass the login gate, locate, export.
//!
//! The browser context is acquired once and closed on every way out of the
//! run, including errors.

use crate::config::{ExtractorConfig, OutputFormat};
use crate::error::Result;
use crate::export::{self, Exporter};
use crate::gate::{self, GateOutcome};
use crate::locator::{self, HeaderMatcher};
use crate::renderer::{RenderContext, Renderer};
use crate::table::DividendTable;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// How a run ended. Every variant is a normal completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The spreadsheet was written.
    Exported { path: PathBuf, rows: usize },
    /// The records were rendered as JSON instead of written to disk.
    Printed { json: serde_json::Value, rows: usize },
    /// A login prompt was shown and no table appeared in time.
    LoginTimedOut,
    /// No table on the page had the expected headers.
    TableNotFound,
}

/// Progress notifications for whoever is watching the run.
///
/// All methods default to doing nothing.
pub trait RunObserver {
    fn navigating(&mut self, _url: &str) {}
    fn login_required(&mut self, _timeout_secs: u64) {}
    fn login_resolved(&mut self, _outcome: GateOutcome) {}
    fn table_found(&mut self, _index: usize, _table: &DividendTable) {}
    fn table_not_found(&mut self) {}
    fn saving(&mut self, _path: &Path) {}
    fn finished(&mut self, _outcome: &RunOutcome) {}
}

/// Observer that ignores everything.
pub struct Silent;

impl RunObserver for Silent {}

/// Drives a run against a renderer.
pub struct Extractor<'a> {
    config: &'a ExtractorConfig,
    matcher: HeaderMatcher,
    exporter: Box<dyn Exporter + 'a>,
}

impl<'a> Extractor<'a> {
    pub fn new(config: &'a ExtractorConfig) -> Self {
        Self {
            config,
            matcher: HeaderMatcher::default(),
            exporter: Box::new(export::XlsxExporter),
        }
    }

    pub fn with_matcher(mut self, matcher: HeaderMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_exporter(mut self, exporter: impl Exporter + 'a) -> Self {
        self.exporter = Box::new(exporter);
        self
    }

    /// Run once. The context is closed whatever happens inside.
    pub async fn run(
        &self,
        renderer: &dyn Renderer,
        observer: &mut dyn RunObserver,
    ) -> Result<RunOutcome> {
        self.config.validate()?;

        let mut context = renderer.new_context().await?;
        let result = self.drive(context.as_mut(), observer).await;

        if let Ok(outcome) = &result {
            observer.finished(outcome);
            // Linger only after a successful export so the user sees the final page.
            if matches!(outcome, RunOutcome::Exported { .. }) && !self.config.linger_delay.is_zero() {
                tokio::time::sleep(self.config.linger_delay).await;
            }
        }

        let closed = context.close().await;
        let outcome = result?;
        if let Err(e) = closed {
            warn!("failed to close {} context: {e}", renderer.name());
        }
        Ok(outcome)
    }

    async fn drive(
        &self,
        context: &mut dyn RenderContext,
        observer: &mut dyn RunObserver,
    ) -> Result<RunOutcome> {
        let cfg = self.config;

        observer.navigating(&cfg.url);
        info!("navigating to {}", cfg.url);
        let nav = context.navigate(&cfg.url, cfg.navigation_timeout_ms).await?;
        info!("loaded {} in {}ms", nav.final_url, nav.load_time_ms);

        if gate::login_required(context).await? {
            warn!("login prompt detected");
            observer.login_required(cfg.login_timeout.as_secs());
            let resolved = gate::wait_for_login(context, cfg.login_timeout).await?;
            observer.login_resolved(resolved);
            if resolved == GateOutcome::TimedOut {
                return Ok(RunOutcome::LoginTimedOut);
            }
        }

        if !cfg.settle_delay.is_zero() {
            tokio::time::sleep(cfg.settle_delay).await;
        }

        let Some(found) = locator::locate(context, &self.matcher).await? else {
            warn!("no table with the expected headers");
            observer.table_not_found();
            return Ok(RunOutcome::TableNotFound);
        };
        observer.table_found(found.index, &found.table);

        let ragged = found.table.ragged_rows();
        if ragged > 0 {
            warn!("{ragged} rows differ in width from the header row");
        }

        let rows = found.table.len();
        match cfg.format {
            OutputFormat::Json => Ok(RunOutcome::Printed {
                json: export::to_json(&found.table),
                rows,
            }),
            OutputFormat::Xlsx => {
                observer.saving(&cfg.output);
                self.exporter.export(&found.table, &cfg.output)?;
                let path = std::path::absolute(&cfg.output)?;
                Ok(RunOutcome::Exported { path, rows })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::renderer::StaticRenderer;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl RunObserver for Recorder {
        fn navigating(&mut self, _url: &str) {
            self.events.push("navigating".into());
        }
        fn login_required(&mut self, secs: u64) {
            self.events.push(format!("login_required:{secs}"));
        }
        fn login_resolved(&mut self, outcome: GateOutcome) {
            self.events.push(format!("login_resolved:{outcome:?}"));
        }
        fn table_found(&mut self, index: usize, _table: &DividendTable) {
            self.events.push(format!("table_found:{index}"));
        }
        fn table_not_found(&mut self) {
            self.events.push("table_not_found".into());
        }
        fn saving(&mut self, _path: &Path) {
            self.events.push("saving".into());
        }
    }

    fn config(dir: &Path, format: OutputFormat) -> ExtractorConfig {
        ExtractorConfig {
            output: dir.join("proventos.xlsx"),
            format,
            login_timeout: Duration::from_millis(20),
            ..Default::default()
        }
        .without_delays()
    }

    const DIVIDENDS: &str = r#"<table>
        <thead><tr><th>Ticker</th><th>Valor</th></tr></thead>
        <tbody><tr><td>PETR4</td><td>10.50</td></tr><tr><td>VALE3</td><td>5.00</td></tr></tbody>
    </table>"#;

    #[tokio::test]
    async fn test_json_format_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), OutputFormat::Json);
        let renderer = StaticRenderer::new(DIVIDENDS);
        let mut rec = Recorder::default();

        let outcome = Extractor::new(&cfg).run(&renderer, &mut rec).await.unwrap();
        match outcome {
            RunOutcome::Printed { json, rows } => {
                assert_eq!(rows, 2);
                assert_eq!(json["rows"][1]["Ticker"], "VALE3");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(!cfg.output.exists());
        assert_eq!(renderer.closed_contexts(), 1);
        assert_eq!(rec.events, vec!["navigating", "table_found:0"]);
    }

    #[tokio::test]
    async fn test_login_then_table_proceeds() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), OutputFormat::Xlsx);
        let page = format!("<a>Entrar</a>{DIVIDENDS}");
        let renderer = StaticRenderer::new(page);
        let mut rec = Recorder::default();

        let outcome = Extractor::new(&cfg).run(&renderer, &mut rec).await.unwrap();
        assert!(matches!(outcome, RunOutcome::Exported { rows: 2, .. }));
        assert_eq!(
            rec.events,
            vec![
                "navigating",
                "login_required:0",
                "login_resolved:Passed",
                "table_found:0",
                "saving"
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_launch() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ExtractorConfig {
            url: "::nope::".into(),
            ..config(dir.path(), OutputFormat::Xlsx)
        };
        let renderer = StaticRenderer::new(DIVIDENDS);
        let err = Extractor::new(&cfg)
            .run(&renderer, &mut Silent)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidUrl { .. }));
        assert_eq!(renderer.closed_contexts(), 0);
    }

    #[tokio::test]
    async fn test_export_error_still_closes_context() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ExtractorConfig {
            output: dir.path().join("missing").join("out.xlsx"),
            ..config(dir.path(), OutputFormat::Xlsx)
        };
        let renderer = StaticRenderer::new(DIVIDENDS);
        let err = Extractor::new(&cfg)
            .run(&renderer, &mut Silent)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Export { .. }));
        assert_eq!(renderer.closed_contexts(), 1);
    }

    struct Capture(std::sync::Mutex<Option<DividendTable>>);

    impl Exporter for &Capture {
        fn export(&self, table: &DividendTable, _path: &Path) -> Result<()> {
            *self.0.lock().unwrap() = Some(table.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_custom_exporter_receives_rows_unmodified() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), OutputFormat::Xlsx);
        let page = r#"<table>
            <thead><tr><th>Ativo</th><th>Data</th><th>Valor</th></tr></thead>
            <tbody><tr><td>ITSA4</td><td>0,02</td></tr><tr></tr></tbody>
        </table>"#;
        let renderer = StaticRenderer::new(page);
        let capture = Capture(std::sync::Mutex::new(None));

        let outcome = Extractor::new(&cfg)
            .with_exporter(&capture)
            .run(&renderer, &mut Silent)
            .await
            .unwrap();
        assert!(matches!(outcome, RunOutcome::Exported { rows: 1, .. }));

        let table = capture.0.lock().unwrap().clone().unwrap();
        assert_eq!(table.headers, vec!["Ativo", "Data", "Valor"]);
        assert_eq!(table.rows, vec![vec!["ITSA4", "0,02"]]);
    }
}
