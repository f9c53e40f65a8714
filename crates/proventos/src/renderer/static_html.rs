//! Renderer over a fixed HTML document.
//!
//! Serves a page saved from the browser (or a test fixture) through the same
//! `RenderContext` surface the live browser uses. The document never changes,
//! so every element that is present counts as visible and waits resolve
//! immediately.

use super::{NavigationResult, RenderContext, Renderer};
use crate::error::{ExtractError, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Hands out contexts over one HTML document.
pub struct StaticRenderer {
    html: Arc<str>,
    closed: Arc<AtomicUsize>,
}

impl StaticRenderer {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: Arc::from(html.into()),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Load the document from a saved page.
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }

    /// Number of contexts that have been closed so far.
    pub fn closed_contexts(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renderer for StaticRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        Ok(Box::new(StaticContext {
            html: Arc::clone(&self.html),
            closed: Arc::clone(&self.closed),
        }))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// A context over the shared document. Parsing happens per query, so no
/// parsed tree is held across an await.
pub struct StaticContext {
    html: Arc<str>,
    closed: Arc<AtomicUsize>,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ExtractError::Query(format!("bad selector '{css}': {e}")))
}

/// Text of an element as `innerText` would lay it out on one line: inline
/// markup adds nothing between text nodes, ASCII whitespace runs collapse to
/// a single space and non-breaking spaces are kept.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_ascii_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Elements whose text never renders.
fn is_hidden_text(el: &ElementRef<'_>) -> bool {
    matches!(el.value().name(), "script" | "style" | "noscript" | "template")
}

impl StaticContext {
    fn with_table<T>(&self, index: usize, f: impl FnOnce(ElementRef<'_>) -> Result<T>) -> Result<T> {
        let doc = Html::parse_document(&self.html);
        let tables = selector("table")?;
        let table = doc
            .select(&tables)
            .nth(index)
            .ok_or_else(|| ExtractError::Query(format!("no table at index {index}")))?;
        f(table)
    }

    fn count(&self, css: &str) -> Result<usize> {
        let doc = Html::parse_document(&self.html);
        let sel = selector(css)?;
        let n = doc.select(&sel).count();
        Ok(n)
    }

    fn exact_text(&self, text: &str) -> Result<bool> {
        let doc = Html::parse_document(&self.html);
        let sel = selector("body *")?;
        let found = doc
            .select(&sel)
            .filter(|el| !is_hidden_text(el))
            .any(|el| element_text(el) == text.trim());
        Ok(found)
    }
}

#[async_trait]
impl RenderContext for StaticContext {
    async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<NavigationResult> {
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 0,
        })
    }

    async fn has_element(&self, selector: &str) -> Result<bool> {
        Ok(self.count(selector)? > 0)
    }

    async fn has_exact_text(&self, text: &str) -> Result<bool> {
        self.exact_text(text)
    }

    async fn wait_for_visible(&self, selector: &str, _timeout: Duration) -> Result<bool> {
        Ok(self.count(selector)? > 0)
    }

    async fn snapshot_tables(&mut self) -> Result<usize> {
        self.count("table")
    }

    async fn table_headers(&self, index: usize) -> Result<Vec<String>> {
        let th = selector("thead th")?;
        self.with_table(index, |table| Ok(table.select(&th).map(element_text).collect()))
    }

    async fn table_rows(&self, index: usize) -> Result<Vec<Vec<String>>> {
        let tr = selector("tbody tr")?;
        let td = selector("td")?;
        self.with_table(index, |table| {
            Ok(table
                .select(&tr)
                .map(|row| row.select(&td).map(element_text).collect())
                .collect())
        })
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <nav><a href="/login">Entrar</a></nav>
          <table id="summary">
            <thead><tr><th>Mês</th><th>Total</th></tr></thead>
            <tbody><tr><td>Jan</td><td>R$ 12,00</td></tr></tbody>
          </table>
          <table id="dividends">
            <thead><tr><th> Ticker </th><th>Valor
              pago</th></tr></thead>
            <tbody>
              <tr><td>PETR4</td><td>10.50</td></tr>
              <tr></tr>
              <tr><td>VALE3</td><td>5.00</td></tr>
            </tbody>
          </table>
        </body></html>
    "#;

    #[tokio::test]
    async fn test_reads_headers_and_rows() {
        let renderer = StaticRenderer::new(PAGE);
        let mut ctx = renderer.new_context().await.unwrap();
        ctx.navigate("file:///page.html", 1_000).await.unwrap();

        assert_eq!(ctx.snapshot_tables().await.unwrap(), 2);
        assert_eq!(
            ctx.table_headers(1).await.unwrap(),
            vec!["Ticker".to_string(), "Valor pago".to_string()]
        );
        let rows = ctx.table_rows(1).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[1].is_empty());
        assert_eq!(rows[2], vec!["VALE3".to_string(), "5.00".to_string()]);
    }

    #[tokio::test]
    async fn test_presence_queries() {
        let renderer = StaticRenderer::new(PAGE);
        let ctx = renderer.new_context().await.unwrap();
        assert!(ctx.has_exact_text("Entrar").await.unwrap());
        assert!(!ctx.has_exact_text("Entrar agora").await.unwrap());
        assert!(!ctx.has_element("form.login-form").await.unwrap());
        assert!(ctx
            .wait_for_visible("table", Duration::from_millis(10))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_inline_markup_does_not_split_text() {
        let renderer = StaticRenderer::new(
            r#"<table>
                <thead><tr><th>Tick<b>er</b></th><th><span>Valor</span> (R$)</th></tr></thead>
                <tbody><tr><td><b>PETR</b>4</td><td><span>R$</span>10,50</td></tr></tbody>
            </table>"#,
        );
        let ctx = renderer.new_context().await.unwrap();
        assert_eq!(
            ctx.table_headers(0).await.unwrap(),
            vec!["Ticker".to_string(), "Valor (R$)".to_string()]
        );
        assert_eq!(
            ctx.table_rows(0).await.unwrap(),
            vec![vec!["PETR4".to_string(), "R$10,50".to_string()]]
        );
    }

    #[tokio::test]
    async fn test_non_breaking_space_is_kept() {
        let renderer = StaticRenderer::new(
            r#"<table>
                <thead><tr><th>Ativo</th><th>Valor&nbsp;pago</th></tr></thead>
                <tbody><tr><td>ITSA4</td><td>R$&nbsp;0,02</td></tr></tbody>
            </table>"#,
        );
        let ctx = renderer.new_context().await.unwrap();
        assert_eq!(ctx.table_headers(0).await.unwrap()[1], "Valor\u{a0}pago");
        assert_eq!(ctx.table_rows(0).await.unwrap()[0][1], "R$\u{a0}0,02");
    }

    #[tokio::test]
    async fn test_script_text_is_not_a_login_prompt() {
        let renderer = StaticRenderer::new(
            "<html><body><script>Entrar</script><p>Bem-vindo</p></body></html>",
        );
        let ctx = renderer.new_context().await.unwrap();
        assert!(!ctx.has_exact_text("Entrar").await.unwrap());
        assert!(ctx.has_exact_text("Bem-vindo").await.unwrap());
    }

    #[tokio::test]
    async fn test_out_of_range_table_is_an_error() {
        let renderer = StaticRenderer::new("<html><body></body></html>");
        let ctx = renderer.new_context().await.unwrap();
        assert!(matches!(
            ctx.table_headers(0).await,
            Err(ExtractError::Query(_))
        ));
    }

    #[tokio::test]
    async fn test_close_is_counted() {
        let renderer = StaticRenderer::new(PAGE);
        let ctx = renderer.new_context().await.unwrap();
        ctx.close().await.unwrap();
        assert_eq!(renderer.closed_contexts(), 1);
    }
}
