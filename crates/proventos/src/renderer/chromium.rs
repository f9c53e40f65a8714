//! Chromium renderer over the DevTools protocol.

use super::poll::poll_until;
use super::{NavigationResult, RenderContext, Renderer};
use crate::error::{ExtractError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::{Element, Page};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Interval between visibility checks while waiting on a selector.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launches a fresh Chromium process per context.
pub struct ChromiumRenderer {
    executable: PathBuf,
    headless: bool,
}

impl ChromiumRenderer {
    pub fn new(executable: PathBuf, headless: bool) -> Self {
        Self {
            executable,
            headless,
        }
    }

    /// Use an explicit executable if given, otherwise search for one.
    pub fn discover(explicit: Option<PathBuf>, headless: bool) -> Result<Self> {
        let executable = explicit
            .or_else(find_chromium)
            .ok_or(ExtractError::BrowserNotFound)?;
        Ok(Self::new(executable, headless))
    }

    pub fn executable(&self) -> &PathBuf {
        &self.executable
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let mut builder = BrowserConfig::builder()
            .chrome_executable(&self.executable)
            .viewport(None)
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-infobars");
        if !self.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(ExtractError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ExtractError::Launch(e.to_string()))?;
        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(ExtractError::Launch(e.to_string()));
            }
        };

        info!(
            "launched {} ({})",
            self.executable.display(),
            if self.headless { "headless" } else { "headed" }
        );

        Ok(Box::new(ChromiumContext {
            browser: Mutex::new(browser),
            handler_task,
            page,
            tables: Vec::new(),
        }))
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

/// One browser process with a single page.
pub struct ChromiumContext {
    browser: Mutex<Browser>,
    handler_task: JoinHandle<()>,
    page: Page,
    tables: Vec<Element>,
}

impl Drop for ChromiumContext {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

impl ChromiumContext {
    async fn eval_bool(&self, script: &str) -> Result<bool> {
        let value = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| ExtractError::Query(e.to_string()))?;
        Ok(value.into_value::<bool>().unwrap_or(false))
    }

    fn table(&self, index: usize) -> Result<&Element> {
        self.tables
            .get(index)
            .ok_or_else(|| ExtractError::Query(format!("no table at index {index}")))
    }
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let start = Instant::now();
        let nav_err = |reason: String| ExtractError::Navigation {
            url: url.to_string(),
            reason,
        };

        tokio::time::timeout(Duration::from_millis(timeout_ms), self.page.goto(url))
            .await
            .map_err(|_| nav_err(format!("timed out after {timeout_ms}ms")))?
            .map_err(|e| nav_err(e.to_string()))?;

        let final_url = self
            .page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());
        self.tables.clear();

        Ok(NavigationResult {
            final_url,
            load_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn has_element(&self, selector: &str) -> Result<bool> {
        let script = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector)?
        );
        self.eval_bool(&script).await
    }

    async fn has_exact_text(&self, text: &str) -> Result<bool> {
        let script = format!(
            r#"((text) => Array.from(document.querySelectorAll('body *'))
                .some(el => (el.innerText || '').replace(/[ \t\n\r\f]+/g, ' ').trim() === text))({})"#,
            serde_json::to_string(text)?
        );
        self.eval_bool(&script).await
    }

    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let script = format!(
            r#"((sel) => Array.from(document.querySelectorAll(sel)).some(el => {{
                const style = window.getComputedStyle(el);
                if (style.visibility === 'hidden' || style.display === 'none') return false;
                const rect = el.getBoundingClientRect();
                return rect.width > 0 && rect.height > 0;
            }}))({})"#,
            serde_json::to_string(selector)?
        );

        let this = self;
        let script = script.as_str();
        Ok(poll_until(timeout, POLL_INTERVAL, move || this.eval_bool(script)).await)
    }

    async fn snapshot_tables(&mut self) -> Result<usize> {
        self.tables = self
            .page
            .find_elements("table")
            .await
            .map_err(|e| ExtractError::Query(e.to_string()))?;
        Ok(self.tables.len())
    }

    async fn table_headers(&self, index: usize) -> Result<Vec<String>> {
        let cells = self
            .table(index)?
            .find_elements("thead th")
            .await
            .map_err(|e| ExtractError::Query(e.to_string()))?;
        read_texts(&cells).await
    }

    async fn table_rows(&self, index: usize) -> Result<Vec<Vec<String>>> {
        let rows = self
            .table(index)?
            .find_elements("tbody tr")
            .await
            .map_err(|e| ExtractError::Query(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let cells = row
                .find_elements("td")
                .await
                .map_err(|e| ExtractError::Query(e.to_string()))?;
            out.push(read_texts(&cells).await?);
        }
        Ok(out)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        {
            let mut browser = self.browser.lock().await;
            browser
                .close()
                .await
                .map_err(|e| ExtractError::Close(e.to_string()))?;
            if let Err(e) = browser.wait().await {
                debug!("waiting on browser process: {e}");
            }
        }
        info!("browser closed");
        Ok(())
    }
}

async fn read_texts(cells: &[Element]) -> Result<Vec<String>> {
    let mut texts = Vec::with_capacity(cells.len());
    for cell in cells {
        let text = cell
            .inner_text()
            .await
            .map_err(|e| ExtractError::Query(e.to_string()))?;
        texts.push(text.unwrap_or_default());
    }
    Ok(texts)
}

/// Find a Chromium binary by checking multiple locations.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. Check PROVENTOS_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("PROVENTOS_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. Check ~/.proventos/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = [
            home.join(".proventos/chromium/chrome"),
            home.join(".proventos/chromium/chrome-linux64/chrome"),
        ];
        if let Some(found) = candidates.into_iter().find(|c| c.exists()) {
            return Some(found);
        }
    }

    // 3. Check system PATH
    for name in ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_executable_wins() {
        let renderer =
            ChromiumRenderer::discover(Some(PathBuf::from("/opt/chrome/chrome")), true).unwrap();
        assert_eq!(renderer.executable(), &PathBuf::from("/opt/chrome/chrome"));
        assert_eq!(renderer.name(), "chromium");
    }
}
