//! Browser rendering abstraction.
//!
//! The extractor only needs a small slice of what a browser can do: load a
//! page, ask whether something is on it, wait for something to show up and
//! read table text. `Renderer` hands out a `RenderContext` that owns one live
//! page; closing the context releases everything it holds.

pub mod chromium;
pub mod poll;
pub mod static_html;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub use chromium::ChromiumRenderer;
pub use static_html::StaticRenderer;

/// Outcome of a page navigation.
#[derive(Debug, Clone)]
pub struct NavigationResult {
    /// URL the page ended up on after redirects.
    pub final_url: String,
    /// Wall time spent navigating, in milliseconds.
    pub load_time_ms: u64,
}

/// Something that can open browsing contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Open a new context with a single blank page.
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// A single live page.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Load `url` and wait for the document to finish loading.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;

    /// Whether at least one element matches the CSS `selector`.
    async fn has_element(&self, selector: &str) -> Result<bool>;

    /// Whether some element's rendered text, with whitespace runs collapsed
    /// and trimmed, is exactly `text`.
    async fn has_exact_text(&self, text: &str) -> Result<bool>;

    /// Wait until an element matching `selector` is visible.
    ///
    /// Returns `Ok(false)` when `timeout` elapses first.
    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Snapshot the `table` elements currently on the page, in document order,
    /// and return how many there are. Indices passed to `table_headers` and
    /// `table_rows` refer to this snapshot.
    async fn snapshot_tables(&mut self) -> Result<usize>;

    /// Text of each `thead th` cell of table `index`.
    async fn table_headers(&self, index: usize) -> Result<Vec<String>>;

    /// Text of the `td` cells of each `tbody tr` of table `index`.
    async fn table_rows(&self, index: usize) -> Result<Vec<Vec<String>>>;

    /// Release the page and whatever backs it.
    async fn close(self: Box<Self>) -> Result<()>;
}
