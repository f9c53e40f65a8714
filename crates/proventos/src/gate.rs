//! Login gate.
//!
//! If the portfolio page shows a login prompt, the run parks until a table
//! appears (the user logged in through the visible window) or the timeout
//! elapses.

use crate::error::Result;
use crate::renderer::RenderContext;
use std::time::Duration;
use tracing::{info, warn};

/// Login form rendered by the portfolio site.
pub const LOGIN_FORM_SELECTOR: &str = "form.login-form";

/// Text of the sign-in link shown to anonymous visitors.
pub const LOGIN_TEXT: &str = "Entrar";

/// What the gate waits for once a login prompt was seen.
pub const TABLE_SELECTOR: &str = "table";

/// How the gate resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// No login prompt on the page.
    Open,
    /// A login prompt was seen and a table showed up before the timeout.
    Passed,
    /// A login prompt was seen and no table showed up in time.
    TimedOut,
}

/// Whether the page is asking the user to sign in.
pub async fn login_required(context: &dyn RenderContext) -> Result<bool> {
    if context.has_element(LOGIN_FORM_SELECTOR).await? {
        return Ok(true);
    }
    context.has_exact_text(LOGIN_TEXT).await
}

/// Wait for a visible table after a login prompt was detected.
pub async fn wait_for_login(context: &dyn RenderContext, timeout: Duration) -> Result<GateOutcome> {
    if context.wait_for_visible(TABLE_SELECTOR, timeout).await? {
        info!("table visible after login");
        Ok(GateOutcome::Passed)
    } else {
        warn!("no table visible after {}s", timeout.as_secs());
        Ok(GateOutcome::TimedOut)
    }
}
