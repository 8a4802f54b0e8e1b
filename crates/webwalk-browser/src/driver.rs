//! Narrow page-automation seam consumed by the walk engine
//!
//! The engine never talks to a browser library directly; everything it
//! needs from a live page goes through [`PageDriver`]. Locators are
//! resolved per call so no element handles cross the seam.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use webwalk_core::{Locator, Result, SettleTimeout, WaitPolicy};

/// Capabilities the walk engine consumes from a live page.
///
/// Timeout semantics follow the walk's local-failure rule: probes
/// (`is_visible`, `wait_for_attribute`) never error, they report false on
/// timeout. Clicks and navigation surface real errors, including the
/// distinguishable `ClickIntercepted` variant when another element covers
/// the target.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Number of elements the locator currently resolves to
    async fn count(&self, locator: &Locator) -> Result<usize>;

    /// Whether the first matching element becomes visible within `timeout`.
    /// Never errors; probe failures of any kind read as not visible.
    async fn is_visible(&self, locator: &Locator, timeout: Duration) -> bool;

    /// Scroll the first matching element into the viewport
    async fn scroll_into_view(&self, locator: &Locator) -> Result<()>;

    /// Click the first matching element.
    ///
    /// With `override_intercept` false, a click blocked by an overlapping
    /// element fails with `WalkError::ClickIntercepted`. With it true the
    /// click is dispatched directly to the element, bypassing hit testing.
    async fn click(
        &self,
        locator: &Locator,
        timeout: Duration,
        override_intercept: bool,
    ) -> Result<()>;

    /// Read an attribute off the first matching element
    async fn get_attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>>;

    /// Text content of the first matching element
    async fn text_content(&self, locator: &Locator) -> Result<String>;

    /// URL of the page currently loaded
    async fn current_location(&self) -> Result<String>;

    /// Title of the page currently loaded
    async fn title(&self) -> Result<String>;

    /// Best-effort wait for network/document activity to settle.
    ///
    /// Callers match and discard the `SettleTimeout` branch explicitly;
    /// a page that never quiets down is not an error.
    async fn wait_for_network_settled(
        &self,
        timeout: Duration,
    ) -> std::result::Result<(), SettleTimeout>;

    /// Wait for an attribute on the first matching element to reach
    /// `expected`. Timeout reads as false, never an error.
    async fn wait_for_attribute(
        &self,
        locator: &Locator,
        name: &str,
        expected: &str,
        timeout: Duration,
    ) -> bool;

    /// Navigate to a URL. Hard failures (DNS, timeout) error; the caller
    /// may retry once with a relaxed wait policy.
    async fn navigate(&self, url: &str, policy: WaitPolicy, timeout: Duration) -> Result<()>;

    /// Best-effort diagnostic screenshot
    async fn screenshot(&self, path: &Path) -> Result<()>;
}
