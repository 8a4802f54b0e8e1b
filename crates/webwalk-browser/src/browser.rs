//! Browser lifecycle and page driving over Chrome DevTools Protocol

use crate::driver::PageDriver;
use crate::proxy::ProxyConfig;
use async_trait::async_trait;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use webwalk_core::{Locator, Result, SettleTimeout, WaitPolicy, WalkError};

/// Interval between probe attempts inside bounded waits
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Configuration for browser launch
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode (default: true)
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// User agent string
    pub user_agent: Option<String>,
    /// Default operation timeout in seconds
    pub timeout_seconds: u64,
    /// Optional upstream proxy
    pub proxy: Option<ProxyConfig>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            user_agent: None,
            timeout_seconds: 30,
            proxy: None,
        }
    }
}

impl BrowserConfig {
    /// Headless unless `HEADLESS=false` in the environment or the caller
    /// asked for a visible window.
    pub fn resolve_headless(headed: bool) -> bool {
        if headed {
            return false;
        }
        std::env::var("HEADLESS").map(|v| v != "false").unwrap_or(true)
    }
}

/// Active browser session driving one page at a time
pub struct BrowserSession {
    /// Underlying browser instance (kept alive for tab lifetime)
    #[allow(dead_code)]
    browser: Browser,
    /// Current active tab
    tab: Arc<Tab>,
    /// Configuration
    config: BrowserConfig,
}

impl BrowserSession {
    /// Launch a new browser instance with default configuration
    pub async fn launch() -> Result<Self> {
        Self::launch_with_config(BrowserConfig::default()).await
    }

    /// Launch browser with custom configuration
    pub async fn launch_with_config(config: BrowserConfig) -> Result<Self> {
        info!(
            "Launching browser (headless: {}, size: {}x{}, proxy: {})",
            config.headless,
            config.window_width,
            config.window_height,
            config.proxy.is_some()
        );

        let mut launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.window_width, config.window_height)))
            .build()
            .map_err(|e| WalkError::Browser(format!("Failed to build launch options: {}", e)))?;

        // Extra args need owned storage that outlives the option builder
        let user_agent_arg: Option<String> = config
            .user_agent
            .as_ref()
            .map(|ua| format!("--user-agent={}", ua));
        if let Some(ref ua_arg) = user_agent_arg {
            launch_options.args.push(OsStr::new(ua_arg));
        }

        let proxy_arg: Option<String> = config
            .proxy
            .as_ref()
            .filter(|p| p.enabled)
            .map(|p| format!("--proxy-server={}", p.url));
        if let Some(ref proxy) = proxy_arg {
            launch_options.args.push(OsStr::new(proxy));
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| WalkError::Browser(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| WalkError::Browser(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_secs(config.timeout_seconds));

        info!("Browser launched successfully");

        Ok(Self {
            browser,
            tab,
            config,
        })
    }

    /// Connect to an existing browser instance
    ///
    /// # Arguments
    /// * `port` - Chrome DevTools Protocol port (typically 9222)
    pub async fn connect(port: u16) -> Result<Self> {
        info!("Connecting to existing browser on port {}", port);

        let browser = Browser::connect(format!("http://127.0.0.1:{}", port))
            .map_err(|e| WalkError::Browser(format!("Failed to connect to browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| WalkError::Browser(format!("Failed to create tab: {}", e)))?;

        info!("Connected to browser successfully");

        Ok(Self {
            browser,
            tab,
            config: BrowserConfig::default(),
        })
    }

    /// Execute JavaScript in the page context
    pub async fn evaluate_script(&self, script: &str) -> Result<serde_json::Value> {
        debug!("Evaluating JavaScript: {}", script);

        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| WalkError::Browser(format!("JavaScript evaluation failed: {}", e)))?;

        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    /// Get reference to the active tab
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    /// Close the browser session
    pub async fn close(self) -> Result<()> {
        info!("Closing browser session");
        // Browser is dropped and cleaned up automatically
        Ok(())
    }

    /// Resolve the first element a locator matches
    fn find(&self, locator: &Locator) -> Result<Element<'_>> {
        let found = match locator {
            Locator::Css(selector) => self.tab.find_element(selector),
            other => self.tab.find_element_by_xpath(&xpath_for(other)),
        };
        found.map_err(|e| WalkError::ElementNotFound(format!("{}: {}", locator, e)))
    }

    /// Visibility probe on an already-resolved element
    fn element_visible(&self, element: &Element<'_>) -> bool {
        let check = element.call_js_fn(
            r#"function() {
                const rects = this.getClientRects();
                if (rects.length === 0) { return false; }
                const style = window.getComputedStyle(this);
                return style.visibility !== 'hidden' && style.display !== 'none';
            }"#,
            vec![],
            false,
        );
        matches!(
            check.map(|obj| obj.value),
            Ok(Some(serde_json::Value::Bool(true)))
        )
    }

    /// Whether another element covers the target's click point
    fn element_covered(&self, element: &Element<'_>) -> bool {
        let check = element.call_js_fn(
            r#"function() {
                const r = this.getBoundingClientRect();
                const hit = document.elementFromPoint(r.x + r.width / 2, r.y + r.height / 2);
                if (hit === null) { return false; }
                return !(hit === this || this.contains(hit) || hit.contains(this));
            }"#,
            vec![],
            false,
        );
        matches!(
            check.map(|obj| obj.value),
            Ok(Some(serde_json::Value::Bool(true)))
        )
    }
}

#[async_trait]
impl PageDriver for BrowserSession {
    async fn count(&self, locator: &Locator) -> Result<usize> {
        let found = match locator {
            Locator::Css(selector) => self.tab.find_elements(selector),
            other => self.tab.find_elements_by_xpath(&xpath_for(other)),
        };
        // A locator that matches nothing is a zero count, not an error
        Ok(found.map(|elements| elements.len()).unwrap_or(0))
    }

    async fn is_visible(&self, locator: &Locator, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(element) = self.find(locator) {
                if self.element_visible(&element) {
                    return true;
                }
            }
            if Instant::now() >= deadline {
                debug!("Visibility probe timed out for {}", locator);
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn scroll_into_view(&self, locator: &Locator) -> Result<()> {
        let element = self.find(locator)?;
        element
            .scroll_into_view()
            .map_err(|e| WalkError::Browser(format!("Scroll failed for {}: {}", locator, e)))?;
        Ok(())
    }

    async fn click(
        &self,
        locator: &Locator,
        timeout: Duration,
        override_intercept: bool,
    ) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.find(locator) {
                Ok(element) => {
                    if override_intercept {
                        // Dispatch the click directly on the element,
                        // bypassing pointer hit testing
                        element
                            .call_js_fn("function() { this.click(); }", vec![], false)
                            .map_err(|e| {
                                WalkError::Browser(format!("Forced click failed: {}", e))
                            })?;
                        return Ok(());
                    }

                    if self.element_covered(&element) {
                        return Err(WalkError::ClickIntercepted(locator.to_string()));
                    }

                    element.click().map_err(|e| {
                        WalkError::Browser(format!("Click failed for {}: {}", locator, e))
                    })?;
                    return Ok(());
                }
                Err(e) => {
                    if Instant::now() >= deadline {
                        return Err(e);
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        }
    }

    async fn get_attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
        let element = self.find(locator)?;
        let result = element
            .call_js_fn(
                "function(name) { return this.getAttribute(name); }",
                vec![serde_json::Value::String(name.to_string())],
                false,
            )
            .map_err(|e| WalkError::Browser(format!("Attribute read failed: {}", e)))?;

        Ok(result.value.and_then(|v| v.as_str().map(String::from)))
    }

    async fn text_content(&self, locator: &Locator) -> Result<String> {
        let element = self.find(locator)?;
        element
            .get_inner_text()
            .map_err(|e| WalkError::Browser(format!("Text read failed for {}: {}", locator, e)))
    }

    async fn current_location(&self) -> Result<String> {
        let result = self.evaluate_script("window.location.href").await?;
        Ok(result.as_str().unwrap_or("").to_string())
    }

    async fn title(&self) -> Result<String> {
        let result = self.evaluate_script("document.title").await?;
        Ok(result.as_str().unwrap_or("").to_string())
    }

    async fn wait_for_network_settled(
        &self,
        timeout: Duration,
    ) -> std::result::Result<(), SettleTimeout> {
        let deadline = Instant::now() + timeout;
        loop {
            let ready = self
                .evaluate_script("document.readyState")
                .await
                .map(|v| v.as_str() == Some("complete"))
                .unwrap_or(false);
            if ready {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(SettleTimeout);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for_attribute(
        &self,
        locator: &Locator,
        name: &str,
        expected: &str,
        timeout: Duration,
    ) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            match self.get_attribute(locator, name).await {
                Ok(Some(value)) if value == expected => return true,
                _ => {}
            }
            if Instant::now() >= deadline {
                debug!("Attribute wait timed out: {}[{}] != {}", locator, name, expected);
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn navigate(&self, url: &str, policy: WaitPolicy, timeout: Duration) -> Result<()> {
        debug!("Navigating to {} ({:?})", url, policy);

        self.tab.navigate_to(url).map_err(|e| WalkError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| WalkError::Navigation {
                url: url.to_string(),
                reason: format!("navigation wait failed: {}", e),
            })?;

        if policy == WaitPolicy::NetworkSettled {
            // Quiet-down wait is advisory; the navigation itself succeeded
            if self.wait_for_network_settled(timeout).await.is_err() {
                warn!("Page did not settle within {:?} after {}", timeout, url);
            }
        }

        info!("Successfully navigated to {}", url);
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;

        let data = self
            .tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| WalkError::Screenshot(format!("CDP capture failed: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, data)?;

        info!("Screenshot saved: {}", path.display());
        Ok(())
    }
}

/// Translate a non-CSS locator into XPath
fn xpath_for(locator: &Locator) -> String {
    match locator {
        Locator::Css(_) => unreachable!("CSS locators resolve directly"),
        Locator::Text(text) => format!(
            "//*[normalize-space(text())={}]",
            xpath_literal(text)
        ),
        Locator::LinkText(text) => format!(
            "//a[contains(normalize-space(.), {})]",
            xpath_literal(text)
        ),
        Locator::EnclosingLinkText(text) => format!(
            "//*[contains(normalize-space(text()), {})]/ancestor-or-self::a[1]",
            xpath_literal(text)
        ),
    }
}

/// Quote a string as an XPath literal, handling embedded quotes
fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{}'", text)
    } else if !text.contains('"') {
        format!("\"{}\"", text)
    } else {
        let parts: Vec<String> = text
            .split('\'')
            .map(|part| format!("'{}'", part))
            .collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.window_width, 1920);
        assert_eq!(config.window_height, 1080);
        assert_eq!(config.timeout_seconds, 30);
        assert!(config.proxy.is_none());
    }

    // Single test for the HEADLESS variable; parallel tests mutating it
    // would race
    #[test]
    fn test_resolve_headless_env_and_flag() {
        std::env::remove_var("HEADLESS");
        assert!(BrowserConfig::resolve_headless(false));

        std::env::set_var("HEADLESS", "false");
        assert!(!BrowserConfig::resolve_headless(false));

        std::env::set_var("HEADLESS", "true");
        assert!(BrowserConfig::resolve_headless(false));
        // An explicit window request wins over the environment
        assert!(!BrowserConfig::resolve_headless(true));

        std::env::remove_var("HEADLESS");
    }

    #[test]
    fn test_xpath_for_text() {
        let xpath = xpath_for(&Locator::Text("Shop top".to_string()));
        assert_eq!(xpath, "//*[normalize-space(text())='Shop top']");
    }

    #[test]
    fn test_xpath_for_link_text() {
        let xpath = xpath_for(&Locator::LinkText("MONROE".to_string()));
        assert_eq!(xpath, "//a[contains(normalize-space(.), 'MONROE')]");
    }

    #[test]
    fn test_xpath_for_enclosing_link() {
        let xpath = xpath_for(&Locator::EnclosingLinkText("MONROE".to_string()));
        assert!(xpath.contains("ancestor-or-self::a[1]"));
    }

    #[test]
    fn test_xpath_literal_plain() {
        assert_eq!(xpath_literal("plain"), "'plain'");
    }

    #[test]
    fn test_xpath_literal_with_single_quote() {
        assert_eq!(xpath_literal("it's"), "\"it's\"");
    }

    #[test]
    fn test_xpath_literal_with_both_quotes() {
        let quoted = xpath_literal("a'b\"c");
        assert!(quoted.starts_with("concat("));
        assert!(quoted.contains("'a'"));
    }
}
