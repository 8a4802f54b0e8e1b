//! Page-automation interface and Chrome DevTools Protocol driver for webwalk
//!
//! This crate owns the seam between the walk engine and the browser:
//!
//! - [`driver::PageDriver`]: the narrow async trait the engine consumes
//!   (visibility probes, clicks, navigation, settle waits, screenshots)
//! - [`browser::BrowserSession`]: the `headless_chrome` implementation,
//!   including browser launch configuration and proxy support
//! - [`screenshot`]: timestamped diagnostic captures on fatal walk errors
//!
//! # Requirements
//!
//! - Chrome or Chromium browser installed
//! - For connecting to an existing browser: `chrome --remote-debugging-port=9222`

pub mod browser;
pub mod driver;
pub mod error;
pub mod proxy;
pub mod screenshot;

// Re-export commonly used types
pub use browser::{BrowserConfig, BrowserSession};
pub use driver::PageDriver;
pub use error::{Result, SettleTimeout, WalkError};
pub use proxy::{ProxyConfig, ProxyRotation, RotationMethod};
pub use screenshot::{capture_error_screenshot, error_screenshot_path};
