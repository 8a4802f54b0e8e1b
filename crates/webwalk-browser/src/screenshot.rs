//! Diagnostic screenshot capture
//!
//! Screenshots are side files for debugging a failed walk; they are named
//! by timestamp and sit outside the walk's correctness contract.

use crate::driver::PageDriver;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Build a timestamped path for an error screenshot
pub fn error_screenshot_path(dir: &Path) -> PathBuf {
    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f");
    dir.join(format!("error-{}.png", timestamp))
}

/// Capture a best-effort diagnostic screenshot into `dir`.
///
/// Failures are logged and swallowed; a missing screenshot must never
/// mask the walk error that triggered it.
pub async fn capture_error_screenshot(page: &dyn PageDriver, dir: &Path) -> Option<PathBuf> {
    let path = error_screenshot_path(dir);
    match page.screenshot(&path).await {
        Ok(()) => {
            info!("Error screenshot captured: {}", path.display());
            Some(path)
        }
        Err(e) => {
            error!("Failed to capture error screenshot: {}", e);
            None
        }
    }
}
