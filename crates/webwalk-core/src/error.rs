//! Unified error types for webwalk

use thiserror::Error;

/// Unified error type for all webwalk operations
#[derive(Error, Debug)]
pub enum WalkError {
    // Browser errors
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Click intercepted by overlapping element: {0}")]
    ClickIntercepted(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Screenshot capture failed: {0}")]
    Screenshot(String),

    // Catalog errors
    #[error("Invalid location rule: {0}")]
    InvalidRule(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl WalkError {
    /// True when a click failed because another element covered the target
    pub fn is_intercepted(&self) -> bool {
        matches!(self, Self::ClickIntercepted(_))
    }
}

/// Result type alias using WalkError
pub type Result<T> = std::result::Result<T, WalkError>;

/// Timeout marker returned by best-effort settle waits.
///
/// Settle waits are advisory: the page may never reach a quiet network
/// state. Call sites match this branch and discard it explicitly instead
/// of the wait swallowing the timeout internally.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("settle wait timed out")]
pub struct SettleTimeout;
