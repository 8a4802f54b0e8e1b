//! Browser error types - re-exports the unified WalkError from webwalk-core
//!
//! All browser failures use the unified WalkError type:
//! - Browser(String) - launch, CDP, script, and element interaction errors
//! - ClickIntercepted(String) - the distinguishable overlap-blocked click
//! - Navigation { url, reason } - hard navigation failures
//! - Screenshot(String) - diagnostic capture failures

pub use webwalk_core::{Result, SettleTimeout, WalkError};
