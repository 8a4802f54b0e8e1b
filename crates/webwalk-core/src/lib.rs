//! # webwalk-core
//!
//! Core types for the webwalk randomized walk engine.
//!
//! Webwalk performs automated, randomized navigation of a web application
//! to exercise its interactive surface without a fixed test script: it
//! matches the current page to a set of catalog-declared actions, picks
//! one according to a selection policy, executes it, and repeats inside a
//! bounded exploration loop.
//!
//! This crate holds the shared vocabulary:
//!
//! - Actions, locator strategies, and execution results
//! - Location rule matchers (exact string or pattern)
//! - The unified [`WalkError`] type and walk configuration

mod config;
mod error;
mod types;

pub use config::WalkConfig;
pub use error::{Result, SettleTimeout, WalkError};
pub use types::{Action, ActionKind, ActionResult, Locator, Matcher, WaitPolicy};
