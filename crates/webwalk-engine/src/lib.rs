//! Action-resolution and walk-control engine for webwalk
//!
//! The engine turns a static action catalog plus a live page into a
//! bounded randomized walk:
//!
//! - [`catalog`]: location rules mapping URL/title matchers to actions
//! - [`resolver`]: pure resolution of the candidate list for a location
//! - [`filter`]: visibility-based executability probing
//! - [`policy`]: required-first random/sequential selection with
//!   per-location execution history
//! - [`base_key`]: history-bucket key derivation from URLs
//! - [`executor`]: per-action-kind interaction sequences
//! - [`state`]: the walk lifecycle phase machine
//! - [`walker`]: the controller tying it all together
//!
//! Everything above the [`webwalk_browser::PageDriver`] seam is
//! deterministic given a seeded RNG, which is how the engine tests run
//! without a browser.

pub mod base_key;
pub mod catalog;
pub mod executor;
pub mod filter;
pub mod policy;
pub mod resolver;
pub mod state;
pub mod walker;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use catalog::{shop_walk_catalog, Catalog, LocationRule};
pub use policy::{ExecutionHistory, SelectionMode};
pub use resolver::resolve;
pub use state::{Phase, StopReason};
pub use walker::{WalkReport, Walker};
