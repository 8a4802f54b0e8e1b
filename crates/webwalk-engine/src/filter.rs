//! Executability filter: which resolved actions can run right now
//!
//! An action is executable when at least one of its locator strategies
//! resolves to a visible element within a short per-strategy probe
//! budget. Probes never error out of the filter; any failure reads as
//! not visible and the walk moves on.

use std::time::Duration;
use tracing::trace;
use webwalk_core::{Action, ActionKind, Locator};
use webwalk_browser::PageDriver;

/// Per-strategy visibility probe budget
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// The full locator chain an action can be found through, probe order.
///
/// Find-target actions fan out across their search terms first: exact
/// visible text, then anchor-text substring, then the enclosing link of
/// any matching text node. Declared locators come after as fallbacks.
pub fn candidate_locators(action: &Action) -> Vec<Locator> {
    match &action.kind {
        ActionKind::FindTarget { terms } => {
            let mut chain = Vec::with_capacity(terms.len() * 3 + action.locators.len());
            chain.extend(terms.iter().map(|t| Locator::Text(t.clone())));
            chain.extend(terms.iter().map(|t| Locator::LinkText(t.clone())));
            chain.extend(terms.iter().map(|t| Locator::EnclosingLinkText(t.clone())));
            chain.extend(action.locators.iter().cloned());
            chain
        }
        ActionKind::Click | ActionKind::TabSwitch { .. } => action.locators.clone(),
    }
}

/// First locator in the action's chain that is currently visible.
///
/// A locator matching zero elements skips the bounded visibility wait;
/// most of a fan-out chain misses entirely and should cost nothing.
pub async fn first_visible_locator<P: PageDriver + ?Sized>(
    page: &P,
    action: &Action,
) -> Option<Locator> {
    for locator in candidate_locators(action) {
        if matches!(page.count(&locator).await, Ok(0)) {
            trace!(action = %action.name, %locator, "No matches");
            continue;
        }
        if page.is_visible(&locator, PROBE_TIMEOUT).await {
            trace!(action = %action.name, %locator, "Visible");
            return Some(locator);
        }
        trace!(action = %action.name, %locator, "Not visible");
    }
    None
}

/// Whether any of the action's locator strategies is visible right now
pub async fn is_executable<P: PageDriver + ?Sized>(page: &P, action: &Action) -> bool {
    first_visible_locator(page, action).await.is_some()
}

/// Keep only the candidates that are executable, preserving order
pub async fn executable<P: PageDriver + ?Sized>(page: &P, candidates: &[Action]) -> Vec<Action> {
    let mut out = Vec::new();
    for action in candidates {
        if is_executable(page, action).await {
            out.push(action.clone());
        }
    }
    out
}
