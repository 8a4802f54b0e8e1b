//! Per-action executors
//!
//! An executor owns the interaction sequence for one action kind:
//! scroll, settle pause, click with the intercepted-click retry, then
//! the kind's own completion wait. Executors report failures through
//! [`ActionResult`]; only the walk controller decides what a failure
//! means for the walk.

use crate::filter;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use webwalk_core::{Action, ActionKind, ActionResult, Locator, Result};
use webwalk_browser::PageDriver;

/// Pause before clicking so late layout shifts settle under the cursor
const SETTLE_PAUSE: Duration = Duration::from_millis(500);
/// Element-resolution budget for the click itself
const CLICK_TIMEOUT: Duration = Duration::from_secs(5);
/// How long a tab's marker attribute gets to flip to its active value
const MARKER_TIMEOUT: Duration = Duration::from_secs(5);
/// Post-click advisory network-settle budget
const NETWORK_SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Execute `action` through `locator`, the pre-resolved visible strategy.
///
/// Find-target actions ignore the pre-resolved locator and fan out
/// through their full strategy chain, clicking the first visible hit.
/// Never panics; every failure path lands in a failure `ActionResult`.
pub async fn execute<P: PageDriver + ?Sized>(
    page: &P,
    action: &Action,
    locator: &Locator,
) -> ActionResult {
    match &action.kind {
        ActionKind::Click => click_action(page, action, locator).await,
        ActionKind::TabSwitch {
            marker_attribute,
            active_value,
        } => tab_switch_action(page, action, locator, marker_attribute, active_value).await,
        ActionKind::FindTarget { .. } => find_target_action(page, action).await,
    }
}

async fn click_action<P: PageDriver + ?Sized>(
    page: &P,
    action: &Action,
    locator: &Locator,
) -> ActionResult {
    if let Err(e) = click_through(page, locator).await {
        return ActionResult::failure(format!("{}: click failed: {}", action.name, e));
    }

    match page.wait_for_network_settled(NETWORK_SETTLE_TIMEOUT).await {
        Ok(()) => {}
        Err(_timeout) => {} // advisory wait; a chatty page is not a failure
    }

    finish(page, format!("{}: clicked {}", action.name, locator)).await
}

async fn tab_switch_action<P: PageDriver + ?Sized>(
    page: &P,
    action: &Action,
    locator: &Locator,
    marker_attribute: &str,
    active_value: &str,
) -> ActionResult {
    if let Err(e) = click_through(page, locator).await {
        return ActionResult::failure(format!("{}: click failed: {}", action.name, e));
    }

    let active = page
        .wait_for_attribute(locator, marker_attribute, active_value, MARKER_TIMEOUT)
        .await;
    if !active {
        return ActionResult::failure(format!(
            "{}: tab did not activate ({}!={})",
            action.name, marker_attribute, active_value
        ));
    }

    finish(page, format!("{}: tab activated", action.name)).await
}

async fn find_target_action<P: PageDriver + ?Sized>(page: &P, action: &Action) -> ActionResult {
    let Some(locator) = filter::first_visible_locator(page, action).await else {
        return ActionResult::failure(format!(
            "{}: target not found by any search strategy",
            action.name
        ));
    };

    // The matched element's own text is the best identification of what
    // the search actually hit
    let label = page
        .text_content(&locator)
        .await
        .unwrap_or_default()
        .trim()
        .to_string();
    debug!(action = %action.name, %locator, %label, "Target found");

    if let Err(e) = click_through(page, &locator).await {
        return ActionResult::failure(format!("{}: click failed: {}", action.name, e));
    }
    match page.wait_for_network_settled(NETWORK_SETTLE_TIMEOUT).await {
        Ok(()) => {}
        Err(_timeout) => {}
    }
    finish(
        page,
        format!("{}: opened '{}' via {}", action.name, label, locator),
    )
    .await
}

/// Scroll, settle, click; retry a blocked click once with hit testing
/// bypassed.
async fn click_through<P: PageDriver + ?Sized>(page: &P, locator: &Locator) -> Result<()> {
    if let Err(e) = page.scroll_into_view(locator).await {
        debug!(%locator, "Scroll into view failed: {}", e);
    }
    sleep(SETTLE_PAUSE).await;

    match page.click(locator, CLICK_TIMEOUT, false).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_intercepted() => {
            warn!(%locator, "Click intercepted, retrying with override");
            page.click(locator, CLICK_TIMEOUT, true).await
        }
        Err(e) => Err(e),
    }
}

async fn finish<P: PageDriver + ?Sized>(page: &P, message: String) -> ActionResult {
    match page.current_location().await {
        Ok(location) => ActionResult::success(message, location),
        // The interaction itself completed; a lost location read only
        // costs the visit bookkeeping
        Err(e) => {
            warn!("Could not read resulting location: {}", e);
            ActionResult {
                success: true,
                message,
                resulting_location: None,
            }
        }
    }
}
