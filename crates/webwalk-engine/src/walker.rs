//! Walk controller: the bounded resolve/filter/select/execute loop
//!
//! One `Walker` owns one walk. Failures split two ways: local failures
//! (an action that cannot run or does not complete) consume a step and
//! the walk continues; fatal failures (the start navigation failing even
//! after the relaxed retry) capture a diagnostic screenshot and abort.

use crate::base_key::base_key;
use crate::catalog::Catalog;
use crate::executor;
use crate::filter;
use crate::policy::{select, ExecutionHistory, SelectionMode};
use crate::resolver::resolve;
use crate::state::{advance, Phase, StopReason, WalkEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};
use webwalk_browser::{capture_error_screenshot, PageDriver};
use webwalk_core::{Result, WaitPolicy, WalkConfig, WalkError};

/// Budget for the start navigation (per attempt)
const NAV_TIMEOUT: Duration = Duration::from_secs(30);

/// Summary of a finished walk
#[derive(Debug, Clone)]
pub struct WalkReport {
    /// Execution attempts consumed (successes and failures alike)
    pub steps: usize,
    /// Distinct locations visited, in first-visit order
    pub visited_locations: Vec<String>,
    pub stop_reason: StopReason,
}

/// Drives one walk over a page
pub struct Walker<P: PageDriver> {
    page: P,
    catalog: Catalog,
    config: WalkConfig,
    history: ExecutionHistory,
    visited: Vec<String>,
    visited_set: HashSet<String>,
    step_count: usize,
    phase: Phase,
    rng: StdRng,
}

impl<P: PageDriver> Walker<P> {
    pub fn new(page: P, catalog: Catalog, config: WalkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            page,
            catalog,
            config,
            history: ExecutionHistory::new(),
            visited: Vec::new(),
            visited_set: HashSet::new(),
            step_count: 0,
            phase: Phase::Idle,
            rng: StdRng::from_entropy(),
        })
    }

    /// Deterministic selection and wait jitter, for reproducible runs
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    /// Give the page driver back, for callers that shut it down
    /// explicitly after the walk
    pub fn into_page(self) -> P {
        self.page
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn visited_locations(&self) -> &[String] {
        &self.visited
    }

    fn mode(&self) -> SelectionMode {
        if self.config.random_order {
            SelectionMode::Random
        } else {
            SelectionMode::Sequential
        }
    }

    /// Run the walk from `start` until a stop condition fires.
    ///
    /// `Err` means a fatal failure; every bounded outcome, including
    /// walks where nothing was ever executable, is an `Ok` report.
    pub async fn walk(&mut self, start: &str) -> Result<WalkReport> {
        self.phase = advance(self.phase, WalkEvent::NavigationStarted);
        if let Err(e) = self.navigate_with_retry(start).await {
            return Err(self.fatal(e).await);
        }
        self.phase = advance(self.phase, WalkEvent::PageReady);
        info!(start, "Walk started");

        if let Ok(location) = self.page.current_location().await {
            self.record_visit(&location);
        }

        loop {
            if self.step_count >= self.config.max_steps {
                self.halt(StopReason::MaxSteps);
                break;
            }

            let location = match self.page.current_location().await {
                Ok(l) => l,
                Err(e) => return Err(self.fatal(e).await),
            };
            let title = self.page.title().await.ok();

            let candidates = resolve(&self.catalog, &location, title.as_deref());
            if candidates.is_empty() {
                info!(%location, "No rule matches here");
                self.halt(StopReason::NoApplicableActions);
                break;
            }

            let executable = filter::executable(&self.page, &candidates).await;
            if executable.is_empty() {
                info!(%location, "Nothing executable on this page");
                self.halt(StopReason::NoExecutableActions);
                break;
            }

            let base = base_key(&location);
            let mode = self.mode();
            let Some(selection) = select(&executable, &base, mode, &self.history, &mut self.rng)
            else {
                self.halt(StopReason::PolicyExhausted);
                break;
            };
            if selection.reset_history {
                info!(%base, "All actions attempted here, clearing history bucket");
                self.history.clear_base(&base);
            }
            let action = selection.action;

            // Re-resolve visibility just before acting; pages shift
            let Some(locator) = filter::first_visible_locator(&self.page, action).await else {
                warn!(action = %action.name, "Went invisible before execution");
                self.step_count += 1;
                self.phase = advance(self.phase, WalkEvent::StepFinished);
                continue;
            };

            let wait_ms = self
                .rng
                .gen_range(self.config.min_wait_ms..=self.config.max_wait_ms);
            sleep(Duration::from_millis(wait_ms)).await;

            info!(step = self.step_count + 1, action = %action.name, "Executing");
            let result = executor::execute(&self.page, action, &locator).await;
            self.step_count += 1;
            // Attempted is attempted; failures count toward the bucket too
            self.history.record(&base, &action.name);

            if result.success {
                info!(action = %action.name, "{}", result.message);
                if let Some(next) = &result.resulting_location {
                    if !self.record_visit(next) {
                        self.halt(StopReason::MaxVisitedLocations);
                        break;
                    }
                }
            } else {
                warn!(action = %action.name, "{}", result.message);
            }
            self.phase = advance(self.phase, WalkEvent::StepFinished);
        }

        let stop_reason = match self.phase {
            Phase::Halted(reason) => reason,
            // Loop only exits through halt()
            _ => StopReason::Fatal,
        };
        info!(
            steps = self.step_count,
            visited = self.visited.len(),
            %stop_reason,
            "Walk finished"
        );
        Ok(WalkReport {
            steps: self.step_count,
            visited_locations: self.visited.clone(),
            stop_reason,
        })
    }

    /// Record a distinct visit. Returns false when the visit budget is
    /// already spent and `location` is new.
    fn record_visit(&mut self, location: &str) -> bool {
        if self.visited_set.contains(location) {
            return true;
        }
        if self.visited_set.len() >= self.config.max_visited_locations {
            return false;
        }
        self.visited_set.insert(location.to_string());
        self.visited.push(location.to_string());
        true
    }

    async fn navigate_with_retry(&self, url: &str) -> Result<()> {
        match self
            .page
            .navigate(url, WaitPolicy::NetworkSettled, NAV_TIMEOUT)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(url, "Navigation failed ({}), retrying with load-only wait", e);
                self.page.navigate(url, WaitPolicy::Load, NAV_TIMEOUT).await
            }
        }
    }

    async fn fatal(&mut self, e: WalkError) -> WalkError {
        capture_error_screenshot(&self.page, &self.config.screenshot_dir).await;
        self.halt(StopReason::Fatal);
        e
    }

    fn halt(&mut self, reason: StopReason) {
        self.phase = advance(self.phase, WalkEvent::Halt(reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LocationRule;
    use crate::testing::{ClickOutcome, MockPage};
    use webwalk_core::{Action, Locator, Matcher};

    fn fast_config() -> WalkConfig {
        WalkConfig {
            min_wait_ms: 0,
            max_wait_ms: 0,
            ..Default::default()
        }
    }

    fn css(s: &str) -> Locator {
        Locator::Css(s.to_string())
    }

    fn single_rule_catalog(actions: Vec<Action>) -> Catalog {
        Catalog::new().rule(LocationRule::new(
            Matcher::Exact("example.com".to_string()),
            10,
            "everything",
            actions,
        ))
    }

    #[tokio::test]
    async fn test_failing_steps_still_exhaust_the_step_budget() {
        let page = MockPage::new("");
        let loc = css("a.flaky");
        page.set_visible(loc.clone());
        for _ in 0..5 {
            page.queue_click(ClickOutcome::Fail("detached".to_string()));
        }

        let catalog = single_rule_catalog(vec![Action::click("Flaky", vec![loc], "")]);
        let config = WalkConfig {
            max_steps: 5,
            ..fast_config()
        };
        let mut walker = Walker::new(page, catalog, config).unwrap().with_rng_seed(1);

        let report = walker.walk("https://example.com/").await.unwrap();
        assert_eq!(report.steps, 5);
        assert_eq!(report.stop_reason, StopReason::MaxSteps);
        assert_eq!(walker.page().click_count(), 5);
        // Nothing succeeded, so only the start location was visited
        assert_eq!(report.visited_locations, vec!["https://example.com/"]);
    }

    #[tokio::test]
    async fn test_sequential_mode_cycles_through_actions() {
        let page = MockPage::new("");
        let a = css("a.first");
        let b = css("a.second");
        page.set_visible(a.clone());
        page.set_visible(b.clone());

        let catalog = single_rule_catalog(vec![
            Action::click("First", vec![a.clone()], ""),
            Action::click("Second", vec![b.clone()], ""),
        ]);
        let config = WalkConfig {
            max_steps: 3,
            random_order: false,
            ..fast_config()
        };
        let mut walker = Walker::new(page, catalog, config).unwrap().with_rng_seed(1);

        let report = walker.walk("https://example.com/").await.unwrap();
        assert_eq!(report.steps, 3);
        assert_eq!(report.stop_reason, StopReason::MaxSteps);

        // A, B, bucket reset, then A again
        let clicked: Vec<Locator> = walker
            .page()
            .clicks
            .lock()
            .unwrap()
            .iter()
            .map(|(l, _)| l.clone())
            .collect();
        assert_eq!(clicked, vec![a.clone(), b, a]);
    }

    #[tokio::test]
    async fn test_unmatched_location_halts_immediately() {
        let page = MockPage::new("");
        let catalog = single_rule_catalog(vec![Action::click("A", vec![css("a")], "")]);
        let mut walker = Walker::new(page, catalog, fast_config()).unwrap();

        let report = walker.walk("https://other.net/").await.unwrap();
        assert_eq!(report.steps, 0);
        assert_eq!(report.stop_reason, StopReason::NoApplicableActions);
    }

    #[tokio::test]
    async fn test_nothing_visible_halts_without_consuming_steps() {
        let page = MockPage::new("");
        let catalog = single_rule_catalog(vec![Action::click("A", vec![css("a.gone")], "")]);
        let mut walker = Walker::new(page, catalog, fast_config()).unwrap();

        let report = walker.walk("https://example.com/").await.unwrap();
        assert_eq!(report.steps, 0);
        assert_eq!(report.stop_reason, StopReason::NoExecutableActions);
    }

    #[tokio::test]
    async fn test_navigation_retries_with_relaxed_wait() {
        let page = MockPage::new("");
        page.fail_navigations(1);
        let catalog = Catalog::new();
        let mut walker = Walker::new(page, catalog, fast_config()).unwrap();

        let report = walker.walk("https://example.com/").await.unwrap();
        assert_eq!(report.stop_reason, StopReason::NoApplicableActions);

        let navigations = walker.page().navigations.lock().unwrap().clone();
        // Only the successful attempt is logged; it used the relaxed policy
        assert_eq!(navigations, vec![("https://example.com/".to_string(), WaitPolicy::Load)]);
    }

    #[tokio::test]
    async fn test_navigation_failure_after_retry_is_fatal() {
        let page = MockPage::new("");
        page.fail_navigations(2);
        let mut walker = Walker::new(page, Catalog::new(), fast_config()).unwrap();

        let err = walker.walk("https://example.com/").await.unwrap_err();
        assert!(matches!(err, WalkError::Navigation { .. }));
        // The fatal path captured a diagnostic screenshot
        assert_eq!(walker.page().screenshots.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_visit_budget_halts_the_walk() {
        let page = MockPage::new("");
        let loc = css("a.next");
        page.set_visible(loc.clone());
        page.queue_location_after_click("https://example.com/page-two");

        let catalog = single_rule_catalog(vec![Action::click("Next", vec![loc], "")]);
        let config = WalkConfig {
            max_visited_locations: 1,
            ..fast_config()
        };
        let mut walker = Walker::new(page, catalog, config).unwrap().with_rng_seed(1);

        let report = walker.walk("https://example.com/").await.unwrap();
        assert_eq!(report.stop_reason, StopReason::MaxVisitedLocations);
        assert_eq!(report.visited_locations, vec!["https://example.com/"]);
    }

    #[tokio::test]
    async fn test_revisits_do_not_consume_the_visit_budget() {
        let page = MockPage::new("");
        let loc = css("a.self");
        page.set_visible(loc.clone());

        // Clicks never change the location; every step revisits the start
        let catalog = single_rule_catalog(vec![Action::click("Self", vec![loc], "")]);
        let config = WalkConfig {
            max_steps: 4,
            max_visited_locations: 1,
            ..fast_config()
        };
        let mut walker = Walker::new(page, catalog, config).unwrap().with_rng_seed(1);

        let report = walker.walk("https://example.com/").await.unwrap();
        assert_eq!(report.steps, 4);
        assert_eq!(report.stop_reason, StopReason::MaxSteps);
        assert_eq!(report.visited_locations.len(), 1);
    }

    #[tokio::test]
    async fn test_required_action_runs_first() {
        let page = MockPage::new("");
        let optional = css("a.optional");
        let must = css("a.required");
        page.set_visible(optional.clone());
        page.set_visible(must.clone());

        let catalog = single_rule_catalog(vec![
            Action::click("Optional", vec![optional], ""),
            Action::click("Must", vec![must.clone()], "").required(),
        ]);
        let config = WalkConfig {
            max_steps: 1,
            ..fast_config()
        };
        let mut walker = Walker::new(page, catalog, config).unwrap().with_rng_seed(42);

        walker.walk("https://example.com/").await.unwrap();
        let clicks = walker.page().clicks.lock().unwrap().clone();
        assert_eq!(clicks[0].0, must);
    }

    #[tokio::test]
    async fn test_into_page_releases_the_driver_for_shutdown() {
        let page = MockPage::new("");
        let mut walker = Walker::new(page, Catalog::new(), fast_config()).unwrap();
        walker.walk("https://example.com/").await.unwrap();

        let page = walker.into_page();
        assert_eq!(page.navigations.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_invalid_config() {
        let page = MockPage::new("");
        let config = WalkConfig {
            max_steps: 0,
            ..Default::default()
        };
        assert!(Walker::new(page, Catalog::new(), config).is_err());
    }
}
