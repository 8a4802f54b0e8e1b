//! In-memory `PageDriver` double for engine tests
//!
//! `MockPage` scripts page behavior through queues and maps: which
//! locators are visible, how each successive click resolves, what the
//! location becomes after a successful click, and how many navigations
//! fail before one succeeds.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use webwalk_browser::PageDriver;
use webwalk_core::{Locator, Result, SettleTimeout, WaitPolicy, WalkError};

/// How one scripted click call resolves
#[derive(Debug, Clone)]
pub enum ClickOutcome {
    Ok,
    Intercepted,
    Fail(String),
}

#[derive(Default)]
pub struct MockPage {
    location: Mutex<String>,
    title: Mutex<Option<String>>,
    visible: Mutex<HashSet<Locator>>,
    click_queue: Mutex<VecDeque<ClickOutcome>>,
    location_after_click: Mutex<VecDeque<String>>,
    /// (locator, override_intercept) per click call, in order
    pub clicks: Mutex<Vec<(Locator, bool)>>,
    attributes: Mutex<HashMap<String, String>>,
    texts: Mutex<HashMap<String, String>>,
    nav_failures: Mutex<u32>,
    pub navigations: Mutex<Vec<(String, WaitPolicy)>>,
    pub screenshots: Mutex<Vec<PathBuf>>,
    /// Locators that reached a bounded visibility wait, in probe order
    pub visibility_probes: Mutex<Vec<Locator>>,
}

impl MockPage {
    pub fn new(location: &str) -> Self {
        let page = Self::default();
        *page.location.lock().unwrap() = location.to_string();
        page
    }

    pub fn set_title(&self, title: &str) {
        *self.title.lock().unwrap() = Some(title.to_string());
    }

    pub fn set_visible(&self, locator: Locator) {
        self.visible.lock().unwrap().insert(locator);
    }

    pub fn set_hidden(&self, locator: &Locator) {
        self.visible.lock().unwrap().remove(locator);
    }

    /// Script the outcome of the next click call (FIFO; an empty queue
    /// means clicks succeed)
    pub fn queue_click(&self, outcome: ClickOutcome) {
        self.click_queue.lock().unwrap().push_back(outcome);
    }

    /// Location the page moves to after the next successful click
    pub fn queue_location_after_click(&self, url: &str) {
        self.location_after_click
            .lock()
            .unwrap()
            .push_back(url.to_string());
    }

    pub fn set_attribute(&self, locator: &Locator, name: &str, value: &str) {
        self.attributes
            .lock()
            .unwrap()
            .insert(attr_key(locator, name), value.to_string());
    }

    pub fn set_text(&self, locator: &Locator, text: &str) {
        self.texts
            .lock()
            .unwrap()
            .insert(locator.to_string(), text.to_string());
    }

    /// Fail the next `n` navigation calls before letting one succeed
    pub fn fail_navigations(&self, n: u32) {
        *self.nav_failures.lock().unwrap() = n;
    }

    pub fn click_count(&self) -> usize {
        self.clicks.lock().unwrap().len()
    }
}

fn attr_key(locator: &Locator, name: &str) -> String {
    format!("{}|{}", locator, name)
}

#[async_trait]
impl PageDriver for MockPage {
    async fn count(&self, locator: &Locator) -> Result<usize> {
        Ok(usize::from(self.visible.lock().unwrap().contains(locator)))
    }

    async fn is_visible(&self, locator: &Locator, _timeout: Duration) -> bool {
        self.visibility_probes.lock().unwrap().push(locator.clone());
        self.visible.lock().unwrap().contains(locator)
    }

    async fn scroll_into_view(&self, _locator: &Locator) -> Result<()> {
        Ok(())
    }

    async fn click(
        &self,
        locator: &Locator,
        _timeout: Duration,
        override_intercept: bool,
    ) -> Result<()> {
        self.clicks
            .lock()
            .unwrap()
            .push((locator.clone(), override_intercept));

        let outcome = self
            .click_queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ClickOutcome::Ok);
        match outcome {
            ClickOutcome::Ok => {
                if let Some(next) = self.location_after_click.lock().unwrap().pop_front() {
                    *self.location.lock().unwrap() = next;
                }
                Ok(())
            }
            ClickOutcome::Intercepted => Err(WalkError::ClickIntercepted(format!(
                "element covering {}",
                locator
            ))),
            ClickOutcome::Fail(reason) => Err(WalkError::Browser(reason)),
        }
    }

    async fn get_attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
        Ok(self
            .attributes
            .lock()
            .unwrap()
            .get(&attr_key(locator, name))
            .cloned())
    }

    async fn text_content(&self, locator: &Locator) -> Result<String> {
        Ok(self
            .texts
            .lock()
            .unwrap()
            .get(&locator.to_string())
            .cloned()
            .unwrap_or_default())
    }

    async fn current_location(&self) -> Result<String> {
        Ok(self.location.lock().unwrap().clone())
    }

    async fn title(&self) -> Result<String> {
        self.title
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| WalkError::Browser("no title".to_string()))
    }

    async fn wait_for_network_settled(
        &self,
        _timeout: Duration,
    ) -> std::result::Result<(), SettleTimeout> {
        Ok(())
    }

    async fn wait_for_attribute(
        &self,
        locator: &Locator,
        name: &str,
        expected: &str,
        _timeout: Duration,
    ) -> bool {
        self.attributes
            .lock()
            .unwrap()
            .get(&attr_key(locator, name))
            .is_some_and(|v| v == expected)
    }

    async fn navigate(&self, url: &str, policy: WaitPolicy, _timeout: Duration) -> Result<()> {
        {
            let mut failures = self.nav_failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(WalkError::Navigation {
                    url: url.to_string(),
                    reason: "scripted navigation failure".to_string(),
                });
            }
        }
        self.navigations
            .lock()
            .unwrap()
            .push((url.to_string(), policy));
        *self.location.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.screenshots.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}
