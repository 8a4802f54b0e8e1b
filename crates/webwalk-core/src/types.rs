//! Core type definitions for the walk engine

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One way of finding a target element on the current page.
///
/// An action declares an ordered chain of locators; earlier entries are
/// more precise, later entries are broader fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Locator {
    /// CSS selector
    Css(String),
    /// Exact visible-text match on any element
    Text(String),
    /// Substring match on anchor text
    LinkText(String),
    /// Any text-bearing element whose enclosing link is the click target
    EnclosingLinkText(String),
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={}", s),
            Self::Text(s) => write!(f, "text={}", s),
            Self::LinkText(s) => write!(f, "link-text={}", s),
            Self::EnclosingLinkText(s) => write!(f, "enclosing-link-text={}", s),
        }
    }
}

/// Matcher for a location rule: exact string containment or regex pattern.
///
/// A matcher fires when either the location (URL) or the page title
/// matches.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Substring match against URL or title
    Exact(String),
    /// Regex match against URL or title
    Pattern(Regex),
}

impl Matcher {
    /// Compile a regex matcher, surfacing pattern errors as `InvalidRule`
    pub fn pattern(re: &str) -> crate::Result<Self> {
        let compiled = Regex::new(re)
            .map_err(|e| crate::WalkError::InvalidRule(format!("bad pattern '{}': {}", re, e)))?;
        Ok(Self::Pattern(compiled))
    }

    /// Check whether this matcher fires for the given location and title
    pub fn matches(&self, location: &str, title: Option<&str>) -> bool {
        match self {
            Self::Exact(s) => {
                location.contains(s.as_str()) || title.is_some_and(|t| t.contains(s.as_str()))
            }
            Self::Pattern(re) => re.is_match(location) || title.is_some_and(|t| re.is_match(t)),
        }
    }
}

impl std::fmt::Display for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(s) => write!(f, "exact:{}", s),
            Self::Pattern(re) => write!(f, "pattern:{}", re.as_str()),
        }
    }
}

/// Fixed enumeration of action behaviors.
///
/// Generic actions share the `Click` template; special-cased behaviors
/// (same-page tab switches, multi-strategy target search) get their own
/// variant with the data their executor needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    /// Locate, scroll, click, wait for the page to settle
    Click,
    /// Same-page panel/tab switch. Instead of a navigation wait, the
    /// executor waits for `marker_attribute` on the clicked element to
    /// reach `active_value`.
    TabSwitch {
        marker_attribute: String,
        active_value: String,
    },
    /// First-class target search on an index page: fan out through
    /// successively broader strategies built from `terms` before falling
    /// back to the declared locator chain.
    FindTarget { terms: Vec<String> },
}

impl ActionKind {
    /// Find-target actions only make sense on search-origin pages; once
    /// the walker is on the target's own detail page their purpose is gone.
    pub fn is_search_origin_only(&self) -> bool {
        matches!(self, Self::FindTarget { .. })
    }
}

/// A named, catalog-declared interaction.
///
/// Two actions are equal iff their names match; names must be unique
/// within a catalog entry for deduplication to be correct.
#[derive(Debug, Clone)]
pub struct Action {
    /// Unique human-readable identifier
    pub name: String,
    /// Ordered locator strategies, most precise first
    pub locators: Vec<Locator>,
    /// Behavior of this action's executor
    pub kind: ActionKind,
    /// Required actions take precedence during selection
    pub required: bool,
    /// Documentation only
    pub description: String,
}

impl Action {
    /// Generic click action
    pub fn click(name: &str, locators: Vec<Locator>, description: &str) -> Self {
        Self {
            name: name.to_string(),
            locators,
            kind: ActionKind::Click,
            required: false,
            description: description.to_string(),
        }
    }

    /// Same-page tab switch action
    pub fn tab_switch(
        name: &str,
        locators: Vec<Locator>,
        marker_attribute: &str,
        active_value: &str,
        description: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            locators,
            kind: ActionKind::TabSwitch {
                marker_attribute: marker_attribute.to_string(),
                active_value: active_value.to_string(),
            },
            required: false,
            description: description.to_string(),
        }
    }

    /// Multi-strategy target search action
    pub fn find_target(
        name: &str,
        terms: Vec<String>,
        locators: Vec<Locator>,
        description: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            locators,
            kind: ActionKind::FindTarget { terms },
            required: false,
            description: description.to_string(),
        }
    }

    /// Mark this action as required (takes precedence during selection)
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Action {}

/// Result of one action execution attempt. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Whether the interaction completed
    pub success: bool,
    /// Human-readable outcome or failure reason
    pub message: String,
    /// Location observed after the action completed, if any
    pub resulting_location: Option<String>,
}

impl ActionResult {
    /// Successful execution ending at `location`
    pub fn success(message: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            resulting_location: Some(location.into()),
        }
    }

    /// Failed execution with a descriptive reason
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            resulting_location: None,
        }
    }
}

/// How long to wait after a navigation before considering it done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitPolicy {
    /// Wait until network activity settles
    NetworkSettled,
    /// Wait only for the document to load (relaxed retry policy)
    Load,
}
