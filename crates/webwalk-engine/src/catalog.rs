//! Static action catalog: location rules mapped to candidate actions
//!
//! A catalog is a fixed, ordered list of location rules built once at
//! startup and never mutated during a walk. Each rule pairs a matcher
//! over URL/title with the ordered actions applicable when it fires.
//! Rules carry an explicit priority; the resolver orders overlapping
//! matches by it (higher wins) with declaration order as tie-break.

use webwalk_core::{Action, Locator, Matcher, Result};

/// One (matcher -> ordered action list) entry in the catalog
#[derive(Debug, Clone)]
pub struct LocationRule {
    /// Fires when URL or title matches
    pub matcher: Matcher,
    /// Higher-priority rules contribute their actions first
    pub priority: u32,
    /// Documentation only
    pub description: String,
    /// Actions applicable when this rule matches, in declared order
    pub actions: Vec<Action>,
}

impl LocationRule {
    pub fn new(matcher: Matcher, priority: u32, description: &str, actions: Vec<Action>) -> Self {
        Self {
            matcher,
            priority,
            description: description.to_string(),
            actions,
        }
    }
}

/// Fixed ordered list of location rules
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    rules: Vec<LocationRule>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule (declaration order matters for priority ties)
    pub fn rule(mut self, rule: LocationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[LocationRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// The built-in shop-walk catalog.
///
/// Mirrors the production walk target: an area ranking page where the
/// target shop must be found among many listings, and the shop's own
/// detail pages with their navigation tabs.
pub fn shop_walk_catalog() -> Result<Catalog> {
    let find_shop = Action::find_target(
        "Find target shop",
        vec![
            "MONROE（モンロー） 船橋店".to_string(),
            "MONROE 船橋店".to_string(),
            "MONROE".to_string(),
            "モンロー".to_string(),
        ],
        vec![Locator::Css("a[href*='monroe']".to_string())],
        "Locate the target shop's listing on the ranking page and open it",
    )
    .required();

    let detail_actions = vec![
        Action::click(
            "Shop top",
            vec![
                Locator::LinkText("店舗トップ".to_string()),
                Locator::Css("[href*='top']".to_string()),
            ],
            "Open the shop's top page",
        ),
        Action::click(
            "Therapist news",
            vec![
                Locator::LinkText("ニュース セラピスト".to_string()),
                Locator::Css("[href*='news']".to_string()),
                Locator::Css("[href*='therapist']".to_string()),
            ],
            "Open the therapist news page",
        ),
        Action::click(
            "Therapist videos",
            vec![
                Locator::LinkText("セラピスト動画".to_string()),
                Locator::Css("[href*='video']".to_string()),
                Locator::Css("[href*='movie']".to_string()),
            ],
            "Open the therapist video page",
        ),
        Action::click(
            "Price list",
            vec![
                Locator::LinkText("料金システム".to_string()),
                Locator::Css("[href*='price']".to_string()),
                Locator::Css("[href*='fee']".to_string()),
            ],
            "Open the pricing page",
        ),
        Action::click(
            "Access",
            vec![
                Locator::LinkText("アクセス".to_string()),
                Locator::Css("[href*='access']".to_string()),
            ],
            "Open the access/directions page",
        ),
        Action::click(
            "Discounts",
            vec![
                Locator::LinkText("割引情報".to_string()),
                Locator::Css("[href*='discount']".to_string()),
                Locator::Css("[href*='coupon']".to_string()),
            ],
            "Open the discount information page",
        ),
        Action::tab_switch(
            "Reviews tab",
            vec![
                Locator::Css("[role='tab'][data-panel='reviews']".to_string()),
                Locator::LinkText("口コミ".to_string()),
            ],
            "aria-selected",
            "true",
            "Switch to the reviews panel on the shop page",
        ),
        Action::click(
            "Online booking",
            vec![
                Locator::LinkText("ネット予約".to_string()),
                Locator::Css("[href*='reserve']".to_string()),
                Locator::Css("[href*='booking']".to_string()),
                Locator::Css("button[class*='reserve']".to_string()),
            ],
            "Open the online booking page",
        ),
    ];

    Ok(Catalog::new()
        .rule(LocationRule::new(
            Matcher::pattern("shop-detail")?,
            30,
            "Shop detail pages (tabs and sub-pages of one shop)",
            detail_actions.clone(),
        ))
        .rule(LocationRule::new(
            Matcher::pattern("(?i)monroe|モンロー")?,
            20,
            "Target shop pages matched by name (fallback)",
            detail_actions,
        ))
        .rule(LocationRule::new(
            Matcher::pattern("funabashi")?,
            10,
            "Area ranking page: the walk's search origin",
            vec![find_shop],
        )))
}
