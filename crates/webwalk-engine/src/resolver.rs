//! Action resolution: catalog + current location -> ordered candidate list
//!
//! Resolution is pure and deterministic. It never touches the page and
//! never errors; a location no rule matches simply resolves to an empty
//! list.

use crate::base_key;
use crate::catalog::Catalog;
use tracing::debug;
use webwalk_core::Action;

/// Resolve the ordered, deduplicated candidate actions for a location.
///
/// Matching rules contribute their actions in rule-priority order
/// (higher first), declaration order breaking ties. Duplicate action
/// names keep the first occurrence. Search-origin-only actions are
/// dropped once the walker is on a detail page.
pub fn resolve(catalog: &Catalog, location: &str, title: Option<&str>) -> Vec<Action> {
    let mut matched: Vec<(usize, &crate::catalog::LocationRule)> = catalog
        .rules()
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule.matcher.matches(location, title))
        .collect();

    matched.sort_by(|(ia, a), (ib, b)| b.priority.cmp(&a.priority).then(ia.cmp(ib)));

    let on_detail_page = base_key::detail_root(location).is_some();

    let mut seen: Vec<&str> = Vec::new();
    let mut actions: Vec<Action> = Vec::new();
    for (_, rule) in matched {
        for action in &rule.actions {
            if seen.contains(&action.name.as_str()) {
                continue;
            }
            if on_detail_page && action.kind.is_search_origin_only() {
                debug!(action = %action.name, "Dropping search-origin action on detail page");
                continue;
            }
            seen.push(action.name.as_str());
            actions.push(action.clone());
        }
    }

    debug!(location, candidates = actions.len(), "Resolved actions");
    actions
}
