//! Location-based rule evaluation: specific links for visitors from
//! certain countries.

use crate::LinkId;
use crate::VisitorContext;
use crate::config::LocationConfig;

/// Without a resolved visitor country the rule cannot evaluate and matches
/// nothing. Membership is an exact code match, and every configured country
/// shares the rule's single `link_ids` list.
pub(crate) fn evaluate(config: &LocationConfig, visitor: &VisitorContext) -> Vec<LinkId> {
    let Some(country) = visitor.country.as_deref() else {
        return Vec::new();
    };

    if config.countries.iter().any(|c| c == country) {
        return config.link_ids.clone();
    }

    Vec::new()
}
