//! First-match-wins accumulation and final link resolution.

use crate::{Link, LinkId};
use std::collections::HashSet;

/// Ordered, duplicate-free accumulator of prioritized link ids.
///
/// A link's position is fixed by the highest-priority rule that first names
/// it; later rules naming the same link have no further effect.
#[derive(Debug, Default)]
pub(crate) struct Prioritized {
    order: Vec<LinkId>,
    seen: HashSet<LinkId>,
}

impl Prioritized {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the id unless a higher-priority rule already claimed it.
    /// Returns whether the id was newly added.
    pub fn push(&mut self, id: LinkId) -> bool {
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.insert(id.clone());
        self.order.push(id);
        true
    }

    fn contains(&self, id: &LinkId) -> bool {
        self.seen.contains(id)
    }
}

/// Resolve the accumulated ids to links and append the remainder.
///
/// Accumulated ids with no corresponding link (stale or cross-hub ids in
/// rule config) are silently dropped. Unmatched links follow in ascending
/// `display_order`; the sort is stable, so equal orders keep input order.
/// The result is always a permutation of `links`.
pub(crate) fn resolve(prioritized: &Prioritized, links: &[Link]) -> Vec<Link> {
    let mut result = Vec::with_capacity(links.len());

    for id in &prioritized.order {
        if let Some(link) = links.iter().find(|l| l.id == *id) {
            result.push(link.clone());
        }
    }

    let mut remaining: Vec<&Link> = links.iter().filter(|l| !prioritized.contains(&l.id)).collect();
    remaining.sort_by_key(|l| l.display_order);
    result.extend(remaining.into_iter().cloned());

    result
}
