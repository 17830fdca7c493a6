//! Click-history collaborator.
//!
//! The performance rule is the only place the engine reaches outside its
//! inputs: it asks a [`ClickStore`] for per-link click counts inside a time
//! window. The read is point-in-time with no transactional requirement —
//! counts are a ranking hint, not a ledger — and any failure is degraded to
//! "no click data" by the caller, never retried here.

use crate::{HubId, LinkId};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use thiserror::Error;

/// Clicks recorded for one link inside the queried window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickCount {
    pub link_id: LinkId,
    pub clicks: u64,
}

/// Errors a click-history backend may surface.
///
/// The engine logs these and treats them as "no click data"; they never
/// abort an evaluation.
#[derive(Debug, Error)]
pub enum ClickStoreError {
    #[error("click store unavailable: {0}")]
    Unavailable(String),
    #[error("click query failed: {0}")]
    Query(String),
}

/// Query contract for historical click counts.
///
/// Implementations return one row per link that was clicked within
/// `[window_start, window_end]`, ordered by count descending. Rows for
/// links no longer on the hub are fine — stale ids are dropped later when
/// matches are resolved against the link set.
pub trait ClickStore {
    fn click_counts(
        &self,
        hub_id: &HubId,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> Result<Vec<ClickCount>, ClickStoreError>;
}

/// A store with no history; every lookup returns zero rows. Default
/// collaborator for engines built without analytics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClickHistory;

impl ClickStore for NoClickHistory {
    fn click_counts(
        &self,
        _hub_id: &HubId,
        _window_start: NaiveDateTime,
        _window_end: NaiveDateTime,
    ) -> Result<Vec<ClickCount>, ClickStoreError> {
        Ok(Vec::new())
    }
}

/// In-memory click history for demos and tests.
///
/// Holds raw timestamped click events and answers the contract query by
/// filtering, grouping and sorting them, the same shape the production
/// analytics store computes in SQL.
#[derive(Debug, Clone, Default)]
pub struct MemoryClickStore {
    events: Vec<ClickEvent>,
}

#[derive(Debug, Clone)]
struct ClickEvent {
    hub_id: HubId,
    link_id: LinkId,
    clicked_at: NaiveDateTime,
}

impl MemoryClickStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one click on a link at the given instant.
    pub fn record(&mut self, hub_id: impl Into<HubId>, link_id: impl Into<LinkId>, clicked_at: NaiveDateTime) {
        self.events.push(ClickEvent {
            hub_id: hub_id.into(),
            link_id: link_id.into(),
            clicked_at,
        });
    }

    /// Record `clicks` clicks on a link at the same instant.
    pub fn record_many(
        &mut self,
        hub_id: impl Into<HubId>,
        link_id: impl Into<LinkId>,
        clicks: u64,
        clicked_at: NaiveDateTime,
    ) {
        let hub_id = hub_id.into();
        let link_id = link_id.into();
        for _ in 0..clicks {
            self.events.push(ClickEvent {
                hub_id: hub_id.clone(),
                link_id: link_id.clone(),
                clicked_at,
            });
        }
    }
}

impl ClickStore for MemoryClickStore {
    fn click_counts(
        &self,
        hub_id: &HubId,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> Result<Vec<ClickCount>, ClickStoreError> {
        let mut counts: HashMap<&LinkId, u64> = HashMap::new();
        for event in &self.events {
            if event.hub_id == *hub_id && event.clicked_at >= window_start && event.clicked_at <= window_end {
                *counts.entry(&event.link_id).or_default() += 1;
            }
        }

        let mut rows: Vec<ClickCount> = counts
            .into_iter()
            .map(|(link_id, clicks)| ClickCount { link_id: link_id.clone(), clicks })
            .collect();
        // Descending by count, ties by link id so results are reproducible.
        rows.sort_by(|a, b| b.clicks.cmp(&a.clicks).then_with(|| a.link_id.cmp(&b.link_id)));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    #[test]
    fn counts_are_windowed_grouped_and_sorted() {
        let hub: HubId = "h1".into();
        let mut store = MemoryClickStore::new();
        store.record_many("h1", "a", 3, at(10, 12));
        store.record_many("h1", "b", 5, at(11, 9));
        store.record("h1", "a", at(12, 8));
        // Outside the window.
        store.record_many("h1", "c", 10, at(1, 0));
        // Different hub.
        store.record_many("h2", "d", 7, at(11, 0));

        let rows = store.click_counts(&hub, at(9, 0), at(12, 23)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], ClickCount { link_id: "b".into(), clicks: 5 });
        assert_eq!(rows[1], ClickCount { link_id: "a".into(), clicks: 4 });
    }

    #[test]
    fn no_history_store_returns_no_rows() {
        let hub: HubId = "h1".into();
        let rows = NoClickHistory.click_counts(&hub, at(1, 0), at(28, 0)).unwrap();
        assert!(rows.is_empty());
    }
}
