//! Performance-based rule evaluation: auto-promote the links visitors
//! actually click.
//!
//! The match set is a cumulative-coverage top-K: the smallest leading set of
//! links, by descending click count, whose cumulative share of total clicks
//! reaches `topPercentage` — not a fixed percentile of the link count. With
//! any data at all the top link is always included, since the threshold is
//! reached at the latest by the full sum.

use crate::config::PerformanceConfig;
use crate::{ClickStore, HubId, LinkId};
use chrono::NaiveDateTime;

/// A failed click-history lookup degrades to "no click data" and an empty
/// match; it must never abort the surrounding evaluation.
pub(crate) fn evaluate<S: ClickStore>(
    config: &PerformanceConfig,
    hub_id: &HubId,
    clicks: &S,
    now: NaiveDateTime,
) -> Vec<LinkId> {
    let window_start = now - config.time_window.duration();

    let mut rows = match clicks.click_counts(hub_id, window_start, now) {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(
                hub = %hub_id,
                window = config.time_window.as_str(),
                error = %err,
                "click history lookup failed; performance rule matches nothing"
            );
            return Vec::new();
        }
    };

    if rows.is_empty() {
        return Vec::new();
    }

    // The store contract says descending already; the stable re-sort keeps
    // its tie order while not trusting a sloppy backend.
    rows.sort_by(|a, b| b.clicks.cmp(&a.clicks));

    let total: u64 = rows.iter().map(|row| row.clicks).sum();
    let threshold = total as f64 * config.top_percentage / 100.0;

    let mut cumulative = 0u64;
    let mut top = Vec::new();
    for row in rows {
        cumulative += row.clicks;
        top.push(row.link_id);
        if cumulative as f64 >= threshold {
            break;
        }
    }

    top
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeWindow;
    use crate::{ClickCount, ClickStoreError, MemoryClickStore};
    use chrono::NaiveDate;

    struct BrokenStore;

    impl ClickStore for BrokenStore {
        fn click_counts(
            &self,
            _hub_id: &HubId,
            _window_start: NaiveDateTime,
            _window_end: NaiveDateTime,
        ) -> Result<Vec<ClickCount>, ClickStoreError> {
            Err(ClickStoreError::Unavailable("connection refused".into()))
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap().and_hms_opt(10, 30, 0).unwrap()
    }

    fn config(top_percentage: f64, time_window: TimeWindow) -> PerformanceConfig {
        PerformanceConfig { top_percentage, time_window }
    }

    fn store_with(counts: &[(&str, u64)]) -> MemoryClickStore {
        let mut store = MemoryClickStore::new();
        for (link, clicks) in counts {
            store.record_many("h1", *link, *clicks, now() - chrono::Duration::hours(1));
        }
        store
    }

    #[test]
    fn cumulative_coverage_stops_at_the_crossing_link() {
        let store = store_with(&[("a", 50), ("b", 30), ("c", 20)]);
        let hub: HubId = "h1".into();

        // 50 < 60, 50+30 = 80 >= 60: a and b.
        let top = evaluate(&config(60.0, TimeWindow::Days7), &hub, &store, now());
        assert_eq!(top, vec![LinkId::from("a"), LinkId::from("b")]);
    }

    #[test]
    fn top_link_always_included_once_any_data_exists() {
        let store = store_with(&[("a", 50), ("b", 30), ("c", 20)]);
        let hub: HubId = "h1".into();

        let top = evaluate(&config(10.0, TimeWindow::Days7), &hub, &store, now());
        assert_eq!(top, vec![LinkId::from("a")]);
    }

    #[test]
    fn full_coverage_takes_every_clicked_link() {
        let store = store_with(&[("a", 50), ("b", 30), ("c", 20)]);
        let hub: HubId = "h1".into();

        let top = evaluate(&config(100.0, TimeWindow::Days7), &hub, &store, now());
        assert_eq!(top, vec![LinkId::from("a"), LinkId::from("b"), LinkId::from("c")]);
    }

    #[test]
    fn no_click_data_matches_nothing() {
        let store = MemoryClickStore::new();
        let hub: HubId = "h1".into();
        assert!(evaluate(&config(30.0, TimeWindow::Days7), &hub, &store, now()).is_empty());
    }

    #[test]
    fn lookup_failure_matches_nothing() {
        let hub: HubId = "h1".into();
        assert!(evaluate(&config(30.0, TimeWindow::Days7), &hub, &BrokenStore, now()).is_empty());
    }

    #[test]
    fn window_excludes_older_clicks() {
        let mut store = MemoryClickStore::new();
        // Two days old: inside 7d, outside 24h.
        store.record_many("h1", "old", 40, now() - chrono::Duration::days(2));
        store.record_many("h1", "fresh", 10, now() - chrono::Duration::hours(2));
        let hub: HubId = "h1".into();

        let top = evaluate(&config(100.0, TimeWindow::Hours24), &hub, &store, now());
        assert_eq!(top, vec![LinkId::from("fresh")]);

        let top = evaluate(&config(100.0, TimeWindow::Days7), &hub, &store, now());
        assert_eq!(top, vec![LinkId::from("old"), LinkId::from("fresh")]);
    }
}
