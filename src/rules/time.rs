//! Time-based rule evaluation: show specific links during certain
//! hours/days, e.g. a support link 9–5 Mon–Fri.

use crate::LinkId;
use crate::config::{ClockTime, TimeConfig};
use chrono::{Datelike, NaiveDateTime, Timelike};

/// Ranges are checked in listed order and the first match wins — listed
/// order, not specificity. A range outside its `days` set is skipped, as is
/// a matching range with no link ids (it cannot promote anything, and later
/// ranges still get a chance).
pub(crate) fn evaluate(config: &TimeConfig, at: NaiveDateTime) -> Vec<LinkId> {
    let now = ClockTime::from_hm(at.hour(), at.minute());
    let weekday = at.weekday();

    for range in &config.time_ranges {
        if !range.days.contains_weekday(weekday) {
            continue;
        }

        let matched = if range.start <= range.end {
            // Normal range, e.g. 09:00–17:00: [start, end).
            now >= range.start && now < range.end
        } else {
            // Wrap past midnight, e.g. 22:00–06:00.
            now >= range.start || now < range.end
        };

        if matched && !range.link_ids.is_empty() {
            return range.link_ids.clone();
        }
    }

    Vec::new()
}
