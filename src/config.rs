//! Typed rule configuration and the permissive parsing boundary.
//!
//! The CRUD layer stores each rule as a `rule_type` string plus a free-form
//! JSON `rule_config` blob. This module is where that blob becomes a typed
//! [`RuleConfig`] variant so the per-type evaluators in `src/rules/` never
//! see raw JSON. Parsing is permissive by contract: an unknown type or a
//! payload that does not deserialize degrades to [`RuleConfig::Unknown`]
//! (which matches nothing), never an error — a public page view must always
//! get *some* ordering.
//!
//! Field names are preserved from the stored JSON exactly, including its
//! mixed camel/snake casing (`timeRanges` vs `link_ids`).

use crate::LinkId;
use chrono::{Duration, Weekday};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

// --- Rule config union ------------------------------------------------------

/// Variant-typed rule payload, keyed by the stored `rule_type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule_type", content = "rule_config", rename_all = "lowercase")]
pub enum RuleConfig {
    /// Show specific links during certain hours/days.
    Time(TimeConfig),
    /// Show different links per device class.
    Device(DeviceConfig),
    /// Show specific links to visitors from certain countries.
    Location(LocationConfig),
    /// Auto-promote the best-clicking links.
    Performance(PerformanceConfig),
    /// Unrecognized rule type or malformed payload; matches nothing.
    #[serde(other)]
    Unknown,
}

impl RuleConfig {
    /// Parse a stored `rule_type` / `rule_config` pair, degrading anything
    /// unrecognized or malformed to [`RuleConfig::Unknown`].
    pub fn parse(rule_type: &str, rule_config: &serde_json::Value) -> Self {
        let parsed = match rule_type {
            "time" => serde_json::from_value(rule_config.clone()).map(RuleConfig::Time),
            "device" => serde_json::from_value(rule_config.clone()).map(RuleConfig::Device),
            "location" => serde_json::from_value(rule_config.clone()).map(RuleConfig::Location),
            "performance" => serde_json::from_value(rule_config.clone()).map(RuleConfig::Performance),
            other => {
                tracing::debug!(rule_type = other, "unrecognized rule type; rule will match nothing");
                return RuleConfig::Unknown;
            }
        };

        match parsed {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(rule_type, error = %err, "malformed rule config; rule will match nothing");
                RuleConfig::Unknown
            }
        }
    }

    /// Short tag used in traces and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RuleConfig::Time(_) => "time",
            RuleConfig::Device(_) => "device",
            RuleConfig::Location(_) => "location",
            RuleConfig::Performance(_) => "performance",
            RuleConfig::Unknown => "unknown",
        }
    }
}

// --- Time rules -------------------------------------------------------------

/// Config for a time rule: ranges are evaluated in listed order and the
/// first match wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeConfig {
    #[serde(default, rename = "timeRanges")]
    pub time_ranges: Vec<TimeRange>,
}

/// One window of wall-clock time, optionally restricted to weekdays.
///
/// `start > end` wraps past midnight (for example 22:00–06:00).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: ClockTime,
    pub end: ClockTime,
    #[serde(default = "DaySet::full_week")]
    pub days: DaySet,
    #[serde(default)]
    pub link_ids: Vec<LinkId>,
}

/// A time of day in minutes since midnight, parsed from 24-hour `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Parse 24-hour `HH:MM` (`9:05` and `09:05` both accepted).
    pub fn parse(s: &str) -> Option<Self> {
        let caps = regex!(r"^([01]?\d|2[0-3]):([0-5]\d)$").captures(s)?;
        let hours: u16 = caps[1].parse().ok()?;
        let minutes: u16 = caps[2].parse().ok()?;
        Some(Self(hours * 60 + minutes))
    }

    pub fn from_hm(hours: u32, minutes: u32) -> Self {
        Self((hours * 60 + minutes).min(24 * 60 - 1) as u16)
    }

    pub fn minutes_since_midnight(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ClockTime::parse(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid HH:MM clock time: {raw:?}")))
    }
}

bitflags::bitflags! {
    /// Set of weekdays a time range applies to, indexed 0=Sunday..6=Saturday
    /// in the stored JSON.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DaySet: u8 {
        const SUN = 1 << 0;
        const MON = 1 << 1;
        const TUE = 1 << 2;
        const WED = 1 << 3;
        const THU = 1 << 4;
        const FRI = 1 << 5;
        const SAT = 1 << 6;
    }
}

impl DaySet {
    /// All seven days; the default when a range lists none.
    pub fn full_week() -> Self {
        Self::all()
    }

    /// Day by stored index (0=Sunday..6=Saturday); out-of-range indexes are
    /// ignored by the caller.
    pub fn from_index(index: u8) -> Option<Self> {
        (index <= 6).then(|| Self::from_bits_truncate(1u8 << index))
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        Self::from_bits_truncate(1u8 << weekday.num_days_from_sunday())
    }

    pub fn contains_weekday(self, weekday: Weekday) -> bool {
        self.contains(Self::from_weekday(weekday))
    }
}

impl Serialize for DaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let indexes: Vec<u8> = (0u8..7).filter(|i| self.bits() & (1u8 << i) != 0).collect();
        indexes.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DaySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Out-of-range day numbers are dropped, not errors: a config saying
        // [1, 2, 9] still restricts to Monday and Tuesday.
        let indexes = Vec::<i64>::deserialize(deserializer)?;
        let mut days = DaySet::empty();
        for index in indexes {
            if let Ok(index) = u8::try_from(index) {
                if let Some(day) = DaySet::from_index(index) {
                    days |= day;
                }
            }
        }
        Ok(days)
    }
}

// --- Device rules -----------------------------------------------------------

/// Config for a device rule: device class → links to promote.
///
/// Keys stay strings so an unmapped or unknown device key simply yields no
/// match instead of failing the whole rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default, rename = "deviceMappings")]
    pub device_mappings: HashMap<String, Vec<LinkId>>,
}

// --- Location rules ---------------------------------------------------------

/// Config for a location rule.
///
/// A single `link_ids` list is shared by every configured country; mapping
/// different countries to different link sets takes multiple rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub link_ids: Vec<LinkId>,
}

// --- Performance rules ------------------------------------------------------

/// Config for a performance rule: promote the smallest leading set of links,
/// by descending click count, whose cumulative share of total clicks reaches
/// `top_percentage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceConfig {
    #[serde(default = "default_top_percentage", rename = "topPercentage")]
    pub top_percentage: f64,
    #[serde(default, rename = "timeWindow")]
    pub time_window: TimeWindow,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self { top_percentage: default_top_percentage(), time_window: TimeWindow::default() }
    }
}

fn default_top_percentage() -> f64 {
    30.0
}

/// Click-history lookback window. Unrecognized values parse to the 7-day
/// default rather than erroring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeWindow {
    Hours24,
    #[default]
    Days7,
    Days30,
}

impl TimeWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeWindow::Hours24 => "24h",
            TimeWindow::Days7 => "7d",
            TimeWindow::Days30 => "30d",
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            TimeWindow::Hours24 => Duration::hours(24),
            TimeWindow::Days7 => Duration::days(7),
            TimeWindow::Days30 => Duration::days(30),
        }
    }
}

impl Serialize for TimeWindow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TimeWindow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "24h" => TimeWindow::Hours24,
            "7d" => TimeWindow::Days7,
            "30d" => TimeWindow::Days30,
            _ => TimeWindow::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clock_time_parsing() {
        // Array of (expected_minutes, input)
        let valid: Vec<(u16, &str)> = vec![
            (0, "00:00"),
            (9 * 60, "09:00"),
            (9 * 60, "9:00"),
            (9 * 60 + 5, "9:05"),
            (17 * 60 + 30, "17:30"),
            (23 * 60 + 59, "23:59"),
        ];
        for (expected, input) in valid {
            let parsed = ClockTime::parse(input).unwrap_or_else(|| panic!("should parse {input:?}"));
            assert_eq!(parsed.minutes_since_midnight(), expected, "input: {input:?}");
        }

        for input in ["24:00", "12:60", "12", "12:5", "noon", "", "-1:00"] {
            assert!(ClockTime::parse(input).is_none(), "should reject {input:?}");
        }
    }

    #[test]
    fn clock_time_display_round_trips() {
        let t = ClockTime::parse("9:05").unwrap();
        assert_eq!(t.to_string(), "09:05");
        assert_eq!(serde_json::to_value(t).unwrap(), json!("09:05"));
    }

    #[test]
    fn day_set_ignores_out_of_range_indexes() {
        let days: DaySet = serde_json::from_value(json!([1, 2, 9, -3])).unwrap();
        assert!(days.contains_weekday(Weekday::Mon));
        assert!(days.contains_weekday(Weekday::Tue));
        assert!(!days.contains_weekday(Weekday::Sun));
        assert!(!days.contains_weekday(Weekday::Sat));
    }

    #[test]
    fn time_range_defaults_to_full_week() {
        let range: TimeRange =
            serde_json::from_value(json!({ "start": "09:00", "end": "17:00" })).unwrap();
        assert_eq!(range.days, DaySet::full_week());
        assert!(range.link_ids.is_empty());
    }

    #[test]
    fn time_window_unknown_values_default_to_seven_days() {
        for raw in ["24h", "7d", "30d", "90d", "fortnight", ""] {
            let window: TimeWindow = serde_json::from_value(json!(raw)).unwrap();
            let expected = match raw {
                "24h" => TimeWindow::Hours24,
                "30d" => TimeWindow::Days30,
                _ => TimeWindow::Days7,
            };
            assert_eq!(window, expected, "raw: {raw:?}");
        }
    }

    #[test]
    fn parse_degrades_unknown_rule_type() {
        let config = RuleConfig::parse("weather", &json!({ "condition": "rain" }));
        assert_eq!(config, RuleConfig::Unknown);
    }

    #[test]
    fn parse_degrades_malformed_payload() {
        // timeRanges should be an array of objects.
        let config = RuleConfig::parse("time", &json!({ "timeRanges": "always" }));
        assert_eq!(config, RuleConfig::Unknown);

        // A malformed start time poisons the whole rule, not the process.
        let config = RuleConfig::parse(
            "time",
            &json!({ "timeRanges": [{ "start": "whenever", "end": "17:00" }] }),
        );
        assert_eq!(config, RuleConfig::Unknown);
    }

    #[test]
    fn parse_accepts_stored_payload_shapes() {
        let config = RuleConfig::parse(
            "performance",
            &json!({ "topPercentage": 60, "timeWindow": "24h" }),
        );
        match config {
            RuleConfig::Performance(c) => {
                assert_eq!(c.top_percentage, 60.0);
                assert_eq!(c.time_window, TimeWindow::Hours24);
            }
            other => panic!("expected performance config, got {other:?}"),
        }

        // Defaults when the payload is empty.
        let config = RuleConfig::parse("performance", &json!({}));
        match config {
            RuleConfig::Performance(c) => {
                assert_eq!(c.top_percentage, 30.0);
                assert_eq!(c.time_window, TimeWindow::Days7);
            }
            other => panic!("expected performance config, got {other:?}"),
        }
    }

    #[test]
    fn rule_row_deserializes_with_adjacent_tag() {
        let rule: crate::Rule = serde_json::from_value(json!({
            "id": "r1",
            "hub_id": "h1",
            "rule_type": "location",
            "rule_config": { "countries": ["SE", "NO"], "link_ids": ["a"] },
            "priority": 5
        }))
        .unwrap();

        assert!(rule.is_active);
        assert_eq!(rule.priority, 5);
        match &rule.config {
            RuleConfig::Location(c) => assert_eq!(c.countries, vec!["SE", "NO"]),
            other => panic!("expected location config, got {other:?}"),
        }
    }
}
