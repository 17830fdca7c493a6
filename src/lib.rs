//! Rule-based link prioritization for link-hub pages.
//!
//! A *hub* is a public landing page aggregating links. Hub owners attach
//! rules (time, device, location, click performance) that decide which links
//! a given visitor sees first. This crate is the scoring core: it takes a
//! snapshot of a hub's links and rules plus a per-request [`VisitorContext`]
//! and returns the links in display order. Everything around it (CRUD,
//! HTTP, auth, geo-IP, persistence) is a collaborator.
//!
//! The evaluation is synchronous, stateless and total: for any input the
//! output is a permutation of the input links, and malformed rule data
//! degrades to "matches nothing" rather than an error — a public page view
//! must always render something.
//!
//! ```
//! use hubrank::{Link, Rule, VisitorContext, order_links};
//! use serde_json::json;
//!
//! let hub = "hub-1".into();
//! let links = vec![
//!     Link::new("a", "hub-1", "Blog", "https://example.com/blog", 1),
//!     Link::new("b", "hub-1", "Shop", "https://example.com/shop", 2),
//! ];
//! let rules = vec![Rule::parse(
//!     "r1",
//!     "hub-1",
//!     "device",
//!     &json!({ "deviceMappings": { "desktop": ["b"] } }),
//!     10,
//! )];
//!
//! let visitor = VisitorContext::new("203.0.113.7");
//! let ordered = order_links(&hub, &visitor, &links, &rules);
//! assert_eq!(ordered[0].id.as_str(), "b");
//! ```

#[macro_use]
mod macros;
mod api;
mod clicks;
mod config;
mod engine;
mod rules;
mod visitor;

pub use api::{Context, Engine, Evaluation, RuleTrace, order_links, order_links_at};
pub use clicks::{ClickCount, ClickStore, ClickStoreError, MemoryClickStore, NoClickHistory};
pub use config::{
    ClockTime, DaySet, DeviceConfig, LocationConfig, PerformanceConfig, RuleConfig, TimeConfig, TimeRange,
    TimeWindow,
};
pub use visitor::{DeviceType, VisitorContext, detect_device_type};

use serde::{Deserialize, Serialize};
use std::fmt;

// --- Identifiers ------------------------------------------------------------

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        ///
        /// String-backed rather than parsed: rule configs may carry stale or
        /// cross-hub identifiers, and the engine treats those permissively
        /// instead of rejecting them at the boundary.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id! {
    /// Unique identifier of a hub.
    HubId
}
string_id! {
    /// Identifier of a link, unique within its hub.
    LinkId
}
string_id! {
    /// Identifier of a rule, unique within its hub.
    RuleId
}

// --- Core model -------------------------------------------------------------

/// A single link on a hub page. Read-only to the engine.
///
/// `display_order` defines the default/fallback ordering; ties are broken by
/// stable input order. Inactive links are expected to be filtered out by the
/// caller before evaluation, mirroring the CRUD layer's queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub hub_id: HubId,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Link {
    pub fn new(
        id: impl Into<LinkId>,
        hub_id: impl Into<HubId>,
        title: impl Into<String>,
        url: impl Into<String>,
        display_order: i32,
    ) -> Self {
        Self {
            id: id.into(),
            hub_id: hub_id.into(),
            title: title.into(),
            url: url.into(),
            display_order,
            is_active: true,
        }
    }
}

/// A configured prioritization rule. Read-only to the engine.
///
/// Higher `priority` evaluates first; equal priorities keep their input
/// order (stable), so identical snapshots always produce identical
/// orderings. The typed payload lives in [`RuleConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub hub_id: HubId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub config: RuleConfig,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Rule {
    /// Build a rule from the raw `rule_type` / `rule_config` pair the CRUD
    /// layer stores. Unknown types and malformed payloads degrade to a
    /// config that matches nothing; this constructor never fails.
    pub fn parse(
        id: impl Into<RuleId>,
        hub_id: impl Into<HubId>,
        rule_type: &str,
        rule_config: &serde_json::Value,
        priority: i32,
    ) -> Self {
        Self {
            id: id.into(),
            hub_id: hub_id.into(),
            name: None,
            config: RuleConfig::parse(rule_type, rule_config),
            priority,
            is_active: true,
        }
    }
}

pub(crate) fn default_true() -> bool {
    true
}
