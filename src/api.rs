//! Public surface of the engine.

use crate::clicks::{ClickStore, NoClickHistory};
use crate::engine;
use crate::{HubId, Link, LinkId, Rule, RuleId, VisitorContext};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::time::Duration;

/// Evaluation context.
///
/// Holds the environment needed to resolve "now" for time and performance
/// rules. Injecting it keeps evaluations deterministic and lets callers
/// evaluate in the visitor's local wall time.
#[derive(Debug, Clone)]
pub struct Context {
    /// Reference datetime used as "now" during evaluation.
    pub reference_time: NaiveDateTime,
}

impl Default for Context {
    fn default() -> Self {
        if cfg!(test) {
            // A Wednesday, mid-morning.
            let date = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
            let time = NaiveTime::from_hms_opt(10, 30, 0).unwrap();
            Self { reference_time: NaiveDateTime::new(date, time) }
        } else {
            Self { reference_time: Local::now().naive_local() }
        }
    }
}

/// The link-ordering engine.
///
/// Stateless and reentrant: it holds nothing besides the injected
/// click-history collaborator, so one instance can serve concurrent
/// evaluations across visitors and hubs. [`Engine::new`] builds an engine
/// with no click history, in which performance rules simply match nothing.
#[derive(Debug, Clone, Default)]
pub struct Engine<S = NoClickHistory> {
    clicks: S,
}

impl Engine<NoClickHistory> {
    pub fn new() -> Self {
        Self { clicks: NoClickHistory }
    }
}

impl<S: ClickStore> Engine<S> {
    pub fn with_click_store(clicks: S) -> Self {
        Self { clicks }
    }

    /// Order a hub's links for one visitor, using the default [`Context`].
    ///
    /// Never fails: the result is a permutation of `links` for any input,
    /// falling back to plain `display_order` when nothing matches.
    pub fn evaluate_link_order(
        &self,
        hub_id: &HubId,
        visitor: &VisitorContext,
        links: &[Link],
        rules: &[Rule],
    ) -> Vec<Link> {
        self.evaluate_link_order_at(hub_id, visitor, links, rules, &Context::default())
    }

    /// Order a hub's links for one visitor at a specific reference time.
    pub fn evaluate_link_order_at(
        &self,
        hub_id: &HubId,
        visitor: &VisitorContext,
        links: &[Link],
        rules: &[Rule],
        context: &Context,
    ) -> Vec<Link> {
        engine::evaluate(hub_id, visitor, links, rules, &self.clicks, context.reference_time).ordered
    }

    /// Like [`Engine::evaluate_link_order_at`], but also returns a per-rule
    /// trace of what matched and what was newly promoted. Useful for
    /// debugging rule setups; the plain path does not allocate the trace
    /// copies.
    pub fn evaluate_verbose_at(
        &self,
        hub_id: &HubId,
        visitor: &VisitorContext,
        links: &[Link],
        rules: &[Rule],
        context: &Context,
    ) -> Evaluation {
        let run = engine::evaluate(hub_id, visitor, links, rules, &self.clicks, context.reference_time);

        Evaluation {
            links: run.ordered,
            trace: run.outcomes.into_iter().map(outcome_to_trace).collect(),
            elapsed: run.elapsed,
        }
    }
}

/// Result of a verbose evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// The ordered links (same contents as the plain evaluation path).
    pub links: Vec<Link>,
    /// Per-rule outcomes, in evaluation order (priority descending).
    pub trace: Vec<RuleTrace>,
    /// Total elapsed evaluation time.
    pub elapsed: Duration,
}

/// What one rule contributed to an evaluation.
#[derive(Debug, Clone)]
pub struct RuleTrace {
    pub rule_id: RuleId,
    /// Rule type tag, e.g. `"device"` or `"performance"`.
    pub rule_kind: &'static str,
    /// Link ids the rule matched, in the rule's own order.
    pub matched: Vec<LinkId>,
    /// How many of those were newly promoted (first-match-wins).
    pub promoted: usize,
}

fn outcome_to_trace(outcome: engine::RuleOutcome) -> RuleTrace {
    RuleTrace {
        rule_id: outcome.rule_id,
        rule_kind: outcome.kind,
        matched: outcome.matched,
        promoted: outcome.promoted,
    }
}

/// Order a hub's links with no click history and the default [`Context`].
///
/// # Example
/// ```
/// use hubrank::{Link, VisitorContext, order_links};
///
/// let links = vec![Link::new("a", "h1", "A", "https://example.com/a", 1)];
/// let ordered = order_links(&"h1".into(), &VisitorContext::new("203.0.113.7"), &links, &[]);
/// assert_eq!(ordered.len(), 1);
/// ```
pub fn order_links(hub_id: &HubId, visitor: &VisitorContext, links: &[Link], rules: &[Rule]) -> Vec<Link> {
    Engine::new().evaluate_link_order(hub_id, visitor, links, rules)
}

/// Order a hub's links with no click history at a specific reference time.
pub fn order_links_at(
    hub_id: &HubId,
    visitor: &VisitorContext,
    links: &[Link],
    rules: &[Rule],
    context: &Context,
) -> Vec<Link> {
    Engine::new().evaluate_link_order_at(hub_id, visitor, links, rules, context)
}
