//! Rule activation, dispatch and the evaluation loop.

use super::ordering::{Prioritized, resolve};
use crate::config::RuleConfig;
use crate::{ClickStore, HubId, Link, LinkId, Rule, RuleId, VisitorContext, rules};
use chrono::NaiveDateTime;
use std::time::{Duration, Instant};

/// Result of one engine run: the ordered links plus a compact per-rule
/// trace. Converted to the public `Evaluation` by `src/api.rs`.
#[derive(Debug)]
pub(crate) struct Run {
    pub ordered: Vec<Link>,
    pub outcomes: Vec<RuleOutcome>,
    pub elapsed: Duration,
}

/// What a single rule contributed, in evaluation order.
#[derive(Debug)]
pub(crate) struct RuleOutcome {
    pub rule_id: RuleId,
    pub kind: &'static str,
    pub matched: Vec<LinkId>,
    /// How many of the matched ids were newly promoted (not already claimed
    /// by a higher-priority rule).
    pub promoted: usize,
}

/// Evaluate a hub's rules against one visitor and order its links.
///
/// `at` resolves "now" for time and performance rules. The call is total:
/// whatever the rules contain, the result is a permutation of `links`.
pub(crate) fn evaluate<S: ClickStore>(
    hub_id: &HubId,
    visitor: &VisitorContext,
    links: &[Link],
    rules: &[Rule],
    clicks: &S,
    at: NaiveDateTime,
) -> Run {
    let started = Instant::now();

    // Callers are expected to pass active rules only, but filtering again
    // here keeps the engine safe against sloppy callers. The sort is
    // stable: equal priorities keep their input order.
    let mut active: Vec<&Rule> = rules.iter().filter(|r| r.is_active).collect();
    active.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut prioritized = Prioritized::new();
    let mut outcomes = Vec::with_capacity(active.len());

    for rule in active {
        let matched = matching_link_ids(rule, visitor, hub_id, clicks, at);

        let mut promoted = 0;
        for id in &matched {
            if prioritized.push(id.clone()) {
                promoted += 1;
            }
        }

        outcomes.push(RuleOutcome {
            rule_id: rule.id.clone(),
            kind: rule.config.kind(),
            matched,
            promoted,
        });
    }

    Run { ordered: resolve(&prioritized, links), outcomes, elapsed: started.elapsed() }
}

/// Dispatch one rule to its evaluator. Exhaustive over the config variants;
/// unknown configs match nothing.
fn matching_link_ids<S: ClickStore>(
    rule: &Rule,
    visitor: &VisitorContext,
    hub_id: &HubId,
    clicks: &S,
    at: NaiveDateTime,
) -> Vec<LinkId> {
    match &rule.config {
        RuleConfig::Time(config) => rules::time::evaluate(config, at),
        RuleConfig::Device(config) => rules::device::evaluate(config, visitor),
        RuleConfig::Location(config) => rules::location::evaluate(config, visitor),
        RuleConfig::Performance(config) => rules::performance::evaluate(config, hub_id, clicks, at),
        RuleConfig::Unknown => {
            tracing::debug!(rule = %rule.id, "unknown rule config matches nothing");
            Vec::new()
        }
    }
}
