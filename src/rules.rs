//! Per-rule-type evaluators.
//!
//! One focused module per rule type. Each evaluator is a pure function of
//! `(config, visitor/clock)` — except `performance`, which additionally
//! performs the one click-history read — and returns the link ids the rule
//! matched, in the order the rule wants them promoted. Evaluators never
//! fail; anything unanswerable yields an empty match.

pub(crate) mod device;
pub(crate) mod location;
pub(crate) mod performance;
pub(crate) mod time;
