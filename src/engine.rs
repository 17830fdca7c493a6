//! Link-ordering engine.
//!
//! This module is the internal entry point for a single evaluation. The
//! public surface lives in `src/api.rs`; the engine itself is split into
//! focused submodules under `src/engine/` while keeping internal paths
//! stable (`crate::engine::evaluate`).
//!
//! ## How one evaluation flows
//!
//! ```text
//! rules (active) ── sort by priority desc, stable ──┐
//!                                                   │
//! visitor + reference time ─────────────────────────┼─ per-rule dispatch
//! click history (performance rules only) ───────────┘   (evaluator.rs)
//!                               │
//!                               v
//!                  Prioritized accumulator (ordering.rs)
//!                    - ordered, duplicate-free link ids
//!                    - first-match-wins per link
//!                               │
//!                               v
//!                  resolve against the hub's links (ordering.rs)
//!                    - stale ids silently dropped
//!                    - remainder appended by display_order
//!                               │
//!                               v
//!                   ordered links + per-rule trace
//! ```
//!
//! ## Responsibilities by module
//!
//! - `evaluator.rs`: activates and sorts rules, dispatches each one to its
//!   evaluator in `src/rules/`, records a compact per-rule trace.
//! - `ordering.rs`: the first-match-wins accumulator and the final
//!   resolution step that guarantees the output is a permutation of the
//!   input links.
//!
//! ## Invariants
//!
//! - Output is exactly a permutation of the input link set.
//! - Equal-priority rules evaluate in input order (stable sort), so
//!   identical snapshots always produce identical orderings.
//! - Nothing in here returns an error: malformed configs, unknown rule
//!   types and failed click lookups all degrade to "matches nothing".

#[path = "engine/evaluator.rs"]
mod evaluator;
#[path = "engine/ordering.rs"]
mod ordering;

pub(crate) use evaluator::{RuleOutcome, evaluate};
