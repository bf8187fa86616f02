//! Feedback to an external value-learning module.
//!
//! The learner is consulted through [`LearningModule`]. Which value it is fed
//! depends on its update rule:
//!
//! - on-policy (SARSA-style): the utility of the candidate actually chosen;
//! - off-policy (Q-learning-style): the utility of the greedy candidate,
//!   computed *before* the selection policy runs ([`greedy_reference`]). When
//!   the chosen candidate's utility differs from it, eligibility traces for the
//!   decision context are cleared.

use std::fmt;

use tracing::trace;

use crate::Candidate;

/// Which value the learner's update step consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum LearningRule {
    /// Update with the taken action's value.
    OnPolicy,
    /// Update with the greedy action's value.
    OffPolicy,
}

impl fmt::Display for LearningRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LearningRule::OnPolicy => "on-policy",
            LearningRule::OffPolicy => "off-policy",
        })
    }
}

/// Capability interface of the reinforcement-learning module.
pub trait LearningModule {
    /// Identifies the decision (e.g. the slot) being updated.
    type Context: Copy + fmt::Debug;

    fn is_enabled(&self) -> bool;

    fn active_rule(&self) -> LearningRule;

    /// Tabulate pending rewards before the update.
    fn tabulate_rewards(&mut self);

    fn update(&mut self, value: f64, contributed: bool, context: Self::Context);

    /// Drop accumulated eligibility for `context`.
    fn clear_eligibility(&mut self, context: Self::Context);
}

/// A learner that is always disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLearning;

impl LearningModule for NoLearning {
    type Context = ();

    fn is_enabled(&self) -> bool {
        false
    }

    fn active_rule(&self) -> LearningRule {
        LearningRule::OffPolicy
    }

    fn tabulate_rewards(&mut self) {}

    fn update(&mut self, _value: f64, _contributed: bool, _context: ()) {}

    fn clear_eligibility(&mut self, _context: ()) {}
}

/// Value and RL flag the off-policy update would use.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GreedyReference {
    pub value: f64,
    pub rl_contribution: bool,
}

/// Compute the greedy reference for a non-empty candidate slice.
///
/// With learning enabled under the off-policy rule this is the candidate with
/// the strictly greatest utility (first seen wins ties). Otherwise it is the
/// head candidate; the on-policy path never reads it, but it is still
/// recorded in the [`Decision`](crate::Decision).
///
/// Returns `None` only for an empty slice.
pub fn greedy_reference<A>(
    candidates: &[Candidate<A>],
    rl_enabled: bool,
    rule: LearningRule,
) -> Option<GreedyReference> {
    let head = candidates.first()?;
    let mut top = GreedyReference {
        value: head.numeric_value,
        rl_contribution: head.rl_contribution,
    };
    if rl_enabled && rule == LearningRule::OffPolicy {
        for c in &candidates[1..] {
            if c.numeric_value > top.value {
                top = GreedyReference {
                    value: c.numeric_value,
                    rl_contribution: c.rl_contribution,
                };
            }
        }
    }
    Some(top)
}

/// Report a finished selection to `learner`.
///
/// Does nothing when the learner is disabled.
pub fn feed_back<A, L: LearningModule + ?Sized>(
    learner: &mut L,
    chosen: &Candidate<A>,
    greedy: GreedyReference,
    context: L::Context,
) {
    if !learner.is_enabled() {
        return;
    }
    learner.tabulate_rewards();
    match learner.active_rule() {
        LearningRule::OnPolicy => {
            learner.update(chosen.numeric_value, chosen.rl_contribution, context);
        }
        LearningRule::OffPolicy => {
            learner.update(greedy.value, greedy.rl_contribution, context);
            if chosen.numeric_value != greedy.value {
                trace!(
                    ?context,
                    chosen = chosen.numeric_value,
                    greedy = greedy.value,
                    "non-greedy choice; clearing eligibility"
                );
                learner.clear_eligibility(context);
            }
        }
    }
}
