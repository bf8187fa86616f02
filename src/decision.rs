//! Decision envelope for selection outputs.
//!
//! A [`Decision`] is a small, audit-friendly record of one selection: which
//! candidate won, under which policy, the greedy reference handed to the
//! learner, and typed [`DecisionNote`]s explaining how the choice happened.
//! When diagnostics are on it also carries a per-candidate [`CandidateReport`].

use std::fmt;

use crate::{GreedyReference, SelectionPolicy};

/// Audit notes attached to a decision.
///
/// Notes are intentionally small, typed, and stable. Prefer adding new variants
/// over changing existing semantics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecisionNote {
    /// Head of the candidate list.
    Head,

    /// Tail of the candidate list.
    Tail,

    /// Uniform draw over all candidates.
    UniformDraw,

    /// Proportional selection found no positive utility and drew uniformly instead.
    ZeroTotalFallbackToUniform,

    /// A weighted cumulative walk picked the candidate.
    SampledFromDistribution,

    /// Epsilon-greedy took its exploration branch.
    EpsilonExplore { epsilon: f64 },

    /// Epsilon-greedy took its exploitation branch and the maximum was unique.
    Greedy,

    /// Epsilon-greedy took its exploitation branch and drew among `tied` maxima.
    GreedyTieBroken { tied: usize },
}

/// One row of the per-candidate diagnostic report.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateReport {
    /// Position in the candidate slice.
    pub index: usize,
    /// Aggregated utility at selection time.
    pub utility: f64,
    /// Normalized selection probability (Boltzmann only).
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub probability: Option<f64>,
}

impl fmt::Display for CandidateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value (Sum) = {:.6}", self.utility)?;
        if let Some(p) = self.probability {
            write!(f, ", (Prob) = {:.6}", p)?;
        }
        Ok(())
    }
}

/// A single selection in a unified envelope.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decision {
    /// The policy that produced this decision.
    pub policy: SelectionPolicy,
    /// Index of the chosen candidate.
    pub chosen: usize,
    /// Greedy reference computed before the policy ran.
    pub greedy: GreedyReference,
    /// Audit notes describing why this choice happened.
    pub notes: Vec<DecisionNote>,
    /// Per-candidate report; empty unless diagnostics were enabled.
    pub report: Vec<CandidateReport>,
}

impl Decision {
    /// The chosen element of `candidates` (the slice the decision was made over).
    pub fn pick<'a, T>(&self, candidates: &'a [T]) -> Option<&'a T> {
        candidates.get(self.chosen)
    }
}
