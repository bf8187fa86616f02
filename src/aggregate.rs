//! Numeric aggregation: fold a candidate's endorsements into one utility.

use std::fmt;
use std::str::FromStr;

use crate::{Candidate, EndorsementKind, Endorsement, Error};

/// How multiple endorsements for one candidate combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AggregationMode {
    #[default]
    Sum,
    #[cfg_attr(feature = "serde", serde(rename = "avg"))]
    Average,
}

impl AggregationMode {
    pub const ALL: [AggregationMode; 2] = [AggregationMode::Average, AggregationMode::Sum];

    /// Configuration name (`"sum"` / `"avg"`).
    pub fn name(self) -> &'static str {
        match self {
            AggregationMode::Sum => "sum",
            AggregationMode::Average => "avg",
        }
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggregationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| Error::UnknownAggregationMode(s.to_string()))
    }
}

/// Recompute `cand`'s utility from every endorsement in the decision.
///
/// Numeric-indifferent endorsements are summed first, then binary-indifferent
/// ones, each in slice order. A candidate nobody endorsed gets `default_value`
/// with one (virtual) contributor, so `Average` never divides by zero.
pub fn aggregate<A: PartialEq>(
    cand: &mut Candidate<A>,
    endorsements: &[Endorsement<A>],
    default_value: f64,
    mode: AggregationMode,
) {
    cand.numeric_value = 0.0;
    cand.contributors = 0;
    cand.rl_contribution = false;

    for kind in [
        EndorsementKind::NumericIndifferent,
        EndorsementKind::BinaryIndifferent,
    ] {
        for e in endorsements
            .iter()
            .filter(|e| e.kind == kind && e.action == cand.action)
        {
            cand.contributors += 1;
            cand.numeric_value += e.referent.as_number();
            if e.is_rl_sourced() {
                cand.rl_contribution = true;
            }
        }
    }

    if cand.contributors == 0 {
        cand.numeric_value = default_value;
        cand.contributors = 1;
    }

    if mode == AggregationMode::Average {
        cand.numeric_value /= cand.contributors as f64;
    }
}

/// [`aggregate`] every candidate in place.
pub fn aggregate_all<A: PartialEq>(
    candidates: &mut [Candidate<A>],
    endorsements: &[Endorsement<A>],
    default_value: f64,
    mode: AggregationMode,
) {
    for cand in candidates.iter_mut() {
        aggregate(cand, endorsements, default_value, mode);
    }
}
