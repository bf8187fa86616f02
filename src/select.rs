//! Selection policies.
//!
//! Every policy picks exactly one index from a non-empty, already-aggregated
//! candidate slice. Slice order is authoritative: `First`/`Last`, the tie
//! set of epsilon-greedy, and the cumulative walks of the two weighted
//! policies all follow it, and the walks sum in that order (never re-sorted)
//! so boundary draws resolve identically across runs.
//!
//! Random draws per call:
//!
//! | policy                | draws                                          |
//! |-----------------------|------------------------------------------------|
//! | `First`, `Last`       | none                                           |
//! | `RandomUniform`       | one int                                        |
//! | `SoftmaxProportional` | one float, or one int when no utility is > 0   |
//! | `EpsilonGreedy`       | one float, then one int if exploring or tied   |
//! | `Boltzmann`           | one float                                      |

use std::fmt;
use std::str::FromStr;

use tracing::trace;

use crate::alloc::{boltzmann_weights, proportional_weights};
use crate::{
    Candidate, CandidateReport, DecisionNote, Error, ParameterStore, RandomSource, Result, EPSILON,
    TEMPERATURE,
};

/// Which algorithm picks among the candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SelectionPolicy {
    /// Sample with probability proportional to `exp((u - max_u) / temperature)`.
    Boltzmann,
    /// With probability epsilon draw uniformly, otherwise take the maximum.
    EpsilonGreedy,
    /// Head of the list.
    First,
    /// Tail of the list.
    Last,
    /// Uniform draw.
    RandomUniform,
    /// Sample with probability proportional to positive utility.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "softmax"))]
    SoftmaxProportional,
}

impl SelectionPolicy {
    pub const ALL: [SelectionPolicy; 6] = [
        SelectionPolicy::Boltzmann,
        SelectionPolicy::EpsilonGreedy,
        SelectionPolicy::First,
        SelectionPolicy::Last,
        SelectionPolicy::RandomUniform,
        SelectionPolicy::SoftmaxProportional,
    ];

    /// Configuration name.
    pub fn name(self) -> &'static str {
        match self {
            SelectionPolicy::Boltzmann => "boltzmann",
            SelectionPolicy::EpsilonGreedy => "epsilon-greedy",
            SelectionPolicy::First => "first",
            SelectionPolicy::Last => "last",
            SelectionPolicy::RandomUniform => "random-uniform",
            SelectionPolicy::SoftmaxProportional => "softmax",
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SelectionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| Error::UnknownPolicy(s.to_string()))
    }
}

/// Output of [`select`].
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Index of the chosen candidate.
    pub chosen: usize,
    pub notes: Vec<DecisionNote>,
    /// Per-candidate report; empty unless requested.
    pub report: Vec<CandidateReport>,
}

/// Pick one candidate under `policy`.
///
/// `params` supplies `epsilon` and `temperature`. With `diagnostics` set the
/// returned [`Selection`] carries one [`CandidateReport`] per candidate
/// (Boltzmann rows include the normalized probability) and each row is
/// emitted as a `trace` event.
pub fn select<A, R: RandomSource + ?Sized>(
    policy: SelectionPolicy,
    candidates: &[Candidate<A>],
    params: &ParameterStore,
    rng: &mut R,
    diagnostics: bool,
) -> Result<Selection> {
    if candidates.is_empty() {
        return Err(Error::EmptyCandidates);
    }

    let mut probabilities: Option<Vec<f64>> = None;
    let (chosen, note) = match policy {
        SelectionPolicy::First => (select_first(candidates)?, DecisionNote::Head),
        SelectionPolicy::Last => (select_last(candidates)?, DecisionNote::Tail),
        SelectionPolicy::RandomUniform => {
            (select_random_uniform(candidates, rng)?, DecisionNote::UniformDraw)
        }
        SelectionPolicy::SoftmaxProportional => select_softmax_proportional(candidates, rng)?,
        SelectionPolicy::EpsilonGreedy => {
            select_epsilon_greedy(candidates, params.get_value(EPSILON), rng)?
        }
        SelectionPolicy::Boltzmann => {
            let (chosen, probs) =
                select_boltzmann(candidates, params.get_value(TEMPERATURE), rng, diagnostics)?;
            probabilities = probs;
            (chosen, DecisionNote::SampledFromDistribution)
        }
    };

    let report = if diagnostics {
        candidate_report(candidates, probabilities.as_deref())
    } else {
        Vec::new()
    };

    Ok(Selection {
        chosen,
        notes: vec![note],
        report,
    })
}

fn candidate_report<A>(
    candidates: &[Candidate<A>],
    probabilities: Option<&[f64]>,
) -> Vec<CandidateReport> {
    candidates
        .iter()
        .enumerate()
        .map(|(index, c)| {
            let row = CandidateReport {
                index,
                utility: c.numeric_value,
                probability: probabilities.and_then(|p| p.get(index).copied()),
            };
            trace!(candidate = index, "{row}");
            row
        })
        .collect()
}

fn ensure_finite<A>(candidates: &[Candidate<A>]) -> Result<()> {
    match candidates
        .iter()
        .position(|c| !c.numeric_value.is_finite())
    {
        Some(index) => Err(Error::NonFiniteUtility {
            index,
            value: candidates[index].numeric_value,
        }),
        None => Ok(()),
    }
}

/// Head of the list.
pub fn select_first<A>(candidates: &[Candidate<A>]) -> Result<usize> {
    if candidates.is_empty() {
        return Err(Error::EmptyCandidates);
    }
    Ok(0)
}

/// Tail of the list.
pub fn select_last<A>(candidates: &[Candidate<A>]) -> Result<usize> {
    candidates
        .len()
        .checked_sub(1)
        .ok_or(Error::EmptyCandidates)
}

/// One uniform integer draw over all candidates.
pub fn select_random_uniform<A, R: RandomSource + ?Sized>(
    candidates: &[Candidate<A>],
    rng: &mut R,
) -> Result<usize> {
    if candidates.is_empty() {
        return Err(Error::EmptyCandidates);
    }
    Ok(rng.uniform_int(candidates.len()))
}

/// Proportional to positive utility; uniform when nothing is positive.
///
/// Draws `r` in `[0, 1)`, sets `target = r * total`, and walks the slice
/// accumulating only positive utilities; the first candidate whose running sum
/// reaches `target` wins. Non-positive candidates are never chosen unless the
/// uniform fallback fires. Utilities whose sum overflows are rescaled by the
/// largest one first (see [`proportional_weights`](crate::proportional_weights)).
pub fn select_softmax_proportional<A, R: RandomSource + ?Sized>(
    candidates: &[Candidate<A>],
    rng: &mut R,
) -> Result<(usize, DecisionNote)> {
    if candidates.is_empty() {
        return Err(Error::EmptyCandidates);
    }
    ensure_finite(candidates)?;

    let utilities: Vec<f64> = candidates.iter().map(|c| c.numeric_value).collect();
    let (weights, total) = proportional_weights(&utilities);
    if total == 0.0 {
        let chosen = select_random_uniform(candidates, rng)?;
        return Ok((chosen, DecisionNote::ZeroTotalFallbackToUniform));
    }

    let target = rng.uniform_float() * total;
    let mut sum = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        if w > 0.0 {
            sum += w;
            if target <= sum {
                return Ok((i, DecisionNote::SampledFromDistribution));
            }
        }
    }
    Err(Error::DistributionExhausted {
        policy: SelectionPolicy::SoftmaxProportional,
    })
}

/// Epsilon-greedy with uniform tie-breaking among the maxima.
///
/// Draws `r` in `[0, 1)`; `r < epsilon` explores uniformly over all
/// candidates. Otherwise the maximum wins; if `k > 1` candidates share it,
/// one more integer draw `j` in `[0, k)` picks the `j`-th of them in slice
/// order.
pub fn select_epsilon_greedy<A, R: RandomSource + ?Sized>(
    candidates: &[Candidate<A>],
    epsilon: f64,
    rng: &mut R,
) -> Result<(usize, DecisionNote)> {
    if candidates.is_empty() {
        return Err(Error::EmptyCandidates);
    }
    ensure_finite(candidates)?;

    if rng.uniform_float() < epsilon {
        let chosen = select_random_uniform(candidates, rng)?;
        return Ok((chosen, DecisionNote::EpsilonExplore { epsilon }));
    }

    let mut top = 0usize;
    let mut top_value = candidates[0].numeric_value;
    let mut tied = 0usize;
    for (i, c) in candidates.iter().enumerate() {
        if c.numeric_value > top_value {
            top = i;
            top_value = c.numeric_value;
            tied = 1;
        } else if c.numeric_value == top_value {
            tied += 1;
        }
    }
    if tied == 1 {
        return Ok((top, DecisionNote::Greedy));
    }

    let j = rng.uniform_int(tied);
    candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.numeric_value == top_value)
        .nth(j)
        .map(|(i, _)| (i, DecisionNote::GreedyTieBroken { tied }))
        .ok_or(Error::DistributionExhausted {
            policy: SelectionPolicy::EpsilonGreedy,
        })
}

/// Boltzmann (Gibbs) sampling at `temperature`.
///
/// Weights are `exp((u - max_u) / temperature)`; see
/// [`boltzmann_weights`](crate::boltzmann_weights). With `with_probabilities`
/// the normalized probabilities `w_i / total` are also returned.
pub fn select_boltzmann<A, R: RandomSource + ?Sized>(
    candidates: &[Candidate<A>],
    temperature: f64,
    rng: &mut R,
    with_probabilities: bool,
) -> Result<(usize, Option<Vec<f64>>)> {
    if candidates.is_empty() {
        return Err(Error::EmptyCandidates);
    }
    ensure_finite(candidates)?;

    let utilities: Vec<f64> = candidates.iter().map(|c| c.numeric_value).collect();
    let (weights, total) = boltzmann_weights(&utilities, temperature);
    let probabilities =
        with_probabilities.then(|| weights.iter().map(|w| w / total).collect::<Vec<f64>>());

    let target = rng.uniform_float() * total;
    let mut sum = 0.0;
    for (i, w) in weights.iter().enumerate() {
        sum += w;
        if sum >= target {
            return Ok((i, probabilities));
        }
    }
    Err(Error::DistributionExhausted {
        policy: SelectionPolicy::Boltzmann,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SeededRandom;
    use std::collections::VecDeque;

    /// Replays scripted draws; panics if a policy draws more than scripted.
    #[derive(Default)]
    struct Script {
        floats: VecDeque<f64>,
        ints: VecDeque<usize>,
        int_bounds: Vec<usize>,
    }

    impl Script {
        fn floats(xs: &[f64]) -> Self {
            Self {
                floats: xs.iter().copied().collect(),
                ..Self::default()
            }
        }

        fn with_ints(mut self, xs: &[usize]) -> Self {
            self.ints = xs.iter().copied().collect();
            self
        }
    }

    impl RandomSource for Script {
        fn uniform_float(&mut self) -> f64 {
            self.floats.pop_front().expect("unscripted float draw")
        }

        fn uniform_int(&mut self, n: usize) -> usize {
            self.int_bounds.push(n);
            self.ints.pop_front().expect("unscripted int draw")
        }
    }

    fn cands(vals: &[f64]) -> Vec<Candidate<usize>> {
        vals.iter()
            .enumerate()
            .map(|(i, &v)| Candidate::with_value(i, v))
            .collect()
    }

    #[test]
    fn first_and_last_ignore_utilities_and_rng() {
        let c = cands(&[f64::NAN, 1e300, -5.0]);
        let params = ParameterStore::default();
        let mut rng = Script::default();
        let s = select(SelectionPolicy::First, &c, &params, &mut rng, false).unwrap();
        assert_eq!(s.chosen, 0);
        let s = select(SelectionPolicy::Last, &c, &params, &mut rng, false).unwrap();
        assert_eq!(s.chosen, 2);
        assert_eq!(s.notes, vec![DecisionNote::Tail]);
    }

    #[test]
    fn empty_is_rejected_by_every_policy() {
        let params = ParameterStore::default();
        let mut rng = SeededRandom::new(0);
        for p in SelectionPolicy::ALL {
            let e = select::<u8, _>(p, &[], &params, &mut rng, false).unwrap_err();
            assert_eq!(e, Error::EmptyCandidates);
        }
    }

    #[test]
    fn uniform_uses_one_int_draw() {
        let c = cands(&[1.0, 2.0, 3.0, 4.0]);
        let mut rng = Script::default().with_ints(&[2]);
        assert_eq!(select_random_uniform(&c, &mut rng).unwrap(), 2);
        assert_eq!(rng.int_bounds, vec![4]);
    }

    #[test]
    fn softmax_walk_skips_non_positive() {
        let c = cands(&[-1.0, 2.0, 0.0, 6.0]);
        // total = 8
        let (i, note) = select_softmax_proportional(&c, &mut Script::floats(&[0.0])).unwrap();
        assert_eq!((i, note), (1, DecisionNote::SampledFromDistribution));
        // target = 2.0 reaches the running sum exactly at candidate 1.
        let (i, _) = select_softmax_proportional(&c, &mut Script::floats(&[0.25])).unwrap();
        assert_eq!(i, 1);
        let (i, _) = select_softmax_proportional(&c, &mut Script::floats(&[0.26])).unwrap();
        assert_eq!(i, 3);
        let (i, _) = select_softmax_proportional(&c, &mut Script::floats(&[0.999_999])).unwrap();
        assert_eq!(i, 3);
    }

    #[test]
    fn softmax_survives_an_overflowing_total() {
        let c = cands(&[1e308, 1e308]);
        let (i, note) = select_softmax_proportional(&c, &mut Script::floats(&[0.0])).unwrap();
        assert_eq!((i, note), (0, DecisionNote::SampledFromDistribution));
        let (i, _) = select_softmax_proportional(&c, &mut Script::floats(&[0.25])).unwrap();
        assert_eq!(i, 0);
        let (i, _) = select_softmax_proportional(&c, &mut Script::floats(&[0.75])).unwrap();
        assert_eq!(i, 1);

        let mut rng = SeededRandom::new(4);
        let mut counts = [0usize; 2];
        for _ in 0..10_000 {
            let (i, _) = select_softmax_proportional(&c, &mut rng).unwrap();
            counts[i] += 1;
        }
        assert!((4_500..=5_500).contains(&counts[0]), "{counts:?}");
    }

    #[test]
    fn softmax_zero_total_matches_uniform() {
        let c = cands(&[0.0, -3.0, -0.5]);
        for j in 0..3 {
            let (i, note) =
                select_softmax_proportional(&c, &mut Script::default().with_ints(&[j])).unwrap();
            let u = select_random_uniform(&c, &mut Script::default().with_ints(&[j])).unwrap();
            assert_eq!(i, u);
            assert_eq!(note, DecisionNote::ZeroTotalFallbackToUniform);
        }
    }

    #[test]
    fn weighted_policies_reject_non_finite_utilities() {
        let c = cands(&[1.0, f64::INFINITY]);
        let err = select_softmax_proportional(&c, &mut Script::floats(&[0.5])).unwrap_err();
        assert!(matches!(err, Error::NonFiniteUtility { index: 1, .. }));
        let c = cands(&[f64::NAN, 1.0]);
        assert!(select_boltzmann(&c, 1.0, &mut Script::floats(&[0.5]), false).is_err());
        assert!(select_epsilon_greedy(&c, 0.0, &mut Script::floats(&[0.5])).is_err());
    }

    #[test]
    fn epsilon_explores_below_threshold() {
        let c = cands(&[1.0, 9.0, 3.0]);
        let mut rng = Script::floats(&[0.05]).with_ints(&[2]);
        let (i, note) = select_epsilon_greedy(&c, 0.1, &mut rng).unwrap();
        assert_eq!(i, 2);
        assert_eq!(note, DecisionNote::EpsilonExplore { epsilon: 0.1 });
        assert_eq!(rng.int_bounds, vec![3]);
    }

    #[test]
    fn epsilon_greedy_unique_max_draws_no_int() {
        let c = cands(&[1.0, 9.0, 3.0]);
        let mut rng = Script::floats(&[0.5]);
        let (i, note) = select_epsilon_greedy(&c, 0.1, &mut rng).unwrap();
        assert_eq!((i, note), (1, DecisionNote::Greedy));
        assert!(rng.int_bounds.is_empty());
    }

    #[test]
    fn epsilon_greedy_breaks_ties_among_maxima_only() {
        let c = cands(&[5.0, 3.0, 5.0, 5.0]);
        for (j, expected) in [(0, 0), (1, 2), (2, 3)] {
            let mut rng = Script::floats(&[0.9]).with_ints(&[j]);
            let (i, note) = select_epsilon_greedy(&c, 0.0, &mut rng).unwrap();
            assert_eq!(i, expected);
            assert_eq!(note, DecisionNote::GreedyTieBroken { tied: 3 });
            assert_eq!(rng.int_bounds, vec![3]);
        }
    }

    #[test]
    fn boltzmann_walk_and_probabilities() {
        let c = cands(&[1e8, 1e8 - 1.0, 1e8 - 2.0]);
        let z = 1.0 + (-1.0f64).exp() + (-2.0f64).exp();

        let (i, probs) = select_boltzmann(&c, 1.0, &mut Script::floats(&[0.0]), true).unwrap();
        assert_eq!(i, 0);
        let probs = probs.unwrap();
        assert!((probs[0] - 1.0 / z).abs() < 1e-12);
        assert!(probs.iter().all(|p| p.is_finite()));

        // Just past the first candidate's share lands on the second.
        let r = 1.0 / z + 1e-9;
        let (i, none) = select_boltzmann(&c, 1.0, &mut Script::floats(&[r]), false).unwrap();
        assert_eq!(i, 1);
        assert!(none.is_none());

        let (i, _) = select_boltzmann(&c, 1.0, &mut Script::floats(&[0.999_999]), false).unwrap();
        assert_eq!(i, 2);
    }

    #[test]
    fn diagnostics_report_rows() {
        let c = cands(&[2.0, 1.0]);
        let params = ParameterStore::default();
        let mut rng = SeededRandom::new(7);
        let s = select(SelectionPolicy::Boltzmann, &c, &params, &mut rng, true).unwrap();
        assert_eq!(s.report.len(), 2);
        let total: f64 = s.report.iter().filter_map(|r| r.probability).sum();
        assert!((total - 1.0).abs() < 1e-12);

        let s = select(SelectionPolicy::EpsilonGreedy, &c, &params, &mut rng, true).unwrap();
        assert!(s.report.iter().all(|r| r.probability.is_none()));
        assert_eq!(s.report[1].utility, 1.0);

        let s = select(SelectionPolicy::Boltzmann, &c, &params, &mut rng, false).unwrap();
        assert!(s.report.is_empty());
    }

    #[test]
    fn policy_names_round_trip() {
        for p in SelectionPolicy::ALL {
            assert_eq!(p.name().parse::<SelectionPolicy>().unwrap(), p);
        }
        assert_eq!(SelectionPolicy::default(), SelectionPolicy::SoftmaxProportional);
        assert_eq!(
            "greedy".parse::<SelectionPolicy>(),
            Err(Error::UnknownPolicy("greedy".to_string()))
        );
    }
}
