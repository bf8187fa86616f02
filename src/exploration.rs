//! The caller-owned exploration context.
//!
//! [`Exploration`] bundles what a decision-maker configures once and reads on
//! every decision: the active [`SelectionPolicy`], the [`AggregationMode`],
//! the auto-update (annealing) flag, the diagnostics flag, and the
//! [`ParameterStore`]. Nothing here is process-global; independent
//! decision-makers each own one.
//!
//! A decision cycle looks like:
//!
//! ```text
//! let d = exploration.choose(&mut candidates, &endorsements, &mut rng, &mut learner, slot)?;
//! apply(&candidates[d.chosen]);           // your code
//! exploration.update_parameters();        // end of cycle: anneal if enabled
//! ```

use std::fmt;

use tracing::debug;

use crate::alloc::proportional_probabilities;
use crate::{
    aggregate_all, anneal, feed_back, greedy_reference, select, AggregationMode, Candidate,
    DecayLaw, DecayRates, Decision, Endorsement, Error, LearningModule, LearningRule,
    ParameterStore, RandomSource, Result, SelectionPolicy, ValueDomain, EPSILON, TEMPERATURE,
};

/// Utility given to a candidate nobody endorsed.
pub const DEFAULT_UTILITY: f64 = 0.0;

// ============================================================================
// Configuration
// ============================================================================

/// Serializable description of one parameter.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterConfig {
    pub name: String,
    pub value: f64,
    pub domain: ValueDomain,
    pub decay_law: DecayLaw,
    pub rates: DecayRates,
}

impl ParameterConfig {
    /// A parameter with neutral decay.
    pub fn new(name: &str, value: f64, domain: ValueDomain) -> Self {
        Self {
            name: name.to_string(),
            value,
            domain,
            decay_law: DecayLaw::Exponential,
            rates: DecayRates::default(),
        }
    }
}

/// Full configuration for an [`Exploration`].
///
/// Start with [`ExplorationConfig::default()`] (the built-in parameters and
/// the proportional policy) and override fields directly.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExplorationConfig {
    pub policy: SelectionPolicy,
    pub aggregation: AggregationMode,
    /// Anneal parameters in [`Exploration::update_parameters`].
    pub auto_update: bool,
    /// Attach per-candidate reports to decisions.
    pub diagnostics: bool,
    pub parameters: Vec<ParameterConfig>,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            policy: SelectionPolicy::default(),
            aggregation: AggregationMode::default(),
            auto_update: false,
            diagnostics: false,
            parameters: vec![
                ParameterConfig::new(EPSILON, 0.1, ValueDomain::UnitInterval),
                ParameterConfig::new(TEMPERATURE, 25.0, ValueDomain::Positive),
            ],
        }
    }
}

// ============================================================================
// Exploration
// ============================================================================

/// Policy, aggregation, annealing, and parameter state for one decision-maker.
#[derive(Debug, Clone, Default)]
pub struct Exploration {
    policy: SelectionPolicy,
    aggregation: AggregationMode,
    auto_update: bool,
    diagnostics: bool,
    params: ParameterStore,
}

impl Exploration {
    /// Defaults: proportional policy, sum aggregation, no annealing, built-in parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a config, validating every value and rate.
    ///
    /// `epsilon` and `temperature` are added with their defaults if the
    /// config omits them, since `EpsilonGreedy` and `Boltzmann` read them.
    pub fn from_config(cfg: ExplorationConfig) -> Result<Self> {
        let mut params = ParameterStore::empty();
        for p in &cfg.parameters {
            params.register(&p.name, p.value, p.domain)?;
            params.set_decay_law(&p.name, p.decay_law);
            for law in DecayLaw::ALL {
                let rate = p.rates.get(law);
                if !params.set_decay_rate(&p.name, law, rate) {
                    return Err(Error::InvalidRate {
                        name: p.name.clone(),
                        law,
                        rate,
                    });
                }
            }
        }
        let builtins = ParameterStore::default();
        for b in builtins.iter() {
            if !params.is_known(b.name()) {
                params.register(b.name(), b.value(), b.domain())?;
            }
        }
        Ok(Self {
            policy: cfg.policy,
            aggregation: cfg.aggregation,
            auto_update: cfg.auto_update,
            diagnostics: cfg.diagnostics,
            params,
        })
    }

    /// Capture the current state as a config.
    pub fn config(&self) -> ExplorationConfig {
        ExplorationConfig {
            policy: self.policy,
            aggregation: self.aggregation,
            auto_update: self.auto_update,
            diagnostics: self.diagnostics,
            parameters: self
                .params
                .iter()
                .map(|p| ParameterConfig {
                    name: p.name().to_string(),
                    value: p.value(),
                    domain: p.domain(),
                    decay_law: p.decay_law(),
                    rates: p.rates(),
                })
                .collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: SelectionPolicy) {
        self.policy = policy;
    }

    /// Set the policy from its configuration name; `false` (and no change) if unknown.
    pub fn set_policy_by_name(&mut self, name: &str) -> bool {
        match name.parse() {
            Ok(p) => {
                self.policy = p;
                true
            }
            Err(e) => {
                debug!(%e, "rejected policy");
                false
            }
        }
    }

    pub fn aggregation(&self) -> AggregationMode {
        self.aggregation
    }

    pub fn set_aggregation(&mut self, mode: AggregationMode) {
        self.aggregation = mode;
    }

    pub fn set_aggregation_by_name(&mut self, name: &str) -> bool {
        match name.parse() {
            Ok(m) => {
                self.aggregation = m;
                true
            }
            Err(e) => {
                debug!(%e, "rejected aggregation mode");
                false
            }
        }
    }

    pub fn auto_update(&self) -> bool {
        self.auto_update
    }

    pub fn set_auto_update(&mut self, on: bool) {
        self.auto_update = on;
    }

    pub fn diagnostics(&self) -> bool {
        self.diagnostics
    }

    pub fn set_diagnostics(&mut self, on: bool) {
        self.diagnostics = on;
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParameterStore {
        &mut self.params
    }

    pub fn set_decay_law_by_name(&mut self, param: &str, law: &str) -> bool {
        match law.parse::<DecayLaw>() {
            Ok(law) => self.params.set_decay_law(param, law),
            Err(e) => {
                debug!(param, %e, "rejected decay law");
                false
            }
        }
    }

    /// Rate for `law` of `param`, or `0.0` if either name is unknown.
    pub fn decay_rate_by_name(&self, param: &str, law: &str) -> f64 {
        law.parse::<DecayLaw>()
            .map_or(0.0, |law| self.params.get_decay_rate(param, law))
    }

    pub fn set_decay_rate_by_name(&mut self, param: &str, law: &str, rate: f64) -> bool {
        match law.parse::<DecayLaw>() {
            Ok(law) => self.params.set_decay_rate(param, law, rate),
            Err(e) => {
                debug!(param, %e, "rejected decay law");
                false
            }
        }
    }

    /// End-of-cycle hook: anneal every parameter once if auto-update is on.
    pub fn update_parameters(&mut self) {
        if self.auto_update {
            anneal(&mut self.params);
        }
    }

    // -----------------------------------------------------------------------
    // Decisions
    // -----------------------------------------------------------------------

    /// Aggregate every candidate's endorsements under the current mode.
    pub fn evaluate<A: PartialEq>(
        &self,
        candidates: &mut [Candidate<A>],
        endorsements: &[Endorsement<A>],
    ) {
        aggregate_all(candidates, endorsements, DEFAULT_UTILITY, self.aggregation);
    }

    /// Aggregate, select, and report the outcome to `learner`.
    pub fn choose<A, R, L>(
        &self,
        candidates: &mut [Candidate<A>],
        endorsements: &[Endorsement<A>],
        rng: &mut R,
        learner: &mut L,
        context: L::Context,
    ) -> Result<Decision>
    where
        A: PartialEq,
        R: RandomSource + ?Sized,
        L: LearningModule + ?Sized,
    {
        if candidates.is_empty() {
            return Err(Error::EmptyCandidates);
        }
        self.evaluate(candidates, endorsements);
        self.decide(candidates, rng, learner, context)
    }

    /// Select among already-aggregated candidates and report to `learner`.
    pub fn decide<A, R, L>(
        &self,
        candidates: &[Candidate<A>],
        rng: &mut R,
        learner: &mut L,
        context: L::Context,
    ) -> Result<Decision>
    where
        R: RandomSource + ?Sized,
        L: LearningModule + ?Sized,
    {
        let rl_enabled = learner.is_enabled();
        let rule = if rl_enabled {
            learner.active_rule()
        } else {
            LearningRule::OffPolicy
        };
        let greedy =
            greedy_reference(candidates, rl_enabled, rule).ok_or(Error::EmptyCandidates)?;

        let sel = select(
            self.policy,
            candidates,
            &self.params,
            rng,
            self.diagnostics,
        )?;
        feed_back(learner, &candidates[sel.chosen], greedy, context);

        debug!(
            policy = %self.policy,
            chosen = sel.chosen,
            candidates = candidates.len(),
            greedy = greedy.value,
            "selected candidate"
        );
        Ok(Decision {
            policy: self.policy,
            chosen: sel.chosen,
            greedy,
            notes: sel.notes,
            report: sel.report,
        })
    }

    /// Proportional selection probabilities after aggregation, without drawing.
    ///
    /// Positive utilities get their share of the positive total, others 0; if
    /// nothing is positive every candidate gets `1 / n`.
    pub fn selection_preview<A: PartialEq>(
        &self,
        candidates: &mut [Candidate<A>],
        endorsements: &[Endorsement<A>],
    ) -> Vec<f64> {
        self.evaluate(candidates, endorsements);
        let utilities: Vec<f64> = candidates.iter().map(|c| c.numeric_value).collect();
        proportional_probabilities(&utilities)
    }

    /// Human-readable settings summary.
    pub fn summary(&self) -> ExplorationSummary {
        let mut rows = vec![
            (
                "Numeric indifference mode:".to_string(),
                self.aggregation.to_string(),
            ),
            ("Exploration policy:".to_string(), self.policy.to_string()),
            (
                "Automatic policy parameter reduction:".to_string(),
                if self.auto_update { "on" } else { "off" }.to_string(),
            ),
        ];
        for p in self.params.iter() {
            let label = capitalize(p.name());
            rows.push((format!("{label}:"), p.value().to_string()));
            rows.push((
                format!("{label} reduction policy:"),
                p.decay_law().to_string(),
            ));
            for law in DecayLaw::ALL {
                rows.push((
                    format!("{label} {} reduction rate:", capitalize(law.name())),
                    p.rates().get(law).to_string(),
                ));
            }
        }
        ExplorationSummary { rows }
    }
}

fn capitalize(s: &str) -> String {
    let mut cs = s.chars();
    match cs.next() {
        Some(c) => c.to_uppercase().chain(cs).collect(),
        None => String::new(),
    }
}

/// Settings summary rendered as aligned `label value` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorationSummary {
    pub rows: Vec<(String, String)>,
}

impl ExplorationSummary {
    const COLUMNS: usize = 55;
}

impl fmt::Display for ExplorationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in &self.rows {
            let pad = Self::COLUMNS.saturating_sub(label.len() + value.len()).max(1);
            writeln!(f, "{label}{:pad$}{value}", "")?;
        }
        Ok(())
    }
}
