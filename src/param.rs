//! Named, annealable exploration parameters.
//!
//! Every parameter carries a value domain that is checked on every write, an
//! active [`DecayLaw`], and one rate per law. Rates have their own validity
//! rule per law: exponential rates must lie in `[0, 1]`, linear rates must be
//! non-negative.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::Error;

/// Name of the built-in epsilon-greedy exploration rate.
pub const EPSILON: &str = "epsilon";
/// Name of the built-in Boltzmann temperature.
pub const TEMPERATURE: &str = "temperature";

/// How a parameter shrinks each annealing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DecayLaw {
    /// `value *= rate`.
    #[default]
    Exponential,
    /// `value = max(0, value - rate)`.
    Linear,
}

impl DecayLaw {
    pub const ALL: [DecayLaw; 2] = [DecayLaw::Exponential, DecayLaw::Linear];

    pub fn name(self) -> &'static str {
        match self {
            DecayLaw::Exponential => "exponential",
            DecayLaw::Linear => "linear",
        }
    }

    /// Whether `rate` is an acceptable rate for this law.
    pub fn is_rate_valid(self, rate: f64) -> bool {
        match self {
            DecayLaw::Exponential => (0.0..=1.0).contains(&rate),
            DecayLaw::Linear => rate >= 0.0,
        }
    }

    /// Apply one step of this law to `value`.
    pub fn apply(self, value: f64, rate: f64) -> f64 {
        match self {
            DecayLaw::Exponential if rate != 1.0 => value * rate,
            DecayLaw::Linear if value > 0.0 && rate != 0.0 => (value - rate).max(0.0),
            _ => value,
        }
    }
}

impl fmt::Display for DecayLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DecayLaw {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.name() == s)
            .ok_or_else(|| Error::UnknownDecayLaw(s.to_string()))
    }
}

/// One rate per decay law.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecayRates {
    pub exponential: f64,
    pub linear: f64,
}

impl Default for DecayRates {
    /// Both rates are no-ops.
    fn default() -> Self {
        Self {
            exponential: 1.0,
            linear: 0.0,
        }
    }
}

impl DecayRates {
    pub fn get(&self, law: DecayLaw) -> f64 {
        match law {
            DecayLaw::Exponential => self.exponential,
            DecayLaw::Linear => self.linear,
        }
    }

    fn slot(&mut self, law: DecayLaw) -> &mut f64 {
        match law {
            DecayLaw::Exponential => &mut self.exponential,
            DecayLaw::Linear => &mut self.linear,
        }
    }
}

/// Validity predicate for a parameter's value.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ValueDomain {
    /// `[0, 1]`.
    UnitInterval,
    /// `> 0`.
    Positive,
    /// `>= 0`.
    NonNegative,
    /// Any finite value.
    Any,
    /// Caller-supplied predicate. Not serializable.
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(fn(f64) -> bool),
}

impl ValueDomain {
    pub fn contains(&self, value: f64) -> bool {
        match self {
            ValueDomain::UnitInterval => (0.0..=1.0).contains(&value),
            ValueDomain::Positive => value > 0.0,
            ValueDomain::NonNegative => value >= 0.0,
            ValueDomain::Any => value.is_finite(),
            ValueDomain::Custom(f) => f(value),
        }
    }
}

/// A named tunable scalar.
#[derive(Debug, Clone)]
pub struct ExplorationParameter {
    name: String,
    value: f64,
    domain: ValueDomain,
    decay_law: DecayLaw,
    rates: DecayRates,
}

impl ExplorationParameter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn domain(&self) -> ValueDomain {
        self.domain
    }

    pub fn decay_law(&self) -> DecayLaw {
        self.decay_law
    }

    pub fn rates(&self) -> DecayRates {
        self.rates
    }

    /// One annealing step under the active law.
    ///
    /// A step that would leave the value domain (e.g. temperature reaching 0)
    /// is dropped and the value stays where it was.
    pub(crate) fn decay(&mut self) -> bool {
        let next = self
            .decay_law
            .apply(self.value, self.rates.get(self.decay_law));
        if !self.domain.contains(next) {
            return false;
        }
        self.value = next;
        true
    }
}

/// Registry of exploration parameters, keyed by name.
///
/// Lookups are permissive: reading an unknown name yields `0.0` / `None`, and
/// writes to unknown names (or with invalid values) return `false` without
/// touching any state.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    params: BTreeMap<String, ExplorationParameter>,
}

impl Default for ParameterStore {
    /// A store holding the built-ins: `epsilon = 0.1` in `[0, 1]` and
    /// `temperature = 25` (> 0).
    fn default() -> Self {
        let mut store = Self::empty();
        store.insert(EPSILON, 0.1, ValueDomain::UnitInterval, DecayRates::default());
        store.insert(TEMPERATURE, 25.0, ValueDomain::Positive, DecayRates::default());
        store
    }
}

impl ParameterStore {
    /// A store with no parameters at all.
    pub fn empty() -> Self {
        Self {
            params: BTreeMap::new(),
        }
    }

    fn insert(&mut self, name: &str, value: f64, domain: ValueDomain, rates: DecayRates) {
        self.params.insert(
            name.to_string(),
            ExplorationParameter {
                name: name.to_string(),
                value,
                domain,
                decay_law: DecayLaw::Exponential,
                rates,
            },
        );
    }

    /// Register (or replace) a parameter with no-op decay rates and exponential decay.
    ///
    /// Fails if `initial_value` is outside `domain`.
    pub fn register(
        &mut self,
        name: &str,
        initial_value: f64,
        domain: ValueDomain,
    ) -> Result<&ExplorationParameter, Error> {
        if !domain.contains(initial_value) {
            return Err(Error::InvalidValue {
                name: name.to_string(),
                value: initial_value,
            });
        }
        if self.params.contains_key(name) {
            debug!(name, "replacing exploration parameter");
        }
        self.insert(name, initial_value, domain, DecayRates::default());
        self.params
            .get(name)
            .ok_or_else(|| Error::UnknownParameter(name.to_string()))
    }

    /// Read-only view of one parameter.
    pub fn get(&self, name: &str) -> Option<&ExplorationParameter> {
        self.params.get(name)
    }

    /// Parameter names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExplorationParameter> {
        self.params.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ExplorationParameter> {
        self.params.values_mut()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Current value, or `0.0` for an unknown name.
    pub fn get_value(&self, name: &str) -> f64 {
        self.params.get(name).map_or(0.0, |p| p.value)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Whether `value` would be accepted by [`ParameterStore::set_value`].
    pub fn is_valid_value(&self, name: &str, value: f64) -> bool {
        self.params
            .get(name)
            .is_some_and(|p| p.domain.contains(value))
    }

    pub fn set_value(&mut self, name: &str, value: f64) -> bool {
        match self.params.get_mut(name) {
            Some(p) if p.domain.contains(value) => {
                p.value = value;
                true
            }
            Some(_) => {
                debug!(name, value, "rejected out-of-domain parameter value");
                false
            }
            None => {
                debug!(name, "rejected write to unknown parameter");
                false
            }
        }
    }

    pub fn get_decay_law(&self, name: &str) -> Option<DecayLaw> {
        self.params.get(name).map(|p| p.decay_law)
    }

    pub fn set_decay_law(&mut self, name: &str, law: DecayLaw) -> bool {
        match self.params.get_mut(name) {
            Some(p) => {
                p.decay_law = law;
                true
            }
            None => false,
        }
    }

    /// Rate for `law`, or `0.0` for an unknown name.
    pub fn get_decay_rate(&self, name: &str, law: DecayLaw) -> f64 {
        self.params.get(name).map_or(0.0, |p| p.rates.get(law))
    }

    pub fn set_decay_rate(&mut self, name: &str, law: DecayLaw, rate: f64) -> bool {
        let Some(p) = self.params.get_mut(name) else {
            return false;
        };
        if !law.is_rate_valid(rate) {
            debug!(name, %law, rate, "rejected invalid decay rate");
            return false;
        }
        *p.rates.slot(law) = rate;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn builtins() {
        let s = ParameterStore::default();
        assert_eq!(s.get_value(EPSILON), 0.1);
        assert_eq!(s.get_value(TEMPERATURE), 25.0);
        for name in [EPSILON, TEMPERATURE] {
            assert_eq!(s.get_decay_law(name), Some(DecayLaw::Exponential));
            assert_eq!(s.get_decay_rate(name, DecayLaw::Exponential), 1.0);
            assert_eq!(s.get_decay_rate(name, DecayLaw::Linear), 0.0);
        }
        assert_eq!(s.names().collect::<Vec<_>>(), vec![EPSILON, TEMPERATURE]);
    }

    #[test]
    fn unknown_names_are_permissive() {
        let mut s = ParameterStore::default();
        assert_eq!(s.get_value("alpha"), 0.0);
        assert!(!s.is_known("alpha"));
        assert!(!s.is_valid_value("alpha", 0.5));
        assert!(!s.set_value("alpha", 0.5));
        assert_eq!(s.get_decay_law("alpha"), None);
        assert!(!s.set_decay_law("alpha", DecayLaw::Linear));
        assert_eq!(s.get_decay_rate("alpha", DecayLaw::Linear), 0.0);
        assert!(!s.set_decay_rate("alpha", DecayLaw::Linear, 1.0));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn out_of_domain_values_are_rejected() {
        let mut s = ParameterStore::default();
        assert!(!s.set_value(EPSILON, 1.5));
        assert_eq!(s.get_value(EPSILON), 0.1);
        assert!(!s.set_value(TEMPERATURE, 0.0));
        assert!(!s.set_value(TEMPERATURE, -3.0));
        assert_eq!(s.get_value(TEMPERATURE), 25.0);
        assert!(!s.set_value(EPSILON, f64::NAN));
    }

    #[test]
    fn invalid_rates_leave_stored_rate_unchanged() {
        let mut s = ParameterStore::default();
        assert!(s.set_decay_rate(EPSILON, DecayLaw::Exponential, 0.9));
        assert!(!s.set_decay_rate(EPSILON, DecayLaw::Exponential, 1.1));
        assert!(!s.set_decay_rate(EPSILON, DecayLaw::Exponential, -0.1));
        assert_eq!(s.get_decay_rate(EPSILON, DecayLaw::Exponential), 0.9);

        assert!(s.set_decay_rate(EPSILON, DecayLaw::Linear, 5.0));
        assert!(!s.set_decay_rate(EPSILON, DecayLaw::Linear, -1.0));
        assert_eq!(s.get_decay_rate(EPSILON, DecayLaw::Linear), 5.0);
    }

    #[test]
    fn register_custom_parameter() {
        let mut s = ParameterStore::default();
        let p = s.register("alpha", 0.3, ValueDomain::NonNegative).unwrap();
        assert_eq!(p.name(), "alpha");
        assert_eq!(p.decay_law(), DecayLaw::Exponential);
        assert_eq!(p.rates(), DecayRates::default());
        assert!(s.set_value("alpha", 4.0));
        assert!(!s.set_value("alpha", -1.0));

        let err = s.register("beta", -1.0, ValueDomain::Positive).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
        assert!(!s.is_known("beta"));

        fn even(x: f64) -> bool {
            x % 2.0 == 0.0
        }
        s.register("even", 2.0, ValueDomain::Custom(even)).unwrap();
        assert!(!s.set_value("even", 3.0));
        assert!(s.set_value("even", 8.0));
    }

    #[test]
    fn decay_law_names() {
        for l in DecayLaw::ALL {
            assert_eq!(l.name().parse::<DecayLaw>().unwrap(), l);
        }
        assert!("geometric".parse::<DecayLaw>().is_err());
    }

    proptest! {
        #[test]
        fn set_then_get_returns_value(v in 0.0f64..=1.0f64, t in 1.0e-9f64..1.0e9f64) {
            let mut s = ParameterStore::default();
            prop_assert!(s.set_value(EPSILON, v));
            prop_assert_eq!(s.get_value(EPSILON), v);
            prop_assert!(s.set_value(TEMPERATURE, t));
            prop_assert_eq!(s.get_value(TEMPERATURE), t);
        }

        #[test]
        fn rate_validity_matches_law(rate in -2.0f64..3.0f64) {
            let mut s = ParameterStore::default();
            prop_assert_eq!(
                s.set_decay_rate(EPSILON, DecayLaw::Exponential, rate),
                (0.0..=1.0).contains(&rate)
            );
            prop_assert_eq!(s.set_decay_rate(EPSILON, DecayLaw::Linear, rate), rate >= 0.0);
        }
    }
}
