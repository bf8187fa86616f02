//! Per-cycle annealing of exploration parameters.
//!
//! One [`anneal`] call advances every registered parameter by one step of its
//! currently active [`DecayLaw`](crate::DecayLaw). The caller decides when a
//! cycle has ended; [`Exploration::update_parameters`](crate::Exploration::update_parameters)
//! gates this on the auto-update flag.

use tracing::{debug, trace};

use crate::ParameterStore;

/// Decay every parameter in `store` by one step.
///
/// - exponential: `value *= rate` unless `rate == 1`
/// - linear: `value = max(0, value - rate)` when `value > 0` and `rate != 0`
///
/// Values never leave their parameter's domain: a step that would (temperature
/// decaying to exactly 0, say) is skipped for that parameter. The value then
/// stays put on every later cycle until the rate or law changes, so a linear
/// temperature schedule stops at its last positive value instead of reaching 0.
pub fn anneal(store: &mut ParameterStore) {
    for p in store.iter_mut() {
        let before = p.value();
        if !p.decay() {
            debug!(
                name = p.name(),
                value = before,
                law = %p.decay_law(),
                "decay step would leave domain; kept value"
            );
        } else if p.value() != before {
            trace!(
                name = p.name(),
                before,
                after = p.value(),
                law = %p.decay_law(),
                "annealed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DecayLaw, ValueDomain, EPSILON, TEMPERATURE};
    use proptest::prelude::*;

    #[test]
    fn neutral_rates_are_idempotent() {
        let mut s = ParameterStore::default();
        for _ in 0..100 {
            anneal(&mut s);
        }
        assert_eq!(s.get_value(EPSILON), 0.1);
        assert_eq!(s.get_value(TEMPERATURE), 25.0);

        for name in [EPSILON, TEMPERATURE] {
            assert!(s.set_decay_law(name, DecayLaw::Linear));
        }
        for _ in 0..100 {
            anneal(&mut s);
        }
        assert_eq!(s.get_value(EPSILON), 0.1);
        assert_eq!(s.get_value(TEMPERATURE), 25.0);
    }

    #[test]
    fn exponential_halving() {
        let mut s = ParameterStore::empty();
        s.register("x", 100.0, ValueDomain::Positive).unwrap();
        assert!(s.set_decay_rate("x", DecayLaw::Exponential, 0.5));
        anneal(&mut s);
        assert_eq!(s.get_value("x"), 50.0);
        anneal(&mut s);
        assert_eq!(s.get_value("x"), 25.0);
    }

    #[test]
    fn linear_floors_at_zero() {
        let mut s = ParameterStore::empty();
        s.register("x", 3.0, ValueDomain::NonNegative).unwrap();
        assert!(s.set_decay_law("x", DecayLaw::Linear));
        assert!(s.set_decay_rate("x", DecayLaw::Linear, 2.0));
        anneal(&mut s);
        assert_eq!(s.get_value("x"), 1.0);
        anneal(&mut s);
        assert_eq!(s.get_value("x"), 0.0);
        anneal(&mut s);
        assert_eq!(s.get_value("x"), 0.0);
    }

    #[test]
    fn only_the_active_law_applies() {
        let mut s = ParameterStore::default();
        assert!(s.set_decay_rate(EPSILON, DecayLaw::Linear, 0.05));
        anneal(&mut s);
        // Exponential is active with its neutral rate; the linear rate is ignored.
        assert_eq!(s.get_value(EPSILON), 0.1);
        assert!(s.set_decay_law(EPSILON, DecayLaw::Linear));
        anneal(&mut s);
        assert!((s.get_value(EPSILON) - 0.05).abs() < 1e-15);
    }

    #[test]
    fn decay_never_leaves_the_domain() {
        let mut s = ParameterStore::default();
        assert!(s.set_decay_rate(TEMPERATURE, DecayLaw::Exponential, 0.0));
        anneal(&mut s);
        assert_eq!(s.get_value(TEMPERATURE), 25.0);

        assert!(s.set_decay_law(TEMPERATURE, DecayLaw::Linear));
        assert!(s.set_decay_rate(TEMPERATURE, DecayLaw::Linear, 10.0));
        anneal(&mut s);
        anneal(&mut s);
        assert_eq!(s.get_value(TEMPERATURE), 5.0);
        anneal(&mut s);
        assert_eq!(s.get_value(TEMPERATURE), 5.0);
    }

    proptest! {
        #[test]
        fn annealing_never_increases_or_goes_negative(
            v0 in 0.0f64..1.0e6f64,
            exp_rate in 0.0f64..=1.0f64,
            lin_rate in 0.0f64..1.0e3f64,
            linear in any::<bool>(),
            steps in 0usize..50,
        ) {
            let mut s = ParameterStore::empty();
            s.register("x", v0, ValueDomain::NonNegative).unwrap();
            prop_assert!(s.set_decay_rate("x", DecayLaw::Exponential, exp_rate));
            prop_assert!(s.set_decay_rate("x", DecayLaw::Linear, lin_rate));
            let law = if linear { DecayLaw::Linear } else { DecayLaw::Exponential };
            prop_assert!(s.set_decay_law("x", law));

            let mut prev = v0;
            for _ in 0..steps {
                anneal(&mut s);
                let v = s.get_value("x");
                prop_assert!(v >= 0.0);
                prop_assert!(v <= prev);
                prev = v;
            }
        }
    }
}
