//! Allocation helpers (weights, probabilities).
//!
//! These turn utilities into selection weights in a stable, reproducible way.
//! The selection walks in [`crate::select`] use the same helpers, so a
//! probability reported here is bit-for-bit the one the draw was made against.

/// Shifted Boltzmann weights `exp((u_i - max_u) / t)` and their sum.
///
/// Subtracting the maximum keeps every exponent `<= 0`: the largest weight is
/// exactly `1.0`, nothing overflows, and the ratios equal those of the
/// unshifted formula. `temperature` must be `> 0`.
///
/// Returns `(weights, total)`; both are empty/zero for empty input.
pub fn boltzmann_weights(utilities: &[f64], temperature: f64) -> (Vec<f64>, f64) {
    let max_u = utilities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut total = 0.0;
    let weights = utilities
        .iter()
        .map(|&u| {
            let w = ((u - max_u) / temperature).exp();
            total += w;
            w
        })
        .collect();
    (weights, total)
}

/// Boltzmann selection probabilities (`w_i / total`, see [`boltzmann_weights`]).
pub fn boltzmann_probabilities(utilities: &[f64], temperature: f64) -> Vec<f64> {
    let (weights, total) = boltzmann_weights(utilities, temperature);
    weights.into_iter().map(|w| w / total).collect()
}

/// Sum of the strictly positive utilities, in slice order.
pub fn positive_total(utilities: &[f64]) -> f64 {
    utilities.iter().filter(|&&u| u > 0.0).sum()
}

/// Proportional weights: each positive utility, or 0 for the rest, plus their total.
///
/// If the positive total overflows, every positive utility is first divided
/// by the largest one. Ratios and slice order are unchanged and the total
/// stays finite.
pub fn proportional_weights(utilities: &[f64]) -> (Vec<f64>, f64) {
    let total = positive_total(utilities);
    if total.is_finite() {
        let weights = utilities.iter().map(|&u| u.max(0.0)).collect();
        return (weights, total);
    }
    let max_pos = utilities
        .iter()
        .copied()
        .filter(|&u| u > 0.0)
        .fold(0.0, f64::max);
    let weights: Vec<f64> = utilities
        .iter()
        .map(|&u| if u > 0.0 { u / max_pos } else { 0.0 })
        .collect();
    let total = weights.iter().sum();
    (weights, total)
}

/// Proportional ("softmax") selection probabilities.
///
/// Each positive utility gets its share of the positive total (see
/// [`proportional_weights`]); non-positive utilities get 0. If nothing is
/// positive the distribution is uniform, which mirrors the uniform fallback
/// of the proportional policy.
pub fn proportional_probabilities(utilities: &[f64]) -> Vec<f64> {
    if utilities.is_empty() {
        return Vec::new();
    }
    let (weights, total) = proportional_weights(utilities);
    if total == 0.0 {
        let n = utilities.len() as f64;
        return vec![1.0 / n; utilities.len()];
    }
    weights.into_iter().map(|w| w / total).collect()
}
