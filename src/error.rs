//! Error types.
//!
//! Configuration setters keep their boolean contract (`false` means nothing
//! changed); this enum is what name parsing, fallible construction, and the
//! selection entry points return when a precondition is violated.

use thiserror::Error;

use crate::{DecayLaw, SelectionPolicy};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by parsing, construction, and selection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Selection was invoked with no candidates.
    #[error("no candidates to select from")]
    EmptyCandidates,

    /// A utility-weighted policy saw a NaN or infinite utility.
    #[error("candidate {index} has non-finite utility {value}")]
    NonFiniteUtility { index: usize, value: f64 },

    /// A cumulative walk ended without reaching its target.
    #[error("{policy} walk exhausted the candidates without reaching its target")]
    DistributionExhausted { policy: SelectionPolicy },

    #[error("unknown selection policy: {0:?}")]
    UnknownPolicy(String),

    #[error("unknown aggregation mode: {0:?}")]
    UnknownAggregationMode(String),

    #[error("unknown decay law: {0:?}")]
    UnknownDecayLaw(String),

    #[error("unknown exploration parameter: {0:?}")]
    UnknownParameter(String),

    #[error("value {value} is outside the domain of parameter {name:?}")]
    InvalidValue { name: String, value: f64 },

    #[error("rate {rate} is not valid for {law} decay of parameter {name:?}")]
    InvalidRate {
        name: String,
        law: DecayLaw,
        rate: f64,
    },
}
