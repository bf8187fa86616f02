//! Candidates and the numeric endorsements attached to them.
//!
//! A decision is made over an ordered slice of [`Candidate`]s. Order is
//! discovery order and is authoritative: `First`/`Last`, tie-breaking, and every
//! cumulative walk follow it.

/// One competing action under consideration for the current decision.
///
/// The aggregated fields (`numeric_value`, `contributors`, `rl_contribution`)
/// are overwritten by [`crate::aggregate`] at the start of every decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<A> {
    /// Opaque action identity.
    pub action: A,
    /// Aggregated utility.
    pub numeric_value: f64,
    /// Number of endorsements that contributed to `numeric_value` (never 0 after aggregation).
    pub contributors: u32,
    /// True if any contributing endorsement came from a learned (RL) rule.
    pub rl_contribution: bool,
}

impl<A> Candidate<A> {
    /// A fresh candidate with no aggregated value yet.
    pub fn new(action: A) -> Self {
        Self {
            action,
            numeric_value: 0.0,
            contributors: 0,
            rl_contribution: false,
        }
    }

    /// A candidate with a pre-computed utility (skips aggregation in tests and previews).
    pub fn with_value(action: A, numeric_value: f64) -> Self {
        Self {
            action,
            numeric_value,
            contributors: 1,
            rl_contribution: false,
        }
    }
}

/// The value an endorsement votes with.
///
/// Symbolic referents carry no number and count as `0.0`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Referent {
    Float(f64),
    Int(i64),
    Symbolic(String),
}

impl Referent {
    /// Numeric reading of the referent.
    pub fn as_number(&self) -> f64 {
        match self {
            Referent::Float(x) => *x,
            Referent::Int(i) => *i as f64,
            Referent::Symbolic(_) => 0.0,
        }
    }
}

impl From<f64> for Referent {
    fn from(x: f64) -> Self {
        Referent::Float(x)
    }
}

impl From<i64> for Referent {
    fn from(i: i64) -> Self {
        Referent::Int(i)
    }
}

/// Which flavour of numeric vote an endorsement is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndorsementKind {
    /// May originate from a learned rule.
    NumericIndifferent,
    /// Never RL-sourced.
    BinaryIndifferent,
}

/// One numeric vote for a specific action.
#[derive(Debug, Clone, PartialEq)]
pub struct Endorsement<A> {
    /// The action this endorsement votes for.
    pub action: A,
    pub kind: EndorsementKind,
    pub referent: Referent,
    rl_sourced: bool,
}

impl<A> Endorsement<A> {
    /// A numeric-indifferent endorsement from an ordinary rule.
    pub fn numeric(action: A, referent: impl Into<Referent>) -> Self {
        Self {
            action,
            kind: EndorsementKind::NumericIndifferent,
            referent: referent.into(),
            rl_sourced: false,
        }
    }

    /// A numeric-indifferent endorsement from a learned (RL) rule.
    pub fn learned(action: A, referent: impl Into<Referent>) -> Self {
        Self {
            rl_sourced: true,
            ..Self::numeric(action, referent)
        }
    }

    /// A binary-indifferent endorsement.
    pub fn binary(action: A, referent: impl Into<Referent>) -> Self {
        Self {
            action,
            kind: EndorsementKind::BinaryIndifferent,
            referent: referent.into(),
            rl_sourced: false,
        }
    }

    /// Whether this endorsement came from a learned rule.
    ///
    /// Always false for binary-indifferent endorsements.
    pub fn is_rl_sourced(&self) -> bool {
        self.rl_sourced && self.kind == EndorsementKind::NumericIndifferent
    }
}
