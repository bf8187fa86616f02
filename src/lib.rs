//! `indifferent`: exploration policies for choosing among tied candidate actions.
//!
//! Built for the "indifferent selection" step of a decision cycle: several
//! candidate actions are acceptable, and the caller wants one picked
//! according to a configurable policy. Each candidate's utility comes from
//! numeric endorsements (preference values) attached to it.
//!
//! **Pipeline (one decision):**
//! 1. [`aggregate`]: fold each candidate's endorsements into a utility
//!    ([`AggregationMode::Sum`] or [`AggregationMode::Average`]).
//! 2. [`greedy_reference`]: record the greedy value an off-policy learner
//!    would update toward.
//! 3. [`select`]: apply the active [`SelectionPolicy`].
//! 4. [`feed_back`]: report the outcome to a [`LearningModule`].
//!
//! [`Exploration`] bundles the settings and runs the whole pipeline via
//! [`Exploration::choose`].
//!
//! **Selection policies:**
//! - `First` / `Last`: deterministic head/tail.
//! - `RandomUniform`: one uniform integer draw.
//! - `SoftmaxProportional`: probability proportional to positive utility;
//!   uniform if nothing is positive.
//! - `EpsilonGreedy`: explore uniformly with probability `epsilon`, otherwise
//!   pick a maximum (ties broken uniformly).
//! - `Boltzmann`: probability proportional to `exp(u / temperature)`,
//!   computed with the max shift so large utilities stay finite.
//!
//! **Parameters:** [`ParameterStore`] holds named, domain-checked scalars
//! (`epsilon`, `temperature`, and any the caller registers). [`anneal`]
//! decays each one by its active [`DecayLaw`] once per cycle when
//! auto-update is on.
//!
//! **Goals:**
//! - **Deterministic under a seed**: all randomness flows through
//!   [`RandomSource`]; [`SeededRandom`] makes decisions reproducible.
//! - **Caller-owned state**: no globals; every decision-maker owns its
//!   [`Exploration`].
//! - **Auditable**: every selection returns a [`Decision`] with typed
//!   [`DecisionNote`]s and, with diagnostics on, a per-candidate report.
//!
//! **Non-goals:**
//! - Not a learner. Value updates belong to the [`LearningModule`] you plug in.
//! - No command surface or persistence beyond the serializable
//!   [`ExplorationConfig`] (feature `serde`).
//!
//! # Example
//!
//! ```rust
//! use indifferent::{
//!     Candidate, Endorsement, Exploration, NoLearning, SeededRandom, SelectionPolicy,
//! };
//!
//! let mut exploration = Exploration::new();
//! exploration.set_policy(SelectionPolicy::Boltzmann);
//!
//! let mut candidates = vec![Candidate::new("left"), Candidate::new("right")];
//! let endorsements = vec![
//!     Endorsement::numeric("left", 0.2),
//!     Endorsement::numeric("right", 0.9),
//! ];
//! let mut rng = SeededRandom::new(7);
//! let d = exploration
//!     .choose(&mut candidates, &endorsements, &mut rng, &mut NoLearning, ())
//!     .unwrap();
//! assert!(d.chosen < candidates.len());
//! exploration.update_parameters();
//! ```

#![forbid(unsafe_code)]

mod error;
pub use error::*;

mod candidate;
pub use candidate::*;

mod aggregate;
pub use aggregate::*;

mod param;
pub use param::*;

mod anneal;
pub use anneal::*;

mod rng;
pub use rng::*;

mod alloc;
pub use alloc::*;

mod decision;
pub use decision::*;

mod learning;
pub use learning::*;

mod select;
pub use select::*;

mod exploration;
pub use exploration::*;
