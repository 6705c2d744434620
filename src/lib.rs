//! `banditlab`: a seedable Bernoulli multi-armed bandit simulator.
//!
//! An agent repeatedly picks one of K arms; arm `i` pays 1 with a hidden fixed
//! probability `p_i` and 0 otherwise. Each step the configured policy picks an
//! arm, the reward is simulated, the arm's statistics are updated, and regret
//! is accounted against an oracle that always pulls the best arm.
//!
//! **Components:**
//! - [`ArmRegistry`]: the arm set and per-arm statistics (`Q`, `N`, successes,
//!   failures), plus the cached optimal arm.
//! - [`Policy`]: a closed set of selection policies behind [`SelectArm`]:
//!   [`Greedy`], [`EpsilonGreedy`], [`Ucb`], [`Thompson`].
//! - [`Simulation`]: the session object. One [`Simulation::step`] =
//!   choose → simulate reward → update arm → account → [`StepResult`].
//! - [`Driver`]: periodic-timer / single-step trigger discipline over a session.
//!
//! **Goals:**
//! - **Deterministic by default**: same config (including `seed`) → same run.
//! - **Auditable**: every step carries a [`Diagnostic`] with the quantities the
//!   decision was made on (estimate, pulls, UCB bonus, posterior sample).
//! - **No ambient state**: whoever drives steps owns the session.
//!
//! **Non-goals:**
//! - No persistence of history across sessions.
//! - No contextual or multi-agent bandits; no significance testing.
//! - No parallel execution: one decision per step, strictly sequential.
//!
//! # Quick start
//!
//! ```rust
//! use banditlab::{PolicyKind, Simulation, SimulationConfig};
//!
//! let cfg = SimulationConfig::default()
//!     .with_true_probabilities(vec![0.2, 0.8, 0.5, 0.6])
//!     .with_policy(PolicyKind::Ucb)
//!     .with_seed(7);
//! let mut sim = Simulation::new(cfg).unwrap();
//!
//! for _ in 0..1_000 {
//!     let r = sim.step().unwrap();
//!     assert!(r.arm < 4);
//! }
//! let totals = sim.episode();
//! assert_eq!(totals.step, 1_000);
//! assert!(totals.regret >= 0.0);
//! ```
//!
//! # Exploration vs exploitation labels
//!
//! Warm-up pulls (some arm still unpulled) and epsilon-greedy random picks are
//! exploration by construction. For UCB and Thompson the label is assigned
//! after the fact: a choice counts as exploitation when it coincides with the
//! arm that has the highest current estimate. Treat the explore/exploit
//! percentages as a display heuristic, not a regret decomposition.
//!
//! # Thompson sampling approximation
//!
//! By default posterior draws use the power-ratio approximation
//! `U^(1/α) / (U^(1/α) + V^(1/β))`, which is biased relative to a true Beta
//! draw. Set [`SimulationConfig::beta_sampler`] to [`BetaSampler::Exact`] for
//! Gamma-ratio sampling.
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` for configs, results and snapshots.
//! - `runtime`: `Driver::run_periodic`, a `tokio` interval loop.

#![forbid(unsafe_code)]

/// Epsilon used for floating-point tie-breaking in selection scoring.
///
/// Scores within this distance count as tied; ties then resolve to the lowest
/// id (UCB, Thompson, best-estimate) or uniformly at random (greedy).
pub const TIEBREAK_EPS: f64 = 1e-12;

mod error;
pub use error::*;

mod config;
pub use config::*;

mod arm;
pub use arm::*;

mod sampling;
pub use sampling::*;

mod policy;
pub use policy::*;

mod simulation;
pub use simulation::*;

mod driver;
pub use driver::*;
