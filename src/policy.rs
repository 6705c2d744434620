//! Arm-selection policies.
//!
//! [`Policy`] is a closed set of variants; each variant is its own type
//! implementing [`SelectArm`], and the enum dispatches exhaustively.
//!
//! All policies share the same warm-up: while any arm is unpulled, the
//! lowest-id unpulled arm is chosen and classified as exploration. Policy
//! scoring only starts once every arm has at least one observation.
//!
//! UCB and Thompson classify their choice *post hoc*: `Exploit` when the chosen
//! arm is also the best-estimated arm, `Explore` otherwise. This is a display
//! heuristic, not a regret decomposition.

use std::fmt;

use rand::Rng;

use crate::{ArmRegistry, BetaSampler, PolicyKind, SimulationConfig, TIEBREAK_EPS};

/// How the policy itself classifies a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActionType {
    Explore,
    Exploit,
}

impl ActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::Explore => "explore",
            ActionType::Exploit => "exploit",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The quantities needed to audit a decision.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Diagnostic {
    /// An unpulled arm was chosen before any scoring.
    WarmUp { arm: usize, policy: PolicyKind },
    /// Greedy argmax; `tied` counts the arms sharing the maximum estimate.
    Greedy {
        arm: usize,
        estimate: f64,
        pulls: u64,
        tied: usize,
    },
    /// Epsilon-greedy took the random branch.
    EpsilonExplore { arm: usize, epsilon: f64 },
    /// Epsilon-greedy took the greedy branch.
    EpsilonExploit {
        arm: usize,
        epsilon: f64,
        estimate: f64,
        pulls: u64,
        tied: usize,
    },
    /// UCB choice; `bonuses[i]` is arm `i`'s exploration bonus this step.
    Ucb {
        arm: usize,
        estimate: f64,
        pulls: u64,
        bonus: f64,
        score: f64,
        bonuses: Vec<f64>,
    },
    /// Thompson choice; `samples[i]` is arm `i`'s posterior draw this step.
    Thompson {
        arm: usize,
        estimate: f64,
        pulls: u64,
        sample: f64,
        alpha: f64,
        beta: f64,
        samples: Vec<f64>,
    },
}

impl Diagnostic {
    pub fn arm(&self) -> usize {
        match self {
            Diagnostic::WarmUp { arm, .. }
            | Diagnostic::Greedy { arm, .. }
            | Diagnostic::EpsilonExplore { arm, .. }
            | Diagnostic::EpsilonExploit { arm, .. }
            | Diagnostic::Ucb { arm, .. }
            | Diagnostic::Thompson { arm, .. } => *arm,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::WarmUp { arm, policy } => {
                write!(f, "{}: first pull of arm {} (warm-up)", policy.display_name(), arm + 1)
            }
            Diagnostic::Greedy { arm, estimate, .. } => {
                write!(f, "Greedy: chose arm {} (highest Q = {estimate:.2})", arm + 1)
            }
            Diagnostic::EpsilonExplore { arm, epsilon } => write!(
                f,
                "ε-Greedy: exploring at random (ε={epsilon:.2}), chose arm {}",
                arm + 1
            ),
            Diagnostic::EpsilonExploit { arm, estimate, .. } => write!(
                f,
                "ε-Greedy: exploiting (1-ε), chose arm {} (highest Q = {estimate:.2})",
                arm + 1
            ),
            Diagnostic::Ucb {
                arm,
                estimate,
                bonus,
                score,
                ..
            } => write!(
                f,
                "UCB: chose arm {} (Q={estimate:.2} + bonus={bonus:.2} = UCB {score:.2})",
                arm + 1
            ),
            Diagnostic::Thompson {
                arm,
                sample,
                alpha,
                beta,
                ..
            } => write!(
                f,
                "Thompson: chose arm {} (sample Beta({alpha}, {beta}) = {sample:.3})",
                arm + 1
            ),
        }
    }
}

/// One policy decision.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Choice {
    pub arm: usize,
    pub action: ActionType,
    pub diagnostic: Diagnostic,
}

/// Common selection capability of every policy variant.
pub trait SelectArm {
    fn kind(&self) -> PolicyKind;

    /// Policy-specific scoring. Only called once every arm has been pulled.
    fn select_scored<R: Rng>(
        &self,
        registry: &ArmRegistry,
        step_index: u64,
        rng: &mut R,
    ) -> Choice;

    /// Select the next arm for 0-based decision `step_index`.
    fn select_arm<R: Rng>(&self, registry: &ArmRegistry, step_index: u64, rng: &mut R) -> Choice {
        if let Some(arm) = registry.first_unpulled() {
            return Choice {
                arm,
                action: ActionType::Explore,
                diagnostic: Diagnostic::WarmUp {
                    arm,
                    policy: self.kind(),
                },
            };
        }
        self.select_scored(registry, step_index, rng)
    }
}

fn pick_uniform<R: Rng>(rng: &mut R, items: &[usize]) -> usize {
    match items.len() {
        0 => 0,
        1 => items[0],
        n => items[rng.random_range(0..n)],
    }
}

fn estimate_and_pulls(registry: &ArmRegistry, arm: usize) -> (f64, u64) {
    registry
        .arms()
        .get(arm)
        .map(|a| (a.estimated_value(), a.pull_count()))
        .unwrap_or((0.0, 0))
}

fn post_hoc_action(registry: &ArmRegistry, arm: usize) -> ActionType {
    if arm == registry.best_estimated_arm_id() {
        ActionType::Exploit
    } else {
        ActionType::Explore
    }
}

/// Always the highest estimate; ties broken uniformly at random.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Greedy;

impl Greedy {
    /// Returns `(arm, number of tied arms)`.
    fn pick<R: Rng>(registry: &ArmRegistry, rng: &mut R) -> (usize, usize) {
        let (tied, _) = registry.greedy_candidates();
        (pick_uniform(rng, &tied), tied.len())
    }
}

impl SelectArm for Greedy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Greedy
    }

    fn select_scored<R: Rng>(
        &self,
        registry: &ArmRegistry,
        _step_index: u64,
        rng: &mut R,
    ) -> Choice {
        let (arm, tied) = Greedy::pick(registry, rng);
        let (estimate, pulls) = estimate_and_pulls(registry, arm);
        Choice {
            arm,
            action: ActionType::Exploit,
            diagnostic: Diagnostic::Greedy {
                arm,
                estimate,
                pulls,
                tied,
            },
        }
    }
}

/// Uniformly random arm with probability `epsilon`, greedy otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpsilonGreedy {
    pub epsilon: f64,
}

impl SelectArm for EpsilonGreedy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::EpsilonGreedy
    }

    fn select_scored<R: Rng>(
        &self,
        registry: &ArmRegistry,
        _step_index: u64,
        rng: &mut R,
    ) -> Choice {
        // No coin flip at epsilon = 0, so the random stream matches plain greedy.
        if self.epsilon > 0.0 && rng.random::<f64>() < self.epsilon {
            let arm = rng.random_range(0..registry.len().max(1));
            return Choice {
                arm,
                action: ActionType::Explore,
                diagnostic: Diagnostic::EpsilonExplore {
                    arm,
                    epsilon: self.epsilon,
                },
            };
        }
        let (arm, tied) = Greedy::pick(registry, rng);
        let (estimate, pulls) = estimate_and_pulls(registry, arm);
        Choice {
            arm,
            action: ActionType::Exploit,
            diagnostic: Diagnostic::EpsilonExploit {
                arm,
                epsilon: self.epsilon,
                estimate,
                pulls,
                tied,
            },
        }
    }
}

/// UCB exploration bonus `c * sqrt(ln(t) / n)`.
///
/// `t` is the 1-based decision count; `n` must be > 0.
pub fn ucb_bonus(c: f64, t: u64, n: u64) -> f64 {
    c * ((t.max(1) as f64).ln() / n.max(1) as f64).sqrt()
}

/// UCB score `q + c * sqrt(ln(t) / n)`.
pub fn ucb_score(q: f64, n: u64, c: f64, t: u64) -> f64 {
    q + ucb_bonus(c, t, n)
}

/// Upper confidence bound: maximise `Q + c * sqrt(ln t / N)`, ties to lowest id.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ucb {
    pub c: f64,
}

impl SelectArm for Ucb {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Ucb
    }

    fn select_scored<R: Rng>(
        &self,
        registry: &ArmRegistry,
        step_index: u64,
        _rng: &mut R,
    ) -> Choice {
        let t = step_index.saturating_add(1);
        let mut bonuses = Vec::with_capacity(registry.len());
        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for a in registry.arms() {
            let bonus = ucb_bonus(self.c, t, a.pull_count());
            let score = a.estimated_value() + bonus;
            if score > best_score + TIEBREAK_EPS {
                best_score = score;
                best = a.id();
            }
            bonuses.push(bonus);
        }
        let (estimate, pulls) = estimate_and_pulls(registry, best);
        Choice {
            arm: best,
            action: post_hoc_action(registry, best),
            diagnostic: Diagnostic::Ucb {
                arm: best,
                estimate,
                pulls,
                bonus: bonuses.get(best).copied().unwrap_or(0.0),
                score: best_score,
                bonuses,
            },
        }
    }
}

/// Thompson sampling over `Beta(S + 1, F + 1)` posteriors, ties to lowest id.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Thompson {
    pub sampler: BetaSampler,
}

impl SelectArm for Thompson {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Thompson
    }

    fn select_scored<R: Rng>(
        &self,
        registry: &ArmRegistry,
        _step_index: u64,
        rng: &mut R,
    ) -> Choice {
        let mut samples = Vec::with_capacity(registry.len());
        let mut best = 0;
        let mut best_sample = f64::NEG_INFINITY;
        for a in registry.arms() {
            let (alpha, beta) = a.beta_params();
            let x = self.sampler.sample(rng, alpha, beta);
            if x > best_sample + TIEBREAK_EPS {
                best_sample = x;
                best = a.id();
            }
            samples.push(x);
        }
        let (estimate, pulls) = estimate_and_pulls(registry, best);
        let (alpha, beta) = registry
            .arms()
            .get(best)
            .map(|a| a.beta_params())
            .unwrap_or((1.0, 1.0));
        Choice {
            arm: best,
            action: post_hoc_action(registry, best),
            diagnostic: Diagnostic::Thompson {
                arm: best,
                estimate,
                pulls,
                sample: best_sample,
                alpha,
                beta,
                samples,
            },
        }
    }
}

/// The configured policy.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Policy {
    Greedy(Greedy),
    EpsilonGreedy(EpsilonGreedy),
    Ucb(Ucb),
    Thompson(Thompson),
}

impl Policy {
    /// Build the policy selected by `cfg`, with its parameters.
    pub fn from_config(cfg: &SimulationConfig) -> Self {
        match cfg.policy {
            PolicyKind::Greedy => Policy::Greedy(Greedy),
            PolicyKind::EpsilonGreedy => Policy::EpsilonGreedy(EpsilonGreedy {
                epsilon: cfg.epsilon,
            }),
            PolicyKind::Ucb => Policy::Ucb(Ucb {
                c: cfg.ucb_coefficient,
            }),
            PolicyKind::Thompson => Policy::Thompson(Thompson {
                sampler: cfg.beta_sampler,
            }),
        }
    }
}

impl SelectArm for Policy {
    fn kind(&self) -> PolicyKind {
        match self {
            Policy::Greedy(p) => p.kind(),
            Policy::EpsilonGreedy(p) => p.kind(),
            Policy::Ucb(p) => p.kind(),
            Policy::Thompson(p) => p.kind(),
        }
    }

    fn select_scored<R: Rng>(
        &self,
        registry: &ArmRegistry,
        step_index: u64,
        rng: &mut R,
    ) -> Choice {
        match self {
            Policy::Greedy(p) => p.select_scored(registry, step_index, rng),
            Policy::EpsilonGreedy(p) => p.select_scored(registry, step_index, rng),
            Policy::Ucb(p) => p.select_scored(registry, step_index, rng),
            Policy::Thompson(p) => p.select_scored(registry, step_index, rng),
        }
    }
}
