//! Simulation session: the step loop and regret accounting.
//!
//! [`Simulation`] owns everything a run needs (configuration, arm registry,
//! episode counters, per-step history, RNG) and exposes one atomic operation:
//!
//! ```text
//! let r = sim.step()?;   // choose, simulate the Bernoulli reward, update, account
//! render(&r);            // your code
//! ```
//!
//! There is no global state; whoever drives steps holds the session.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{validate_epsilon, validate_ucb_coefficient};
use crate::{
    ActionType, ArmRegistry, ArmSnapshot, ConfigError, Diagnostic, Error, Policy, PolicyKind,
    SelectArm, SimulationConfig,
};

/// Where a session is in its lifecycle.
///
/// A step in progress is never observable: `step()` takes `&mut self`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SessionState {
    /// No steps since the last reset.
    Idle,
    /// At least one step completed; ready for the next.
    Ready,
}

/// Cumulative episode counters. All zero after a reset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpisodeTotals {
    /// Completed decisions.
    pub step: u64,
    /// Sum of observed 0/1 rewards.
    pub total_reward: u64,
    /// Expected reward of an oracle always pulling the optimal arm: `step * p*`.
    pub optimal_reward: f64,
    /// Expected regret: `sum(p* - p(chosen))`, independent of realized rewards.
    pub regret: f64,
    pub explore_count: u64,
    pub exploit_count: u64,
}

impl EpisodeTotals {
    /// Share of steps the policy classified as exploration, in percent (0 before any step).
    pub fn explore_percent(&self) -> f64 {
        percent(self.explore_count, self.step)
    }

    pub fn exploit_percent(&self) -> f64 {
        percent(self.exploit_count, self.step)
    }

    /// `total_reward / step`, or 0 before any step.
    pub fn mean_reward(&self) -> f64 {
        if self.step == 0 {
            0.0
        } else {
            self.total_reward as f64 / self.step as f64
        }
    }
}

fn percent(count: u64, of: u64) -> f64 {
    if of == 0 {
        0.0
    } else {
        100.0 * count as f64 / of as f64
    }
}

/// Immutable record of one completed step.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepResult {
    /// 1-based index of this step.
    pub step: u64,
    pub arm: usize,
    /// Observed reward, 0 or 1.
    pub reward: u8,
    pub action: ActionType,
    pub diagnostic: Diagnostic,
    pub total_reward: u64,
    pub optimal_reward: f64,
    pub regret: f64,
    pub explore_percent: f64,
    pub exploit_percent: f64,
}

/// One point of the per-step time series (cumulative values after `step`).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryPoint {
    pub step: u64,
    pub total_reward: u64,
    pub optimal_reward: f64,
    pub regret: f64,
    pub explore_percent: f64,
    pub exploit_percent: f64,
}

/// Everything a renderer needs to redraw from scratch.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationSnapshot {
    pub state: SessionState,
    pub policy: PolicyKind,
    pub arms: Vec<ArmSnapshot>,
    pub episode: EpisodeTotals,
}

/// A bandit simulation session.
#[derive(Debug, Clone)]
pub struct Simulation {
    cfg: SimulationConfig,
    policy: Policy,
    blank: ArmRegistry,
    registry: ArmRegistry,
    episode: EpisodeTotals,
    history: VecDeque<HistoryPoint>,
    rng: StdRng,
}

impl Simulation {
    /// Create a session from a validated configuration.
    pub fn new(cfg: SimulationConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let blank = ArmRegistry::new(&cfg.true_probabilities)?;
        tracing::info!(
            policy = %cfg.policy,
            arms = cfg.arm_count,
            seed = cfg.seed,
            "simulation created"
        );
        Ok(Self {
            policy: Policy::from_config(&cfg),
            registry: blank.clone(),
            blank,
            episode: EpisodeTotals::default(),
            history: VecDeque::with_capacity(cfg.history_limit.min(1024)),
            rng: StdRng::seed_from_u64(cfg.seed),
            cfg,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.cfg
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn registry(&self) -> &ArmRegistry {
        &self.registry
    }

    pub fn episode(&self) -> &EpisodeTotals {
        &self.episode
    }

    /// Per-step cumulative series since the last reset, oldest first.
    ///
    /// Holds at most `history_limit` points; the oldest are dropped first.
    pub fn history(&self) -> &VecDeque<HistoryPoint> {
        &self.history
    }

    pub fn state(&self) -> SessionState {
        if self.episode.step == 0 {
            SessionState::Idle
        } else {
            SessionState::Ready
        }
    }

    /// Run one decision: choose, simulate the reward, update the arm, account.
    ///
    /// On error the arm statistics, episode counters and history are unchanged;
    /// the RNG may already have advanced.
    pub fn step(&mut self) -> Result<StepResult, Error> {
        let choice = self
            .policy
            .select_arm(&self.registry, self.episode.step, &mut self.rng);
        let p = self.registry.true_probability(choice.arm)?;
        let success = self.rng.random::<f64>() < p;
        self.registry
            .record_outcome(choice.arm, success, self.policy.kind())?;

        let reward = u8::from(success);
        let p_star = self.registry.optimal_probability();
        let e = &mut self.episode;
        e.step += 1;
        e.total_reward += u64::from(reward);
        e.optimal_reward = e.step as f64 * p_star;
        e.regret += p_star - p;
        match choice.action {
            ActionType::Explore => e.explore_count += 1,
            ActionType::Exploit => e.exploit_count += 1,
        }

        let result = StepResult {
            step: e.step,
            arm: choice.arm,
            reward,
            action: choice.action,
            diagnostic: choice.diagnostic,
            total_reward: e.total_reward,
            optimal_reward: e.optimal_reward,
            regret: e.regret,
            explore_percent: e.explore_percent(),
            exploit_percent: e.exploit_percent(),
        };
        self.record_history(&result);
        tracing::debug!(
            step = result.step,
            arm = result.arm,
            reward = result.reward,
            action = %result.action,
            regret = result.regret,
            "step"
        );
        Ok(result)
    }

    fn record_history(&mut self, r: &StepResult) {
        let limit = self.cfg.history_limit;
        if limit == 0 {
            return;
        }
        while self.history.len() >= limit {
            self.history.pop_front();
        }
        self.history.push_back(HistoryPoint {
            step: r.step,
            total_reward: r.total_reward,
            optimal_reward: r.optimal_reward,
            regret: r.regret,
            explore_percent: r.explore_percent,
            exploit_percent: r.exploit_percent,
        });
    }

    /// Run `n` steps; returns the last result (`None` when `n == 0`).
    pub fn run(&mut self, n: u64) -> Result<Option<StepResult>, Error> {
        let mut last = None;
        for _ in 0..n {
            last = Some(self.step()?);
        }
        Ok(last)
    }

    /// Discard all arm statistics, counters and history; back to [`SessionState::Idle`].
    ///
    /// The RNG stream continues; it is not re-seeded.
    pub fn reset(&mut self) {
        self.registry = self.blank.clone();
        self.episode = EpisodeTotals::default();
        self.history.clear();
        tracing::info!(policy = %self.cfg.policy, "simulation reset");
    }

    /// Replace the configuration and reset.
    ///
    /// The new configuration is validated first; if it is rejected the
    /// current configuration and episode are left untouched. The RNG is
    /// re-seeded only when `seed` changes.
    pub fn reconfigure(&mut self, cfg: SimulationConfig) -> Result<(), ConfigError> {
        let blank = cfg
            .validate()
            .and_then(|()| ArmRegistry::new(&cfg.true_probabilities))
            .inspect_err(|e| tracing::warn!(error = %e, "configuration rejected"))?;
        if cfg.seed != self.cfg.seed {
            self.rng = StdRng::seed_from_u64(cfg.seed);
        }
        self.policy = Policy::from_config(&cfg);
        self.blank = blank;
        self.cfg = cfg;
        tracing::info!(policy = %self.cfg.policy, arms = self.cfg.arm_count, "reconfigured");
        self.reset();
        Ok(())
    }

    /// Change the exploration rate mid-run. Arm statistics and the episode
    /// are kept; the next step uses the new value.
    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<(), ConfigError> {
        validate_epsilon(epsilon)
            .inspect_err(|e| tracing::warn!(error = %e, "epsilon rejected"))?;
        self.cfg.epsilon = epsilon;
        self.policy = Policy::from_config(&self.cfg);
        tracing::info!(epsilon, step = self.episode.step, "epsilon updated");
        Ok(())
    }

    /// Change the UCB exploration coefficient mid-run, without a reset.
    pub fn set_ucb_coefficient(&mut self, c: f64) -> Result<(), ConfigError> {
        validate_ucb_coefficient(c)
            .inspect_err(|e| tracing::warn!(error = %e, "ucb coefficient rejected"))?;
        self.cfg.ucb_coefficient = c;
        self.policy = Policy::from_config(&self.cfg);
        tracing::info!(c, step = self.episode.step, "ucb coefficient updated");
        Ok(())
    }

    /// Record a new periodic-trigger cadence in the configuration.
    pub fn set_step_interval_ms(&mut self, ms: u64) -> Result<(), ConfigError> {
        if ms == 0 {
            return Err(ConfigError::ZeroStepInterval);
        }
        self.cfg.step_interval_ms = ms;
        Ok(())
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            state: self.state(),
            policy: self.policy.kind(),
            arms: self.registry.snapshot(),
            episode: self.episode,
        }
    }
}
