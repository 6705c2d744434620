//! Simulation configuration.
//!
//! This is the surface an external UI/config layer fills in. Fields are public;
//! start from [`SimulationConfig::default()`] and override via the `with_*`
//! builders or struct update syntax, then call [`SimulationConfig::validate`]
//! (sessions do this for you on construction and on reconfigure).

use std::fmt;
use std::str::FromStr;

use crate::{BetaSampler, ConfigError};

/// Default per-arm success probabilities.
pub const DEFAULT_TRUE_PROBABILITIES: [f64; 4] = [0.2, 0.8, 0.5, 0.6];

/// Default cap on retained history points.
pub const DEFAULT_HISTORY_LIMIT: usize = 10_000;

/// Which selection policy a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum PolicyKind {
    #[default]
    Greedy,
    EpsilonGreedy,
    Ucb,
    Thompson,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::Greedy,
        PolicyKind::EpsilonGreedy,
        PolicyKind::Ucb,
        PolicyKind::Thompson,
    ];

    /// Stable identifier, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Greedy => "greedy",
            PolicyKind::EpsilonGreedy => "epsilon-greedy",
            PolicyKind::Ucb => "ucb",
            PolicyKind::Thompson => "thompson",
        }
    }

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            PolicyKind::Greedy => "Greedy",
            PolicyKind::EpsilonGreedy => "ε-Greedy",
            PolicyKind::Ucb => "UCB (Upper Confidence Bound)",
            PolicyKind::Thompson => "Thompson Sampling",
        }
    }

    /// The decision rule, in the notation usually shown next to the policy.
    pub fn formula(self) -> &'static str {
        match self {
            PolicyKind::Greedy => "a_t = argmax_a Q_t(a)",
            PolicyKind::EpsilonGreedy => "P(a) = ε/|A| + (1-ε) × 1{a = argmax_a Q_t(a)}",
            PolicyKind::Ucb => "a_t = argmax_a [Q_t(a) + c × √(ln t / N_t(a))]",
            PolicyKind::Thompson => "θ_a ~ Beta(S_a+1, F_a+1), a_t = argmax_a θ_a",
        }
    }

    /// One-paragraph explanation of how the policy trades off exploration.
    pub fn description(self) -> &'static str {
        match self {
            PolicyKind::Greedy => {
                "Always pulls the arm with the highest estimated reward and never \
                 explores. Can lock onto a suboptimal arm after unlucky early draws."
            }
            PolicyKind::EpsilonGreedy => {
                "Pulls a uniformly random arm with probability ε and the best known \
                 arm with probability 1-ε."
            }
            PolicyKind::Ucb => {
                "Adds an exploration bonus to each estimate that shrinks as the arm \
                 is pulled more often, so uncertain arms keep getting tried."
            }
            PolicyKind::Thompson => {
                "Keeps a Beta posterior over each arm's success rate and pulls the \
                 arm whose posterior sample is highest."
            }
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" => Ok(PolicyKind::Greedy),
            "epsilon-greedy" | "epsilon_greedy" | "egreedy" => Ok(PolicyKind::EpsilonGreedy),
            "ucb" => Ok(PolicyKind::Ucb),
            "thompson" => Ok(PolicyKind::Thompson),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Full configuration for a [`Simulation`][crate::Simulation].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// Number of arms. Must equal `true_probabilities.len()`.
    pub arm_count: usize,
    /// Hidden per-arm success probabilities, each in `[0, 1]`.
    pub true_probabilities: Vec<f64>,
    pub policy: PolicyKind,
    /// Exploration rate in `[0, 1]` (epsilon-greedy only).
    pub epsilon: f64,
    /// Exploration coefficient `c > 0` (UCB only).
    pub ucb_coefficient: f64,
    /// Posterior sampler (Thompson only).
    pub beta_sampler: BetaSampler,
    /// Periodic-trigger cadence. Irrelevant to single-step mode.
    pub step_interval_ms: u64,
    /// Most recent history points a session keeps; older points are dropped.
    /// `0` disables history.
    pub history_limit: usize,
    /// Seed for the session RNG.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            arm_count: DEFAULT_TRUE_PROBABILITIES.len(),
            true_probabilities: DEFAULT_TRUE_PROBABILITIES.to_vec(),
            policy: PolicyKind::Greedy,
            epsilon: 0.1,
            ucb_coefficient: 2.0,
            beta_sampler: BetaSampler::PowerRatio,
            step_interval_ms: 500,
            history_limit: DEFAULT_HISTORY_LIMIT,
            seed: 0,
        }
    }
}

impl SimulationConfig {
    /// Replace the arm set. Also updates `arm_count`.
    pub fn with_true_probabilities(mut self, probabilities: impl Into<Vec<f64>>) -> Self {
        self.true_probabilities = probabilities.into();
        self.arm_count = self.true_probabilities.len();
        self
    }

    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_ucb_coefficient(mut self, c: f64) -> Self {
        self.ucb_coefficient = c;
        self
    }

    pub fn with_beta_sampler(mut self, sampler: BetaSampler) -> Self {
        self.beta_sampler = sampler;
        self
    }

    pub fn with_step_interval_ms(mut self, ms: u64) -> Self {
        self.step_interval_ms = ms;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check every field the selected policy depends on.
    ///
    /// Policy parameters that the selected policy ignores are not checked
    /// (e.g. `epsilon` under UCB).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arm_count == 0 || self.true_probabilities.is_empty() {
            return Err(ConfigError::NoArms);
        }
        if self.arm_count != self.true_probabilities.len() {
            return Err(ConfigError::ArmCountMismatch {
                expected: self.arm_count,
                actual: self.true_probabilities.len(),
            });
        }
        validate_probabilities(&self.true_probabilities)?;
        match self.policy {
            PolicyKind::EpsilonGreedy => validate_epsilon(self.epsilon)?,
            PolicyKind::Ucb => validate_ucb_coefficient(self.ucb_coefficient)?,
            PolicyKind::Greedy | PolicyKind::Thompson => {}
        }
        if self.step_interval_ms == 0 {
            return Err(ConfigError::ZeroStepInterval);
        }
        Ok(())
    }

    /// Apply per-arm probability edits field by field.
    ///
    /// `values[i]` is the edit for arm `i`; `None` stands for an unparseable
    /// field. Valid values in `[0, 1]` replace the current probability, anything
    /// else is skipped without blocking the other arms. Entries beyond
    /// `arm_count` are ignored.
    ///
    /// Returns the ids of the arms whose edit was rejected.
    pub fn apply_probability_overrides(&mut self, values: &[Option<f64>]) -> Vec<usize> {
        let mut rejected = Vec::new();
        let n = self.arm_count.min(self.true_probabilities.len());
        for (arm, value) in values.iter().take(n).enumerate() {
            match value {
                Some(v) if is_unit(*v) => self.true_probabilities[arm] = *v,
                _ => rejected.push(arm),
            }
        }
        if !rejected.is_empty() {
            tracing::warn!(?rejected, "ignored out-of-range probability edits");
        }
        rejected
    }
}

/// Map a speed-slider position to a step interval: `1050 - speed` ms, at least 1ms.
pub fn step_interval_for_speed(speed: u64) -> u64 {
    1050u64.saturating_sub(speed).max(1)
}

pub(crate) fn validate_probabilities(probabilities: &[f64]) -> Result<(), ConfigError> {
    if probabilities.is_empty() {
        return Err(ConfigError::NoArms);
    }
    for (arm, &value) in probabilities.iter().enumerate() {
        if !is_unit(value) {
            return Err(ConfigError::ProbabilityOutOfRange { arm, value });
        }
    }
    Ok(())
}

pub(crate) fn validate_epsilon(epsilon: f64) -> Result<(), ConfigError> {
    if is_unit(epsilon) {
        Ok(())
    } else {
        Err(ConfigError::EpsilonOutOfRange(epsilon))
    }
}

pub(crate) fn validate_ucb_coefficient(c: f64) -> Result<(), ConfigError> {
    if c.is_finite() && c > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidUcbCoefficient(c))
    }
}

fn is_unit(x: f64) -> bool {
    x.is_finite() && (0.0..=1.0).contains(&x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = SimulationConfig::default();
        assert_eq!(cfg.arm_count, 4);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn rejects_empty_and_mismatched_arm_sets() {
        let cfg = SimulationConfig::default().with_true_probabilities(Vec::<f64>::new());
        assert_eq!(cfg.validate(), Err(ConfigError::NoArms));

        let cfg = SimulationConfig {
            arm_count: 3,
            ..SimulationConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ArmCountMismatch {
                expected: 3,
                actual: 4
            })
        );
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let cfg = SimulationConfig::default().with_true_probabilities(vec![0.1, 1.5]);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ProbabilityOutOfRange { arm: 1, value: 1.5 })
        );
        let cfg = SimulationConfig::default().with_true_probabilities(vec![f64::NAN]);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ProbabilityOutOfRange { arm: 0, .. })
        ));
    }

    #[test]
    fn only_checks_parameters_of_selected_policy() {
        let cfg = SimulationConfig::default().with_epsilon(3.0);
        assert_eq!(cfg.validate(), Ok(()));
        let cfg = cfg.with_policy(PolicyKind::EpsilonGreedy);
        assert_eq!(cfg.validate(), Err(ConfigError::EpsilonOutOfRange(3.0)));

        let cfg = SimulationConfig::default()
            .with_policy(PolicyKind::Ucb)
            .with_ucb_coefficient(0.0);
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidUcbCoefficient(0.0)));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let cfg = SimulationConfig::default().with_step_interval_ms(0);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroStepInterval));
    }

    #[test]
    fn policy_kind_parses_and_displays() {
        for kind in PolicyKind::ALL {
            assert_eq!(kind.as_str().parse::<PolicyKind>(), Ok(kind));
            assert_eq!(kind.to_string(), kind.as_str());
        }
        assert_eq!(" UCB ".parse::<PolicyKind>(), Ok(PolicyKind::Ucb));
        assert_eq!(
            "softmax".parse::<PolicyKind>(),
            Err(ConfigError::UnknownPolicy("softmax".to_string()))
        );
    }

    #[test]
    fn every_policy_has_its_own_description() {
        let descriptions: Vec<&str> = PolicyKind::ALL.iter().map(|k| k.description()).collect();
        for (i, d) in descriptions.iter().enumerate() {
            assert!(!d.is_empty());
            assert!(!d.contains("  "), "{d}");
            assert!(descriptions[i + 1..].iter().all(|other| other != d));
        }
        assert!(PolicyKind::EpsilonGreedy.description().contains('ε'));
    }

    #[test]
    fn history_limit_defaults_and_builds() {
        assert_eq!(SimulationConfig::default().history_limit, DEFAULT_HISTORY_LIMIT);
        let cfg = SimulationConfig::default().with_history_limit(0);
        assert_eq!(cfg.history_limit, 0);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn overrides_skip_bad_fields_independently() {
        let mut cfg = SimulationConfig::default();
        let rejected =
            cfg.apply_probability_overrides(&[Some(0.9), None, Some(-0.1), Some(0.3), Some(0.7)]);
        assert_eq!(rejected, vec![1, 2]);
        assert_eq!(cfg.true_probabilities, vec![0.9, 0.8, 0.5, 0.3]);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn speed_maps_to_interval() {
        assert_eq!(step_interval_for_speed(550), 500);
        assert_eq!(step_interval_for_speed(1000), 50);
        assert_eq!(step_interval_for_speed(5000), 1);
    }

    proptest! {
        #[test]
        fn validate_accepts_exactly_unit_probabilities(
            probs in proptest::collection::vec(-0.5f64..1.5, 1..10),
        ) {
            let cfg = SimulationConfig::default().with_true_probabilities(probs.clone());
            let all_unit = probs.iter().all(|p| (0.0..=1.0).contains(p));
            prop_assert_eq!(cfg.validate().is_ok(), all_unit);
        }
    }
}
