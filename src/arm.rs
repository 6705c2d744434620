//! Arm registry: the arm set and its running statistics.
//!
//! The registry is rebuilt wholesale on every reset or reconfigure; arms are
//! never added or removed individually.

use crate::config::validate_probabilities;
use crate::{ConfigError, Error, PolicyKind, TIEBREAK_EPS};

/// One bandit arm.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arm {
    id: usize,
    true_probability: f64,
    estimated_value: f64,
    pull_count: u64,
    success_count: u64,
    failure_count: u64,
}

impl Arm {
    fn new(id: usize, true_probability: f64) -> Self {
        Self {
            id,
            true_probability,
            estimated_value: 0.0,
            pull_count: 0,
            success_count: 0,
            failure_count: 0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Hidden success probability. Policies must not score with this.
    pub fn true_probability(&self) -> f64 {
        self.true_probability
    }

    /// Running mean of observed rewards (`Q`); `0` before the first pull.
    pub fn estimated_value(&self) -> f64 {
        self.estimated_value
    }

    pub fn pull_count(&self) -> u64 {
        self.pull_count
    }

    pub fn success_count(&self) -> u64 {
        self.success_count
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }

    /// Beta posterior parameters `(S + 1, F + 1)` under a uniform prior.
    pub fn beta_params(&self) -> (f64, f64) {
        (
            self.success_count as f64 + 1.0,
            self.failure_count as f64 + 1.0,
        )
    }

    pub fn snapshot(&self) -> ArmSnapshot {
        ArmSnapshot {
            id: self.id,
            estimated_value: self.estimated_value,
            pull_count: self.pull_count,
            success_count: self.success_count,
            failure_count: self.failure_count,
        }
    }
}

/// Renderer-facing copy of an arm's statistics (the true probability is omitted).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmSnapshot {
    pub id: usize,
    pub estimated_value: f64,
    pub pull_count: u64,
    pub success_count: u64,
    pub failure_count: u64,
}

/// Ordered arm set plus the cached optimal-arm baseline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmRegistry {
    arms: Vec<Arm>,
    optimal_arm: usize,
    optimal_probability: f64,
}

impl ArmRegistry {
    /// Build one zeroed arm per probability, in order.
    ///
    /// Fails if `true_probabilities` is empty or any value is outside `[0, 1]`.
    pub fn new(true_probabilities: &[f64]) -> Result<Self, ConfigError> {
        validate_probabilities(true_probabilities)?;
        let arms: Vec<Arm> = true_probabilities
            .iter()
            .enumerate()
            .map(|(id, &p)| Arm::new(id, p))
            .collect();

        // Strict `>` keeps the lowest id on ties.
        let mut optimal_arm = 0;
        for (id, &p) in true_probabilities.iter().enumerate() {
            if p > true_probabilities[optimal_arm] {
                optimal_arm = id;
            }
        }

        Ok(Self {
            optimal_probability: true_probabilities[optimal_arm],
            optimal_arm,
            arms,
        })
    }

    pub fn len(&self) -> usize {
        self.arms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    pub fn arms(&self) -> &[Arm] {
        &self.arms
    }

    pub fn get(&self, arm: usize) -> Result<&Arm, Error> {
        self.arms.get(arm).ok_or(Error::InvalidArm {
            arm,
            len: self.arms.len(),
        })
    }

    pub fn true_probability(&self, arm: usize) -> Result<f64, Error> {
        self.get(arm).map(Arm::true_probability)
    }

    /// Arm with the highest true probability (lowest id on ties).
    pub fn optimal_arm_id(&self) -> usize {
        self.optimal_arm
    }

    pub fn optimal_probability(&self) -> f64 {
        self.optimal_probability
    }

    /// Lowest-id arm that has never been pulled.
    pub fn first_unpulled(&self) -> Option<usize> {
        self.arms.iter().position(|a| a.pull_count == 0)
    }

    /// Arm with the highest estimate; ties go to the lowest id.
    pub fn best_estimated_arm_id(&self) -> usize {
        let mut best = 0;
        let mut best_q = f64::NEG_INFINITY;
        for a in &self.arms {
            if a.estimated_value > best_q + TIEBREAK_EPS {
                best_q = a.estimated_value;
                best = a.id;
            }
        }
        best
    }

    /// All arms tied at the highest estimate, in id order, and that estimate.
    pub fn greedy_candidates(&self) -> (Vec<usize>, f64) {
        let max_q = self
            .arms
            .iter()
            .map(|a| a.estimated_value)
            .fold(f64::NEG_INFINITY, f64::max);
        let tied = self
            .arms
            .iter()
            .filter(|a| (a.estimated_value - max_q).abs() <= TIEBREAK_EPS)
            .map(|a| a.id)
            .collect();
        (tied, max_q)
    }

    /// Record one observed outcome for `arm`.
    ///
    /// Success/failure counts are maintained only under Thompson; the estimate
    /// always uses the incremental mean `Q += (r - Q) / N`, which for 0/1
    /// rewards equals `S / N`.
    pub fn record_outcome(
        &mut self,
        arm: usize,
        success: bool,
        policy: PolicyKind,
    ) -> Result<(), Error> {
        let len = self.arms.len();
        let a = self
            .arms
            .get_mut(arm)
            .ok_or(Error::InvalidArm { arm, len })?;
        a.pull_count = a.pull_count.saturating_add(1);
        if policy == PolicyKind::Thompson {
            if success {
                a.success_count += 1;
            } else {
                a.failure_count += 1;
            }
        }
        let reward = if success { 1.0 } else { 0.0 };
        a.estimated_value += (reward - a.estimated_value) / a.pull_count as f64;
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<ArmSnapshot> {
        self.arms.iter().map(Arm::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_builds_zeroed_arms_in_order() {
        let r = ArmRegistry::new(&[0.2, 0.8, 0.5]).unwrap();
        assert_eq!(r.len(), 3);
        for (i, a) in r.arms().iter().enumerate() {
            assert_eq!(a.id(), i);
            assert_eq!(a.pull_count(), 0);
            assert_eq!(a.estimated_value(), 0.0);
            assert_eq!(a.success_count() + a.failure_count(), 0);
        }
        assert_eq!(r.optimal_arm_id(), 1);
        assert_eq!(r.optimal_probability(), 0.8);
    }

    #[test]
    fn new_rejects_bad_input() {
        assert_eq!(ArmRegistry::new(&[]), Err(ConfigError::NoArms));
        assert_eq!(
            ArmRegistry::new(&[0.5, -0.01]),
            Err(ConfigError::ProbabilityOutOfRange {
                arm: 1,
                value: -0.01
            })
        );
    }

    #[test]
    fn optimal_arm_tie_goes_to_lowest_id() {
        let r = ArmRegistry::new(&[0.3, 0.7, 0.7, 0.1]).unwrap();
        assert_eq!(r.optimal_arm_id(), 1);
    }

    #[test]
    fn record_outcome_rejects_unknown_arm_without_side_effects() {
        let mut r = ArmRegistry::new(&[0.5, 0.5]).unwrap();
        let before = r.clone();
        assert_eq!(
            r.record_outcome(2, true, PolicyKind::Greedy),
            Err(Error::InvalidArm { arm: 2, len: 2 })
        );
        assert_eq!(r, before);
    }

    #[test]
    fn counts_only_tracked_under_thompson() {
        let mut r = ArmRegistry::new(&[0.5]).unwrap();
        r.record_outcome(0, true, PolicyKind::Greedy).unwrap();
        assert_eq!(r.arms()[0].success_count(), 0);
        assert_eq!(r.arms()[0].pull_count(), 1);

        let mut r = ArmRegistry::new(&[0.5]).unwrap();
        r.record_outcome(0, true, PolicyKind::Thompson).unwrap();
        r.record_outcome(0, false, PolicyKind::Thompson).unwrap();
        r.record_outcome(0, true, PolicyKind::Thompson).unwrap();
        let a = &r.arms()[0];
        assert_eq!((a.success_count(), a.failure_count()), (2, 1));
        assert_eq!(a.beta_params(), (3.0, 2.0));
        assert!((a.estimated_value() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn best_estimated_breaks_ties_by_lowest_id() {
        let mut r = ArmRegistry::new(&[0.5, 0.5, 0.5]).unwrap();
        r.record_outcome(1, true, PolicyKind::Greedy).unwrap();
        r.record_outcome(2, true, PolicyKind::Greedy).unwrap();
        assert_eq!(r.best_estimated_arm_id(), 1);
        let (tied, q) = r.greedy_candidates();
        assert_eq!(tied, vec![1, 2]);
        assert_eq!(q, 1.0);
    }

    #[test]
    fn unpulled_registry_has_every_arm_as_greedy_candidate() {
        let r = ArmRegistry::new(&[0.1, 0.9]).unwrap();
        assert_eq!(r.first_unpulled(), Some(0));
        assert_eq!(r.best_estimated_arm_id(), 0);
        assert_eq!(r.greedy_candidates().0, vec![0, 1]);
    }

    proptest! {
        #[test]
        fn incremental_mean_matches_arithmetic_mean(
            rewards in proptest::collection::vec(any::<bool>(), 1..200),
            thompson in any::<bool>(),
        ) {
            let policy = if thompson { PolicyKind::Thompson } else { PolicyKind::Ucb };
            let mut r = ArmRegistry::new(&[0.5]).unwrap();
            for &x in &rewards {
                r.record_outcome(0, x, policy).unwrap();
            }
            let a = &r.arms()[0];
            let mean = rewards.iter().filter(|&&x| x).count() as f64 / rewards.len() as f64;
            prop_assert!((a.estimated_value() - mean).abs() < 1e-9);
            prop_assert_eq!(a.pull_count(), rewards.len() as u64);
            if thompson {
                prop_assert_eq!(a.success_count() + a.failure_count(), a.pull_count());
            }
        }
    }
}
