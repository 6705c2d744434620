//! Error types.
//!
//! There are no transient failures in this crate: everything is in-memory
//! computation, so every error is a validation failure.

/// A configuration was rejected.
///
/// Returned before any state changes; the previously active configuration
/// (if any) stays in effect.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// No arms were configured.
    #[error("at least one arm is required")]
    NoArms,
    /// `arm_count` disagrees with the number of configured probabilities.
    #[error("arm_count is {expected} but {actual} true probabilities were given")]
    ArmCountMismatch { expected: usize, actual: usize },
    /// A true probability is non-finite or outside `[0, 1]`.
    #[error("true probability {value} for arm {arm} is outside [0, 1]")]
    ProbabilityOutOfRange { arm: usize, value: f64 },
    #[error("epsilon {0} is outside [0, 1]")]
    EpsilonOutOfRange(f64),
    #[error("UCB coefficient must be finite and > 0 (got {0})")]
    InvalidUcbCoefficient(f64),
    #[error("step interval must be at least 1ms")]
    ZeroStepInterval,
    #[error("unknown policy {0:?} (expected greedy, epsilon-greedy, ucb or thompson)")]
    UnknownPolicy(String),
}

/// Errors raised by simulation operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// An operation referenced an arm outside the registry.
    ///
    /// This cannot be produced from valid external input once a configuration
    /// has been accepted; treat it as an internal consistency bug.
    #[error("arm {arm} is out of range (registry has {len} arms)")]
    InvalidArm { arm: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_error() {
        let e: Error = ConfigError::NoArms.into();
        assert_eq!(e, Error::Config(ConfigError::NoArms));
        assert_eq!(e.to_string(), "at least one arm is required");
    }

    #[test]
    fn invalid_arm_message_names_both_bounds() {
        let e = Error::InvalidArm { arm: 7, len: 4 };
        assert_eq!(e.to_string(), "arm 7 is out of range (registry has 4 arms)");
    }
}
