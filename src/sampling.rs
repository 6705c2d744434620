//! Beta posterior sampling for Thompson sampling.
//!
//! The default sampler is the power-ratio approximation
//! `x = U^(1/α)`, `y = V^(1/β)`, `θ = x / (x + y)`. It is cheap and keeps
//! the ordering behaviour of a Beta posterior (more successes push samples up),
//! but it is **not** Beta-distributed: it is biased, most visibly for small
//! `α`, `β`. [`BetaSampler::Exact`] opts into the Gamma-ratio sampler from
//! `rand_distr`.

use rand::distr::Open01;
use rand::Rng;
use rand_distr::{Beta, Distribution};

/// How Thompson sampling draws from each arm's Beta posterior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum BetaSampler {
    /// `U^(1/α) / (U^(1/α) + V^(1/β))` with `U, V ~ Uniform(0, 1)`.
    #[default]
    PowerRatio,
    /// Exact Beta draw (Gamma ratio).
    Exact,
}

impl BetaSampler {
    /// Draw one sample in `[0, 1]` from (an approximation of) `Beta(alpha, beta)`.
    ///
    /// Non-finite or non-positive parameters yield `0.5`.
    pub fn sample<R: Rng>(self, rng: &mut R, alpha: f64, beta: f64) -> f64 {
        if !(alpha.is_finite() && beta.is_finite()) || alpha <= 0.0 || beta <= 0.0 {
            return 0.5;
        }
        match self {
            BetaSampler::PowerRatio => power_ratio_beta(rng, alpha, beta),
            BetaSampler::Exact => match Beta::new(alpha, beta) {
                Ok(dist) => dist.sample(rng),
                Err(_) => 0.5,
            },
        }
    }
}

/// The power-ratio approximation. Consumes exactly two uniform draws.
pub fn power_ratio_beta<R: Rng>(rng: &mut R, alpha: f64, beta: f64) -> f64 {
    // Open interval: U = 0 and V = 0 together would give 0/0.
    let u: f64 = rng.sample(Open01);
    let v: f64 = rng.sample(Open01);
    let x = u.powf(1.0 / alpha);
    let y = v.powf(1.0 / beta);
    let s = x + y;
    if s > 0.0 && s.is_finite() {
        x / s
    } else {
        0.5
    }
}
