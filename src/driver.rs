//! Step triggering: periodic timer and single-step requests over one session.
//!
//! Both trigger paths call the same atomic [`Simulation::step`], and both go
//! through `&mut Driver`, so two steps can never interleave.
//!
//! - [`Driver::tick`] is what a periodic timer calls; it only steps while running.
//! - [`Driver::step_once`] cancels the periodic trigger, steps exactly once and
//!   leaves the driver paused.
//! - [`Driver::reset`] and [`Driver::reconfigure`] are cancellation points: the
//!   driver pauses before anything else happens.
//!
//! With the `runtime` feature, `Driver::run_periodic` drives ticks from a
//! `tokio` interval on the caller's runtime.

use std::time::Duration;

use crate::config::step_interval_for_speed;
use crate::{ConfigError, Error, Simulation, SimulationConfig, StepResult};

/// Whether periodic triggers are honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RunState {
    #[default]
    Paused,
    Running,
}

/// Owns a [`Simulation`] and the trigger discipline around it.
#[derive(Debug, Clone)]
pub struct Driver {
    sim: Simulation,
    run_state: RunState,
    interval: Duration,
}

impl Driver {
    /// Wrap a session; starts paused with the session's configured interval.
    pub fn new(sim: Simulation) -> Self {
        let interval = Duration::from_millis(sim.config().step_interval_ms.max(1));
        Self {
            sim,
            run_state: RunState::Paused,
            interval,
        }
    }

    pub fn from_config(cfg: SimulationConfig) -> Result<Self, ConfigError> {
        Simulation::new(cfg).map(Self::new)
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn into_simulation(self) -> Simulation {
        self.sim
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    /// Current periodic-trigger cadence.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn start(&mut self) {
        if !self.is_running() {
            self.run_state = RunState::Running;
            tracing::info!(interval_ms = self.interval.as_millis() as u64, "driver started");
        }
    }

    /// Stop honoring periodic triggers. The last completed step is unaffected.
    pub fn pause(&mut self) {
        if self.is_running() {
            self.run_state = RunState::Paused;
            tracing::info!(step = self.sim.episode().step, "driver paused");
        }
    }

    /// Start/pause button.
    pub fn toggle(&mut self) -> RunState {
        match self.run_state {
            RunState::Running => self.pause(),
            RunState::Paused => self.start(),
        }
        self.run_state
    }

    /// Periodic trigger. Steps only while running; returns `None` when paused.
    pub fn tick(&mut self) -> Result<Option<StepResult>, Error> {
        if !self.is_running() {
            return Ok(None);
        }
        self.sim.step().map(Some)
    }

    /// Single-step request: cancel the periodic trigger, then step exactly once.
    pub fn step_once(&mut self) -> Result<StepResult, Error> {
        self.pause();
        self.sim.step()
    }

    /// Change the cadence. Takes effect at the next scheduled trigger.
    ///
    /// The value is written into the session configuration, so a later
    /// [`Driver::reconfigure`] built from [`Simulation::config`] keeps it.
    pub fn set_interval_ms(&mut self, ms: u64) -> Result<(), ConfigError> {
        self.sim.set_step_interval_ms(ms)?;
        self.interval = Duration::from_millis(ms);
        Ok(())
    }

    /// Speed-slider variant of [`Driver::set_interval_ms`]: `1050 - speed` ms.
    pub fn set_speed(&mut self, speed: u64) {
        let ms = step_interval_for_speed(speed);
        if self.sim.set_step_interval_ms(ms).is_ok() {
            self.interval = Duration::from_millis(ms);
        }
    }

    /// Live exploration-rate change; neither pauses nor resets.
    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<(), ConfigError> {
        self.sim.set_epsilon(epsilon)
    }

    /// Live UCB coefficient change; neither pauses nor resets.
    pub fn set_ucb_coefficient(&mut self, c: f64) -> Result<(), ConfigError> {
        self.sim.set_ucb_coefficient(c)
    }

    /// Cancel periodic triggers and reset the session.
    pub fn reset(&mut self) {
        self.pause();
        self.sim.reset();
    }

    /// Cancel periodic triggers, then apply `cfg` (which resets the session).
    ///
    /// The driver stays paused even if `cfg` is rejected; the previous
    /// configuration then remains active.
    pub fn reconfigure(&mut self, cfg: SimulationConfig) -> Result<(), ConfigError> {
        self.pause();
        let interval_ms = cfg.step_interval_ms;
        self.sim.reconfigure(cfg)?;
        self.interval = Duration::from_millis(interval_ms);
        Ok(())
    }

    /// Start and step on every interval tick until `max_steps` steps ran,
    /// `on_step` breaks, or a step fails. Always returns paused.
    ///
    /// Returns the number of steps taken.
    #[cfg(feature = "runtime")]
    pub async fn run_periodic<F>(&mut self, max_steps: u64, mut on_step: F) -> Result<u64, Error>
    where
        F: FnMut(&StepResult) -> std::ops::ControlFlow<()>,
    {
        use tokio::time::{interval_at, Instant, MissedTickBehavior};

        self.start();
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut taken = 0;
        while taken < max_steps && self.is_running() {
            ticker.tick().await;
            match self.tick() {
                Ok(Some(r)) => {
                    taken += 1;
                    if on_step(&r).is_break() {
                        self.pause();
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    self.pause();
                    return Err(e);
                }
            }
        }
        self.pause();
        Ok(taken)
    }
}
