// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fixed-timestep accumulator.

use tether_math::Fx;
use tracing::debug;

use crate::config::{ConfigError, SimConfig};

/// What one [`StepDriver::advance`] call did.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct StepOutcome {
    /// Fixed steps taken.
    pub sub_steps: u32,
    /// The sub-step cap stopped stepping with at least one full step of time
    /// still in the accumulator.
    pub capped: bool,
}

/// Converts variable frame time into whole fixed steps.
///
/// # Invariant
/// After a call that was not capped, `0 <= accumulator < fixed_time_step`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct StepDriver {
    fixed_time_step: Fx,
    max_sub_steps: u32,
    accumulator: Fx,
}

impl StepDriver {
    /// Creates a driver with an empty accumulator.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] when `fixed_time_step` is not positive or
    /// `max_sub_steps` is zero.
    pub fn new(fixed_time_step: Fx, max_sub_steps: u32) -> Result<Self, ConfigError> {
        if fixed_time_step <= Fx::ZERO {
            return Err(ConfigError::invalid("fixed_time_step", "must be positive"));
        }
        if max_sub_steps == 0 {
            return Err(ConfigError::invalid("max_sub_steps", "must be at least 1"));
        }
        Ok(Self {
            fixed_time_step,
            max_sub_steps,
            accumulator: Fx::ZERO,
        })
    }

    /// Creates a driver from an already validated config.
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            fixed_time_step: config.fixed_time_step(),
            max_sub_steps: config.max_sub_steps(),
            accumulator: Fx::ZERO,
        }
    }

    /// Adds `frame_dt` and calls `step` once per whole fixed increment, at
    /// most `max_sub_steps` times.
    ///
    /// `step` always receives exactly [`StepDriver::fixed_time_step`].
    /// Negative `frame_dt` is treated as zero.
    ///
    /// # Errors
    ///
    /// Returns the first error from `step` unchanged. The failed increment
    /// stays in the accumulator; increments that succeeded before it are
    /// consumed.
    pub fn advance<E>(
        &mut self,
        frame_dt: Fx,
        mut step: impl FnMut(Fx) -> Result<(), E>,
    ) -> Result<StepOutcome, E> {
        let frame_dt = if frame_dt.is_negative() {
            debug!(frame_dt = %frame_dt, "negative frame time treated as zero");
            Fx::ZERO
        } else {
            frame_dt
        };
        self.accumulator += frame_dt;

        let mut outcome = StepOutcome::default();
        while self.accumulator >= self.fixed_time_step {
            if outcome.sub_steps >= self.max_sub_steps {
                outcome.capped = true;
                debug!(
                    max_sub_steps = self.max_sub_steps,
                    accumulator = %self.accumulator,
                    "sub-step cap reached; retaining surplus time"
                );
                break;
            }
            step(self.fixed_time_step)?;
            self.accumulator -= self.fixed_time_step;
            outcome.sub_steps += 1;
        }
        Ok(outcome)
    }

    /// Time not yet consumed by a fixed step.
    pub fn accumulator(&self) -> Fx {
        self.accumulator
    }

    /// The fixed increment.
    pub fn fixed_time_step(&self) -> Fx {
        self.fixed_time_step
    }

    /// Upper bound on steps per [`StepDriver::advance`] call.
    pub fn max_sub_steps(&self) -> u32 {
        self.max_sub_steps
    }

    /// Interpolation factor `accumulator / fixed_time_step`.
    ///
    /// Exceeds one after a capped frame.
    pub fn alpha(&self) -> Fx {
        self.accumulator / self.fixed_time_step
    }

    /// Drops all accumulated time.
    pub fn reset(&mut self) {
        self.accumulator = Fx::ZERO;
    }
}
