//! Run clock: owns the output-step state of a run.

use serde::{Deserialize, Serialize};

use crate::types::{Gyr, Step};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub current_step: Step,
    pub n_steps: Step,
    pub end_time: Gyr,
    pub paused: bool,
}

impl SimClock {
    pub fn new(n_steps: Step, end_time: Gyr) -> Self {
        Self {
            current_step: 0,
            n_steps,
            end_time,
            paused: true,
        }
    }

    /// Time of `step` on the uniform grid `0..=n_steps` spanning
    /// `[0, end_time]`. The last step lands exactly on `end_time`.
    pub fn time_of(&self, step: Step) -> Gyr {
        if step >= self.n_steps {
            return self.end_time;
        }
        self.end_time * step as f64 / self.n_steps as f64
    }

    pub fn current_time(&self) -> Gyr {
        self.time_of(self.current_step)
    }

    /// Width of one step.
    pub fn dt(&self) -> Gyr {
        self.end_time / self.n_steps as f64
    }

    pub fn is_finished(&self) -> bool {
        self.current_step >= self.n_steps
    }

    /// Advance one step. Returns the new step number.
    /// Panics if called while paused or past the end; callers must check.
    pub fn advance(&mut self) -> Step {
        assert!(!self.paused, "advance() called on paused clock");
        assert!(!self.is_finished(), "advance() called on finished clock");
        self.current_step += 1;
        self.current_step
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }
}
