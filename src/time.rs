//! Simulation time window and (year, step) pairs.

use serde::{Deserialize, Serialize};

/// One simulated time step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeStep {
    pub year: i32,
    pub step: i32,
}

impl TimeStep {
    pub fn new(year: i32, step: i32) -> Self {
        Self { year, step }
    }
}

impl std::fmt::Display for TimeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.year, self.step)
    }
}

/// The period covered by a model run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub first_year: i32,
    pub first_step: i32,
    pub last_year: i32,
    pub last_step: i32,
    /// Number of steps in each year
    pub steps_per_year: i32,
    /// Number of consumption substeps within a step
    #[serde(default = "default_substeps")]
    pub substeps: usize,
    /// Length of one step in the units the suitabilities are expressed in
    #[serde(default = "default_step_length")]
    pub step_length: f64,
}

fn default_substeps() -> usize {
    1
}

fn default_step_length() -> f64 {
    1.0
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            first_year: 1990,
            first_step: 1,
            last_year: 2000,
            last_step: 4,
            steps_per_year: 4,
            substeps: 1,
            step_length: 3.0,
        }
    }
}

impl TimeWindow {
    /// Check whether `(year, step)` falls inside the simulated period
    pub fn is_within_period(&self, year: i32, step: i32) -> bool {
        if step < 1 || step > self.steps_per_year {
            return false;
        }
        let t = TimeStep::new(year, step);
        t >= self.first() && t <= self.last()
    }

    pub fn first(&self) -> TimeStep {
        TimeStep::new(self.first_year, self.first_step)
    }

    pub fn last(&self) -> TimeStep {
        TimeStep::new(self.last_year, self.last_step)
    }

    /// All steps of the window in order
    pub fn steps(&self) -> Vec<TimeStep> {
        let mut steps = Vec::new();
        let mut t = self.first();
        while t <= self.last() {
            steps.push(t);
            t = if t.step >= self.steps_per_year {
                TimeStep::new(t.year + 1, 1)
            } else {
                TimeStep::new(t.year, t.step + 1)
            };
        }
        steps
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.steps_per_year < 1 {
            return Err("steps_per_year must be > 0".to_string());
        }
        if self.substeps == 0 {
            return Err("substeps must be > 0".to_string());
        }
        if self.first() > self.last() {
            return Err("time window starts after it ends".to_string());
        }
        if self.first_step < 1
            || self.first_step > self.steps_per_year
            || self.last_step < 1
            || self.last_step > self.steps_per_year
        {
            return Err("first_step and last_step must lie within the year".to_string());
        }
        Ok(())
    }
}
