//! Likelihood components and the weighted objective.
//!
//! Every component goes through the same life cycle: it is created from its
//! configuration (reading and indexing its observation files), bound once to
//! the live predators, preys and fleets, then scored at each model step.
//! `reset` clears the step cursor between evaluations and keeps the data.

pub mod catch_statistics;
pub mod multinomial;
pub mod stomach_content;

pub use catch_statistics::{CatchStatistics, CatchStatisticsConfig, StatisticsFunction};
pub use multinomial::Multinomial;
pub use stomach_content::{PreyGroupEntry, StomachContent, StomachContentConfig, StomachFunction};

use crate::aggregate::Aggregator;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::observations::LoadReport;
use crate::registry::EntityRegistry;
use crate::time::{TimeStep, TimeWindow};
use serde::{Deserialize, Serialize};

pub(crate) fn default_weight() -> f64 {
    1.0
}

/// Likelihood value of one area on one observed step
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub time: TimeStep,
    pub area: String,
    pub component: String,
    pub weight: f64,
    pub value: f64,
}

/// Modelled against observed value of one cell on the step just scored
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrintRow {
    pub time: TimeStep,
    pub area: String,
    /// Age group or predator length group label
    pub key: String,
    pub prey: Option<String>,
    pub observed: f64,
    pub modelled: f64,
    pub sample_size: Option<f64>,
    pub stddev: Option<f64>,
}

/// Configuration of one likelihood component
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComponentConfig {
    CatchStatistics(CatchStatisticsConfig),
    StomachContent(StomachContentConfig),
}

impl ComponentConfig {
    pub fn name(&self) -> &str {
        match self {
            Self::CatchStatistics(c) => &c.name,
            Self::StomachContent(c) => &c.name,
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            Self::CatchStatistics(c) => c.weight,
            Self::StomachContent(c) => c.weight,
        }
    }
}

/// A likelihood component
#[derive(Clone, Debug)]
pub enum Component {
    CatchStatistics(CatchStatistics),
    StomachContent(StomachContent),
}

impl Component {
    /// Build a component, reading its data files
    pub fn from_config(config: &ComponentConfig, window: &TimeWindow, diag: Diagnostics) -> Result<Self> {
        Ok(match config {
            ComponentConfig::CatchStatistics(c) => Self::CatchStatistics(CatchStatistics::new(c, window, diag)?),
            ComponentConfig::StomachContent(c) => Self::StomachContent(StomachContent::new(c, window, diag)?),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::CatchStatistics(c) => c.name(),
            Self::StomachContent(c) => c.name(),
        }
    }

    /// Short name of the component type
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CatchStatistics(_) => "catchstatistics",
            Self::StomachContent(_) => "stomachcontent",
        }
    }

    pub fn bind(&mut self, registry: &EntityRegistry) -> Result<()> {
        match self {
            Self::CatchStatistics(c) => c.bind(registry),
            Self::StomachContent(c) => c.bind(registry),
        }
    }

    pub fn is_bound(&self) -> bool {
        match self {
            Self::CatchStatistics(c) => c.is_bound(),
            Self::StomachContent(c) => c.is_bound(),
        }
    }

    pub fn score(&mut self, time: TimeStep, aggregator: &mut dyn Aggregator) -> Result<f64> {
        match self {
            Self::CatchStatistics(c) => c.score(time, aggregator),
            Self::StomachContent(c) => c.score(time, aggregator),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::CatchStatistics(c) => c.reset(),
            Self::StomachContent(c) => c.reset(),
        }
    }

    pub fn likelihood(&self) -> f64 {
        match self {
            Self::CatchStatistics(c) => c.likelihood(),
            Self::StomachContent(c) => c.likelihood(),
        }
    }

    /// Kept and dropped rows of the main data file
    pub fn load_report(&self) -> LoadReport {
        match self {
            Self::CatchStatistics(c) => c.load_report(),
            Self::StomachContent(c) => c.load_report(),
        }
    }

    /// Observation steps of the component
    pub fn steps(&self) -> &[TimeStep] {
        match self {
            Self::CatchStatistics(c) => c.steps(),
            Self::StomachContent(c) => c.steps(),
        }
    }

    pub fn summary_rows(&self, weight: f64) -> Vec<SummaryRow> {
        match self {
            Self::CatchStatistics(c) => c.summary_rows(weight),
            Self::StomachContent(c) => c.summary_rows(weight),
        }
    }

    pub fn print_rows(&self, time: TimeStep) -> Result<Vec<PrintRow>> {
        match self {
            Self::CatchStatistics(c) => c.print_rows(time),
            Self::StomachContent(c) => c.print_rows(time),
        }
    }
}

/// Component with the weight of its contribution to the objective
#[derive(Clone, Debug)]
pub struct WeightedComponent {
    pub weight: f64,
    pub component: Component,
}

/// The model-wide objective: weighted sum of every component's score
#[derive(Clone, Debug, Default)]
pub struct Objective {
    components: Vec<WeightedComponent>,
    total: f64,
}

impl Objective {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every configured component
    pub fn from_configs(configs: &[ComponentConfig], window: &TimeWindow, diag: &Diagnostics) -> Result<Self> {
        let mut objective = Self::new();
        for config in configs {
            let component = Component::from_config(config, window, diag.clone())?;
            objective.push(component, config.weight());
        }
        Ok(objective)
    }

    pub fn push(&mut self, component: Component, weight: f64) {
        self.components.push(WeightedComponent { weight, component });
    }

    pub fn components(&self) -> &[WeightedComponent] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Bind every component to the live model
    pub fn bind(&mut self, registry: &EntityRegistry) -> Result<()> {
        for wc in self.components.iter_mut() {
            wc.component.bind(registry)?;
        }
        Ok(())
    }

    /// Score every component on `time` and add the weighted sum to the total
    pub fn score_step(&mut self, time: TimeStep, aggregator: &mut dyn Aggregator) -> Result<f64> {
        let mut step_total = 0.0;
        for wc in self.components.iter_mut() {
            step_total += wc.weight * wc.component.score(time, aggregator)?;
        }
        self.total += step_total;
        Ok(step_total)
    }

    /// Start a new evaluation
    pub fn reset(&mut self) {
        for wc in self.components.iter_mut() {
            wc.component.reset();
        }
        self.total = 0.0;
    }

    /// Objective value read by the optimiser
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        self.components
            .iter()
            .flat_map(|wc| wc.component.summary_rows(wc.weight))
            .collect()
    }

    pub fn print_rows(&self, time: TimeStep) -> Result<Vec<PrintRow>> {
        let mut rows = Vec::new();
        for wc in &self.components {
            rows.extend(wc.component.print_rows(time)?);
        }
        Ok(rows)
    }
}
