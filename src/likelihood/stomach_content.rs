//! Stomach content - compares modelled predator diets with stomach samples.
//!
//! Observations are indexed by (area, predator length group, prey group).
//! Four scoring functions are available:
//!
//! - `numbers`: multinomial over predator length groups for each prey, on
//!   numbers eaten
//! - `ratios`: diet proportions, weighted by standard deviation and sample size
//! - `amounts`: absolute amounts, weighted by standard deviation and sample size
//! - `simple`: diet proportions, unweighted

use crate::aggregate::{Aggregator, PreyGroupBinding, StomachBinding, SumMode};
use crate::aggregation::{Aggregation, GroupEntry, LengthAggregation, LengthEntry};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::grid::{AreaGrids, TimeSeries};
use crate::numeric::{is_zero, normalize_row, VERY_SMALL};
use crate::observations::{self, LoadReport};
use crate::registry::{EntityInfo, EntityRegistry, PreyHandle};
use crate::time::{TimeStep, TimeWindow};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::multinomial::{Multinomial, DEFAULT_EPSILON};
use super::{PrintRow, SummaryRow};

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

fn default_digestion() -> [f64; 3] {
    [1.0, 0.0, 0.0]
}

/// A labelled prey group: the preys it sums over and their length range.
///
/// Without `splits` the group is a single column named `label`. Each split
/// point cuts the range further, and bin `k` (from 1) becomes the column
/// `label:k` with its own digestion mean length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreyGroupEntry {
    pub label: String,
    pub names: Vec<String>,
    pub min_length: f64,
    pub max_length: f64,
    /// Digestion coefficients `d0 + d1 * L^d2`
    #[serde(default = "default_digestion")]
    pub digestion: [f64; 3],
    /// Interior length breakpoints, strictly increasing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub splits: Vec<f64>,
}

/// One scored column per prey length bin
fn prey_columns(component: &str, groups: &[PreyGroupEntry]) -> Result<Vec<PreyGroupEntry>> {
    let mut columns = Vec::with_capacity(groups.len());
    for group in groups {
        let bounds: Vec<f64> = std::iter::once(group.min_length)
            .chain(group.splits.iter().copied())
            .chain(std::iter::once(group.max_length))
            .collect();
        if bounds.windows(2).any(|w| w[1] <= w[0]) {
            return Err(Error::Config(format!(
                "{} - prey group '{}' has an empty length range",
                component, group.label
            )));
        }
        if group.splits.is_empty() {
            columns.push(group.clone());
            continue;
        }
        for (k, bin) in bounds.windows(2).enumerate() {
            columns.push(PreyGroupEntry {
                label: format!("{}:{}", group.label, k + 1),
                min_length: bin[0],
                max_length: bin[1],
                splits: Vec::new(),
                ..group.clone()
            });
        }
    }
    Ok(columns)
}

/// Configuration of a stomach content component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StomachContentConfig {
    pub name: String,
    #[serde(default = "super::default_weight")]
    pub weight: f64,
    pub function: String,
    pub datafile: PathBuf,
    /// Sample sizes, required by `ratios` and `amounts`
    #[serde(default)]
    pub sample_file: Option<PathBuf>,
    /// Minimum probability parameter of the multinomial
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    pub areas: Vec<GroupEntry>,
    pub predators: Vec<String>,
    pub predator_lengths: Vec<LengthEntry>,
    pub preys: Vec<PreyGroupEntry>,
}

/// Scoring function of a stomach content component
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StomachFunction {
    Numbers,
    Ratios,
    Amounts,
    Simple,
}

impl StomachFunction {
    /// Parse a function name, with or without the `sc` prefix
    pub fn from_name(name: &str) -> Option<Self> {
        let key = name.to_ascii_lowercase();
        match key.strip_prefix("sc").unwrap_or(&key) {
            "numbers" => Some(Self::Numbers),
            "ratios" => Some(Self::Ratios),
            "amounts" => Some(Self::Amounts),
            "simple" => Some(Self::Simple),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Numbers => "scnumbers",
            Self::Ratios => "scratios",
            Self::Amounts => "scamounts",
            Self::Simple => "scsimple",
        }
    }

    /// Columns of the main data file
    pub fn columns(&self) -> usize {
        match self {
            Self::Numbers | Self::Simple => 6,
            Self::Ratios | Self::Amounts => 7,
        }
    }

    /// Whether the component reads a standard deviation and sample sizes
    pub fn weighted(&self) -> bool {
        matches!(self, Self::Ratios | Self::Amounts)
    }

    /// Whether observed and modelled rows are compared as proportions
    pub fn normalized(&self) -> bool {
        matches!(self, Self::Ratios | Self::Simple)
    }

    pub fn sum_mode(&self) -> SumMode {
        match self {
            Self::Numbers => SumMode::Numbers,
            _ => SumMode::Biomass,
        }
    }
}

/// Multinomial score of one area, column by column across predator lengths
pub fn numbers_likelihood(observed: &Array2<f64>, modelled: &Array2<f64>, mn: &mut Multinomial) -> f64 {
    observed
        .columns()
        .into_iter()
        .zip(modelled.columns())
        .map(|(data, dist)| mn.calc_log_likelihood(&data, &dist))
        .sum()
}

/// Sample-weighted sum of squares of one area.
///
/// With `normalize` the modelled rows are scaled to proportions first and a
/// modelled row summing to zero is skipped. Cells with zero standard
/// deviation are skipped.
pub fn weighted_likelihood(
    observed: &Array2<f64>,
    modelled: &Array2<f64>,
    stddev: &Array2<f64>,
    number: ArrayView1<'_, f64>,
    normalize: bool,
) -> f64 {
    let mut lik = 0.0;
    for (predl, (obs, model)) in observed.rows().into_iter().zip(modelled.rows()).enumerate() {
        let scale = if normalize {
            let sum = model.sum();
            if is_zero(sum) {
                continue;
            }
            1.0 / sum
        } else {
            1.0
        };

        let mut row = 0.0;
        for (preyl, (&o, &m)) in obs.iter().zip(model.iter()).enumerate() {
            let sd = stddev[[predl, preyl]];
            if !is_zero(sd) {
                let diff = m * scale - o;
                row += diff * diff / (sd * sd);
            }
        }
        lik += row * number.get(predl).copied().unwrap_or(0.0);
    }
    lik
}

/// Unweighted sum of squares between observed and modelled proportions of one area
pub fn simple_likelihood(observed: &Array2<f64>, modelled: &Array2<f64>) -> f64 {
    let mut lik = 0.0;
    for (obs, model) in observed.rows().into_iter().zip(modelled.rows()) {
        let sum = model.sum();
        if is_zero(sum) {
            continue;
        }
        let scale = 1.0 / sum;
        lik += obs
            .iter()
            .zip(model.iter())
            .map(|(&o, &m)| (m * scale - o) * (m * scale - o))
            .sum::<f64>();
    }
    lik
}

/// Observations and model output for one observed time step
#[derive(Clone, Debug)]
struct StomachSlab {
    observed: AreaGrids,
    modelled: AreaGrids,
    stddev: AreaGrids,
    /// Sample size by (area, predator length group)
    number: Array2<f64>,
    likelihood: Array1<f64>,
}

impl StomachSlab {
    fn new(areas: usize, preds: usize, preys: usize) -> Self {
        Self {
            observed: AreaGrids::zeros(areas, preds, preys),
            modelled: AreaGrids::zeros(areas, preds, preys),
            stddev: AreaGrids::zeros(areas, preds, preys),
            number: Array2::zeros((areas, preds)),
            likelihood: Array1::zeros(areas),
        }
    }
}

/// Stomach content likelihood component
#[derive(Clone, Debug)]
pub struct StomachContent {
    name: String,
    function: StomachFunction,
    epsilon: f64,
    areas: Aggregation,
    predator_names: Vec<String>,
    predator_lengths: LengthAggregation,
    prey_groups: Vec<PreyGroupEntry>,
    series: TimeSeries<StomachSlab>,
    report: LoadReport,
    sample_report: LoadReport,
    binding: Option<StomachBinding>,
    cursor: usize,
    last_index: Option<usize>,
    likelihood: f64,
    diag: Diagnostics,
}

impl StomachContent {
    /// Create the component and read its data files
    pub fn new(config: &StomachContentConfig, window: &TimeWindow, diag: Diagnostics) -> Result<Self> {
        let text = observations::read_to_string(&config.datafile)?;
        let samples = match &config.sample_file {
            Some(path) => Some((observations::read_to_string(path)?, path.display().to_string())),
            None => None,
        };
        Self::with_data(
            config,
            &text,
            &config.datafile.display().to_string(),
            samples.as_ref().map(|(t, s)| (t.as_str(), s.as_str())),
            window,
            diag,
        )
    }

    /// Create the component from data already in memory.
    ///
    /// `samples` holds the sample size file and its name.
    pub fn with_data(
        config: &StomachContentConfig,
        text: &str,
        source: &str,
        samples: Option<(&str, &str)>,
        window: &TimeWindow,
        diag: Diagnostics,
    ) -> Result<Self> {
        let function =
            StomachFunction::from_name(&config.function).ok_or_else(|| Error::UnknownFunction {
                component: config.name.clone(),
                name: config.function.clone(),
            })?;

        let mut epsilon = config.epsilon;
        if epsilon < VERY_SMALL {
            diag.warn_value(
                &config.name,
                "epsilon should be a positive number - set to default value",
                DEFAULT_EPSILON,
            );
            epsilon = DEFAULT_EPSILON;
        }

        if config.predators.is_empty() {
            return Err(Error::Config(format!(
                "{} - failed to read predators",
                config.name
            )));
        }
        if config.preys.is_empty() {
            diag.warn(&config.name, "no prey found");
        }
        let prey_groups = prey_columns(&config.name, &config.preys)?;

        let mut component = Self {
            name: config.name.clone(),
            function,
            epsilon,
            areas: Aggregation::from_entries(&config.areas)?,
            predator_names: config.predators.clone(),
            predator_lengths: LengthAggregation::from_entries(&config.predator_lengths)?,
            prey_groups,
            series: TimeSeries::new(),
            report: LoadReport::default(),
            sample_report: LoadReport::default(),
            binding: None,
            cursor: 0,
            last_index: None,
            likelihood: 0.0,
            diag,
        };

        component.read_content(text, source, window)?;
        if function.weighted() {
            let (sample_text, sample_source) = samples.ok_or_else(|| {
                Error::Config(format!(
                    "{} - function {} needs a sample size file",
                    config.name,
                    function.name()
                ))
            })?;
            component.read_samples(sample_text, sample_source, window)?;
        }
        Ok(component)
    }

    fn prey_index(&self, label: &str) -> Option<usize> {
        self.prey_groups
            .iter()
            .rposition(|g| g.label.eq_ignore_ascii_case(label))
    }

    fn read_content(&mut self, text: &str, source: &str, window: &TimeWindow) -> Result<()> {
        let rows = observations::parse_rows(text, source, self.function.columns())?;
        let shape = (self.areas.len(), self.predator_lengths.len(), self.prey_groups.len());

        for row in &rows {
            let area = self.areas.resolve(row.field(2));
            let pred = self.predator_lengths.resolve(row.field(3));
            let prey = self.prey_index(row.field(4));
            let time = match (area, pred, prey) {
                (Some(_), Some(_), Some(_)) => observations::time_in_window(row, window, source)?,
                _ => None,
            };

            if !self.report.tally(time.is_some()) {
                continue;
            }
            let (Some(area), Some(pred), Some(prey), Some(time)) = (area, pred, prey, time) else {
                continue;
            };

            let value = row.value(5, source)?;
            let stddev = if self.function.weighted() {
                row.value(6, source)?
            } else {
                0.0
            };

            let t = self
                .series
                .index_or_insert_with(time, || StomachSlab::new(shape.0, shape.1, shape.2));
            if let Some(slab) = self.series.get_mut(t) {
                slab.observed.set(area, pred, prey, value);
                slab.stddev.set(area, pred, prey, stddev);
            }
        }

        self.report.finish(&self.diag, &self.name);
        Ok(())
    }

    /// Sample sizes are only kept for steps that already have observations
    fn read_samples(&mut self, text: &str, source: &str, window: &TimeWindow) -> Result<()> {
        let rows = observations::parse_rows(text, source, 5)?;

        for row in &rows {
            let area = self.areas.resolve(row.field(2));
            let pred = self.predator_lengths.resolve(row.field(3));
            let t = match observations::time_in_window(row, window, source)? {
                Some(time) => self.series.index_of(time),
                None => None,
            };

            if !self.sample_report.tally(area.is_some() && pred.is_some() && t.is_some()) {
                continue;
            }
            let (Some(area), Some(pred), Some(t)) = (area, pred, t) else {
                continue;
            };

            let value = row.value(4, source)?;
            if let Some(slab) = self.series.get_mut(t) {
                slab.number[[area, pred]] = value;
            }
        }

        self.sample_report.finish(&self.diag, &self.name);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn function(&self) -> StomachFunction {
        self.function
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn load_report(&self) -> LoadReport {
        self.report
    }

    pub fn sample_report(&self) -> LoadReport {
        self.sample_report
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn steps(&self) -> &[TimeStep] {
        self.series.steps()
    }

    /// Stored observation for a key, if it was loaded
    pub fn observation(&self, time: TimeStep, area: &str, predator: &str, prey: &str) -> Option<f64> {
        let slab = self.series.at(time)?;
        let a = self.areas.resolve(area)?;
        let p = self.predator_lengths.resolve(predator)?;
        let q = self.prey_index(prey)?;
        Some(slab.observed.get(a, p, q))
    }

    /// Stored sample size for a key, if it was loaded
    pub fn sample_size(&self, time: TimeStep, area: &str, predator: &str) -> Option<f64> {
        let slab = self.series.at(time)?;
        let a = self.areas.resolve(area)?;
        let p = self.predator_lengths.resolve(predator)?;
        Some(slab.number[[a, p]])
    }

    /// Modelled value of the step scored last, if any
    pub fn modelled(&self, time: TimeStep, area: &str, predator: &str, prey: &str) -> Option<f64> {
        let slab = self.series.at(time)?;
        let a = self.areas.resolve(area)?;
        let p = self.predator_lengths.resolve(predator)?;
        let q = self.prey_index(prey)?;
        Some(slab.modelled.get(a, p, q))
    }

    fn warn_coverage(&self, entities: &[&EntityInfo], what: &str) {
        for g in 0..self.areas.len() {
            let covered = entities
                .iter()
                .any(|e| self.areas.members(g).iter().any(|&a| e.is_in_area(a)));
            if !covered {
                self.diag
                    .warn(&self.name, &format!("{} not defined on all areas", what));
            }
        }
    }

    /// Resolve predators and preys against the live model
    pub fn bind(&mut self, registry: &EntityRegistry) -> Result<()> {
        if self.binding.is_some() {
            return Err(Error::AlreadyBound {
                component: self.name.clone(),
            });
        }

        let mut predators = Vec::with_capacity(self.predator_names.len());
        for name in &self.predator_names {
            predators.push(registry.resolve_predator(name).ok_or_else(|| Error::MissingEntity {
                component: self.name.clone(),
                kind: "predator",
                name: name.clone(),
            })?);
        }
        let predator_info: Vec<&EntityInfo> = predators.iter().map(|&h| registry.predator(h)).collect();
        self.warn_coverage(&predator_info, "predator");

        let mut prey_groups = Vec::with_capacity(self.prey_groups.len());
        for group in &self.prey_groups {
            let mut preys: Vec<PreyHandle> = Vec::with_capacity(group.names.len());
            for name in &group.names {
                preys.push(registry.resolve_prey(name).ok_or_else(|| Error::MissingEntity {
                    component: self.name.clone(),
                    kind: "prey",
                    name: name.clone(),
                })?);
            }
            let prey_info: Vec<&EntityInfo> = preys.iter().map(|&h| registry.prey(h)).collect();
            self.warn_coverage(&prey_info, "prey");

            prey_groups.push(PreyGroupBinding {
                label: group.label.clone(),
                preys,
                min_length: group.min_length,
                max_length: group.max_length,
            });
        }

        let division = self.predator_lengths.division();
        let predator_divisions: Vec<_> = predator_info.iter().filter_map(|e| e.lengths.as_ref()).collect();
        if !predator_divisions.is_empty() {
            if !predator_divisions
                .iter()
                .any(|d| division.max_length(0) > d.lower())
            {
                self.diag
                    .warn(&self.name, "minimum length group less than predator length");
            }
            if !predator_divisions.iter().any(|d| division.upper() < d.upper()) {
                self.diag
                    .warn(&self.name, "maximum length group greater than predator length");
            }
        }

        if self.function.normalized() {
            for slab in self.series.slabs_mut() {
                for grid in slab.observed.iter_mut() {
                    for row in grid.rows_mut() {
                        normalize_row(row);
                    }
                }
            }
        }

        self.binding = Some(StomachBinding {
            predators,
            areas: self.areas.clone(),
            predator_lengths: division.clone(),
            prey_groups,
        });
        self.diag.debug(&self.name, "bound predators and preys");
        Ok(())
    }

    /// Score the current step. Returns 0 for steps without observations.
    pub fn score(&mut self, time: TimeStep, aggregator: &mut dyn Aggregator) -> Result<f64> {
        let Some(t) = self.series.index_of(time) else {
            return Ok(0.0);
        };
        let binding = self.binding.as_ref().ok_or_else(|| Error::NotBound {
            component: self.name.clone(),
        })?;
        self.diag
            .debug(&self.name, "calculating likelihood score for stomachcontent component");

        let slab = self.series.get_mut(t).ok_or_else(|| Error::InvalidTimestep {
            component: self.name.clone(),
            index: t,
        })?;
        let expected = slab.modelled.shape();

        for (g, group) in self.prey_groups.iter().enumerate() {
            let sums = aggregator.predator_consumption(binding, g, self.function.sum_mode())?;
            if sums.len() != expected.0 || sums.iter().any(|s| s.len() != expected.1) {
                return Err(Error::ShapeMismatch {
                    component: self.name.clone(),
                    expected,
                    found: (sums.len(), sums.first().map_or(0, |s| s.len()), expected.2),
                });
            }

            let [d0, d1, d2] = group.digestion;
            let factor = d0 + d1 * binding.prey_groups[g].mean_length().powf(d2);
            for (area, per_pred) in sums.iter().enumerate() {
                for (predl, &value) in per_pred.iter().enumerate() {
                    slab.modelled.set(area, predl, g, value * factor);
                }
            }
        }

        let mut mn = Multinomial::new(self.epsilon);
        let mut total = 0.0;
        for area in 0..expected.0 {
            let observed = slab.observed.area(area);
            let modelled = slab.modelled.area(area);
            let lik = match self.function {
                StomachFunction::Numbers => numbers_likelihood(observed, modelled, &mut mn),
                StomachFunction::Ratios => weighted_likelihood(
                    observed,
                    modelled,
                    slab.stddev.area(area),
                    slab.number.row(area),
                    true,
                ),
                StomachFunction::Amounts => weighted_likelihood(
                    observed,
                    modelled,
                    slab.stddev.area(area),
                    slab.number.row(area),
                    false,
                ),
                StomachFunction::Simple => simple_likelihood(observed, modelled),
            };
            slab.likelihood[area] = lik;
            total += lik;
        }

        self.likelihood += total;
        self.cursor += 1;
        self.last_index = Some(t);
        self.diag.info(
            &self.name,
            "the likelihood score for this component on this timestep is",
            total,
        );
        Ok(total)
    }

    /// Clear the step cursor and the accumulated score; observations are kept
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.last_index = None;
        self.likelihood = 0.0;
        self.diag.debug(&self.name, "reset stomachcontent component");
    }

    pub fn likelihood(&self) -> f64 {
        self.likelihood
    }

    pub fn steps_scored(&self) -> usize {
        self.cursor
    }

    pub fn area_likelihood(&self, time: TimeStep) -> Option<&Array1<f64>> {
        self.series.at(time).map(|s| &s.likelihood)
    }

    pub fn summary_rows(&self, weight: f64) -> Vec<SummaryRow> {
        let mut rows = Vec::new();
        for (time, slab) in self.series.iter() {
            for (area, &value) in slab.likelihood.iter().enumerate() {
                rows.push(SummaryRow {
                    time,
                    area: self.areas.label(area).to_string(),
                    component: self.name.clone(),
                    weight,
                    value,
                });
            }
        }
        rows
    }

    /// Modelled against observed values for the step just scored
    pub fn print_rows(&self, time: TimeStep) -> Result<Vec<PrintRow>> {
        if self.series.index_of(time).is_none() {
            return Ok(Vec::new());
        }
        let t = match self.last_index {
            Some(t) if t < self.series.len() => t,
            _ => {
                return Err(Error::InvalidTimestep {
                    component: self.name.clone(),
                    index: self.cursor,
                })
            }
        };
        let Some(slab) = self.series.get(t) else {
            return Ok(Vec::new());
        };
        let step = self.series.step(t);
        let weighted = self.function.weighted();

        let mut rows = Vec::new();
        for (area, modelled) in slab.modelled.iter().enumerate() {
            for ((pred, prey), &value) in modelled.indexed_iter() {
                rows.push(PrintRow {
                    time: step,
                    area: self.areas.label(area).to_string(),
                    key: self.predator_lengths.label(pred).to_string(),
                    prey: Some(self.prey_groups[prey].label.clone()),
                    observed: slab.observed.get(area, pred, prey),
                    modelled: value,
                    sample_size: weighted.then(|| slab.number[[area, pred]]),
                    stddev: weighted.then(|| slab.stddev.get(area, pred, prey)),
                });
            }
        }
        Ok(rows)
    }
}
