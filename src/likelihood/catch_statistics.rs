//! Catch statistics - sum of squares between observed and modelled
//! mean length or weight of the catch, by area and age group.

use crate::aggregate::{Aggregator, CatchBinding};
use crate::aggregation::{Aggregation, GroupEntry};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::grid::TimeSeries;
use crate::numeric::is_zero;
use crate::observations::{self, LoadReport};
use crate::registry::EntityRegistry;
use crate::stats::{PopInfo, PopStatistics};
use crate::time::{TimeStep, TimeWindow};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{PrintRow, SummaryRow};

/// Configuration of a catch statistics component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatchStatisticsConfig {
    pub name: String,
    #[serde(default = "super::default_weight")]
    pub weight: f64,
    pub datafile: PathBuf,
    pub function: String,
    /// Take the catch lost to overconsumption into account
    #[serde(default)]
    pub overconsumption: bool,
    pub areas: Vec<GroupEntry>,
    pub ages: Vec<GroupEntry>,
    pub fleets: Vec<String>,
    pub stocks: Vec<String>,
}

/// Statistic compared by a catch statistics component
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatisticsFunction {
    /// Mean length, variance from the model
    LengthCalcVariance,
    /// Mean length, variance from the data
    LengthGivenVariance,
    /// Mean weight, variance from the data
    WeightGivenVariance,
    /// Mean weight, unit variance
    WeightNoVariance,
    /// Mean length, unit variance
    LengthNoVariance,
}

impl StatisticsFunction {
    /// Parse a function name, ignoring case, `-` and `_`.
    ///
    /// The variance suffix may be spelled `variance`, `var` or `stddev`.
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        let stem = ["variance", "var", "stddev"]
            .iter()
            .find_map(|suffix| key.strip_suffix(suffix))?;

        match stem {
            "lengthcalc" => Some(Self::LengthCalcVariance),
            "lengthgiven" => Some(Self::LengthGivenVariance),
            "weightgiven" => Some(Self::WeightGivenVariance),
            "weightno" => Some(Self::WeightNoVariance),
            "lengthno" => Some(Self::LengthNoVariance),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LengthCalcVariance => "length-calc-variance",
            Self::LengthGivenVariance => "length-given-variance",
            Self::WeightGivenVariance => "weight-given-variance",
            Self::WeightNoVariance => "weight-no-variance",
            Self::LengthNoVariance => "length-no-variance",
        }
    }

    /// Whether the data file carries an observed standard deviation
    pub fn reads_stddev(&self) -> bool {
        matches!(self, Self::LengthGivenVariance | Self::WeightGivenVariance)
    }

    pub fn columns(&self) -> usize {
        if self.reads_stddev() {
            7
        } else {
            6
        }
    }

    /// Modelled statistic and the variance to divide by
    pub fn model_statistic(&self, stats: &PopStatistics, obs_stddev: f64) -> (f64, f64) {
        match self {
            Self::LengthCalcVariance => (stats.mean_length, stats.sdev_length * stats.sdev_length),
            Self::LengthGivenVariance => (stats.mean_length, obs_stddev * obs_stddev),
            Self::WeightGivenVariance => (stats.mean_weight, obs_stddev * obs_stddev),
            Self::WeightNoVariance => (stats.mean_weight, 1.0),
            Self::LengthNoVariance => (stats.mean_length, 1.0),
        }
    }
}

/// Weighted squared difference; zero when the variance is zero
pub fn discrepancy(model: f64, observed: f64, number: f64, variance: f64) -> f64 {
    if is_zero(variance) {
        return 0.0;
    }
    let diff = model - observed;
    diff * diff * number / variance
}

/// Observations and model output for one observed time step
#[derive(Clone, Debug)]
struct CatchSlab {
    numbers: Array2<f64>,
    obs_mean: Array2<f64>,
    obs_stddev: Array2<f64>,
    model_mean: Array2<f64>,
    model_stddev: Array2<f64>,
    likelihood: Array1<f64>,
}

impl CatchSlab {
    fn new(areas: usize, ages: usize) -> Self {
        Self {
            numbers: Array2::zeros((areas, ages)),
            obs_mean: Array2::zeros((areas, ages)),
            obs_stddev: Array2::zeros((areas, ages)),
            model_mean: Array2::zeros((areas, ages)),
            model_stddev: Array2::zeros((areas, ages)),
            likelihood: Array1::zeros(areas),
        }
    }
}

/// Catch statistics likelihood component
#[derive(Clone, Debug)]
pub struct CatchStatistics {
    name: String,
    function: StatisticsFunction,
    overconsumption: bool,
    areas: Aggregation,
    ages: Aggregation,
    fleet_names: Vec<String>,
    stock_names: Vec<String>,
    series: TimeSeries<CatchSlab>,
    report: LoadReport,
    binding: Option<CatchBinding>,
    cursor: usize,
    last_index: Option<usize>,
    likelihood: f64,
    diag: Diagnostics,
}

impl CatchStatistics {
    /// Create the component and read its data file
    pub fn new(config: &CatchStatisticsConfig, window: &TimeWindow, diag: Diagnostics) -> Result<Self> {
        let text = observations::read_to_string(&config.datafile)?;
        let source = config.datafile.display().to_string();
        Self::with_data(config, &text, &source, window, diag)
    }

    /// Create the component from data already in memory
    pub fn with_data(
        config: &CatchStatisticsConfig,
        text: &str,
        source: &str,
        window: &TimeWindow,
        diag: Diagnostics,
    ) -> Result<Self> {
        let function =
            StatisticsFunction::from_name(&config.function).ok_or_else(|| Error::UnknownFunction {
                component: config.name.clone(),
                name: config.function.clone(),
            })?;

        let mut component = Self {
            name: config.name.clone(),
            function,
            overconsumption: config.overconsumption,
            areas: Aggregation::from_entries(&config.areas)?,
            ages: Aggregation::from_entries(&config.ages)?,
            fleet_names: config.fleets.clone(),
            stock_names: config.stocks.clone(),
            series: TimeSeries::new(),
            report: LoadReport::default(),
            binding: None,
            cursor: 0,
            last_index: None,
            likelihood: 0.0,
            diag,
        };
        component.read_data(text, source, window)?;
        Ok(component)
    }

    fn read_data(&mut self, text: &str, source: &str, window: &TimeWindow) -> Result<()> {
        let rows = observations::parse_rows(text, source, self.function.columns())?;
        let (num_areas, num_ages) = (self.areas.len(), self.ages.len());

        for row in &rows {
            let area = self.areas.resolve(row.field(2));
            let age = self.ages.resolve(row.field(3));
            let time = match (area, age) {
                (Some(_), Some(_)) => observations::time_in_window(row, window, source)?,
                _ => None,
            };

            if !self.report.tally(time.is_some()) {
                continue;
            }
            let (Some(area), Some(age), Some(time)) = (area, age, time) else {
                continue;
            };

            let number = row.value(4, source)?;
            let mean = row.value(5, source)?;
            let stddev = if self.function.reads_stddev() {
                row.value(6, source)?
            } else {
                0.0
            };

            let t = self
                .series
                .index_or_insert_with(time, || CatchSlab::new(num_areas, num_ages));
            if let Some(slab) = self.series.get_mut(t) {
                slab.numbers[[area, age]] = number;
                slab.obs_mean[[area, age]] = mean;
                slab.obs_stddev[[area, age]] = stddev;
            }
        }

        self.report.finish(&self.diag, &self.name);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn function(&self) -> StatisticsFunction {
        self.function
    }

    pub fn load_report(&self) -> LoadReport {
        self.report
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Observation steps in the order they were first read
    pub fn steps(&self) -> &[TimeStep] {
        self.series.steps()
    }

    /// Stored observation `(number, mean, stddev)` for a key, if it was loaded
    pub fn observation(&self, time: TimeStep, area: &str, age: &str) -> Option<(f64, f64, f64)> {
        let slab = self.series.at(time)?;
        let (a, g) = (self.areas.resolve(area)?, self.ages.resolve(age)?);
        Some((slab.numbers[[a, g]], slab.obs_mean[[a, g]], slab.obs_stddev[[a, g]]))
    }

    /// Resolve fleets and stocks against the live model
    pub fn bind(&mut self, registry: &EntityRegistry) -> Result<()> {
        if self.binding.is_some() {
            return Err(Error::AlreadyBound {
                component: self.name.clone(),
            });
        }

        let mut fleets = Vec::with_capacity(self.fleet_names.len());
        for name in &self.fleet_names {
            fleets.push(registry.resolve_fleet(name).ok_or_else(|| Error::MissingEntity {
                component: self.name.clone(),
                kind: "fleet",
                name: name.clone(),
            })?);
        }

        let mut stocks = Vec::with_capacity(self.stock_names.len());
        for name in &self.stock_names {
            stocks.push(registry.resolve_prey(name).ok_or_else(|| Error::MissingEntity {
                component: self.name.clone(),
                kind: "stock",
                name: name.clone(),
            })?);
        }

        let mut divisions = stocks.iter().map(|&h| registry.prey(h).lengths.as_ref());
        let lengths = match divisions.next() {
            Some(Some(first)) => first.clone(),
            _ => {
                return Err(Error::Config(format!(
                    "{} - stocks have no length groups",
                    self.name
                )))
            }
        };
        for other in divisions {
            if !other.map_or(false, |d| d.is_compatible(&lengths)) {
                return Err(Error::IncompatibleLengths {
                    component: self.name.clone(),
                });
            }
        }

        self.binding = Some(CatchBinding {
            fleets,
            stocks,
            areas: self.areas.clone(),
            ages: self.ages.clone(),
            lengths,
            overconsumption: self.overconsumption,
        });
        self.diag.debug(&self.name, "bound fleets and stocks");
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
            .debug(&self.name, "calculating likelihood score for catchstatistics component");

        let distribution = aggregator.catch_distribution(binding)?;
        let expected = (self.areas.len(), self.ages.len(), binding.lengths.num_groups());
        check_shape(&self.name, expected, &distribution)?;

        if distribution.iter().all(|g| g.iter().all(|c| is_zero(c.n))) {
            self.diag.warn(&self.name, "zero catch found");
        }

        let slab = self.series.get_mut(t).ok_or_else(|| Error::InvalidTimestep {
            component: self.name.clone(),
            index: t,
        })?;

        let mut total = 0.0;
        for (area, grid) in distribution.iter().enumerate() {
            slab.likelihood[area] = 0.0;
            for (age, row) in grid.rows().into_iter().enumerate() {
                let cells: Vec<PopInfo> = row.to_vec();
                let stats = PopStatistics::new(&cells, &binding.lengths);
                let (model, variance) = self
                    .function
                    .model_statistic(&stats, slab.obs_stddev[[area, age]]);

                slab.model_mean[[area, age]] = model;
                slab.model_stddev[[area, age]] = stats.sdev_length;
                slab.likelihood[area] += discrepancy(
                    model,
                    slab.obs_mean[[area, age]],
                    slab.numbers[[area, age]],
                    variance,
                );
            }
            total += slab.likelihood[area];
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
        self.diag.debug(&self.name, "reset catchstatistics component");
    }

    /// Total score since the last reset
    pub fn likelihood(&self) -> f64 {
        self.likelihood
    }

    /// Number of steps scored since the last reset
    pub fn steps_scored(&self) -> usize {
        self.cursor
    }

    /// Per-area score of an observed step
    pub fn area_likelihood(&self, time: TimeStep) -> Option<&Array1<f64>> {
        self.series.at(time).map(|s| &s.likelihood)
    }

    /// One row per area for every observed step
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

        let mut rows = Vec::new();
        for ((area, age), &modelled) in slab.model_mean.indexed_iter() {
            let stddev = match self.function {
                StatisticsFunction::LengthCalcVariance => Some(slab.model_stddev[[area, age]]),
                StatisticsFunction::LengthGivenVariance | StatisticsFunction::WeightGivenVariance => {
                    Some(slab.obs_stddev[[area, age]])
                }
                _ => None,
            };
            rows.push(PrintRow {
                time: step,
                area: self.areas.label(area).to_string(),
                key: self.ages.label(age).to_string(),
                prey: None,
                observed: slab.obs_mean[[area, age]],
                modelled,
                sample_size: Some(slab.numbers[[area, age]]),
                stddev,
            });
        }
        Ok(rows)
    }
}

fn check_shape(
    component: &str,
    expected: (usize, usize, usize),
    distribution: &[Array2<PopInfo>],
) -> Result<()> {
    let found = match distribution.first() {
        Some(g) => (distribution.len(), g.nrows(), g.ncols()),
        None => (0, 0, 0),
    };
    let uneven = distribution.iter().any(|g| g.dim() != (expected.1, expected.2));
    if found != expected || uneven {
        return Err(Error::ShapeMismatch {
            component: component.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lengths::LengthGroupDivision;
    use crate::registry::EntityInfo;
    use approx::assert_relative_eq;

    /// Aggregator returning a fixed catch
    struct Fixed(Vec<Array2<PopInfo>>);

    impl Aggregator for Fixed {
        fn catch_distribution(&mut self, _binding: &CatchBinding) -> Result<Vec<Array2<PopInfo>>> {
            Ok(self.0.clone())
        }
    }

    fn config(function: &str) -> CatchStatisticsConfig {
        CatchStatisticsConfig {
            name: "catchstats".to_string(),
            weight: 1.0,
            datafile: PathBuf::from("catch.txt"),
            function: function.to_string(),
            overconsumption: false,
            areas: vec![GroupEntry {
                label: "area1".to_string(),
                members: vec![1],
            }],
            ages: vec![GroupEntry {
                label: "age3".to_string(),
                members: vec![3],
            }],
            fleets: vec!["comm".to_string()],
            stocks: vec!["cod".to_string()],
        }
    }

    fn registry() -> EntityRegistry {
        let lengths = LengthGroupDivision::new(vec![8.0, 12.0]).unwrap();
        let mut registry = EntityRegistry::new();
        registry.fleets.push(EntityInfo::new("comm", vec![1], None));
        registry
            .preys
            .push(EntityInfo::new("cod", vec![1], Some(lengths)));
        registry
    }

    /// Catch of 5 fish in the single length group 8-12, so a mean length of 10
    fn catch_of_five() -> Fixed {
        Fixed(vec![Array2::from_elem((1, 1), PopInfo::new(5.0, 1.0))])
    }

    fn component(function: &str, data: &str) -> (CatchStatistics, Diagnostics) {
        let diag = Diagnostics::new();
        let window = TimeWindow::default();
        let mut cs =
            CatchStatistics::with_data(&config(function), data, "catch.txt", &window, diag.clone()).unwrap();
        cs.bind(&registry()).unwrap();
        (cs, diag)
    }

    #[test]
    fn test_function_names() {
        use StatisticsFunction::*;
        assert_eq!(StatisticsFunction::from_name("lengthcalcvar"), Some(LengthCalcVariance));
        assert_eq!(StatisticsFunction::from_name("LengthCalcStdDev"), Some(LengthCalcVariance));
        assert_eq!(StatisticsFunction::from_name("length-given-variance"), Some(LengthGivenVariance));
        assert_eq!(StatisticsFunction::from_name("weightgivenstddev"), Some(WeightGivenVariance));
        assert_eq!(StatisticsFunction::from_name("WEIGHTNOVAR"), Some(WeightNoVariance));
        assert_eq!(StatisticsFunction::from_name("lengthnostddev"), Some(LengthNoVariance));
        assert_eq!(StatisticsFunction::from_name("lengthmaybe"), None);
    }

    #[test]
    fn test_unknown_function_is_fatal() {
        let result = CatchStatistics::with_data(
            &config("meanish"),
            "",
            "catch.txt",
            &TimeWindow::default(),
            Diagnostics::new(),
        );
        assert!(matches!(result, Err(Error::UnknownFunction { .. })));
    }

    #[test]
    fn test_discrepancy_zero_variance() {
        assert_eq!(discrepancy(12.0, 10.0, 5.0, 0.0), 0.0);
        assert_eq!(discrepancy(12.0, 10.0, 5.0, 1.0), 20.0);
    }

    #[test]
    fn test_matching_mean_scores_zero() {
        let (mut cs, _) = component("length-no-variance", "1995 1 area1 age3 5 10.0\n");
        let mut agg = catch_of_five();

        let score = cs.score(TimeStep::new(1995, 1), &mut agg).unwrap();
        assert_eq!(score, 0.0);
        assert_eq!(cs.steps_scored(), 1);
    }

    #[test]
    fn test_mean_difference_scores() {
        let (mut cs, _) = component("length-no-variance", "1995 1 area1 age3 5 12.0\n");
        let mut agg = catch_of_five();

        let score = cs.score(TimeStep::new(1995, 1), &mut agg).unwrap();
        assert_relative_eq!(score, 20.0);
        assert_relative_eq!(cs.area_likelihood(TimeStep::new(1995, 1)).unwrap()[0], 20.0);
    }

    #[test]
    fn test_unobserved_step_scores_zero() {
        let (mut cs, _) = component("length-no-variance", "1995 1 area1 age3 5 12.0\n");
        let mut agg = catch_of_five();
        assert_eq!(cs.score(TimeStep::new(1995, 2), &mut agg).unwrap(), 0.0);
        assert_eq!(cs.steps_scored(), 0);
    }

    #[test]
    fn test_calc_variance_with_single_group_is_zero() {
        // a single length group has zero modelled spread
        let (mut cs, _) = component("lengthcalcvar", "1995 1 area1 age3 5 12.0\n");
        let mut agg = catch_of_five();
        assert_eq!(cs.score(TimeStep::new(1995, 1), &mut agg).unwrap(), 0.0);
    }

    #[test]
    fn test_given_variance_reads_seven_columns() {
        let (mut cs, _) = component("length-given-variance", "1995 1 area1 age3 5 12.0 2.0\n");
        let mut agg = catch_of_five();
        // (10 - 12)^2 * 5 / 4
        assert_relative_eq!(cs.score(TimeStep::new(1995, 1), &mut agg).unwrap(), 5.0);

        let bad = CatchStatistics::with_data(
            &config("length-given-variance"),
            "1995 1 area1 age3 5 12.0\n",
            "catch.txt",
            &TimeWindow::default(),
            Diagnostics::new(),
        );
        assert!(matches!(bad, Err(Error::ColumnCount { .. })));
    }

    #[test]
    fn test_unknown_area_dropped() {
        let data = "1995 1 area1 age3 5 10.0\n1995 1 area9 age3 5 10.0\n";
        let (cs, diag) = component("length-no-variance", data);

        assert_eq!(cs.load_report().kept, 1);
        assert_eq!(cs.load_report().dropped, 1);
        assert_eq!(diag.warnings_for("catchstats").len(), 1);
        assert!(cs.observation(TimeStep::new(1995, 1), "area9", "age3").is_none());
        assert_eq!(
            cs.observation(TimeStep::new(1995, 1), "AREA1", "age3"),
            Some((5.0, 10.0, 0.0))
        );
    }

    #[test]
    fn test_out_of_window_dropped() {
        let (cs, _) = component("length-no-variance", "2050 1 area1 age3 5 10.0\n");
        assert_eq!(cs.load_report().kept, 0);
        assert!(cs.steps().is_empty());
    }

    #[test]
    fn test_score_before_bind_is_fatal() {
        let mut cs = CatchStatistics::with_data(
            &config("length-no-variance"),
            "1995 1 area1 age3 5 10.0\n",
            "catch.txt",
            &TimeWindow::default(),
            Diagnostics::new(),
        )
        .unwrap();
        let mut agg = catch_of_five();
        assert!(matches!(
            cs.score(TimeStep::new(1995, 1), &mut agg),
            Err(Error::NotBound { .. })
        ));
    }

    #[test]
    fn test_bind_twice_and_missing_fleet() {
        let (mut cs, _) = component("length-no-variance", "1995 1 area1 age3 5 10.0\n");
        assert!(matches!(cs.bind(&registry()), Err(Error::AlreadyBound { .. })));

        let mut cfg = config("length-no-variance");
        cfg.fleets = vec!["survey".to_string()];
        let mut other = CatchStatistics::with_data(
            &cfg,
            "",
            "catch.txt",
            &TimeWindow::default(),
            Diagnostics::new(),
        )
        .unwrap();
        assert!(matches!(
            other.bind(&registry()),
            Err(Error::MissingEntity { kind: "fleet", .. })
        ));
    }

    #[test]
    fn test_incompatible_stock_lengths() {
        let mut cfg = config("length-no-variance");
        cfg.stocks.push("haddock".to_string());
        let mut registry = registry();
        registry.preys.push(EntityInfo::new(
            "haddock",
            vec![1],
            Some(LengthGroupDivision::new(vec![0.0, 5.0]).unwrap()),
        ));

        let mut cs =
            CatchStatistics::with_data(&cfg, "", "catch.txt", &TimeWindow::default(), Diagnostics::new())
                .unwrap();
        assert!(matches!(cs.bind(&registry), Err(Error::IncompatibleLengths { .. })));
    }

    #[test]
    fn test_zero_catch_warns() {
        let (mut cs, diag) = component("length-no-variance", "1995 1 area1 age3 5 10.0\n");
        let mut agg = Fixed(vec![Array2::from_elem((1, 1), PopInfo::default())]);
        cs.score(TimeStep::new(1995, 1), &mut agg).unwrap();
        assert!(diag
            .warnings_for("catchstats")
            .iter()
            .any(|e| e.message == "zero catch found"));
    }

    #[test]
    fn test_shape_mismatch_is_fatal() {
        let (mut cs, _) = component("length-no-variance", "1995 1 area1 age3 5 10.0\n");
        let mut agg = Fixed(vec![Array2::from_elem((2, 1), PopInfo::new(1.0, 1.0))]);
        assert!(matches!(
            cs.score(TimeStep::new(1995, 1), &mut agg),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_print_rows_and_reset() {
        let (mut cs, _) = component("length-no-variance", "1995 1 area1 age3 5 12.0\n");
        let time = TimeStep::new(1995, 1);
        assert!(matches!(cs.print_rows(time), Err(Error::InvalidTimestep { .. })));

        let mut agg = catch_of_five();
        cs.score(time, &mut agg).unwrap();
        let rows = cs.print_rows(time).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "age3");
        assert_relative_eq!(rows[0].modelled, 10.0);
        assert_eq!(rows[0].observed, 12.0);

        let summary = cs.summary_rows(2.0);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].weight, 2.0);

        cs.reset();
        assert_eq!(cs.likelihood(), 0.0);
        assert_eq!(cs.steps_scored(), 0);
        // stored data survives a reset
        assert!(cs.observation(time, "area1", "age3").is_some());
    }
}
