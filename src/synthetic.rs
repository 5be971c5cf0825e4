//! Seeded predator-prey model used by the benchmark and the CLI.
//!
//! One predator (cod) eats two preys (capelin and herring) on two areas while
//! a trawl fleet fishes herring. Observation files for a stomach content and
//! a catch statistics component are generated from the same seed, so a run
//! is reproducible end to end.

use crate::aggregate::PredatorAggregator;
use crate::aggregation::{GroupEntry, LengthEntry};
use crate::diagnostics::Diagnostics;
use crate::ecology::{LinearPredator, Prey, PreyLink};
use crate::engine::ConsumptionEngine;
use crate::error::Result;
use crate::lengths::LengthGroupDivision;
use crate::likelihood::{
    CatchStatistics, CatchStatisticsConfig, Component, Objective, PreyGroupEntry, PrintRow,
    StomachContent, StomachContentConfig,
};
use crate::registry::{FleetHandle, PredatorHandle, PreyHandle};
use crate::stats::PopInfo;
use crate::time::{TimeStep, TimeWindow};
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

const AREAS: [(&str, i32); 2] = [("north", 1), ("south", 2)];
const PREDATOR_LENGTHS: [(&str, f64, f64); 3] = [("small", 20.0, 40.0), ("medium", 40.0, 60.0), ("large", 60.0, 80.0)];
const HERRING_AGE: i32 = 3;

/// A self-contained model evaluation
pub struct SyntheticModel {
    window: TimeWindow,
    engine: ConsumptionEngine,
    objective: Objective,
    cod: PredatorHandle,
    trawl: FleetHandle,
    capelin: PreyHandle,
    herring: PreyHandle,
    rng: ChaCha8Rng,
    diag: Diagnostics,
    /// Events recorded while loading and binding, kept across runs
    setup_events: usize,
}

impl SyntheticModel {
    /// Build the model, generate its observations and bind the components
    pub fn new(window: TimeWindow, seed: u64, max_ratio_consumed: f64, diag: Diagnostics) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let areas: Vec<i32> = AREAS.iter().map(|(_, a)| *a).collect();
        let mut engine = ConsumptionEngine::new(diag.clone());

        let capelin = engine.add_prey(Prey::new(
            "capelin",
            areas.clone(),
            LengthGroupDivision::uniform(5.0, 20.0, 5.0)?,
            max_ratio_consumed,
        )?.with_age(1));
        let herring = engine.add_prey(Prey::new(
            "herring",
            areas.clone(),
            LengthGroupDivision::uniform(10.0, 40.0, 10.0)?,
            max_ratio_consumed,
        )?.with_age(HERRING_AGE));

        let mut suitability = || Array2::from_shape_fn((3, 3), |_| rng.gen_range(0.1..1.0));
        let links = vec![
            PreyLink::new(capelin, suitability()),
            PreyLink::new(herring, suitability()),
        ];
        let cod = engine.add_predator(LinearPredator::new(
            "cod",
            areas.clone(),
            LengthGroupDivision::uniform(20.0, 80.0, 20.0)?,
            0.001,
            links,
            diag.clone(),
        )?)?;

        let selectivity = Array2::from_shape_vec((1, 3), vec![0.2, 0.6, 1.0])
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        let trawl = engine.add_fleet(LinearPredator::new(
            "trawl",
            areas,
            LengthGroupDivision::new(vec![0.0, 1.0])?,
            0.05,
            vec![PreyLink::new(herring, selectivity)],
            diag.clone(),
        )?)?;

        let mut objective = Objective::new();
        let stomach_data = stomach_observations(&window, &mut rng);
        objective.push(
            Component::StomachContent(StomachContent::with_data(
                &stomach_config(),
                &stomach_data,
                "synthetic stomachs",
                None,
                &window,
                diag.clone(),
            )?),
            1.0,
        );
        let catch_data = catch_observations(&window, &mut rng);
        objective.push(
            Component::CatchStatistics(CatchStatistics::with_data(
                &catch_config(),
                &catch_data,
                "synthetic catch",
                &window,
                diag.clone(),
            )?),
            0.1,
        );
        objective.bind(&engine.registry())?;
        let setup_events = diag.mark();

        Ok(Self {
            window,
            engine,
            objective,
            cod,
            trawl,
            capelin,
            herring,
            rng,
            diag,
            setup_events,
        })
    }

    pub fn engine(&self) -> &ConsumptionEngine {
        &self.engine
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    /// Draw fresh abundances for every entity on every area
    fn populate(&mut self) {
        for (_, area) in AREAS {
            let capelin: Vec<PopInfo> = (0..3)
                .map(|l| PopInfo::new(self.rng.gen_range(1e3..1e4), 0.005 * (l + 1) as f64))
                .collect();
            let herring: Vec<PopInfo> = (0..3)
                .map(|l| PopInfo::new(self.rng.gen_range(1e2..1e3), 0.1 * (l + 1) as f64))
                .collect();
            let cod: Vec<PopInfo> = (0..3)
                .map(|l| PopInfo::new(self.rng.gen_range(1.0..50.0), 0.5 * (l + 1) as f64))
                .collect();

            self.engine.set_prey_population(self.capelin, area, &capelin);
            self.engine.set_prey_population(self.herring, area, &herring);
            self.engine.set_predator_population(self.cod, area, &cod);
            self.engine
                .set_fleet_effort(self.trawl, area, &[PopInfo::new(1.0, self.rng.gen_range(0.5..2.0))]);
        }
    }

    /// Populate, consume and score one step
    pub fn run_step(&mut self, time: TimeStep) -> Result<f64> {
        self.populate();
        self.engine.step(&self.window);
        let mut aggregator = PredatorAggregator::new(&self.engine);
        self.objective.score_step(time, &mut aggregator)
    }

    /// Start a new evaluation: clear the scores and the events of the last run
    fn begin_run(&mut self) {
        self.diag.truncate(self.setup_events);
        self.objective.reset();
    }

    /// Run every step of the window and return the objective value
    pub fn run(&mut self) -> Result<f64> {
        self.begin_run();
        for time in self.window.steps() {
            self.run_step(time)?;
        }
        Ok(self.objective.total())
    }

    /// Like [`SyntheticModel::run`], also collecting the print rows of every step
    pub fn run_with_print(&mut self) -> Result<(f64, Vec<PrintRow>)> {
        self.begin_run();
        let mut rows = Vec::new();
        for time in self.window.steps() {
            self.run_step(time)?;
            rows.extend(self.objective.print_rows(time)?);
        }
        Ok((self.objective.total(), rows))
    }
}

fn area_entries() -> Vec<GroupEntry> {
    AREAS
        .iter()
        .map(|(label, area)| GroupEntry {
            label: label.to_string(),
            members: vec![*area],
        })
        .collect()
}

fn stomach_config() -> StomachContentConfig {
    StomachContentConfig {
        name: "codstomachs".to_string(),
        weight: 1.0,
        function: "scnumbers".to_string(),
        datafile: PathBuf::from("synthetic"),
        sample_file: None,
        epsilon: 10.0,
        areas: area_entries(),
        predators: vec!["cod".to_string()],
        predator_lengths: PREDATOR_LENGTHS
            .iter()
            .map(|(label, min, max)| LengthEntry {
                label: label.to_string(),
                min: *min,
                max: *max,
            })
            .collect(),
        preys: vec![
            PreyGroupEntry {
                label: "capelin".to_string(),
                names: vec!["capelin".to_string()],
                min_length: 5.0,
                max_length: 20.0,
                digestion: [1.0, 0.0, 0.0],
                splits: Vec::new(),
            },
            PreyGroupEntry {
                label: "herring".to_string(),
                names: vec!["herring".to_string()],
                min_length: 10.0,
                max_length: 40.0,
                digestion: [1.0, 0.0, 0.0],
                splits: Vec::new(),
            },
        ],
    }
}

fn catch_config() -> CatchStatisticsConfig {
    CatchStatisticsConfig {
        name: "herringcatch".to_string(),
        weight: 0.1,
        datafile: PathBuf::from("synthetic"),
        function: "lengthcalcvar".to_string(),
        overconsumption: true,
        areas: area_entries(),
        ages: vec![GroupEntry {
            label: "adult".to_string(),
            members: vec![HERRING_AGE],
        }],
        fleets: vec!["trawl".to_string()],
        stocks: vec!["herring".to_string()],
    }
}

fn stomach_observations(window: &TimeWindow, rng: &mut ChaCha8Rng) -> String {
    let mut text = String::from("; year step area predator prey count\n");
    for time in window.steps() {
        for (area, _) in AREAS {
            for (pred, _, _) in PREDATOR_LENGTHS {
                for prey in ["capelin", "herring"] {
                    let count = rng.gen_range(0..30);
                    text.push_str(&format!(
                        "{} {} {} {} {} {}\n",
                        time.year, time.step, area, pred, prey, count
                    ));
                }
            }
        }
    }
    text
}

fn catch_observations(window: &TimeWindow, rng: &mut ChaCha8Rng) -> String {
    let mut text = String::from("; year step area age number mean\n");
    for time in window.steps() {
        for (area, _) in AREAS {
            let number: f64 = rng.gen_range(10.0..100.0);
            let mean: f64 = rng.gen_range(15.0..35.0);
            text.push_str(&format!(
                "{} {} {} adult {:.1} {:.2}\n",
                time.year, time.step, area, number, mean
            ));
        }
    }
    text
}
