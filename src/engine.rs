//! Consumption engine - drives one model step of predation.
//!
//! Owns the predators, fleets and preys of a model evaluation and runs the
//! substeps of a step strictly in order, area by area:
//!
//! 1. predators compute their demand and report it to the preys
//! 2. preys compare demand with biomass and flag overconsumption
//! 3. predators scale back overconsumed cells
//! 4. preys remove what was eaten
//!
//! Each engine is self-contained; parallel trials build one engine each.

use crate::diagnostics::Diagnostics;
use crate::ecology::{LinearPredator, Prey};
use crate::error::{Error, Result};
use crate::registry::{EntityInfo, EntityRegistry, FleetHandle, PredatorHandle, PreyHandle};
use crate::stats::PopInfo;
use crate::time::TimeWindow;

/// Predators, fleets and preys of one model evaluation
#[derive(Clone, Debug, Default)]
pub struct ConsumptionEngine {
    predators: Vec<LinearPredator>,
    fleets: Vec<LinearPredator>,
    preys: Vec<Prey>,
    diag: Diagnostics,
    steps_run: u64,
}

impl ConsumptionEngine {
    /// Create an empty engine reporting into `diag`
    pub fn new(diag: Diagnostics) -> Self {
        Self {
            diag,
            ..Self::default()
        }
    }

    pub fn add_prey(&mut self, prey: Prey) -> PreyHandle {
        self.preys.push(prey);
        PreyHandle(self.preys.len() - 1)
    }

    /// Add a predator whose preys are already in the engine
    pub fn add_predator(&mut self, predator: LinearPredator) -> Result<PredatorHandle> {
        self.check_links(&predator)?;
        self.predators.push(predator);
        Ok(PredatorHandle(self.predators.len() - 1))
    }

    /// Fleets are predators whose consumption is reported as catch
    pub fn add_fleet(&mut self, fleet: LinearPredator) -> Result<FleetHandle> {
        self.check_links(&fleet)?;
        self.fleets.push(fleet);
        Ok(FleetHandle(self.fleets.len() - 1))
    }

    /// Every prey link must name a known prey and carry one suitability
    /// column per prey length group
    fn check_links(&self, predator: &LinearPredator) -> Result<()> {
        for link in predator.preys() {
            let prey = self.preys.get(link.handle.0).ok_or_else(|| {
                Error::Config(format!(
                    "predator '{}' links to unknown prey {:?}",
                    predator.name(),
                    link.handle
                ))
            })?;
            if link.suitability.ncols() != prey.num_length_groups() {
                return Err(Error::Config(format!(
                    "suitability of predator '{}' for prey '{}' has {} columns, expected {}",
                    predator.name(),
                    prey.name(),
                    link.suitability.ncols(),
                    prey.num_length_groups()
                )));
            }
        }
        Ok(())
    }

    pub fn predators(&self) -> &[LinearPredator] {
        &self.predators
    }

    pub fn fleets(&self) -> &[LinearPredator] {
        &self.fleets
    }

    pub fn preys(&self) -> &[Prey] {
        &self.preys
    }

    pub fn predator(&self, handle: PredatorHandle) -> &LinearPredator {
        &self.predators[handle.0]
    }

    pub fn predator_mut(&mut self, handle: PredatorHandle) -> &mut LinearPredator {
        &mut self.predators[handle.0]
    }

    pub fn fleet(&self, handle: FleetHandle) -> &LinearPredator {
        &self.fleets[handle.0]
    }

    pub fn fleet_mut(&mut self, handle: FleetHandle) -> &mut LinearPredator {
        &mut self.fleets[handle.0]
    }

    pub fn prey(&self, handle: PreyHandle) -> &Prey {
        &self.preys[handle.0]
    }

    pub fn prey_mut(&mut self, handle: PreyHandle) -> &mut Prey {
        &mut self.preys[handle.0]
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    pub fn steps_run(&self) -> u64 {
        self.steps_run
    }

    /// Every area any entity lives on, in ascending order
    pub fn areas(&self) -> Vec<i32> {
        let mut areas: Vec<i32> = self
            .predators
            .iter()
            .chain(self.fleets.iter())
            .flat_map(|p| p.areas().iter().copied())
            .chain(self.preys.iter().flat_map(|p| p.areas().iter().copied()))
            .collect();
        areas.sort_unstable();
        areas.dedup();
        areas
    }

    /// Name view of the entities for binding likelihood components
    pub fn registry(&self) -> EntityRegistry {
        let predator_info = |p: &LinearPredator| {
            EntityInfo::new(p.name(), p.areas().to_vec(), Some(p.lengths().clone()))
        };
        EntityRegistry {
            predators: self.predators.iter().map(predator_info).collect(),
            fleets: self.fleets.iter().map(predator_info).collect(),
            preys: self
                .preys
                .iter()
                .map(|p| EntityInfo::new(p.name(), p.areas().to_vec(), Some(p.lengths().clone())))
                .collect(),
        }
    }

    pub fn set_prey_population(&mut self, prey: PreyHandle, area: i32, cells: &[PopInfo]) {
        self.preys[prey.0].set_population(area, cells);
    }

    pub fn set_predator_population(&mut self, predator: PredatorHandle, area: i32, cells: &[PopInfo]) {
        self.predators[predator.0].set_population(area, cells);
    }

    pub fn set_fleet_effort(&mut self, fleet: FleetHandle, area: i32, cells: &[PopInfo]) {
        self.fleets[fleet.0].set_population(area, cells);
    }

    /// Full reset of every consumption accumulator at a step boundary
    pub fn begin_step(&mut self) {
        for predator in self.predators.iter_mut().chain(self.fleets.iter_mut()) {
            predator.reset_step();
        }
        for prey in self.preys.iter_mut() {
            prey.reset_step();
        }
    }

    /// Run every substep of one step on every area
    pub fn run_step(&mut self, step_length: f64, num_substeps: usize) {
        let num_substeps = num_substeps.max(1);
        let areas = self.areas();

        for substep in 0..num_substeps {
            for prey in self.preys.iter_mut() {
                prey.reset_substep();
            }

            for &area in &areas {
                for predator in self.predators.iter_mut().chain(self.fleets.iter_mut()) {
                    predator.compute_consumption(area, step_length, num_substeps, &mut self.preys);
                }
                for prey in self.preys.iter_mut() {
                    prey.check_consumption(area, num_substeps);
                }
                for predator in self.predators.iter_mut().chain(self.fleets.iter_mut()) {
                    predator.adjust_consumption(area, num_substeps, &self.preys);
                }
                for prey in self.preys.iter_mut() {
                    prey.subtract(area);
                }
            }

            log::trace!("substep {} of {} done", substep + 1, num_substeps);
        }

        self.steps_run += 1;
    }

    /// Reset and run one step with the window's step length and substeps
    pub fn step(&mut self, window: &TimeWindow) {
        self.begin_step();
        self.run_step(window.step_length, window.substeps);
    }
}
