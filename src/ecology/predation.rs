//! Predation - consumption of prey biomass by a length-structured predator.
//!
//! Consumption is linear in prey biomass: for every predator length group
//! and prey length group the predator eats
//!
//! ```text
//! scaler * step_length / substeps * suitability * prey biomass * N * W
//! ```
//!
//! where `N` and `W` are the predator numbers and mean weight. When a prey
//! reports that too much of it was eaten, [`LinearPredator::adjust_consumption`]
//! scales the offending cells back to the prey's cap and books the difference
//! as overconsumption.

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::lengths::LengthGroupDivision;
use crate::numeric::VERY_SMALL;
use crate::registry::PreyHandle;
use crate::stats::PopInfo;
use ndarray::{Array2, ArrayView1};

use super::depletion::Prey;

/// A prey eaten by a predator, with the suitability of each
/// (predator length group, prey length group) pair
#[derive(Clone, Debug)]
pub struct PreyLink {
    pub handle: PreyHandle,
    pub suitability: Array2<f64>,
}

impl PreyLink {
    pub fn new(handle: PreyHandle, suitability: Array2<f64>) -> Self {
        Self {
            handle,
            suitability,
        }
    }
}

/// Length-structured predator with linear consumption
#[derive(Clone, Debug)]
pub struct LinearPredator {
    name: String,
    areas: Vec<i32>,
    lengths: LengthGroupDivision,
    scaler: f64,
    preys: Vec<PreyLink>,
    /// Predator numbers by [area][length group]
    prednumber: Vec<Vec<PopInfo>>,
    /// Substep consumption by [area][prey] -> (pred length, prey length)
    cons: Vec<Vec<Array2<f64>>>,
    /// Step consumption, same layout as `cons`
    consumption: Vec<Vec<Array2<f64>>>,
    totalcons: Array2<f64>,
    overcons: Array2<f64>,
    totalconsumption: Array2<f64>,
    overconsumption: Array2<f64>,
    diag: Diagnostics,
}

impl LinearPredator {
    /// Create a predator. Every suitability matrix must have one row per
    /// predator length group; columns are checked against the preys when the
    /// predator joins a [`ConsumptionEngine`](crate::engine::ConsumptionEngine).
    pub fn new(
        name: &str,
        areas: Vec<i32>,
        lengths: LengthGroupDivision,
        scaler: f64,
        preys: Vec<PreyLink>,
        diag: Diagnostics,
    ) -> Result<Self> {
        let na = areas.len();
        let nl = lengths.num_groups();

        if let Some(link) = preys.iter().find(|p| p.suitability.nrows() != nl) {
            return Err(Error::Config(format!(
                "suitability of predator '{}' for prey {:?} has {} rows, expected {}",
                name,
                link.handle,
                link.suitability.nrows(),
                nl
            )));
        }

        let shapes = || -> Vec<Array2<f64>> {
            preys
                .iter()
                .map(|p| Array2::zeros(p.suitability.raw_dim()))
                .collect()
        };
        let cons = (0..na).map(|_| shapes()).collect();
        let consumption = (0..na).map(|_| shapes()).collect();

        Ok(Self {
            name: name.to_string(),
            areas,
            lengths,
            scaler,
            preys,
            prednumber: vec![vec![PopInfo::default(); nl]; na],
            cons,
            consumption,
            totalcons: Array2::zeros((na, nl)),
            overcons: Array2::zeros((na, nl)),
            totalconsumption: Array2::zeros((na, nl)),
            overconsumption: Array2::zeros((na, nl)),
            diag,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn areas(&self) -> &[i32] {
        &self.areas
    }

    pub fn lengths(&self) -> &LengthGroupDivision {
        &self.lengths
    }

    pub fn scaler(&self) -> f64 {
        self.scaler
    }

    pub fn set_scaler(&mut self, scaler: f64) {
        self.scaler = scaler;
    }

    pub fn preys(&self) -> &[PreyLink] {
        &self.preys
    }

    #[inline]
    pub fn area_num(&self, area: i32) -> Option<usize> {
        self.areas.iter().position(|&a| a == area)
    }

    pub fn is_in_area(&self, area: i32) -> bool {
        self.area_num(area).is_some()
    }

    /// Position of `prey` in this predator's prey list
    pub fn prey_slot(&self, prey: PreyHandle) -> Option<usize> {
        self.preys.iter().position(|p| p.handle == prey)
    }

    /// Record the predator population on `area` for the coming step
    pub fn set_population(&mut self, area: i32, cells: &[PopInfo]) {
        let Some(a) = self.area_num(area) else {
            return;
        };
        for (l, slot) in self.prednumber[a].iter_mut().enumerate() {
            *slot = cells.get(l).copied().unwrap_or_default();
        }
    }

    pub fn number(&self, area: i32) -> Option<&[PopInfo]> {
        self.area_num(area).map(|a| self.prednumber[a].as_slice())
    }

    /// Full reset at the start of a step
    pub fn reset_step(&mut self) {
        for area in self.cons.iter_mut().chain(self.consumption.iter_mut()) {
            for grid in area.iter_mut() {
                grid.fill(0.0);
            }
        }
        self.totalcons.fill(0.0);
        self.overcons.fill(0.0);
        self.totalconsumption.fill(0.0);
        self.overconsumption.fill(0.0);
    }

    /// Compute this substep's consumption on `area` and report it to the preys.
    ///
    /// Areas the predator does not live on and preys absent from the area
    /// contribute nothing.
    pub fn compute_consumption(
        &mut self,
        area: i32,
        step_length: f64,
        num_substeps: usize,
        preys: &mut [Prey],
    ) {
        let Some(a) = self.area_num(area) else {
            return;
        };

        self.totalcons.row_mut(a).fill(0.0);

        if self.scaler < 0.0 {
            self.diag
                .warn_value(&self.name, "negative value for scaler", self.scaler);
        }

        let tmp = self.scaler * step_length / num_substeps.max(1) as f64;

        for (p, link) in self.preys.iter().enumerate() {
            let Some(prey) = preys.get(link.handle.0) else {
                continue;
            };
            if !prey.is_in_area(area) {
                continue;
            }

            let cons = &mut self.cons[a][p];
            if prey.biomass(area) > VERY_SMALL {
                for ((predl, preyl), cell) in cons.indexed_iter_mut() {
                    let pred = self.prednumber[a][predl];
                    *cell = tmp
                        * link.suitability[[predl, preyl]]
                        * prey.biomass_at(area, preyl)
                        * pred.n
                        * pred.w;
                    self.totalcons[[a, predl]] += *cell;
                }
            } else {
                cons.fill(0.0);
            }
        }

        // inform the preys of the consumption
        for (p, link) in self.preys.iter().enumerate() {
            let Some(prey) = preys.get_mut(link.handle.0) else {
                continue;
            };
            if prey.is_in_area(area) && prey.biomass(area) > VERY_SMALL {
                for row in self.cons[a][p].rows() {
                    prey.add_consumption(area, row);
                }
            }
        }
    }

    /// Scale back consumption of overconsumed preys and accumulate the step totals.
    ///
    /// Each prey is capped at its own `max_ratio_consumed ^ num_substeps`, the
    /// same bound it applied in [`Prey::check_consumption`]. The substep total
    /// is only reduced when some prey was overconsumed; the step-level cell
    /// accumulator always receives the substep cells.
    pub fn adjust_consumption(&mut self, area: i32, num_substeps: usize, preys: &[Prey]) {
        let Some(a) = self.area_num(area) else {
            return;
        };
        let mut any_prey_eaten_up = false;

        self.overcons.row_mut(a).fill(0.0);

        for (p, link) in self.preys.iter().enumerate() {
            let Some(prey) = preys.get(link.handle.0) else {
                continue;
            };
            if !prey.is_in_area(area)
                || prey.biomass(area) <= VERY_SMALL
                || !prey.too_much_consumption(area)
            {
                continue;
            }

            any_prey_eaten_up = true;
            let max_ratio = prey.max_ratio_consumed().powi(num_substeps as i32);
            for ((predl, preyl), cell) in self.cons[a][p].indexed_iter_mut() {
                let ratio = prey.ratio(area, preyl);
                if ratio > max_ratio && ratio > VERY_SMALL {
                    let tmp = max_ratio / ratio;
                    self.overcons[[a, predl]] += (1.0 - tmp) * *cell;
                    *cell *= tmp;
                }
            }
        }

        if any_prey_eaten_up {
            for predl in 0..self.lengths.num_groups() {
                self.totalcons[[a, predl]] -= self.overcons[[a, predl]];
            }
        }

        for predl in 0..self.lengths.num_groups() {
            self.totalconsumption[[a, predl]] += self.totalcons[[a, predl]];
            self.overconsumption[[a, predl]] += self.overcons[[a, predl]];
        }

        for (p, link) in self.preys.iter().enumerate() {
            let Some(prey) = preys.get(link.handle.0) else {
                continue;
            };
            if prey.is_in_area(area) && prey.biomass(area) > VERY_SMALL {
                self.consumption[a][p] += &self.cons[a][p];
            }
        }
    }

    /// Step consumption of the prey in `slot` on `area`, (pred length x prey length)
    pub fn consumption(&self, area: i32, slot: usize) -> Option<&Array2<f64>> {
        let a = self.area_num(area)?;
        self.consumption[a].get(slot)
    }

    /// Substep consumption of the prey in `slot` on `area`
    pub fn substep_consumption(&self, area: i32, slot: usize) -> Option<&Array2<f64>> {
        let a = self.area_num(area)?;
        self.cons[a].get(slot)
    }

    /// Step consumption of `prey` on `area`, looked up by handle
    pub fn consumption_of(&self, area: i32, prey: PreyHandle) -> Option<&Array2<f64>> {
        self.consumption(area, self.prey_slot(prey)?)
    }

    /// Step total consumption by predator length group, net of overconsumption
    pub fn total_consumption(&self, area: i32) -> Option<ArrayView1<'_, f64>> {
        self.area_num(area).map(|a| self.totalconsumption.row(a))
    }

    /// Step overconsumption by predator length group
    pub fn over_consumption(&self, area: i32) -> Option<ArrayView1<'_, f64>> {
        self.area_num(area).map(|a| self.overconsumption.row(a))
    }

    pub fn total_over_consumption(&self, area: i32) -> f64 {
        self.over_consumption(area).map_or(0.0, |o| o.sum())
    }

    /// Biomass of the prey in `slot` eaten on `area` this step
    pub fn consumption_biomass(&self, slot: usize, area: i32) -> f64 {
        self.consumption(area, slot).map_or(0.0, |c| c.sum())
    }
}
