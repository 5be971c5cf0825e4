//! Prey depletion - tracks consumption of a prey against its biomass.
//!
//! Predators report the biomass they want to eat from each prey length
//! group. The prey then works out how much of each length group that would
//! remove, flags the area when the ratio exceeds the per-substep cap, and
//! books the capped consumption and the overconsumption.

use crate::error::{Error, Result};
use crate::lengths::LengthGroupDivision;
use crate::numeric::VERY_SMALL;
use crate::stats::PopInfo;
use ndarray::{Array1, Array2, ArrayView1};

/// A length-structured prey living on a set of areas
#[derive(Clone, Debug)]
pub struct Prey {
    name: String,
    areas: Vec<i32>,
    lengths: LengthGroupDivision,
    /// Age of the cohort, used when catch is aggregated by age
    age: i32,
    /// Maximum fraction of a length group that may be eaten in one substep
    max_ratio_consumed: f64,
    /// Numbers by [area][length group]
    number: Vec<Vec<PopInfo>>,
    number_prior_to_eating: Vec<Vec<PopInfo>>,
    biomass: Array2<f64>,
    total: Array1<f64>,
    ratio: Array2<f64>,
    /// Consumption in the current substep
    cons: Array2<f64>,
    /// Consumption accumulated over the step
    consumption: Array2<f64>,
    overcons: Array2<f64>,
    overconsumption: Array2<f64>,
    too_much_consumption: Vec<bool>,
}

impl Prey {
    pub fn new(
        name: &str,
        areas: Vec<i32>,
        lengths: LengthGroupDivision,
        max_ratio_consumed: f64,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&max_ratio_consumed) {
            return Err(Error::Config(format!(
                "max_ratio_consumed for prey '{}' must be within [0, 1], got {}",
                name, max_ratio_consumed
            )));
        }
        let na = areas.len();
        let nl = lengths.num_groups();

        Ok(Self {
            name: name.to_string(),
            areas,
            lengths,
            age: 0,
            max_ratio_consumed,
            number: vec![vec![PopInfo::default(); nl]; na],
            number_prior_to_eating: vec![vec![PopInfo::default(); nl]; na],
            biomass: Array2::zeros((na, nl)),
            total: Array1::zeros(na),
            ratio: Array2::zeros((na, nl)),
            cons: Array2::zeros((na, nl)),
            consumption: Array2::zeros((na, nl)),
            overcons: Array2::zeros((na, nl)),
            overconsumption: Array2::zeros((na, nl)),
            too_much_consumption: vec![false; na],
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

    /// Tag the prey with the age of its cohort
    pub fn with_age(mut self, age: i32) -> Self {
        self.age = age;
        self
    }

    pub fn age(&self) -> i32 {
        self.age
    }

    pub fn max_ratio_consumed(&self) -> f64 {
        self.max_ratio_consumed
    }

    pub fn num_length_groups(&self) -> usize {
        self.lengths.num_groups()
    }

    /// Internal index of an external area
    #[inline]
    pub fn area_num(&self, area: i32) -> Option<usize> {
        self.areas.iter().position(|&a| a == area)
    }

    #[inline]
    pub fn is_in_area(&self, area: i32) -> bool {
        self.area_num(area).is_some()
    }

    /// Record the population available for eating at the start of a substep.
    ///
    /// Cells beyond the prey's length groups are ignored, missing cells are zero.
    pub fn set_population(&mut self, area: i32, cells: &[PopInfo]) {
        let Some(a) = self.area_num(area) else {
            return;
        };
        for l in 0..self.num_length_groups() {
            let cell = cells.get(l).copied().unwrap_or_default();
            self.number[a][l] = cell;
            self.biomass[[a, l]] = cell.biomass();
        }
        self.number_prior_to_eating[a] = self.number[a].clone();
        self.total[a] = self.biomass.row(a).sum();
    }

    /// Clear every consumption accumulator at a step boundary
    pub fn reset_step(&mut self) {
        self.consumption.fill(0.0);
        self.overconsumption.fill(0.0);
        self.reset_substep();
    }

    /// Clear the per-substep accumulators
    pub fn reset_substep(&mut self) {
        self.cons.fill(0.0);
        self.overcons.fill(0.0);
        self.ratio.fill(0.0);
        self.too_much_consumption.iter_mut().for_each(|f| *f = false);
    }

    /// Add one predator length group's consumption, indexed by prey length group
    pub fn add_consumption(&mut self, area: i32, predator_consumption: ArrayView1<'_, f64>) {
        let Some(a) = self.area_num(area) else {
            return;
        };
        let mut row = self.cons.row_mut(a);
        for (l, amount) in predator_consumption.iter().enumerate().take(row.len()) {
            row[l] += amount;
        }
    }

    /// Compare this substep's consumption with the available biomass.
    ///
    /// Sets the too-much-consumed flag when any length group would lose more
    /// than `max_ratio_consumed ^ num_substeps` of its biomass, and books the
    /// capped consumption and the overconsumption into the step totals.
    pub fn check_consumption(&mut self, area: i32, num_substeps: usize) {
        let Some(a) = self.area_num(area) else {
            return;
        };
        let max_ratio = self.max_ratio_consumed.powi(num_substeps as i32);
        let mut too_much = false;

        for l in 0..self.num_length_groups() {
            let biomass = self.biomass[[a, l]];
            let ratio = if biomass > VERY_SMALL {
                self.cons[[a, l]] / biomass
            } else {
                0.0
            };
            self.ratio[[a, l]] = ratio;

            if ratio > max_ratio {
                too_much = true;
                self.overcons[[a, l]] = (ratio - max_ratio) * biomass;
                self.cons[[a, l]] = max_ratio * biomass;
            } else {
                self.overcons[[a, l]] = 0.0;
            }

            self.consumption[[a, l]] += self.cons[[a, l]];
            self.overconsumption[[a, l]] += self.overcons[[a, l]];
        }

        self.too_much_consumption[a] = too_much;
    }

    /// Remove this substep's (capped) consumption from the population
    pub fn subtract(&mut self, area: i32) {
        let Some(a) = self.area_num(area) else {
            return;
        };
        for l in 0..self.num_length_groups() {
            let biomass = self.biomass[[a, l]];
            if biomass > VERY_SMALL {
                let survival = (1.0 - self.cons[[a, l]] / biomass).max(0.0);
                self.number[a][l].n *= survival;
                self.biomass[[a, l]] = biomass * survival;
            }
        }
        self.total[a] = self.biomass.row(a).sum();
    }

    /// Total biomass on `area`, zero if the prey does not live there
    pub fn biomass(&self, area: i32) -> f64 {
        self.area_num(area).map_or(0.0, |a| self.total[a])
    }

    pub fn biomass_at(&self, area: i32, length: usize) -> f64 {
        self.area_num(area).map_or(0.0, |a| self.biomass[[a, length]])
    }

    pub fn ratio(&self, area: i32, length: usize) -> f64 {
        self.area_num(area).map_or(0.0, |a| self.ratio[[a, length]])
    }

    pub fn too_much_consumption(&self, area: i32) -> bool {
        self.area_num(area)
            .map_or(false, |a| self.too_much_consumption[a])
    }

    /// Step consumption by length group on `area`
    pub fn consumption(&self, area: i32) -> Option<ArrayView1<'_, f64>> {
        self.area_num(area).map(|a| self.consumption.row(a))
    }

    pub fn over_consumption(&self, area: i32) -> Option<ArrayView1<'_, f64>> {
        self.area_num(area).map(|a| self.overconsumption.row(a))
    }

    pub fn number(&self, area: i32) -> Option<&[PopInfo]> {
        self.area_num(area).map(|a| self.number[a].as_slice())
    }

    pub fn number_prior_to_eating(&self, area: i32) -> Option<&[PopInfo]> {
        self.area_num(area)
            .map(|a| self.number_prior_to_eating[a].as_slice())
    }
}
