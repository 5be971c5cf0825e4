//! Aggregation of model consumption into observation coordinates.
//!
//! Likelihood components never read predators or preys directly. At bind
//! time they resolve their names into a binding (handles plus the
//! aggregation tables of the observation file); at scoring time they hand
//! that binding to an [`Aggregator`] which collapses the fine-grained
//! per-length consumption into one grid per aggregated area.

use crate::aggregation::Aggregation;
use crate::engine::ConsumptionEngine;
use crate::error::{Error, Result};
use crate::lengths::LengthGroupDivision;
use crate::numeric::VERY_SMALL;
use crate::registry::{FleetHandle, PredatorHandle, PreyHandle};
use crate::stats::PopInfo;
use ndarray::{Array1, Array2};

/// Whether consumption is summed as biomass or as numbers of prey
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SumMode {
    Biomass,
    Numbers,
}

/// Resolved inputs for aggregating fleet catch of a set of stocks
#[derive(Clone, Debug)]
pub struct CatchBinding {
    pub fleets: Vec<FleetHandle>,
    pub stocks: Vec<PreyHandle>,
    pub areas: Aggregation,
    pub ages: Aggregation,
    /// Common length groups of the stocks
    pub lengths: LengthGroupDivision,
    /// Include the catch lost to overconsumption
    pub overconsumption: bool,
}

/// One prey column of a stomach content component
#[derive(Clone, Debug)]
pub struct PreyGroupBinding {
    pub label: String,
    pub preys: Vec<PreyHandle>,
    pub min_length: f64,
    pub max_length: f64,
}

impl PreyGroupBinding {
    pub fn contains(&self, length: f64) -> bool {
        length >= self.min_length && length < self.max_length
    }

    pub fn mean_length(&self) -> f64 {
        0.5 * (self.min_length + self.max_length)
    }
}

/// Resolved inputs for aggregating predator consumption
#[derive(Clone, Debug)]
pub struct StomachBinding {
    pub predators: Vec<PredatorHandle>,
    pub areas: Aggregation,
    pub predator_lengths: LengthGroupDivision,
    pub prey_groups: Vec<PreyGroupBinding>,
}

/// Source of aggregated model output for likelihood scoring
pub trait Aggregator {
    /// Catch by aggregated area, as an (age group x length group) grid
    fn catch_distribution(&mut self, _binding: &CatchBinding) -> Result<Vec<Array2<PopInfo>>> {
        Err(Error::Config(
            "aggregator does not provide catch distributions".to_string(),
        ))
    }

    /// Consumption of prey group `group` by aggregated area, per predator length group
    fn predator_consumption(
        &mut self,
        _binding: &StomachBinding,
        _group: usize,
        _mode: SumMode,
    ) -> Result<Vec<Array1<f64>>> {
        Err(Error::Config(
            "aggregator does not provide predator consumption".to_string(),
        ))
    }
}

/// Aggregator reading the step totals of a [`ConsumptionEngine`]
pub struct PredatorAggregator<'a> {
    engine: &'a ConsumptionEngine,
}

impl<'a> PredatorAggregator<'a> {
    pub fn new(engine: &'a ConsumptionEngine) -> Self {
        Self { engine }
    }
}

impl Aggregator for PredatorAggregator<'_> {
    fn catch_distribution(&mut self, binding: &CatchBinding) -> Result<Vec<Array2<PopInfo>>> {
        let num_lengths = binding.lengths.num_groups();
        let mut result = Vec::with_capacity(binding.areas.len());

        for ai in 0..binding.areas.len() {
            let mut grid = Array2::<PopInfo>::default((binding.ages.len(), num_lengths));

            for &fh in &binding.fleets {
                let fleet = self.engine.fleet(fh);
                for &ph in &binding.stocks {
                    let Some(slot) = fleet.prey_slot(ph) else {
                        continue;
                    };
                    let prey = self.engine.prey(ph);
                    let Some(age) = (0..binding.ages.len())
                        .find(|&g| binding.ages.members(g).contains(&prey.age()))
                    else {
                        continue;
                    };

                    for &area in binding.areas.members(ai) {
                        let (Some(cons), Some(prior)) =
                            (fleet.consumption(area, slot), prey.number_prior_to_eating(area))
                        else {
                            continue;
                        };
                        let total_eaten = prey.consumption(area);
                        let total_over = prey.over_consumption(area);

                        for (l, column) in cons.columns().into_iter().enumerate().take(num_lengths) {
                            let mut biomass = column.sum();
                            if binding.overconsumption {
                                if let (Some(eaten), Some(over)) = (&total_eaten, &total_over) {
                                    if eaten[l] > VERY_SMALL {
                                        biomass += over[l] * biomass / eaten[l];
                                    }
                                }
                            }
                            let w = prior[l].w;
                            if w > VERY_SMALL && biomass > 0.0 {
                                grid[[age, l]] += PopInfo::new(biomass / w, w);
                            }
                        }
                    }
                }
            }
            result.push(grid);
        }

        Ok(result)
    }

    fn predator_consumption(
        &mut self,
        binding: &StomachBinding,
        group: usize,
        mode: SumMode,
    ) -> Result<Vec<Array1<f64>>> {
        let prey_group = binding.prey_groups.get(group).ok_or_else(|| {
            Error::Config(format!("prey group {} is not part of the binding", group))
        })?;
        let num_pred = binding.predator_lengths.num_groups();
        let mut result = Vec::with_capacity(binding.areas.len());

        for ai in 0..binding.areas.len() {
            let mut sums = Array1::<f64>::zeros(num_pred);

            for &pred_handle in &binding.predators {
                let predator = self.engine.predator(pred_handle);
                for &prey_handle in &prey_group.preys {
                    let Some(slot) = predator.prey_slot(prey_handle) else {
                        continue;
                    };
                    let prey = self.engine.prey(prey_handle);

                    for &area in binding.areas.members(ai) {
                        let (Some(cons), Some(prior)) =
                            (predator.consumption(area, slot), prey.number_prior_to_eating(area))
                        else {
                            continue;
                        };

                        for ((predl, preyl), &amount) in cons.indexed_iter() {
                            let Some(bin) = binding
                                .predator_lengths
                                .group_of(predator.lengths().mean_length(predl))
                            else {
                                continue;
                            };
                            if !prey_group.contains(prey.lengths().mean_length(preyl)) {
                                continue;
                            }
                            sums[bin] += match mode {
                                SumMode::Biomass => amount,
                                SumMode::Numbers => {
                                    let w = prior[preyl].w;
                                    if w > VERY_SMALL {
                                        amount / w
                                    } else {
                                        0.0
                                    }
                                }
                            };
                        }
                    }
                }
            }
            result.push(sums);
        }

        Ok(result)
    }
}
