//! Live entity registry and the integer handles produced when binding.
//!
//! Likelihood components refer to predators, preys and fleets by name in
//! their configuration. Names are resolved once, at bind time, against an
//! [`EntityRegistry`]; the scoring path only ever sees handles.

use crate::lengths::LengthGroupDivision;
use serde::{Deserialize, Serialize};

/// Index of a predator in the model's predator list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PredatorHandle(pub usize);

/// Index of a prey in the model's prey list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreyHandle(pub usize);

/// Index of a fleet in the model's fleet list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FleetHandle(pub usize);

/// What binding needs to know about a live entity
#[derive(Clone, Debug, PartialEq)]
pub struct EntityInfo {
    pub name: String,
    pub areas: Vec<i32>,
    pub lengths: Option<LengthGroupDivision>,
}

impl EntityInfo {
    pub fn new(name: &str, areas: Vec<i32>, lengths: Option<LengthGroupDivision>) -> Self {
        Self {
            name: name.to_string(),
            areas,
            lengths,
        }
    }

    pub fn is_in_area(&self, area: i32) -> bool {
        self.areas.contains(&area)
    }
}

/// Name-indexed view of the live model entities
#[derive(Clone, Debug, Default)]
pub struct EntityRegistry {
    pub predators: Vec<EntityInfo>,
    pub preys: Vec<EntityInfo>,
    pub fleets: Vec<EntityInfo>,
}

fn find(entities: &[EntityInfo], name: &str) -> Option<usize> {
    entities.iter().position(|e| e.name.eq_ignore_ascii_case(name))
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve_predator(&self, name: &str) -> Option<PredatorHandle> {
        find(&self.predators, name).map(PredatorHandle)
    }

    pub fn resolve_prey(&self, name: &str) -> Option<PreyHandle> {
        find(&self.preys, name).map(PreyHandle)
    }

    pub fn resolve_fleet(&self, name: &str) -> Option<FleetHandle> {
        find(&self.fleets, name).map(FleetHandle)
    }

    pub fn predator(&self, handle: PredatorHandle) -> &EntityInfo {
        &self.predators[handle.0]
    }

    pub fn prey(&self, handle: PreyHandle) -> &EntityInfo {
        &self.preys[handle.0]
    }

    pub fn fleet(&self, handle: FleetHandle) -> &EntityInfo {
        &self.fleets[handle.0]
    }
}
