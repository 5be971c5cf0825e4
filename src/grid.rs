//! Per-timestep grid storage.
//!
//! Observation data and the matching model output are kept in one slab of
//! fixed-shape grids per observed time step. Slabs live in an append-only
//! arena indexed by a dense time index.

use crate::time::TimeStep;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// One grid per aggregated area, all with the same shape
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaGrids {
    grids: Vec<Array2<f64>>,
}

impl AreaGrids {
    /// Zero-filled grids of `rows x cols` for each of `areas`
    pub fn zeros(areas: usize, rows: usize, cols: usize) -> Self {
        Self {
            grids: (0..areas).map(|_| Array2::zeros((rows, cols))).collect(),
        }
    }

    #[inline]
    pub fn get(&self, area: usize, row: usize, col: usize) -> f64 {
        self.grids[area][[row, col]]
    }

    #[inline]
    pub fn set(&mut self, area: usize, row: usize, col: usize, value: f64) {
        self.grids[area][[row, col]] = value;
    }

    pub fn area(&self, area: usize) -> &Array2<f64> {
        &self.grids[area]
    }

    pub fn area_mut(&mut self, area: usize) -> &mut Array2<f64> {
        &mut self.grids[area]
    }

    pub fn num_areas(&self) -> usize {
        self.grids.len()
    }

    /// (areas, rows, cols)
    pub fn shape(&self) -> (usize, usize, usize) {
        match self.grids.first() {
            Some(g) => (self.grids.len(), g.nrows(), g.ncols()),
            None => (0, 0, 0),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Array2<f64>> {
        self.grids.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Array2<f64>> {
        self.grids.iter_mut()
    }

    pub fn total(&self) -> f64 {
        self.grids.iter().map(|g| g.sum()).sum()
    }
}

/// Append-only arena of per-timestep slabs.
///
/// Time steps are stored in the order they were first seen and are never
/// removed or reordered.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimeSeries<T> {
    steps: Vec<TimeStep>,
    slabs: Vec<T>,
}

impl<T> Default for TimeSeries<T> {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            slabs: Vec::new(),
        }
    }
}

impl<T> TimeSeries<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dense index of `time`, if it has been recorded
    pub fn index_of(&self, time: TimeStep) -> Option<usize> {
        self.steps.iter().position(|&t| t == time)
    }

    /// Index of `time`, appending a new slab built by `make` on first sight
    pub fn index_or_insert_with<F: FnOnce() -> T>(&mut self, time: TimeStep, make: F) -> usize {
        match self.index_of(time) {
            Some(idx) => idx,
            None => {
                self.steps.push(time);
                self.slabs.push(make());
                self.steps.len() - 1
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slabs.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slabs.get_mut(index)
    }

    pub fn at(&self, time: TimeStep) -> Option<&T> {
        self.index_of(time).and_then(|i| self.slabs.get(i))
    }

    pub fn step(&self, index: usize) -> TimeStep {
        self.steps[index]
    }

    pub fn steps(&self) -> &[TimeStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TimeStep, &T)> {
        self.steps.iter().copied().zip(self.slabs.iter())
    }

    pub fn slabs_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slabs.iter_mut()
    }
}
