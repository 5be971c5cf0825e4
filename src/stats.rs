//! Population cells and summary statistics over length distributions.

use crate::lengths::LengthGroupDivision;
use crate::numeric::is_zero;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Abundance and mean individual weight of one (area, length group) cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PopInfo {
    /// Number of individuals
    pub n: f64,
    /// Mean individual weight
    pub w: f64,
}

impl PopInfo {
    pub fn new(n: f64, w: f64) -> Self {
        Self { n, w }
    }

    /// Total biomass in the cell
    #[inline]
    pub fn biomass(&self) -> f64 {
        self.n * self.w
    }
}

impl AddAssign for PopInfo {
    /// Merge two cells: counts add, mean weight is count-weighted
    fn add_assign(&mut self, other: PopInfo) {
        let total = self.n + other.n;
        if is_zero(total) {
            self.n = 0.0;
            self.w = 0.0;
        } else {
            self.w = (self.n * self.w + other.n * other.w) / total;
            self.n = total;
        }
    }
}

/// Summary statistics of a distribution over length groups
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PopStatistics {
    pub total_number: f64,
    pub mean_length: f64,
    pub sdev_length: f64,
    pub mean_weight: f64,
}

impl PopStatistics {
    /// Compute statistics of `cells`, where cell `i` is length group `i` of `lengths`
    pub fn new(cells: &[PopInfo], lengths: &LengthGroupDivision) -> Self {
        let groups = cells.len().min(lengths.num_groups());
        let total_number: f64 = cells[..groups].iter().map(|c| c.n).sum();

        if is_zero(total_number) {
            return Self::default();
        }

        let mut length_sum = 0.0;
        let mut weight_sum = 0.0;
        for (i, cell) in cells[..groups].iter().enumerate() {
            length_sum += cell.n * lengths.mean_length(i);
            weight_sum += cell.n * cell.w;
        }
        let mean_length = length_sum / total_number;
        let mean_weight = weight_sum / total_number;

        let variance = cells[..groups]
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let d = lengths.mean_length(i) - mean_length;
                cell.n * d * d
            })
            .sum::<f64>()
            / total_number;

        Self {
            total_number,
            mean_length,
            sdev_length: variance.max(0.0).sqrt(),
            mean_weight,
        }
    }
}
