//! Length group divisions - fixed partitions of a length axis.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Ordered, contiguous partition of a length range into groups.
///
/// Group `i` covers `[breaks[i], breaks[i + 1])`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LengthGroupDivision {
    breaks: Vec<f64>,
}

impl LengthGroupDivision {
    /// Build a division from its breakpoints (at least two, strictly increasing)
    pub fn new(breaks: Vec<f64>) -> Result<Self> {
        if breaks.len() < 2 {
            return Err(Error::Config(
                "a length group division needs at least two breakpoints".to_string(),
            ));
        }
        if breaks.windows(2).any(|w| w[1] <= w[0]) {
            return Err(Error::Config(format!(
                "length breakpoints must be strictly increasing: {:?}",
                breaks
            )));
        }
        Ok(Self { breaks })
    }

    /// Evenly spaced groups of width `dl` from `min` to `max`
    pub fn uniform(min: f64, max: f64, dl: f64) -> Result<Self> {
        if dl <= 0.0 || max <= min {
            return Err(Error::Config(format!(
                "invalid uniform length groups: min {} max {} dl {}",
                min, max, dl
            )));
        }
        let n = ((max - min) / dl).round().max(1.0) as usize;
        let breaks = (0..=n).map(|i| min + i as f64 * dl).collect();
        Self::new(breaks)
    }

    #[inline]
    pub fn num_groups(&self) -> usize {
        self.breaks.len() - 1
    }

    #[inline]
    pub fn min_length(&self, group: usize) -> f64 {
        self.breaks[group]
    }

    #[inline]
    pub fn max_length(&self, group: usize) -> f64 {
        self.breaks[group + 1]
    }

    #[inline]
    pub fn mean_length(&self, group: usize) -> f64 {
        0.5 * (self.breaks[group] + self.breaks[group + 1])
    }

    /// Lower bound of the whole division
    pub fn lower(&self) -> f64 {
        self.breaks[0]
    }

    /// Upper bound of the whole division
    pub fn upper(&self) -> f64 {
        self.breaks[self.breaks.len() - 1]
    }

    pub fn breaks(&self) -> &[f64] {
        &self.breaks
    }

    /// Group containing `length`, if any
    pub fn group_of(&self, length: f64) -> Option<usize> {
        if length < self.lower() || length >= self.upper() {
            return None;
        }
        // breaks are sorted, so the partition point is the first break above `length`
        let idx = self.breaks.partition_point(|&b| b <= length);
        Some(idx - 1)
    }

    /// Two divisions are compatible when their breakpoints agree
    pub fn is_compatible(&self, other: &LengthGroupDivision) -> bool {
        self.breaks.len() == other.breaks.len()
            && self
                .breaks
                .iter()
                .zip(&other.breaks)
                .all(|(a, b)| (a - b).abs() < 1e-9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_division() {
        let div = LengthGroupDivision::uniform(10.0, 50.0, 10.0).unwrap();
        assert_eq!(div.num_groups(), 4);
        assert_eq!(div.mean_length(0), 15.0);
        assert_eq!(div.max_length(3), 50.0);
    }

    #[test]
    fn test_group_of() {
        let div = LengthGroupDivision::new(vec![0.0, 5.0, 20.0, 30.0]).unwrap();
        assert_eq!(div.group_of(0.0), Some(0));
        assert_eq!(div.group_of(4.99), Some(0));
        assert_eq!(div.group_of(5.0), Some(1));
        assert_eq!(div.group_of(29.0), Some(2));
        assert_eq!(div.group_of(30.0), None);
        assert_eq!(div.group_of(-1.0), None);
    }

    #[test]
    fn test_invalid_breaks() {
        assert!(LengthGroupDivision::new(vec![1.0]).is_err());
        assert!(LengthGroupDivision::new(vec![1.0, 1.0]).is_err());
        assert!(LengthGroupDivision::uniform(10.0, 5.0, 1.0).is_err());
    }

    #[test]
    fn test_compatibility() {
        let a = LengthGroupDivision::uniform(0.0, 10.0, 1.0).unwrap();
        let b = LengthGroupDivision::uniform(0.0, 10.0, 1.0).unwrap();
        let c = LengthGroupDivision::uniform(0.0, 10.0, 2.0).unwrap();
        assert!(a.is_compatible(&b));
        assert!(!a.is_compatible(&c));
    }
}
