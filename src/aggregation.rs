//! Label-to-index aggregation tables.
//!
//! Observation files address areas, ages, predator lengths and preys by
//! label. These tables map each label to a dense index and to the model
//! values the index aggregates over.

use crate::error::{Error, Result};
use crate::lengths::LengthGroupDivision;
use serde::{Deserialize, Serialize};

/// One labelled group of integer members (areas or ages)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub label: String,
    pub members: Vec<i32>,
}

/// Labelled length interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthEntry {
    pub label: String,
    pub min: f64,
    pub max: f64,
}

/// Case-insensitive label index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelIndex {
    labels: Vec<String>,
}

impl LabelIndex {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Dense index of `label`, if known. The last match wins.
    pub fn resolve(&self, label: &str) -> Option<usize> {
        self.labels
            .iter()
            .rposition(|l| l.eq_ignore_ascii_case(label))
    }

    pub fn label(&self, index: usize) -> &str {
        &self.labels[index]
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Aggregation of integer model values (areas, ages) under labels
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    index: LabelIndex,
    members: Vec<Vec<i32>>,
}

impl Aggregation {
    pub fn from_entries(entries: &[GroupEntry]) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::Config("aggregation table is empty".to_string()));
        }
        if let Some(e) = entries.iter().find(|e| e.members.is_empty()) {
            return Err(Error::Config(format!(
                "aggregation label '{}' has no members",
                e.label
            )));
        }
        Ok(Self {
            index: LabelIndex::new(entries.iter().map(|e| e.label.clone()).collect()),
            members: entries.iter().map(|e| e.members.clone()).collect(),
        })
    }

    pub fn resolve(&self, label: &str) -> Option<usize> {
        self.index.resolve(label)
    }

    pub fn label(&self, index: usize) -> &str {
        self.index.label(index)
    }

    pub fn members(&self, index: usize) -> &[i32] {
        &self.members[index]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Aggregation of a length axis into labelled, contiguous intervals
#[derive(Debug, Clone, PartialEq)]
pub struct LengthAggregation {
    index: LabelIndex,
    division: LengthGroupDivision,
}

impl LengthAggregation {
    /// Intervals must be given in order and must touch
    pub fn from_entries(entries: &[LengthEntry]) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::Config("length aggregation table is empty".to_string()));
        }
        let mut breaks = vec![entries[0].min];
        for pair in entries.windows(2) {
            if (pair[0].max - pair[1].min).abs() > 1e-9 {
                return Err(Error::Config(format!(
                    "length aggregation '{}' does not start where '{}' ends",
                    pair[1].label, pair[0].label
                )));
            }
        }
        breaks.extend(entries.iter().map(|e| e.max));

        Ok(Self {
            index: LabelIndex::new(entries.iter().map(|e| e.label.clone()).collect()),
            division: LengthGroupDivision::new(breaks)?,
        })
    }

    pub fn resolve(&self, label: &str) -> Option<usize> {
        self.index.resolve(label)
    }

    pub fn label(&self, index: usize) -> &str {
        self.index.label(index)
    }

    pub fn division(&self) -> &LengthGroupDivision {
        &self.division
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
