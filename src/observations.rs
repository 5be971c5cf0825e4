//! Reading whitespace-separated observation files.
//!
//! Lines starting with `;` or `//` are comments, as is anything after a `;`
//! on a data line. A leading line that does not start with a digit is a
//! header and is skipped. Every data row must have exactly the expected
//! number of columns.

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::time::{TimeStep, TimeWindow};
use std::path::Path;

/// One data row of an observation file
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub line: usize,
    fields: Vec<String>,
}

impl Row {
    pub fn field(&self, i: usize) -> &str {
        &self.fields[i]
    }

    pub fn year(&self, source: &str) -> Result<i32> {
        self.parse(0, source)
    }

    pub fn step(&self, source: &str) -> Result<i32> {
        self.parse(1, source)
    }

    pub fn time(&self, source: &str) -> Result<TimeStep> {
        Ok(TimeStep::new(self.year(source)?, self.step(source)?))
    }

    pub fn value(&self, i: usize, source: &str) -> Result<f64> {
        self.parse(i, source)
    }

    fn parse<T: std::str::FromStr>(&self, i: usize, source: &str) -> Result<T>
    where
        T::Err: std::fmt::Display,
    {
        self.fields[i].parse::<T>().map_err(|e| Error::Parse {
            path: source.to_string(),
            line: self.line,
            reason: format!("column {} '{}': {}", i + 1, self.fields[i], e),
        })
    }
}

fn strip_comment(line: &str) -> &str {
    let line = match line.find(';') {
        Some(pos) => &line[..pos],
        None => line,
    };
    let line = match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    };
    line.trim()
}

/// Split `text` into data rows, checking the column count of each one
pub fn parse_rows(text: &str, source: &str, columns: usize) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    let mut seen_data = false;

    for (n, raw) in text.lines().enumerate() {
        let line = strip_comment(raw);
        if line.is_empty() {
            continue;
        }

        if !seen_data {
            seen_data = true;
            let starts_numeric = line
                .chars()
                .next()
                .map(|c| c.is_ascii_digit() || c == '-')
                .unwrap_or(false);
            if !starts_numeric {
                continue;
            }
        }

        let fields: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if fields.len() != columns {
            return Err(Error::ColumnCount {
                path: source.to_string(),
                line: n + 1,
                expected: columns,
                found: fields.len(),
            });
        }
        rows.push(Row {
            line: n + 1,
            fields,
        });
    }

    Ok(rows)
}

/// Read a file into memory
pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    std::fs::read_to_string(path.as_ref()).map_err(|e| Error::io(path.as_ref(), e))
}

/// Counts of kept and dropped rows for one observation file
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub kept: usize,
    pub dropped: usize,
}

impl LoadReport {
    /// Tally a row, keeping it only if every key resolved and the time is in the window
    pub fn tally(&mut self, keep: bool) -> bool {
        if keep {
            self.kept += 1;
        } else {
            self.dropped += 1;
        }
        keep
    }

    /// Report the totals for a finished file
    pub fn finish(&self, diag: &Diagnostics, component: &str) {
        if self.dropped > 0 {
            diag.warn_value(
                component,
                "dropped rows with unresolved labels or outside the time window",
                self.dropped as f64,
            );
        }
        if self.kept == 0 {
            diag.warn(component, "found no data in the data file");
        }
        diag.info(component, "read data file - number of entries", self.kept as f64);
    }
}

/// Shared helper: resolve the time of a row inside the window
pub fn time_in_window(row: &Row, window: &TimeWindow, source: &str) -> Result<Option<TimeStep>> {
    let t = row.time(source)?;
    Ok(if window.is_within_period(t.year, t.step) {
        Some(t)
    } else {
        None
    })
}
