//! Data export system for analysis in external tools.

use crate::diagnostics::Event;
use crate::likelihood::{Objective, PrintRow, SummaryRow};
use std::fs::File;
use std::io::{Result, Write};
use std::path::Path;

/// Export system for saving likelihood output
pub struct ExportSystem;

impl ExportSystem {
    /// Export per-area likelihood values to CSV
    pub fn export_summary_csv<P: AsRef<Path>>(rows: &[SummaryRow], path: P) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;

        wtr.write_record(["year", "step", "area", "component", "weight", "likelihood"])?;

        for row in rows {
            wtr.write_record([
                row.time.year.to_string(),
                row.time.step.to_string(),
                row.area.clone(),
                row.component.clone(),
                row.weight.to_string(),
                format!("{:.6}", row.value),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Export modelled against observed values to CSV
    pub fn export_print_csv<P: AsRef<Path>>(rows: &[PrintRow], path: P) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;

        wtr.write_record([
            "year",
            "step",
            "area",
            "key",
            "prey",
            "observed",
            "modelled",
            "sample_size",
            "stddev",
        ])?;

        let optional = |v: Option<f64>| v.map_or(String::new(), |v| format!("{:.6}", v));
        for row in rows {
            wtr.write_record([
                row.time.year.to_string(),
                row.time.step.to_string(),
                row.area.clone(),
                row.key.clone(),
                row.prey.clone().unwrap_or_default(),
                format!("{:.6}", row.observed),
                format!("{:.6}", row.modelled),
                optional(row.sample_size),
                optional(row.stddev),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Export recorded warnings and notes to CSV
    pub fn export_events_csv<P: AsRef<Path>>(events: &[Event], path: P) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;

        wtr.write_record(["severity", "component", "message", "value"])?;

        for event in events {
            wtr.write_record([
                format!("{:?}", event.severity),
                event.component.clone(),
                event.message.clone(),
                event.value.map_or(String::new(), |v| v.to_string()),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Export the objective and its components to JSON
    pub fn export_objective_json<P: AsRef<Path>>(objective: &Objective, path: P) -> Result<()> {
        let snapshot = ObjectiveSnapshot::from(objective);
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Export everything an evaluation produced into one directory
    pub fn export_full_state<P: AsRef<Path>>(
        objective: &Objective,
        print_rows: &[PrintRow],
        events: &[Event],
        base_path: P,
    ) -> Result<ExportManifest> {
        let base = base_path.as_ref();
        std::fs::create_dir_all(base)?;

        let summary_path = base.join("summary.csv");
        let print_path = base.join("print.csv");
        let events_path = base.join("events.csv");
        let objective_path = base.join("objective.json");

        Self::export_summary_csv(&objective.summary_rows(), &summary_path)?;
        Self::export_print_csv(print_rows, &print_path)?;
        Self::export_events_csv(events, &events_path)?;
        Self::export_objective_json(objective, &objective_path)?;

        Ok(ExportManifest {
            total: objective.total(),
            summary_file: summary_path.to_string_lossy().to_string(),
            print_file: print_path.to_string_lossy().to_string(),
            events_file: events_path.to_string_lossy().to_string(),
            objective_file: objective_path.to_string_lossy().to_string(),
        })
    }

    /// Export a plain-text summary of the objective
    pub fn export_summary<P: AsRef<Path>>(objective: &Objective, path: P) -> Result<()> {
        let mut file = File::create(path)?;

        writeln!(file, "=== Likelihood Summary ===")?;
        writeln!(file, "Components: {}", objective.len())?;
        writeln!(file, "Total: {:.6}", objective.total())?;
        writeln!(file)?;

        for wc in objective.components() {
            let component = &wc.component;
            writeln!(file, "=== {} ({}) ===", component.name(), component.kind())?;
            writeln!(file, "Weight: {}", wc.weight)?;
            writeln!(file, "Observed steps: {}", component.steps().len())?;
            writeln!(file, "Likelihood: {:.6}", component.likelihood())?;
            writeln!(file, "Weighted: {:.6}", wc.weight * component.likelihood())?;
            writeln!(file)?;
        }

        Ok(())
    }
}

/// Manifest of exported files
#[derive(Debug)]
pub struct ExportManifest {
    pub total: f64,
    pub summary_file: String,
    pub print_file: String,
    pub events_file: String,
    pub objective_file: String,
}

#[derive(serde::Serialize)]
struct ComponentSnapshot {
    name: String,
    kind: String,
    weight: f64,
    observed_steps: usize,
    likelihood: f64,
}

#[derive(serde::Serialize)]
struct ObjectiveSnapshot {
    total: f64,
    components: Vec<ComponentSnapshot>,
}

impl From<&Objective> for ObjectiveSnapshot {
    fn from(objective: &Objective) -> Self {
        Self {
            total: objective.total(),
            components: objective
                .components()
                .iter()
                .map(|wc| ComponentSnapshot {
                    name: wc.component.name().to_string(),
                    kind: wc.component.kind().to_string(),
                    weight: wc.weight,
                    observed_steps: wc.component.steps().len(),
                    likelihood: wc.component.likelihood(),
                })
                .collect(),
        }
    }
}
