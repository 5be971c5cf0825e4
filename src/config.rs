//! Configuration system for trophic.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::likelihood::{ComponentConfig, StomachFunction};
use crate::time::TimeWindow;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub time: TimeWindow,
    #[serde(default)]
    pub consumption: ConsumptionConfig,
    /// Likelihood components, in scoring order
    #[serde(default)]
    pub likelihood: Vec<ComponentConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Consumption configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionConfig {
    /// Maximum fraction of a prey length group eaten in one step
    pub max_ratio_consumed: f64,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for exported summaries
    pub output_dir: String,
    /// Write the per-area likelihood summary after an evaluation
    pub write_summary: bool,
    /// Write modelled against observed values for every scored step
    pub write_print: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time: TimeWindow::default(),
            consumption: ConsumptionConfig::default(),
            likelihood: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ConsumptionConfig {
    fn default() -> Self {
        Self {
            max_ratio_consumed: 0.95,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            output_dir: "output".to_string(),
            write_summary: true,
            write_print: false,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| crate::Error::io(path.as_ref(), e))?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate().map_err(crate::Error::Config)?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path.as_ref(), yaml).map_err(|e| crate::Error::io(path.as_ref(), e))?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        self.time.validate()?;

        let ratio = self.consumption.max_ratio_consumed;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(format!("max_ratio_consumed must be within [0, 1], got {}", ratio));
        }

        for (i, component) in self.likelihood.iter().enumerate() {
            if component.weight() < 0.0 {
                return Err(format!("likelihood component '{}' has a negative weight", component.name()));
            }
            if self.likelihood[..i].iter().any(|c| c.name() == component.name()) {
                return Err(format!("likelihood component '{}' is defined twice", component.name()));
            }
            if let ComponentConfig::StomachContent(sc) = component {
                let function = StomachFunction::from_name(&sc.function)
                    .ok_or_else(|| format!("unrecognised function '{}' for {}", sc.function, sc.name))?;
                if function.weighted() && sc.sample_file.is_none() {
                    return Err(format!("{} - function {} needs a sample_file", sc.name, function.name()));
                }
            }
        }
        Ok(())
    }
}
