//! Pipeline configuration.
//!
//! Every field has a default, so `PipelineConfig::default()` is the configuration the `siqrd`
//! binary runs with when no config file is given. A JSON file may override any subset of fields:
//!
//! ```json
//! {
//!     "horizon": 20,
//!     "library_path": "lib/libepidemic.so",
//!     "plot": { "variables": ["S", "I"], "colors": ["blue", "#d62728"] }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::plotting::PlotOptions;

/// Immutable settings for one pipeline run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Number of simulated time steps. The distributions must hold `horizon + 1` values.
    pub horizon: usize,
    /// Directory holding `time_generation.dat` and `incubation_period.dat`.
    pub data_dir: PathBuf,
    /// Shared library exporting the simulation routine.
    pub library_path: PathBuf,
    /// Name of the exported routine.
    pub entry_point: String,
    /// Directory created before the simulation runs.
    pub results_dir: PathBuf,
    /// Where the simulation routine writes its table. This must agree with the routine itself;
    /// the pipeline cannot tell it where to write.
    pub time_evolution_file: PathBuf,
    pub plot: PlotOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let results_dir = PathBuf::from("results");
        PipelineConfig {
            horizon: 20,
            data_dir: PathBuf::from("data"),
            library_path: Path::new("lib").join("libepidemic.so"),
            entry_point: "simulate_and_write".to_string(),
            time_evolution_file: results_dir.join("time_evolution.dat"),
            results_dir,
            plot: PlotOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Reads a configuration from a JSON file. Keys that are absent keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::IoError` if the file cannot be read, or
    /// `PipelineError::JsonError` if it is not valid JSON, has unknown keys, or names an
    /// unknown variable or color.
    pub fn from_json_file(path: &Path) -> Result<Self, PipelineError> {
        let contents = fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }
}
