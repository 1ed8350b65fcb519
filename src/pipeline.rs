//! Runs the stages in their fixed order:
//!
//! `Load -> GatewayInit -> Simulate -> Read -> Plot -> Done`
//!
//! A failing stage aborts the run. The error is logged together with the stage it happened in
//! and returned unchanged; nothing is retried and a later run starts over from `Load`.

use std::fmt::{self, Display};

use log::{debug, error, info};

use crate::config::PipelineConfig;
use crate::distributions::load_distributions;
use crate::error::PipelineError;
use crate::plotting::{render_table, RenderedPlot};
use crate::simulation::{run_simulation, NativeKernel, Simulator};
use crate::time_evolution::read_simulation_data;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Load,
    GatewayInit,
    Simulate,
    Read,
    Plot,
    Done,
}

impl Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Stage::Load => "LOAD",
            Stage::GatewayInit => "GATEWAY_INIT",
            Stage::Simulate => "SIMULATE",
            Stage::Read => "READ",
            Stage::Plot => "PLOT",
            Stage::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// What a completed run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineOutcome {
    /// Number of time steps in the table the simulation wrote.
    pub table_rows: usize,
    pub plot: RenderedPlot,
}

/// Runs the pipeline against the shared library named by `config.library_path`.
///
/// # Errors
///
/// Returns the first error any stage produces.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutcome, PipelineError> {
    run_pipeline_with(config, |config| {
        NativeKernel::init(&config.library_path, &config.entry_point, config.horizon)
    })
}

/// Runs the pipeline with the simulator returned by `init`, which is called once the
/// distributions have loaded.
///
/// # Errors
///
/// Returns the first error any stage produces.
pub fn run_pipeline_with<S, F>(
    config: &PipelineConfig,
    init: F,
) -> Result<PipelineOutcome, PipelineError>
where
    S: Simulator,
    F: FnOnce(&PipelineConfig) -> Result<S, PipelineError>,
{
    let mut stage = Stage::Load;
    execute(config, init, &mut stage).inspect_err(|e| {
        error!("Pipeline aborted during {stage}: {e}");
    })
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!("{stage} -> {next}");
    *stage = next;
}

fn execute<S, F>(
    config: &PipelineConfig,
    init: F,
    stage: &mut Stage,
) -> Result<PipelineOutcome, PipelineError>
where
    S: Simulator,
    F: FnOnce(&PipelineConfig) -> Result<S, PipelineError>,
{
    let (generation_time, incubation_period) =
        load_distributions(&config.data_dir, config.horizon)?;

    advance(stage, Stage::GatewayInit);
    let simulator = init(config)?;

    advance(stage, Stage::Simulate);
    run_simulation(
        &simulator,
        &config.results_dir,
        &generation_time,
        &incubation_period,
    )?;
    info!("Time evolution file: {}", config.time_evolution_file.display());

    advance(stage, Stage::Read);
    let table = read_simulation_data(&config.time_evolution_file)?;

    advance(stage, Stage::Plot);
    let plot = render_table(&table, &config.plot)?;

    advance(stage, Stage::Done);
    Ok(PipelineOutcome {
        table_rows: table.len(),
        plot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{Distribution, GENERATION_TIME_FILE, INCUBATION_PERIOD_FILE};
    use crate::plotting::PlotOptions;
    use std::cell::Cell;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::{tempdir, TempDir};

    fn config_in(dir: &Path, values: usize) -> PipelineConfig {
        let data_dir = dir.join("data");
        fs::create_dir_all(&data_dir).unwrap();
        let contents = "0.05\n".repeat(values);
        fs::write(data_dir.join(GENERATION_TIME_FILE), &contents).unwrap();
        fs::write(data_dir.join(INCUBATION_PERIOD_FILE), &contents).unwrap();

        let results_dir = dir.join("results");
        PipelineConfig {
            data_dir,
            library_path: dir.join("lib").join("libepidemic.so"),
            time_evolution_file: results_dir.join("time_evolution.dat"),
            plot: PlotOptions {
                output_path: results_dir.join("simulation_plot.png"),
                ..PlotOptions::default()
            },
            results_dir,
            ..PipelineConfig::default()
        }
    }

    fn canned_simulator(
        output: PathBuf,
    ) -> impl Fn(&Distribution, &Distribution) -> Result<(), PipelineError> {
        move |_: &Distribution, _: &Distribution| {
            fs::write(
                &output,
                "# T D R I Q S\n0 0.0 0.0 0.01 0.0 0.99\n1 0.0 0.0 0.02 0.0 0.98\n",
            )?;
            Ok(())
        }
    }

    fn setup() -> (TempDir, PipelineConfig) {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path(), 21);
        (dir, config)
    }

    #[test]
    fn runs_every_stage() {
        let (_dir, config) = setup();
        let outcome = run_pipeline_with(&config, |config| {
            Ok(canned_simulator(config.time_evolution_file.clone()))
        })
        .unwrap();

        assert_eq!(outcome.table_rows, 2);
        assert_eq!(outcome.plot.path, config.plot.output_path);
        assert!(config.plot.output_path.is_file());
    }

    #[test]
    fn length_mismatch_stops_before_the_gateway() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path(), 19);
        let initialized = Cell::new(false);

        let result = run_pipeline_with(&config, |config| {
            initialized.set(true);
            Ok(canned_simulator(config.time_evolution_file.clone()))
        });
        assert!(matches!(
            result,
            Err(PipelineError::InvalidDistributionLength {
                expected: 21,
                generation_time: 19,
                incubation_period: 19,
            })
        ));
        assert!(!initialized.get());
    }

    #[test]
    fn missing_library_aborts_the_run() {
        let (_dir, config) = setup();
        let result = run_pipeline(&config);

        assert!(matches!(result, Err(PipelineError::NativeBinding(_))));
        assert!(!config.results_dir.exists());
    }

    #[test]
    fn simulator_that_writes_nothing_fails_at_read() {
        let (_dir, config) = setup();
        let result = run_pipeline_with(&config, |_| {
            Ok(|_: &Distribution, _: &Distribution| -> Result<(), PipelineError> { Ok(()) })
        });

        assert!(matches!(result, Err(PipelineError::MissingOutputFile(_))));
        assert!(config.results_dir.is_dir());
        assert!(!config.plot.output_path.exists());
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::GatewayInit.to_string(), "GATEWAY_INIT");
        assert_eq!(Stage::Done.to_string(), "DONE");
    }
}
