use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{ArgAction, Args, Command, FromArgMatches as _};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::log::{set_log_level, set_module_filters, LevelFilter};
use crate::pipeline::{run_pipeline, PipelineOutcome};

/// Default cli arguments for the siqrd runner
#[derive(Args, Debug, Default)]
pub struct BaseArgs {
    /// Optional path for a JSON config file overriding the default paths and plot settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Set the log level: a level (e.g. `debug`), `module=level` entries, or both,
    /// separated by commas
    #[arg(long, value_parser = LogSpec::from_str)]
    pub log_level: Option<LogSpec>,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// A parsed `--log-level` value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LogSpec {
    pub global: Option<LevelFilter>,
    pub modules: Vec<(String, LevelFilter)>,
}

impl FromStr for LogSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut spec = LogSpec::default();
        for entry in s.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            let parse_level = |level: &str| {
                LevelFilter::from_str(level.trim())
                    .map_err(|_| format!("`{level}` is not a log level"))
            };
            match entry.split_once('=') {
                Some((module, level)) => {
                    let level = parse_level(level)?;
                    spec.modules.push((module.trim().to_string(), level));
                }
                None => spec.global = Some(parse_level(entry)?),
            }
        }
        Ok(spec)
    }
}

fn create_siqrd_cli() -> Command {
    let cli = Command::new("siqrd")
        .about("Runs the SIQRD epidemic kernel on the input distributions and plots the result");
    BaseArgs::augment_args(cli)
}

fn configure_logging(args: &BaseArgs) {
    let verbosity = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let spec = args.log_level.clone().unwrap_or_default();
    set_log_level(spec.global.unwrap_or(verbosity));

    if !spec.modules.is_empty() {
        let filters: Vec<(&str, LevelFilter)> = spec
            .modules
            .iter()
            .map(|(module, level)| (module.as_str(), *level))
            .collect();
        set_module_filters(&filters);
        for (module, level) in &filters {
            println!("Logging enabled for {module} at level {level}");
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, PipelineError> {
    match path {
        Some(path) => {
            println!("Loading pipeline configuration from: {}", path.display());
            PipelineConfig::from_json_file(path)
        }
        None => Ok(PipelineConfig::default()),
    }
}

/// Parses the command line, sets up logging and runs the pipeline.
///
/// # Errors
///
/// Returns the first error the configuration or any pipeline stage produces.
pub fn run_with_args() -> Result<PipelineOutcome, PipelineError> {
    let matches = create_siqrd_cli().get_matches();
    let args = match BaseArgs::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };
    run_with_args_internal(&args)
}

fn run_with_args_internal(args: &BaseArgs) -> Result<PipelineOutcome, PipelineError> {
    configure_logging(args);
    let config = load_config(args.config.as_deref())?;
    run_pipeline(&config)
}
