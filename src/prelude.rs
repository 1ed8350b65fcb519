pub use crate::config::PipelineConfig;
pub use crate::distributions::{load_distributions, Distribution};
pub use crate::error::PipelineError;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::pipeline::{run_pipeline, run_pipeline_with, PipelineOutcome, Stage};
pub use crate::plotting::{plot_simulation, Color, PlotOptions, RenderedPlot};
pub use crate::simulation::{run_simulation, NativeKernel, Simulator};
pub use crate::time_evolution::{read_simulation_data, Compartment, TimeEvolutionTable};
