//! Orchestrates a compartmental (SIQRD) epidemic simulation.
//!
//! The epidemic model itself is a pre-built native kernel that this crate only calls. What the
//! crate owns is everything around that call:
//! * Loading the generation time and incubation period distributions the kernel consumes, and
//!   refusing to call it unless both have exactly `horizon + 1` values.
//! * Binding the kernel's single exported routine and invoking it. The kernel communicates only
//!   by writing a time evolution table to disk.
//! * Reading that table (columns `T D R I Q S`, in that order) back into memory.
//! * Plotting a chosen subset of the compartments against time into a PNG image.
//!
//! The stages run strictly in sequence, see [`pipeline`]. Each stage is also usable on its own,
//! and the kernel sits behind the [`simulation::Simulator`] trait so the whole pipeline can run
//! against a stub.
pub mod config;
pub mod distributions;
pub mod error;
pub mod log;
pub mod pipeline;
pub mod plotting;
pub mod prelude;
pub mod runner;
pub mod simulation;
pub mod time_evolution;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use crate::log::{debug, error, info, trace, warn};
