//! The boundary with the epidemic kernel.
//!
//! The kernel is a pre-built shared library exporting one routine,
//! `void simulate_and_write(const double *g, const double *p)`, which reads `horizon + 1` values
//! from each buffer and writes the time evolution table to a fixed path as a side effect. It
//! returns nothing, so completion is inferred from the call returning.
//!
//! [`Simulator`] is the seam the pipeline calls through. [`NativeKernel`] implements it over the
//! shared library; tests implement it with stubs that write a canned table instead.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use log::info;

use crate::distributions::Distribution;
use crate::error::PipelineError;

/// Runs one simulation for the given generation time and incubation period distributions.
pub trait Simulator {
    /// Blocks until the simulation has written its output.
    ///
    /// # Errors
    ///
    /// Implementations return their own failures unmodified.
    fn run(
        &self,
        generation_time: &Distribution,
        incubation_period: &Distribution,
    ) -> Result<(), PipelineError>;
}

impl<F> Simulator for F
where
    F: Fn(&Distribution, &Distribution) -> Result<(), PipelineError>,
{
    fn run(
        &self,
        generation_time: &Distribution,
        incubation_period: &Distribution,
    ) -> Result<(), PipelineError> {
        self(generation_time, incubation_period)
    }
}

type SimulateFn = unsafe extern "C" fn(*const f64, *const f64);

/// A loaded kernel library and its bound entry point.
///
/// The library stays loaded for as long as this value lives; `entry` points into it.
pub struct NativeKernel {
    entry: SimulateFn,
    buffer_len: usize,
    library_path: PathBuf,
    _library: Library,
}

impl NativeKernel {
    /// Loads the shared library at `library_path` and binds `entry_point`. The routine must have
    /// the signature `void (const double *, const double *)` and read `horizon + 1` values from
    /// each buffer; the C ABI carries no type information, so this cannot be checked here.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::NativeBinding` if the library cannot be loaded or does not export
    /// `entry_point`.
    pub fn init(
        library_path: &Path,
        entry_point: &str,
        horizon: usize,
    ) -> Result<Self, PipelineError> {
        // SAFETY: loading runs the library's initializers. The kernel is trusted to be a plain
        // numerical library without load-time side effects.
        let library = unsafe { Library::new(library_path)? };
        let entry = {
            // SAFETY: `SimulateFn` is the kernel's documented signature. The copied function
            // pointer is only called while `library` is alive, which `NativeKernel` guarantees.
            let symbol: Symbol<SimulateFn> = unsafe { library.get(entry_point.as_bytes())? };
            *symbol
        };
        info!("Simulation library loaded from {}", library_path.display());

        Ok(NativeKernel {
            entry,
            buffer_len: horizon + 1,
            library_path: library_path.to_path_buf(),
            _library: library,
        })
    }

    #[must_use]
    pub fn library_path(&self) -> &Path {
        &self.library_path
    }

    fn check_buffer(&self, distribution: &Distribution) -> Result<(), PipelineError> {
        if distribution.len() == self.buffer_len {
            Ok(())
        } else {
            Err(PipelineError::BufferLength {
                expected: self.buffer_len,
                found: distribution.len(),
            })
        }
    }
}

impl fmt::Debug for NativeKernel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NativeKernel")
            .field("library_path", &self.library_path)
            .field("buffer_len", &self.buffer_len)
            .finish_non_exhaustive()
    }
}

impl Simulator for NativeKernel {
    fn run(
        &self,
        generation_time: &Distribution,
        incubation_period: &Distribution,
    ) -> Result<(), PipelineError> {
        self.check_buffer(generation_time)?;
        self.check_buffer(incubation_period)?;
        // SAFETY: both buffers are contiguous and hold exactly the number of values the routine
        // reads. The routine does not write through them or keep them past the call.
        unsafe {
            (self.entry)(
                generation_time.values().as_ptr(),
                incubation_period.values().as_ptr(),
            );
        }
        Ok(())
    }
}

/// Creates `results_dir` if needed and runs `simulator`. Errors from the simulator are returned
/// as they are.
///
/// # Errors
///
/// Returns `PipelineError::IoError` if `results_dir` cannot be created, or whatever the
/// simulator returns.
pub fn run_simulation<S: Simulator + ?Sized>(
    simulator: &S,
    results_dir: &Path,
    generation_time: &Distribution,
    incubation_period: &Distribution,
) -> Result<(), PipelineError> {
    fs::create_dir_all(results_dir)?;
    info!("Starting simulation...");
    simulator.run(generation_time, incubation_period)?;
    info!("Simulation completed");
    Ok(())
}
