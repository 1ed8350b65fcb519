//! A small discrete-time SIQRD model exported under the native kernel's calling contract:
//!
//! ```c
//! void simulate_and_write(const double *g, const double *p);
//! ```
//!
//! Both buffers hold `NT + 1` values. The routine writes `results/time_evolution.dat`, relative
//! to the working directory, with one row per time step in the column order `T D R I Q S`.
//!
//! New infections follow a renewal equation driven by the generation time distribution `g`.
//! Infected people leave `I` when their incubation period (distribution `p`) ends; a fixed
//! fraction goes into quarantine, the rest is removed. Removed and released people are split
//! between recovered and deceased.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

/// Number of simulated time steps.
pub const NT: usize = 20;
/// Where [`simulate_and_write`] puts its table.
pub const OUTPUT_PATH: &str = "results/time_evolution.dat";

const INITIAL_INFECTED: f64 = 0.01;
const REPRODUCTION_NUMBER: f64 = 2.5;
const QUARANTINED_FRACTION: f64 = 0.4;
const QUARANTINE_RELEASE_RATE: f64 = 0.2;
const FATALITY: f64 = 0.02;

/// Population fractions at one time step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct State {
    pub s: f64,
    pub i: f64,
    pub q: f64,
    pub r: f64,
    pub d: f64,
}

impl State {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.s + self.i + self.q + self.r + self.d
    }
}

/// Runs the model for `g.len() - 1` steps and returns the state at every step, starting at `t = 0`.
#[must_use]
pub fn simulate(g: &[f64], p: &[f64]) -> Vec<State> {
    let steps = g.len().min(p.len());
    let mut state = State {
        s: 1.0 - INITIAL_INFECTED,
        i: INITIAL_INFECTED,
        q: 0.0,
        r: 0.0,
        d: 0.0,
    };
    let mut incidence = vec![0.0; steps];
    let mut states = Vec::with_capacity(steps);
    if steps == 0 {
        return states;
    }
    incidence[0] = INITIAL_INFECTED;
    states.push(state);

    for t in 1..steps {
        let convolve = |kernel: &[f64]| -> f64 {
            (1..=t).map(|k| kernel[k] * incidence[t - k]).sum()
        };
        let infected = (REPRODUCTION_NUMBER * state.s * convolve(g)).min(state.s);
        let onset = convolve(p).min(state.i + infected);
        let quarantined = QUARANTINED_FRACTION * onset;
        let released = QUARANTINE_RELEASE_RATE * state.q;
        let removed = onset - quarantined + released;

        state.s -= infected;
        state.i += infected - onset;
        state.q += quarantined - released;
        state.r += (1.0 - FATALITY) * removed;
        state.d += FATALITY * removed;

        incidence[t] = infected;
        states.push(state);
    }
    states
}

/// Writes `states` as a time evolution table.
///
/// # Errors
///
/// Returns any error creating the parent directory or writing the file.
pub fn write_table(path: &Path, states: &[State]) -> io::Result<()> {
    let mut contents = String::from("#    T               D               R               I               Q               S\n");
    for (t, state) in states.iter().enumerate() {
        // Writing to a `String` cannot fail.
        let _ = writeln!(
            contents,
            "{t:6} {:15.8E} {:15.8E} {:15.8E} {:15.8E} {:15.8E}",
            state.d, state.r, state.i, state.q, state.s
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

/// # Safety
///
/// `g` and `p` must each point to `NT + 1` initialized `f64` values.
#[no_mangle]
pub unsafe extern "C" fn simulate_and_write(g: *const f64, p: *const f64) {
    // SAFETY: guaranteed by the caller.
    let (g, p) = unsafe {
        (
            std::slice::from_raw_parts(g, NT + 1),
            std::slice::from_raw_parts(p, NT + 1),
        )
    };
    let states = simulate(g, p);
    if let Err(e) = write_table(Path::new(OUTPUT_PATH), &states) {
        eprintln!("simulate_and_write: could not write {OUTPUT_PATH}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn uniform(len: usize) -> Vec<f64> {
        let mut values = vec![1.0 / (len - 1) as f64; len];
        values[0] = 0.0;
        values
    }

    #[test]
    fn population_is_conserved() {
        let states = simulate(&uniform(NT + 1), &uniform(NT + 1));
        assert_eq!(states.len(), NT + 1);
        for state in &states {
            assert_approx_eq!(state.total(), 1.0);
            assert!(state.s >= 0.0 && state.i >= -1e-12 && state.q >= 0.0);
        }
    }

    #[test]
    fn susceptibles_never_grow() {
        let states = simulate(&uniform(NT + 1), &uniform(NT + 1));
        for pair in states.windows(2) {
            assert!(pair[1].s <= pair[0].s);
        }
        assert!(states[NT].s < states[0].s);
    }

    #[test]
    fn zero_generation_time_means_no_new_infections() {
        let states = simulate(&vec![0.0; NT + 1], &uniform(NT + 1));
        for state in &states {
            assert_eq!(state.s, 1.0 - INITIAL_INFECTED);
        }
    }

    #[test]
    fn table_has_one_row_per_step() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("time_evolution.dat");
        let states = simulate(&uniform(NT + 1), &uniform(NT + 1));
        write_table(&path, &states).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let rows: Vec<&str> = contents.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(rows.len(), NT + 1);
        assert_eq!(rows[0].split_whitespace().count(), 6);
    }
}
