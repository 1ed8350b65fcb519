//! Loads the two input distributions the epidemic kernel consumes: the generation time
//! distribution `G` and the incubation period distribution `P`.
//!
//! Each lives in a flat text file under the data directory, one or more whitespace-separated
//! values per line, no header. Both must hold exactly `horizon + 1` values, index `i` being the
//! mass for a delay of `i` time steps. The length check is the only data-integrity gate before
//! the native call; nothing is padded or truncated.

use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::error::PipelineError;

/// File holding the generation time distribution, relative to the data directory.
pub const GENERATION_TIME_FILE: &str = "time_generation.dat";
/// File holding the incubation period distribution, relative to the data directory.
pub const INCUBATION_PERIOD_FILE: &str = "incubation_period.dat";

/// An immutable sequence of nonnegative masses indexed by delay.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution(Vec<f64>);

impl Distribution {
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Distribution(values)
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f64>> for Distribution {
    fn from(values: Vec<f64>) -> Self {
        Distribution(values)
    }
}

/// Reads every numeric token in the file at `path` as one flat sequence. Text after `#` on a
/// line is a comment.
///
/// # Errors
///
/// Returns `PipelineError::IoError` if the file cannot be read and
/// `PipelineError::InvalidNumber` for the first token that does not parse.
pub fn read_distribution(path: &Path) -> Result<Distribution, PipelineError> {
    let contents = fs::read_to_string(path)?;
    let mut values = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let data = line.split('#').next().unwrap_or_default();
        for token in data.split_whitespace() {
            let value = token
                .parse::<f64>()
                .map_err(|_| PipelineError::InvalidNumber {
                    path: path.to_path_buf(),
                    line: index + 1,
                    token: token.to_string(),
                })?;
            values.push(value);
        }
    }

    if values.iter().any(|value| *value < 0.0) {
        warn!("{} contains negative values", path.display());
    }
    Ok(Distribution(values))
}

/// Loads `G` and `P` from `data_dir` and checks that both hold `horizon + 1` values.
///
/// # Errors
///
/// Returns `PipelineError::InvalidDistributionLength` with the expected length and both actual
/// lengths when either distribution has the wrong length, or any error from
/// [`read_distribution`].
pub fn load_distributions(
    data_dir: &Path,
    horizon: usize,
) -> Result<(Distribution, Distribution), PipelineError> {
    let generation_time = read_distribution(&data_dir.join(GENERATION_TIME_FILE))?;
    let incubation_period = read_distribution(&data_dir.join(INCUBATION_PERIOD_FILE))?;

    let expected = horizon + 1;
    if generation_time.len() != expected || incubation_period.len() != expected {
        return Err(PipelineError::InvalidDistributionLength {
            expected,
            generation_time: generation_time.len(),
            incubation_period: incubation_period.len(),
        });
    }
    info!("Distributions loaded successfully.");
    Ok((generation_time, incubation_period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;
    use tempfile::tempdir;

    fn write_values(dir: &Path, file: &str, count: usize) {
        let mut contents = String::new();
        for i in 0..count {
            writeln!(contents, "{}", 1.0 / (i + 1) as f64).unwrap();
        }
        fs::write(dir.join(file), contents).unwrap();
    }

    #[test]
    fn loads_distributions_matching_the_horizon() {
        let dir = tempdir().unwrap();
        write_values(dir.path(), GENERATION_TIME_FILE, 21);
        write_values(dir.path(), INCUBATION_PERIOD_FILE, 21);

        let (g, p) = load_distributions(dir.path(), 20).unwrap();
        assert_eq!(g.len(), 21);
        assert_eq!(p.len(), 21);
        assert_eq!(g.values()[0], 1.0);
        assert_eq!(p.values()[1], 0.5);
    }

    #[test]
    fn short_generation_time_is_rejected() {
        let dir = tempdir().unwrap();
        write_values(dir.path(), GENERATION_TIME_FILE, 19);
        write_values(dir.path(), INCUBATION_PERIOD_FILE, 21);

        match load_distributions(dir.path(), 20) {
            Err(PipelineError::InvalidDistributionLength {
                expected,
                generation_time,
                incubation_period,
            }) => {
                assert_eq!(expected, 21);
                assert_eq!(generation_time, 19);
                assert_eq!(incubation_period, 21);
            }
            other => panic!("expected a length mismatch, got {other:?}"),
        }
    }

    #[test]
    fn long_incubation_period_is_rejected() {
        let dir = tempdir().unwrap();
        write_values(dir.path(), GENERATION_TIME_FILE, 21);
        write_values(dir.path(), INCUBATION_PERIOD_FILE, 22);

        let result = load_distributions(dir.path(), 20);
        assert!(matches!(
            result,
            Err(PipelineError::InvalidDistributionLength {
                expected: 21,
                generation_time: 21,
                incubation_period: 22,
            })
        ));
    }

    #[test]
    fn length_gate_holds_for_every_horizon() {
        let dir = tempdir().unwrap();
        for horizon in 0..6 {
            for count in 0..8 {
                write_values(dir.path(), GENERATION_TIME_FILE, count);
                write_values(dir.path(), INCUBATION_PERIOD_FILE, count);
                let result = load_distributions(dir.path(), horizon);
                assert_eq!(result.is_ok(), count == horizon + 1);
            }
        }
    }

    #[test]
    fn values_may_share_lines_and_carry_comments() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mixed.dat");
        fs::write(&path, "# masses\n0.1 0.2\n\n  0.3\t0.4 # tail\n").unwrap();

        let distribution = read_distribution(&path).unwrap();
        assert_eq!(distribution.values(), &[0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn scientific_notation_is_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sci.dat");
        fs::write(&path, "1.0E-02\n2.5e-1\n").unwrap();

        let distribution = read_distribution(&path).unwrap();
        assert_eq!(distribution.values(), &[0.01, 0.25]);
    }

    #[test]
    fn non_numeric_token_reports_its_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.dat");
        fs::write(&path, "0.1\n0.2\nabc\n").unwrap();

        match read_distribution(&path) {
            Err(PipelineError::InvalidNumber { line, token, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(token, "abc");
            }
            other => panic!("expected an invalid number, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let result = load_distributions(dir.path(), 20);
        assert!(matches!(result, Err(PipelineError::IoError(_))));
    }
}
