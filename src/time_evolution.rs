//! Reads the time evolution table the epidemic kernel writes.
//!
//! The file has no header. Each data line holds six whitespace-separated numbers in the fixed
//! order `T D R I Q S`; text after `#` is a comment and blank lines are skipped. Columns are
//! mapped by position only, so the on-disk order must never be inferred from the data.

use std::fmt::{self, Display};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// The columns of the time evolution file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    T,
    D,
    R,
    I,
    Q,
    S,
}

impl Column {
    /// The positional order of the columns in the file.
    pub const FILE_ORDER: [Column; 6] = [
        Column::T,
        Column::D,
        Column::R,
        Column::I,
        Column::Q,
        Column::S,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Column::T => "T",
            Column::D => "D",
            Column::R => "R",
            Column::I => "I",
            Column::Q => "Q",
            Column::S => "S",
        }
    }
}

/// The epidemic compartments, i.e. every column except time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Compartment {
    /// Susceptible
    S,
    /// Infectious
    I,
    /// Quarantined
    Q,
    /// Recovered
    R,
    /// Deceased
    D,
}

impl Compartment {
    /// Canonical display order.
    pub const ALL: [Compartment; 5] = [
        Compartment::S,
        Compartment::I,
        Compartment::Q,
        Compartment::R,
        Compartment::D,
    ];

    #[must_use]
    pub fn column(self) -> Column {
        match self {
            Compartment::S => Column::S,
            Compartment::I => Column::I,
            Compartment::Q => Column::Q,
            Compartment::R => Column::R,
            Compartment::D => Column::D,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.column().name()
    }
}

impl Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Compartment {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Compartment::ALL
            .into_iter()
            .find(|compartment| compartment.name() == s)
            .ok_or_else(|| PipelineError::UnknownVariable(s.to_string()))
    }
}

impl TryFrom<String> for Compartment {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Compartment> for String {
    fn from(compartment: Compartment) -> Self {
        compartment.name().to_string()
    }
}

/// One row of the table: the state of every compartment at time `t`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeStep {
    pub t: f64,
    pub d: f64,
    pub r: f64,
    pub i: f64,
    pub q: f64,
    pub s: f64,
}

impl TimeStep {
    #[must_use]
    pub fn get(&self, column: Column) -> f64 {
        match column {
            Column::T => self.t,
            Column::D => self.d,
            Column::R => self.r,
            Column::I => self.i,
            Column::Q => self.q,
            Column::S => self.s,
        }
    }
}

/// The trajectory produced by one simulation run. Read-only once parsed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeEvolutionTable {
    rows: Vec<TimeStep>,
}

impl TimeEvolutionTable {
    #[must_use]
    pub fn rows(&self) -> &[TimeStep] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column labels in file order.
    #[must_use]
    pub fn column_names(&self) -> [&'static str; 6] {
        Column::FILE_ORDER.map(Column::name)
    }

    #[must_use]
    pub fn column(&self, column: Column) -> Vec<f64> {
        self.rows.iter().map(|row| row.get(column)).collect()
    }

    #[must_use]
    pub fn times(&self) -> Vec<f64> {
        self.column(Column::T)
    }

    #[must_use]
    pub fn series(&self, compartment: Compartment) -> Vec<f64> {
        self.column(compartment.column())
    }
}

/// Parses a time evolution table from any buffered reader.
///
/// # Errors
///
/// Returns `PipelineError::MalformedRow` for a data line without exactly six numeric fields,
/// or `PipelineError::IoError` if reading fails.
pub fn parse_time_evolution<R: BufRead>(reader: R) -> Result<TimeEvolutionTable, PipelineError> {
    let mut rows = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let data = line.split('#').next().unwrap_or_default();
        let fields: Vec<&str> = data.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != Column::FILE_ORDER.len() {
            return Err(PipelineError::MalformedRow {
                line: index + 1,
                reason: format!(
                    "expected {} fields, found {}",
                    Column::FILE_ORDER.len(),
                    fields.len()
                ),
            });
        }

        let mut values = [0.0; 6];
        for (value, field) in values.iter_mut().zip(&fields) {
            *value = field.parse().map_err(|_| PipelineError::MalformedRow {
                line: index + 1,
                reason: format!("`{field}` is not a number"),
            })?;
        }
        let [t, d, r, i, q, s] = values;
        rows.push(TimeStep { t, d, r, i, q, s });
    }
    Ok(TimeEvolutionTable { rows })
}

/// Reads the time evolution file at `path`.
///
/// # Errors
///
/// Returns `PipelineError::MissingOutputFile` if `path` is not a file, and otherwise any error
/// from [`parse_time_evolution`].
pub fn read_simulation_data(path: &Path) -> Result<TimeEvolutionTable, PipelineError> {
    if !path.is_file() {
        error!("Data file not found: {}", path.display());
        return Err(PipelineError::MissingOutputFile(path.to_path_buf()));
    }

    let table = parse_time_evolution(BufReader::new(File::open(path)?))?;
    info!("Data read successfully from {}", path.display());
    Ok(table)
}
