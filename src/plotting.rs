//! Renders a time evolution table as a line chart saved to a PNG file.
//!
//! Each requested compartment becomes one line against `T` on a single shared axis. The figure
//! is 12 × 7 inches at 300 DPI. Variables and colors are paired by position: when the lists have
//! different lengths the extra entries of the longer list are dropped (and a warning is logged).

use std::fmt::{self, Display};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{info, warn};
use plotters::prelude::*;
use plotters::style::Color as _;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::time_evolution::{read_simulation_data, Compartment, TimeEvolutionTable};

/// Figure size in inches (width, height).
pub const FIGURE_SIZE_INCHES: (u32, u32) = (12, 7);
/// Resolution of the saved image.
pub const DPI: u32 = 300;

const TITLE: &str = "Time evolution of the epidemic compartments";
const X_LABEL: &str = "time";
const Y_LABEL: &str = "proportion";

// Sizes in points, converted to pixels at `DPI`.
const TITLE_FONT_PT: f64 = 14.0;
const LABEL_FONT_PT: f64 = 12.0;
const TICK_FONT_PT: f64 = 10.0;
const LINE_WIDTH_PT: f64 = 1.5;

// Fraction of the data span added on each side of an axis.
const AXIS_MARGIN: f64 = 0.05;

fn pixels(points: f64) -> i32 {
    (points * f64::from(DPI) / 72.0).round() as i32
}

/// An RGB line color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

// Named colors follow the "tab10" palette.
const NAMED_COLORS: [(&str, Color); 11] = [
    ("blue", Color::rgb(31, 119, 180)),
    ("orange", Color::rgb(255, 127, 14)),
    ("green", Color::rgb(44, 160, 44)),
    ("red", Color::rgb(214, 39, 40)),
    ("purple", Color::rgb(148, 103, 189)),
    ("brown", Color::rgb(140, 86, 75)),
    ("pink", Color::rgb(227, 119, 194)),
    ("gray", Color::rgb(127, 127, 127)),
    ("olive", Color::rgb(188, 189, 34)),
    ("cyan", Color::rgb(23, 190, 207)),
    ("black", Color::rgb(0, 0, 0)),
];

impl Color {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl FromStr for Color {
    type Err = PipelineError;

    /// Accepts a palette name (`"blue"`, optionally written `"tab:blue"`) or `#rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let color = match s.strip_prefix('#') {
            Some(hex) => Color::parse_hex(hex),
            None => {
                let name = s.strip_prefix("tab:").unwrap_or(s);
                NAMED_COLORS
                    .iter()
                    .find(|(known, _)| *known == name)
                    .map(|(_, color)| *color)
            }
        };
        color.ok_or_else(|| PipelineError::UnknownColor(s.to_string()))
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl From<Color> for RGBColor {
    fn from(color: Color) -> Self {
        RGBColor(color.r, color.g, color.b)
    }
}

/// What to plot and where to save it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotOptions {
    pub output_path: PathBuf,
    pub variables: Vec<Compartment>,
    pub colors: Vec<Color>,
}

impl Default for PlotOptions {
    fn default() -> Self {
        PlotOptions {
            output_path: Path::new("results").join("simulation_plot.png"),
            variables: Compartment::ALL.to_vec(),
            // blue, orange, green, red, purple
            colors: NAMED_COLORS[..5].iter().map(|(_, color)| *color).collect(),
        }
    }
}

impl PlotOptions {
    /// Pairs each variable with the color at the same position. Stops at the end of the shorter
    /// list.
    #[must_use]
    pub fn series(&self) -> Vec<(Compartment, Color)> {
        if self.variables.len() != self.colors.len() {
            warn!(
                "{} variables but {} colors were given; plotting only the first {}",
                self.variables.len(),
                self.colors.len(),
                self.variables.len().min(self.colors.len())
            );
        }
        self.variables
            .iter()
            .copied()
            .zip(self.colors.iter().copied())
            .collect()
    }
}

/// The image written by [`plot_simulation`] and the compartments drawn in it.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedPlot {
    pub path: PathBuf,
    pub series: Vec<Compartment>,
}

/// Padded bounds of `values`, or `0..1` when there is nothing to bound.
fn axis_range(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let (min, max) = values
        .filter(|value| value.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
            (min.min(value), max.max(value))
        });
    if min > max {
        return 0.0..1.0;
    }
    let span = max - min;
    if span == 0.0 {
        return (min - 0.5)..(max + 0.5);
    }
    (min - span * AXIS_MARGIN)..(max + span * AXIS_MARGIN)
}

/// Draws `table` to `options.output_path`, replacing any existing file.
///
/// # Errors
///
/// Returns `PipelineError::IoError` if the output directory cannot be created and
/// `PipelineError::PlotError` if drawing or encoding the image fails.
pub fn render_table(
    table: &TimeEvolutionTable,
    options: &PlotOptions,
) -> Result<RenderedPlot, PipelineError> {
    let output_path = &options.output_path;
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let series = options.series();
    let times = table.times();
    let x_range = axis_range(times.iter().copied());
    let y_range = axis_range(
        series
            .iter()
            .flat_map(|(compartment, _)| table.series(*compartment)),
    );

    let size = (
        FIGURE_SIZE_INCHES.0 * DPI,
        FIGURE_SIZE_INCHES.1 * DPI,
    );
    let root = BitMapBackend::new(output_path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, ("sans-serif", pixels(TITLE_FONT_PT)))
        .margin(pixels(12.0))
        .x_label_area_size(pixels(36.0))
        .y_label_area_size(pixels(48.0))
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .label_style(("sans-serif", pixels(TICK_FONT_PT)))
        .axis_desc_style(("sans-serif", pixels(LABEL_FONT_PT)))
        .draw()?;

    let line_width = pixels(LINE_WIDTH_PT).unsigned_abs();
    for (compartment, color) in &series {
        let color = RGBColor::from(*color);
        let points = times
            .iter()
            .copied()
            .zip(table.series(*compartment))
            .collect::<Vec<(f64, f64)>>();
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(line_width)))?
            .label(compartment.name())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 60, y)], color.stroke_width(line_width))
            });
    }

    if !series.is_empty() {
        chart
            .configure_series_labels()
            .label_font(("sans-serif", pixels(TICK_FONT_PT)))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    drop(chart);
    drop(root);

    let saved = fs::canonicalize(output_path).unwrap_or_else(|_| output_path.clone());
    info!("Plot saved to: {}", saved.display());
    Ok(RenderedPlot {
        path: output_path.clone(),
        series: series.into_iter().map(|(compartment, _)| compartment).collect(),
    })
}

/// Reads the time evolution file at `path` and plots it according to `options`.
///
/// # Errors
///
/// Returns `PipelineError::MissingOutputFile` before any drawing if `path` does not exist, or
/// any error from reading the table or [`render_table`].
pub fn plot_simulation(path: &Path, options: &PlotOptions) -> Result<RenderedPlot, PipelineError> {
    let table = read_simulation_data(path)?;
    render_table(&table, options)
}
