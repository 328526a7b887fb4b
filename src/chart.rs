//! # Chart Rendering
//!
//! Turns a [`ChartRequest`] produced by a handler into a PNG file on disk.
//!
//! ## File Naming
//!
//! Every render writes `<output_dir>/<name>-<uuid v4>.png`. The random suffix
//! keeps concurrent requests for the same chart from overwriting each other.
//!
//! ## Drawing
//!
//! Charts are drawn with the `plotters` bitmap backend without any font
//! support, so they carry no text: guide lines, the series and, for bar
//! charts, a zero baseline. Labels live in the answer's table.
//!
//! | Kind | Used by |
//! |------|---------|
//! | [`ChartKind::Line`] | trend |
//! | [`ChartKind::Bar`] | growth markets, occasions, channel growth |

use std::path::{Path, PathBuf};

use plotters::prelude::*;
use uuid::Uuid;

const WIDTH: u32 = 900;
const HEIGHT: u32 = 480;
const MARGIN: u32 = 28;
const GUIDE_LINES: usize = 4;

const SERIES_COLOR: RGBColor = RGBColor(37, 99, 235);
const NEGATIVE_COLOR: RGBColor = RGBColor(220, 38, 38);
const GUIDE_COLOR: RGBColor = RGBColor(226, 232, 240);
const AXIS_COLOR: RGBColor = RGBColor(100, 116, 139);

/// Shape of the chart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
}

/// What a handler wants drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    /// File-name prefix, e.g. `"trend"`.
    pub name: &'static str,
    /// One value per point or bar, in display order.
    pub values: Vec<f64>,
}

impl ChartRequest {
    pub fn line(name: &'static str, values: Vec<f64>) -> Self {
        Self {
            kind: ChartKind::Line,
            name,
            values,
        }
    }

    pub fn bar(name: &'static str, values: Vec<f64>) -> Self {
        Self {
            kind: ChartKind::Bar,
            name,
            values,
        }
    }
}

/// Chart rendering failure. Never fatal for an answer.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("chart has no data points")]
    Empty,
    #[error("chart has a non-finite value")]
    NonFinite,
    #[error("chart output directory unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("chart backend failed: {0}")]
    Render(String),
}

fn render_error<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

/// Writes charts into one output directory.
#[derive(Clone, Debug)]
pub struct ChartRenderer {
    output_dir: PathBuf,
}

impl ChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Renders `request` to a new PNG file and returns its path.
    pub fn render(&self, request: &ChartRequest) -> Result<PathBuf, ChartError> {
        if request.values.is_empty() {
            return Err(ChartError::Empty);
        }
        if request.values.iter().any(|v| !v.is_finite()) {
            return Err(ChartError::NonFinite);
        }

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self
            .output_dir
            .join(format!("{}-{}.png", request.name, Uuid::new_v4()));

        match request.kind {
            ChartKind::Line => draw_line(&path, &request.values)?,
            ChartKind::Bar => draw_bars(&path, &request.values)?,
        }

        tracing::debug!(path = %path.display(), kind = ?request.kind, "chart rendered");
        Ok(path)
    }
}

/// Y range with 10% headroom; flat series get a unit band.
fn value_bounds(values: &[f64], include_zero: bool) -> (f64, f64) {
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    (lo - span * 0.1, hi + span * 0.1)
}

fn guide_levels(lo: f64, hi: f64) -> impl Iterator<Item = f64> {
    (0..=GUIDE_LINES).map(move |i| lo + (hi - lo) * i as f64 / GUIDE_LINES as f64)
}

fn draw_line(path: &Path, values: &[f64]) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;

    let x_max = (values.len().max(2) - 1) as f64;
    let (lo, hi) = value_bounds(values, false);
    let mut chart = ChartBuilder::on(&root)
        .margin(MARGIN)
        .build_cartesian_2d(0f64..x_max, lo..hi)
        .map_err(render_error)?;

    chart
        .draw_series(
            guide_levels(lo, hi)
                .map(|y| PathElement::new(vec![(0.0, y), (x_max, y)], GUIDE_COLOR.stroke_width(1))),
        )
        .map_err(render_error)?;

    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect();
    chart
        .draw_series(LineSeries::new(points.clone(), SERIES_COLOR.stroke_width(3)))
        .map_err(render_error)?;
    chart
        .draw_series(
            points
                .into_iter()
                .map(|p| Circle::new(p, 4, SERIES_COLOR.filled())),
        )
        .map_err(render_error)?;

    root.present().map_err(render_error)?;
    Ok(())
}

fn draw_bars(path: &Path, values: &[f64]) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;

    let x_max = values.len() as f64 - 0.5;
    let (lo, hi) = value_bounds(values, true);
    let mut chart = ChartBuilder::on(&root)
        .margin(MARGIN)
        .build_cartesian_2d(-0.5f64..x_max, lo..hi)
        .map_err(render_error)?;

    chart
        .draw_series(
            guide_levels(lo, hi)
                .map(|y| PathElement::new(vec![(-0.5, y), (x_max, y)], GUIDE_COLOR.stroke_width(1))),
        )
        .map_err(render_error)?;

    chart
        .draw_series(values.iter().enumerate().map(|(i, &v)| {
            let x = i as f64;
            let color = if v < 0.0 { NEGATIVE_COLOR } else { SERIES_COLOR };
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, v)], color.filled())
        }))
        .map_err(render_error)?;

    // zero baseline
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(-0.5, 0.0), (x_max, 0.0)],
            AXIS_COLOR.stroke_width(2),
        )))
        .map_err(render_error)?;

    root.present().map_err(render_error)?;
    Ok(())
}
