//! # Response Assembly
//!
//! Handlers produce a [`PartialResult`]; the [`Assembler`] turns it into the
//! public [`AnswerResponse`] by rendering the requested chart.
//!
//! ## Wire Shape
//!
//! ```text
//! {
//!   "headline": "...",
//!   "kpis":     { "label": value, ... } | null,
//!   "table":    [ { "column": value, ... }, ... ] | null,
//!   "chart":    "/tmp/ask360-charts/trend-<uuid>.png" | null,
//!   "intent":   "trend",
//!   "details":  { data_sources, time_range, regions, filters, sql } | null
//! }
//! ```
//!
//! Field order is the struct order. KPI and row maps are
//! `serde_json::Map`s built with `preserve_order`, so they serialize in the
//! order the handler inserted them.
//!
//! ## Chart Degradation
//!
//! A chart that fails to render never fails the answer: the failure is
//! logged, `chart` stays `null` and the headline gains
//! [`CHART_UNAVAILABLE_NOTE`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::chart::{ChartRenderer, ChartRequest};
use crate::nlu::Intent;

/// Label → value map shown as KPI cards.
pub type Kpis = Map<String, Value>;
/// Column → value map, one per table row.
pub type Row = Map<String, Value>;

/// Suffix appended to the headline when the chart could not be rendered.
pub const CHART_UNAVAILABLE_NOTE: &str = " (chart unavailable)";

/// How an answer was computed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryDetails {
    pub data_sources: Vec<String>,
    pub time_range: String,
    pub regions: Vec<String>,
    pub filters: Vec<String>,
    pub sql: String,
}

/// Final answer returned to every adapter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub headline: String,
    pub kpis: Option<Kpis>,
    pub table: Option<Vec<Row>>,
    /// Path of the rendered PNG.
    pub chart: Option<String>,
    pub intent: Intent,
    pub details: Option<QueryDetails>,
}

impl AnswerResponse {
    /// File name of the chart, for building a URL under `/charts/`.
    pub fn chart_file_name(&self) -> Option<&str> {
        let chart = self.chart.as_deref()?;
        Path::new(chart).file_name()?.to_str()
    }
}

/// Handler output before chart rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct PartialResult {
    pub intent: Intent,
    pub headline: String,
    pub kpis: Option<Kpis>,
    pub table: Option<Vec<Row>>,
    pub chart: Option<ChartRequest>,
    pub details: Option<QueryDetails>,
}

impl PartialResult {
    /// A result made of a headline and nothing else.
    pub fn headline_only(intent: Intent, headline: impl Into<String>) -> Self {
        Self {
            intent,
            headline: headline.into(),
            kpis: None,
            table: None,
            chart: None,
            details: None,
        }
    }
}

/// Renders charts and builds the final response.
#[derive(Clone, Debug)]
pub struct Assembler {
    renderer: ChartRenderer,
}

impl Assembler {
    pub fn new(chart_dir: impl Into<PathBuf>) -> Self {
        Self {
            renderer: ChartRenderer::new(chart_dir),
        }
    }

    pub fn chart_dir(&self) -> &Path {
        self.renderer.output_dir()
    }

    /// Builds the response. Never fails.
    pub fn assemble(&self, partial: PartialResult) -> AnswerResponse {
        let PartialResult {
            intent,
            mut headline,
            kpis,
            table,
            chart,
            details,
        } = partial;

        let chart = chart.and_then(|request| match self.renderer.render(&request) {
            Ok(path) => Some(path.to_string_lossy().into_owned()),
            Err(e) => {
                warn!(error = %e, chart = request.name, "chart rendering failed");
                headline.push_str(CHART_UNAVAILABLE_NOTE);
                None
            }
        });

        AnswerResponse {
            headline,
            kpis,
            table,
            chart,
            intent,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn partial(chart: Option<ChartRequest>) -> PartialResult {
        let mut kpis = Kpis::new();
        kpis.insert("Start".into(), json!("$1.00M"));
        kpis.insert("End".into(), json!("$1.20M"));
        PartialResult {
            kpis: Some(kpis),
            chart,
            ..PartialResult::headline_only(Intent::Trend, "Revenue rose")
        }
    }

    #[test]
    fn chart_path_is_filled_in() {
        let dir = tempfile::tempdir().unwrap();
        let response = Assembler::new(dir.path())
            .assemble(partial(Some(ChartRequest::line("trend", vec![1.0, 2.0]))));
        let chart = response.chart.as_deref().unwrap();
        assert!(Path::new(chart).exists());
        assert!(response.chart_file_name().unwrap().starts_with("trend-"));
        assert_eq!(response.headline, "Revenue rose");
    }

    #[test]
    fn no_chart_request_means_null_chart() {
        let dir = tempfile::tempdir().unwrap();
        let response = Assembler::new(dir.path()).assemble(partial(None));
        assert!(response.chart.is_none());
        assert_eq!(response.headline, "Revenue rose");
    }

    #[test]
    fn render_failure_degrades() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let response = Assembler::new(file.path().join("charts"))
            .assemble(partial(Some(ChartRequest::line("trend", vec![1.0, 2.0]))));
        assert!(response.chart.is_none());
        assert_eq!(response.headline, "Revenue rose (chart unavailable)");
        assert!(response.kpis.is_some());
    }

    #[test]
    fn json_field_and_kpi_order_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let response = Assembler::new(dir.path()).assemble(partial(None));
        let value = serde_json::to_value(&response).unwrap();
        let fields: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(fields, ["headline", "kpis", "table", "chart", "intent", "details"]);
        let kpis: Vec<&str> = value["kpis"].as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(kpis, ["Start", "End"]);
        assert_eq!(value["intent"], "trend");
        assert!(value["table"].is_null());
    }
}
