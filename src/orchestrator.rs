//! # Orchestrator: Question In, Answer Out
//!
//! [`Ask360`] is the engine behind [`crate::answer`]. It owns the analyzed
//! dataset and runs every question through the same three stages:
//!
//! ```text
//! question text
//!   │
//!   ├── 1. NLU          normalize → classify intent → extract parameters
//!   │
//!   ├── 2. HANDLER      intent-specific aggregation over the dataset
//!   │
//!   └── 3. ASSEMBLER    chart rendering → AnswerResponse
//! ```
//!
//! ## Concurrency
//!
//! Every field is read-only after [`Ask360::new`], so the engine is
//! `Send + Sync` and one instance serves all adapters and requests without
//! locking. The only side effect of an answer is the chart file, whose name
//! is unique per render.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::settings::Settings;
use crate::data::{generate_dataset, Dataset};
use crate::handlers;
use crate::nlu::{Intent, NluPipeline};
use crate::response::{AnswerResponse, Assembler};

/// Question-answering engine.
pub struct Ask360 {
    nlu: NluPipeline,
    dataset: Dataset,
    assembler: Assembler,
}

impl Ask360 {
    /// Generates the dataset and prepares the pipeline.
    pub fn new(settings: &Settings) -> Self {
        let started = Instant::now();
        let dataset = generate_dataset(Some(settings.seed));
        info!(
            seed = settings.seed,
            records = dataset.len(),
            chart_dir = %settings.chart_dir.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Ask360 engine ready"
        );
        Self {
            nlu: NluPipeline::new(),
            dataset,
            assembler: Assembler::new(&settings.chart_dir),
        }
    }

    /// Intent only, without computing an answer.
    pub fn classify(&self, question: &str) -> Intent {
        self.nlu.classify(question)
    }

    /// Answers one question. Never fails: unrecognized text yields the
    /// [`Intent::Unknown`] answer and chart problems degrade the response.
    pub fn answer(&self, question: &str) -> AnswerResponse {
        let started = Instant::now();
        let analyzed = self.nlu.analyze(question);
        debug!(
            intent = ?analyzed.intent,
            params = ?analyzed.params,
            "question analyzed"
        );

        let partial = handlers::handle(analyzed.intent, &self.dataset, &analyzed);
        let response = self.assembler.assemble(partial);

        info!(
            intent = analyzed.intent.as_str(),
            chart = response.chart.is_some(),
            rows = response.table.as_ref().map_or(0, Vec::len),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "question answered"
        );
        response
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn chart_dir(&self) -> &Path {
        self.assembler.chart_dir()
    }
}
