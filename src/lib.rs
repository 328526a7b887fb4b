//! # Ask360: Natural-Language Q&A over Yogurt Sales
//!
//! Answers free-text questions about a synthetic yogurt sales dataset. Every
//! adapter (CLI, HTTP API, chat page) goes through one function,
//! [`answer`].
//!
//! ```text
//! answer(question)
//!   ├── nlu          classify intent, extract parameters
//!   ├── handlers     aggregate the in-memory dataset
//!   └── response     render the chart, build AnswerResponse
//! ```
//!
//! ## Modules
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`data`] | Sales records, dataset, seeded generator |
//! | [`nlu`] | Intent classification and parameter extraction |
//! | [`handlers`] | One computation per intent |
//! | [`chart`] | PNG rendering with `plotters` |
//! | [`response`] | `AnswerResponse` and the assembler |
//! | [`sql`] | SQL sketch shown in query details |
//! | [`orchestrator`] | The [`Ask360`] engine |
//! | [`settings`] | Layered configuration |
//! | [`metrics`] | Process snapshot for the chat page |
//! | [`web`] | axum router, handlers and templates |
//!
//! ## Example
//!
//! ```no_run
//! let response = ask360::answer("Which were the top 3 growth markets for yogurt last year?");
//! assert_eq!(response.intent, ask360::Intent::TopGrowthMarkets);
//! println!("{}", response.headline);
//! ```

pub mod chart;
pub mod data;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod nlu;
pub mod orchestrator;
pub mod response;
pub mod settings;
pub mod sql;
pub mod web;

use std::path::Path;
use std::sync::OnceLock;

pub use data::{generate_dataset, Dataset, SalesRecord};
pub use error::Error;
pub use nlu::Intent;
pub use orchestrator::Ask360;
pub use response::{AnswerResponse, QueryDetails};
pub use settings::Settings;

static ENGINE: OnceLock<Ask360> = OnceLock::new();

/// Installs the process-wide engine built from `settings`.
///
/// Returns `false` when an engine already exists (an earlier `init` or
/// [`answer`] call); the existing one is kept.
pub fn init(settings: &Settings) -> bool {
    let mut installed = false;
    ENGINE.get_or_init(|| {
        installed = true;
        Ask360::new(settings)
    });
    if !installed {
        tracing::warn!("Ask360 engine already initialized, settings ignored");
    }
    installed
}

/// The process-wide engine, built from default settings on first use.
fn engine() -> &'static Ask360 {
    ENGINE.get_or_init(|| Ask360::new(&Settings::default()))
}

/// Answers one question. Never panics on user input: unrecognized text gets
/// the [`Intent::Unknown`] answer.
pub fn answer(question: &str) -> AnswerResponse {
    engine().answer(question)
}

/// Intent of a question, without computing an answer.
pub fn classify(question: &str) -> Intent {
    engine().classify(question)
}

/// Directory the process-wide engine writes charts to.
pub fn chart_dir() -> &'static Path {
    engine().chart_dir()
}
