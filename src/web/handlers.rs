//! # HTTP Handlers
//!
//! Each public function is an axum handler mapped in
//! [`super::create_router()`]. Answering is CPU-bound (aggregation plus PNG
//! encoding), so it runs on tokio's blocking pool.
//!
//! | Handler | Method | Returns |
//! |---------|--------|---------|
//! | `index` | GET | Full HTML page |
//! | `chat` | POST | HTMX fragment |
//! | `ask` | POST | JSON `AnswerResponse`, unmodified |
//! | `health` | GET | JSON status |

use std::time::Instant;

use axum::http::StatusCode;
use axum::response::Html;
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use super::templates;
use crate::metrics::collect_metrics;
use crate::response::AnswerResponse;

/// Body of `POST /ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Chat form (`message` field).
#[derive(Debug, Deserialize)]
pub struct ChatForm {
    pub message: String,
}

fn markup_to_html(m: maud::Markup) -> Html<String> {
    Html(m.into_string())
}

/// Runs [`crate::answer`] off the async runtime.
async fn answer_blocking(question: String) -> Result<AnswerResponse, tokio::task::JoinError> {
    tokio::task::spawn_blocking(move || crate::answer(&question)).await
}

pub async fn index() -> Html<String> {
    markup_to_html(templates::full_page())
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /ask {"question": "..."}`.
pub async fn ask(
    Json(request): Json<AskRequest>,
) -> Result<Json<AnswerResponse>, (StatusCode, String)> {
    match answer_blocking(request.question).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::error!(error = %e, "answer task failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to answer the question".to_string(),
            ))
        }
    }
}

/// `POST /chat`: the user's message, the answer card and a metrics line.
pub async fn chat(Form(form): Form<ChatForm>) -> Html<String> {
    let question = form.message.trim().to_string();
    if question.is_empty() {
        return markup_to_html(maud::html! {});
    }

    let t0 = Instant::now();
    let result = answer_blocking(question.clone()).await;
    let elapsed_ms = t0.elapsed().as_millis() as u64;

    markup_to_html(match result {
        Ok(response) => {
            let metrics_line = collect_metrics(crate::chart_dir()).summary_line(elapsed_ms);
            templates::answer_fragment(&question, &response, &metrics_line)
        }
        Err(e) => {
            tracing::error!(error = %e, "answer task failed");
            templates::error_fragment(&question, "Something went wrong while answering.")
        }
    })
}
