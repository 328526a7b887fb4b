//! # Maud Templates
//!
//! Server-side HTML for the chat page. The page posts questions with HTMX
//! and appends the returned fragment to the conversation.
//!
//! | Function | Kind | Description |
//! |----------|------|-------------|
//! | [`full_page()`] | Full page | Chat, sample questions, input |
//! | [`answer_fragment()`] | HTMX fragment | Question + answer card + metrics |
//! | [`error_fragment()`] | HTMX fragment | Question + error message |
//!
//! ## Answer Card
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ [Trend]  Yogurt revenue rose +12.3% from ...  │
//! │ ┌────────┐ ┌────────┐ ┌────────┐              │
//! │ │ Start  │ │ End    │ │ Change │   KPI cards  │
//! │ └────────┘ └────────┘ └────────┘              │
//! │ [Chart] [Table] [Raw JSON]          tabs      │
//! │ ▸ Query details (sources, range, SQL)         │
//! └───────────────────────────────────────────────┘
//! ```

use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde_json::Value;
use uuid::Uuid;

use crate::response::{AnswerResponse, Row};

/// Sample questions offered as one-click buttons.
pub const SAMPLE_QUESTIONS: &[&str] = &[
    "How is yogurt doing at FreshFoods? Show the last 12 months trend.",
    "Which were the top 3 growth markets for yogurt last year?",
    "Among 18–34 vs 35–54, who has higher repeat rate for yogurt?",
    "What are the top consumption occasions for shelf-stable yogurt?",
    "In e-commerce vs retail, which channel grew faster for multipack yogurt?",
];

const STYLE: &str = r#"
* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, sans-serif; background: #f1f5f9; color: #0f172a; }
.app-shell { max-width: 960px; margin: 0 auto; min-height: 100vh; display: flex; flex-direction: column; }
.nav-bar { display: flex; align-items: center; gap: .75rem; padding: 1rem; }
.nav-brand-icon { background: #2563eb; color: #fff; border-radius: 6px; padding: .2rem .45rem; font-weight: 700; }
.nav-brand-text { font-weight: 600; }
.chat-messages { flex: 1; overflow-y: auto; padding: 0 1rem 1rem; }
.message { margin: .75rem 0; padding: .75rem 1rem; border-radius: 10px; background: #fff; }
.user-message { background: #dbeafe; margin-left: 20%; }
.message-role { font-size: .75rem; color: #64748b; margin-bottom: .25rem; }
.intent-badge { display: inline-block; font-size: .7rem; background: #e2e8f0; border-radius: 999px; padding: .1rem .5rem; margin-right: .5rem; }
.headline { font-weight: 600; }
.kpis { display: flex; flex-wrap: wrap; gap: .5rem; margin: .75rem 0; }
.kpi { border: 1px solid #e2e8f0; border-radius: 8px; padding: .5rem .75rem; min-width: 120px; }
.kpi-label { font-size: .7rem; color: #64748b; }
.kpi-value { font-size: 1.1rem; font-weight: 600; }
.tabs button { border: 0; background: #e2e8f0; padding: .3rem .7rem; border-radius: 6px; cursor: pointer; }
.tabs button.active { background: #2563eb; color: #fff; }
.tab-panel { display: none; margin-top: .5rem; overflow-x: auto; }
.tab-panel.active { display: block; }
.tab-panel img { max-width: 100%; }
table { border-collapse: collapse; font-size: .85rem; }
th, td { border-bottom: 1px solid #e2e8f0; padding: .25rem .6rem; text-align: left; }
pre { background: #0f172a; color: #e2e8f0; padding: .75rem; border-radius: 8px; font-size: .75rem; overflow-x: auto; }
.details dt { font-weight: 600; font-size: .8rem; }
.details dd { margin: 0 0 .4rem; font-size: .8rem; }
.metrics-line { font-size: .7rem; color: #64748b; }
.error { background: #fee2e2; }
.samples { display: flex; flex-wrap: wrap; gap: .4rem; margin-top: .5rem; }
.samples button { border: 1px solid #cbd5e1; background: #fff; border-radius: 999px; padding: .25rem .7rem; cursor: pointer; font-size: .8rem; }
.chat-input-area { padding: 1rem; background: #fff; position: sticky; bottom: 0; }
#chat-form { display: flex; gap: .5rem; }
#chat-form input { flex: 1; padding: .6rem; border: 1px solid #cbd5e1; border-radius: 8px; }
#chat-form button { padding: .6rem 1rem; border: 0; border-radius: 8px; background: #2563eb; color: #fff; }
"#;

const SCRIPT: &str = r#"<script>
function showTab(button, panelId) {
  var card = button.closest('.answer-card');
  card.querySelectorAll('.tabs button').forEach(function(b) { b.classList.remove('active'); });
  card.querySelectorAll('.tab-panel').forEach(function(p) { p.classList.remove('active'); });
  button.classList.add('active');
  document.getElementById(panelId).classList.add('active');
}

function askSample(text) {
  var form = document.getElementById('chat-form');
  form.querySelector('input[name=message]').value = text;
  form.requestSubmit();
}

document.body.addEventListener('htmx:afterRequest', function(e) {
  if (e.detail.elt && e.detail.elt.id === 'chat-form') e.detail.elt.reset();
});

document.addEventListener('DOMContentLoaded', function() {
  var msgs = document.getElementById('chat-messages');
  new MutationObserver(function() { msgs.scrollTop = msgs.scrollHeight; })
    .observe(msgs, { childList: true, subtree: true });
});
</script>"#;

/// The chat page.
pub fn full_page() -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Ask360 | Yogurt Insights" }
                style { (PreEscaped(STYLE)) }
                script src="https://unpkg.com/htmx.org@2.0.4" {}
            }
            body {
                div class="app-shell" {
                    nav class="nav-bar" {
                        span class="nav-brand-icon" { "360" }
                        span class="nav-brand-text" { "Ask360" }
                    }

                    div id="chat-messages" class="chat-messages" {
                        div class="message welcome" {
                            div class="headline" { "Ask a question about yogurt sales." }
                            p {
                                "Trends, growth markets, age-segment repeat rates, "
                                "consumption occasions and channel growth are covered."
                            }
                            div class="samples" {
                                @for q in SAMPLE_QUESTIONS {
                                    button type="button" onclick=(format!("askSample({})", js_string(q))) {
                                        (q)
                                    }
                                }
                            }
                        }
                    }

                    div class="chat-input-area" {
                        form id="chat-form"
                            hx-post="/chat"
                            hx-target="#chat-messages"
                            hx-swap="beforeend" {
                            input type="text" name="message"
                                placeholder="Ask about yogurt performance..."
                                autocomplete="off"
                                autofocus;
                            button type="submit" { "Ask" }
                        }
                    }
                }
                (PreEscaped(SCRIPT))
            }
        }
    }
}

/// The question, the answer card and the metrics line.
pub fn answer_fragment(question: &str, response: &AnswerResponse, metrics_line: &str) -> Markup {
    let id = Uuid::new_v4().simple().to_string();
    let chart_panel = format!("chart-{id}");
    let table_panel = format!("table-{id}");
    let json_panel = format!("json-{id}");
    let raw_json = serde_json::to_string_pretty(response).unwrap_or_default();
    let has_chart = response.chart_file_name().is_some();

    html! {
        (user_message(question))
        div class="message answer-card" {
            div {
                span class="intent-badge" { (response.intent.label()) }
                span class="headline" { (response.headline) }
            }

            @if let Some(kpis) = &response.kpis {
                div class="kpis" {
                    @for (label, value) in kpis {
                        div class="kpi" {
                            div class="kpi-label" { (label) }
                            div class="kpi-value" { (value_text(value)) }
                        }
                    }
                }
            }

            @if response.table.is_some() || has_chart {
                div class="tabs" {
                    @if has_chart {
                        button type="button" class="active"
                            onclick=(format!("showTab(this, '{chart_panel}')")) { "Chart" }
                    }
                    @if response.table.is_some() {
                        button type="button" class=[(!has_chart).then_some("active")]
                            onclick=(format!("showTab(this, '{table_panel}')")) { "Table" }
                    }
                    button type="button"
                        onclick=(format!("showTab(this, '{json_panel}')")) { "Raw JSON" }
                }
                @if let Some(file) = response.chart_file_name() {
                    div id=(chart_panel) class="tab-panel active" {
                        img src=(format!("/charts/{file}")) alt=(response.headline);
                    }
                }
                @if let Some(rows) = &response.table {
                    div id=(table_panel) class=(if has_chart { "tab-panel" } else { "tab-panel active" }) {
                        (table(rows))
                    }
                }
                div id=(json_panel) class="tab-panel" {
                    pre { (raw_json) }
                }
            }

            @if let Some(details) = &response.details {
                details class="details" {
                    summary { "Query details" }
                    dl {
                        dt { "Data sources" }
                        dd { (details.data_sources.join(", ")) }
                        dt { "Time range" }
                        dd { (details.time_range) }
                        dt { "Regions" }
                        dd { (details.regions.join(", ")) }
                        @if !details.filters.is_empty() {
                            dt { "Filters" }
                            dd { (details.filters.join(", ")) }
                        }
                        dt { "SQL" }
                        dd { pre { (details.sql) } }
                    }
                }
            }
        }
        div class="message metrics" {
            div class="metrics-line" { (format!("\u{26a1} {metrics_line}")) }
        }
    }
}

/// The question and an error message.
pub fn error_fragment(question: &str, message: &str) -> Markup {
    html! {
        (user_message(question))
        div class="message error" {
            div class="message-role" { "Error" }
            div { (message) }
        }
    }
}

fn user_message(question: &str) -> Markup {
    html! {
        div class="message user-message" {
            div class="message-role" { "You" }
            div { (question) }
        }
    }
}

/// Columns come from the first row; every row of an answer shares them.
fn table(rows: &[Row]) -> Markup {
    let columns: Vec<&String> = rows.first().map(|r| r.keys().collect()).unwrap_or_default();
    html! {
        table {
            thead {
                tr { @for c in &columns { th { (c) } } }
            }
            tbody {
                @for row in rows {
                    tr {
                        @for c in &columns {
                            td { (row.get(c.as_str()).map(value_text).unwrap_or_default()) }
                        }
                    }
                }
            }
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Single-quoted JavaScript string literal, safe inside an HTML attribute.
fn js_string(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}
