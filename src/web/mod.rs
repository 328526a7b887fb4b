//! # Web Module: HTTP Adapter
//!
//! Thin axum layer over [`crate::answer`]: a JSON API, a chat page driven by
//! **HTMX** + **Maud**, and static serving of rendered charts.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Browser (HTMX)             curl / other clients         │
//! ├─────────────────────────────────────────────────────────┤
//! │ Axum Router (this module)                               │
//! │  ├── GET  /               → chat page                   │
//! │  ├── POST /chat           → HTMX fragment (answer card) │
//! │  ├── POST /ask            → JSON AnswerResponse         │
//! │  ├── GET  /health         → {"status":"ok"}             │
//! │  └── GET  /charts/{file}  → PNG (ServeDir)              │
//! ├─────────────────────────────────────────────────────────┤
//! │ CorsLayer: localhost origins only                       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`handlers`] | One axum handler per route |
//! | [`templates`] | Maud markup for the page and answer fragments |

pub mod handlers;
pub mod templates;

use std::path::Path;

use axum::http::{header, request::Parts, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;

/// Builds the router. Charts are served from `chart_dir`.
pub fn create_router(chart_dir: &Path) -> Router {
    Router::new()
        // ── pages ─────────────────────────────────────────────
        .route("/", get(handlers::index))
        .route("/chat", post(handlers::chat))
        // ── API ───────────────────────────────────────────────
        .route("/ask", post(handlers::ask))
        .route("/health", get(handlers::health))
        // ── charts ────────────────────────────────────────────
        .nest_service("/charts", ServeDir::new(chart_dir))
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            |origin: &HeaderValue, _request: &Parts| is_local_origin(origin),
        ))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// `true` for `http(s)://localhost`, `127.0.0.1` or `[::1]`, any port.
pub fn is_local_origin(origin: &HeaderValue) -> bool {
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    let Some(authority) = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
    else {
        return false;
    };
    ["localhost", "127.0.0.1", "[::1]"].iter().any(|host| {
        authority == *host
            || authority
                .strip_prefix(host)
                .is_some_and(|rest| rest.starts_with(':'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_origins() {
        for origin in [
            "http://localhost",
            "http://localhost:8501",
            "https://127.0.0.1:3000",
            "http://[::1]:5173",
        ] {
            assert!(is_local_origin(&HeaderValue::from_static(origin)), "{origin}");
        }
    }

    #[test]
    fn foreign_origins() {
        for origin in [
            "http://example.com",
            "http://localhost.evil.com",
            "localhost:3000",
            "null",
        ] {
            assert!(!is_local_origin(&HeaderValue::from_static(origin)), "{origin}");
        }
    }
}
