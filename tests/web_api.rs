//! HTTP adapter driven in-process with `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use ask360::{AnswerResponse, Intent};

fn app() -> Router {
    ask360::web::create_router(ask360::chart_dir())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn ask_returns_the_same_answer_as_the_library() {
    let question = "Which were the top 3 growth markets for yogurt last year?";
    let response = app()
        .oneshot(
            Request::post("/ask")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::json!({ "question": question }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["headline", "kpis", "table", "chart", "intent", "details"]);

    let over_http: AnswerResponse = serde_json::from_value(json).unwrap();
    let direct = ask360::answer(question);
    assert_eq!(over_http.intent, Intent::TopGrowthMarkets);
    assert_eq!(over_http.headline, direct.headline);
    assert_eq!(over_http.table, direct.table);
}

#[tokio::test]
async fn ask_rejects_a_body_without_question() {
    let response = app()
        .oneshot(
            Request::post("/ask")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"text":"hello"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn chat_returns_an_answer_fragment() {
    let response = app()
        .oneshot(
            Request::post("/chat")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("message=asdkjasd"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("asdkjasd"));
    assert!(html.contains("recognize"));
}

#[tokio::test]
async fn cors_allows_localhost_only() {
    let preflight = |origin: &'static str| {
        Request::builder()
            .method("OPTIONS")
            .uri("/ask")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let local = app().oneshot(preflight("http://localhost:8501")).await.unwrap();
    assert_eq!(
        local.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:8501"
    );

    let foreign = app().oneshot(preflight("http://example.com")).await.unwrap();
    assert!(foreign
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn unknown_chart_is_not_found() {
    let response = app()
        .oneshot(
            Request::get("/charts/missing.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
