use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use mediscope_gateway::{
    backend::{mock::ScriptedBackend, InvocationOutcome},
    build_app,
    config::ServiceKind,
    models::InterpretResponse,
    pipeline::translate::{TranslationError, Translator},
    state::AppState,
};
use serde_json::Value;
use tower::util::ServiceExt;

struct EchoTranslator;

#[async_trait]
impl Translator for EchoTranslator {
    async fn translate(&self, text: &str, target: &str) -> Result<String, TranslationError> {
        Ok(format!("({target}) {text}"))
    }
}

fn app(backend: Arc<ScriptedBackend>) -> Router {
    build_app(
        ServiceKind::Interpreter,
        AppState::new_for_tests(backend, Arc::new(EchoTranslator)),
    )
}

fn json_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/interpret")
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .expect("request build")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

#[tokio::test]
async fn chat_answer_has_generic_greeting_and_model_text() {
    let backend = Arc::new(ScriptedBackend::replying("Drink water and rest."));
    let response = app(backend.clone())
        .oneshot(json_request(
            r#"{"username":"Patient","language":"english","type":"chat","query":"I have a headache"}"#,
        ))
        .await
        .expect("request execution");

    assert_eq!(response.status(), StatusCode::OK);
    let payload: InterpretResponse =
        serde_json::from_value(body_json(response).await).expect("interpret response shape");
    assert_eq!(payload.response, "👋 Hello there,\n\nDrink water and rest.");
    assert_eq!(backend.call_count().await, 1);
}

#[tokio::test]
async fn chat_without_query_is_bad_request() {
    let backend = Arc::new(ScriptedBackend::default());
    let response = app(backend.clone())
        .oneshot(json_request(r#"{"type":"chat"}"#))
        .await
        .expect("request execution");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = body_json(response).await;
    assert_eq!(payload["error"], "Missing 'query' for chat type");
    assert_eq!(backend.call_count().await, 0);
}

#[tokio::test]
async fn report_falls_back_to_second_model_and_translates() {
    let backend = Arc::new(ScriptedBackend::new([
        InvocationOutcome::HttpError {
            status: 500,
            body: "internal".to_owned(),
        },
        InvocationOutcome::Success("Hello! No fracture seen.".to_owned()),
    ]));
    let response = app(backend.clone())
        .oneshot(json_request(
            r#"{"username":"Ravi","language":"telugu","type":"report","predictions":"{\"fracture\":0.02}"}"#,
        ))
        .await
        .expect("request execution");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(payload["response"], "👋 Hello Ravi,\n\n(te) No fracture seen.");
    assert_eq!(
        backend.calls().await,
        vec!["gemini-flash-latest".to_owned(), "gemini-pro-latest".to_owned()]
    );
}

#[tokio::test]
async fn form_encoded_request_is_accepted() {
    let backend = Arc::new(ScriptedBackend::replying("Take rest."));
    let response = app(backend)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/interpret")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("username=Asha&type=chat&query=sore+throat"))
                .expect("request build"),
        )
        .await
        .expect("request execution");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(payload["response"], "👋 Hello Asha,\n\nTake rest.");
}

#[tokio::test]
async fn multipart_form_request_is_accepted() {
    const BOUNDARY: &str = "interpret-form-boundary";
    let mut body = String::new();
    for (name, value) in [("username", "Asha"), ("type", "chat"), ("query", "headache")] {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    let backend = Arc::new(ScriptedBackend::replying("Rest in a dark room."));
    let response = app(backend.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/interpret")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .expect("request build"),
        )
        .await
        .expect("request execution");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(payload["response"], "👋 Hello Asha,\n\nRest in a dark room.");
    assert_eq!(backend.call_count().await, 1);
}

#[tokio::test]
async fn json_suffix_content_type_is_read_as_json() {
    let backend = Arc::new(ScriptedBackend::replying("Sip warm fluids."));
    let response = app(backend)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/interpret")
                .header("content-type", "Application/Vnd.Mediscope+JSON")
                .body(Body::from(r#"{"type":"chat","query":"sore throat"}"#))
                .expect("request build"),
        )
        .await
        .expect("request execution");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(payload["response"], "👋 Hello there,\n\nSip warm fluids.");
}

#[tokio::test]
async fn quota_exhaustion_still_returns_ok() {
    let backend = Arc::new(ScriptedBackend::always(InvocationOutcome::RateLimited));
    let response = app(backend.clone())
        .oneshot(json_request(r#"{"predictions":{"normal":0.97}}"#))
        .await
        .expect("request execution");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    let text = payload["response"].as_str().expect("response string");
    assert!(text.starts_with("👋 Hello there,\n\n**[Simulated Analysis]**"));
    assert_eq!(backend.call_count().await, 1);
}

#[tokio::test]
async fn home_describes_usage_and_metrics_are_exposed() {
    let router = app(Arc::new(ScriptedBackend::default()));

    let home = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/")
                .body(Body::empty())
                .expect("request build"),
        )
        .await
        .expect("home request");
    assert_eq!(home.status(), StatusCode::OK);
    let payload = body_json(home).await;
    assert!(payload["usage"]["POST /interpret"]["fields"]["query"].is_string());

    router
        .clone()
        .oneshot(json_request(r#"{"type":"chat","query":"cough"}"#))
        .await
        .expect("interpret request");

    let metrics = router
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .expect("request build"),
        )
        .await
        .expect("metrics request");
    assert_eq!(metrics.status(), StatusCode::OK);
    let bytes = to_bytes(metrics.into_body(), 1024 * 1024)
        .await
        .expect("metrics body");
    let text = String::from_utf8(bytes.to_vec()).expect("metrics should be UTF-8");
    assert!(text.contains("mediscope_generation_results_total"));
    assert!(text.contains("path=\"/interpret\""));
}
