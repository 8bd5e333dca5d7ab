use std::{collections::BTreeMap, time::Instant};

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    errors::AppError,
    extract::sanitize_filename,
    models::{FileDiagnostic, InterpretRequest, InterpretResponse, ParseResponse},
    state::AppState,
};

const NO_FILES: &str = "No files provided";

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(error) => AppError::Internal(format!("metrics render failed: {error}")).into_response(),
    }
}

pub async fn interpreter_home() -> Json<Value> {
    Json(json!({
        "message": "🩺 AI Health Interpreter is active and ready.",
        "usage": {
            "POST /interpret": {
                "fields": {
                    "username": "string (optional)",
                    "language": "english/telugu/hindi",
                    "type": "report/chat",
                    "predictions": "JSON (for report)",
                    "query": "string (for chat)"
                }
            }
        }
    }))
}

pub async fn lab_home() -> &'static str {
    "Lab Microservice is running"
}

pub async fn interpret(State(state): State<AppState>, request: Request) -> Response {
    let started = Instant::now();
    let response = match process_interpret(&state, request).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    };

    state.metrics.observe_request(
        "/interpret",
        "POST",
        response.status().as_u16(),
        started.elapsed(),
    );
    response
}

async fn process_interpret(state: &AppState, request: Request) -> Result<Response, AppError> {
    let payload = read_interpret_payload(request).await?;
    let generation = payload.into_generation().map_err(|message| {
        warn!(error = %message, "interpret request rejected");
        AppError::BadRequest(message)
    })?;

    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        mode = generation.mode.as_str(),
        language = generation.language.name(),
        content_chars = generation.content.len(),
        "interpret request accepted"
    );

    let response = state.responder.respond(&generation).await;
    info!(%request_id, "interpreter response generated");

    Ok(Json(InterpretResponse {
        response: response.to_string(),
    })
    .into_response())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadKind {
    Json,
    Multipart,
    Form,
}

/// `application/json` and any `application/*+json` count as JSON; multipart
/// form data is read field by field; everything else is treated as a
/// urlencoded form.
fn payload_kind(content_type: Option<&str>) -> PayloadKind {
    let essence = content_type
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
    {
        PayloadKind::Json
    } else if essence == "multipart/form-data" {
        PayloadKind::Multipart
    } else {
        PayloadKind::Form
    }
}

async fn read_interpret_payload(request: Request) -> Result<InterpretRequest, AppError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    match payload_kind(content_type) {
        PayloadKind::Json => {
            let body = Bytes::from_request(request, &())
                .await
                .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
            serde_json::from_slice(&body)
                .map_err(|error| AppError::BadRequest(format!("invalid JSON body: {error}")))
        }
        PayloadKind::Multipart => {
            let multipart = Multipart::from_request(request, &())
                .await
                .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
            read_multipart_fields(multipart).await
        }
        PayloadKind::Form => {
            let Form(payload) = Form::<InterpretRequest>::from_request(request, &())
                .await
                .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
            Ok(payload)
        }
    }
}

/// Text fields of a `multipart/form-data` post; unknown fields and file parts
/// are skipped.
async fn read_multipart_fields(mut multipart: Multipart) -> Result<InterpretRequest, AppError> {
    let mut payload = InterpretRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::BadRequest(error.body_text()))?
    {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|error| AppError::BadRequest(error.body_text()))?;

        match name.as_str() {
            "username" => payload.username = Some(value),
            "language" => payload.language = Some(value),
            "type" => payload.kind = Some(value),
            "query" => payload.query = Some(value),
            "predictions" => payload.predictions = Some(Value::String(value)),
            _ => {}
        }
    }

    Ok(payload)
}

pub async fn parse(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let started = Instant::now();
    let response = match process_parse(&state, multipart).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    };

    state.metrics.observe_request(
        "/parse",
        "POST",
        response.status().as_u16(),
        started.elapsed(),
    );
    response
}

async fn process_parse(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "parse request is not multipart");
        AppError::BadRequest(NO_FILES.to_owned())
    })?;

    let mut combined = String::new();
    let mut diagnostics = BTreeMap::new();
    let mut received = 0usize;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::BadRequest(error.body_text()))?
    {
        if field.name() != Some("files") {
            continue;
        }
        received += 1;

        let filename = sanitize_filename(field.file_name().unwrap_or("upload"));
        let bytes = field
            .bytes()
            .await
            .map_err(|error| AppError::BadRequest(error.body_text()))?;

        let extractor = state.extractor.clone();
        let name = filename.clone();
        let extracted = tokio::task::spawn_blocking(move || extractor.extract(&name, &bytes))
            .await
            .map_err(|error| AppError::Internal(format!("text extraction task failed: {error}")))?;

        match extracted {
            Ok(text) => {
                combined.push_str(&format!("\n=== {filename} ===\n{text}\n"));
                diagnostics.insert(
                    filename,
                    FileDiagnostic::Success {
                        text_length: text.chars().count(),
                    },
                );
            }
            Err(error) => {
                warn!(file = %filename, error = %error, "lab file extraction failed");
                diagnostics.insert(
                    filename,
                    FileDiagnostic::Failed {
                        error: error.to_string(),
                    },
                );
            }
        }
    }

    if received == 0 {
        warn!("parse request carried no files");
        return Err(AppError::BadRequest(NO_FILES.to_owned()));
    }

    info!(files = received, chars = combined.len(), "lab files processed");
    let summary = state.summarizer.summarize(&combined).await;

    Ok(Json(ParseResponse {
        message: "Parsed successfully (uploaded)".to_owned(),
        diagnostics,
        summary,
    })
    .into_response())
}
