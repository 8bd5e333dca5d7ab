use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
    backend::{GenerativeBackend, InvocationOutcome},
    config::GenerationConfig,
};

#[derive(Clone)]
pub struct GeminiAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiAdapter {
    pub fn new(config: &GenerationConfig) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| format!("failed to build Gemini HTTP client: {error}"))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiAdapter {
    fn name(&self) -> &str {
        "gemini-rest"
    }

    async fn generate(&self, model: &str, prompt: &str) -> InvocationOutcome {
        let payload = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = match self
            .client
            .post(self.url(model))
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(cause) => {
                error!(model, error = %cause, "Gemini request failed");
                return InvocationOutcome::TransportError(cause.to_string());
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(cause) => {
                error!(model, status = status.as_u16(), error = %cause, "Gemini response body unreadable");
                return InvocationOutcome::TransportError(cause.to_string());
            }
        };

        let outcome = classify_response(status, body);
        log_outcome(model, &outcome);
        outcome
    }
}

/// Maps a raw HTTP reply onto an [`InvocationOutcome`]. A 200 reply is only a
/// success when `candidates[0].content.parts[0].text` is present.
pub fn classify_response(status: StatusCode, body: String) -> InvocationOutcome {
    match status {
        StatusCode::OK => match extract_text(&body) {
            Some(text) => InvocationOutcome::Success(text),
            None => InvocationOutcome::ParseFailure(body),
        },
        StatusCode::TOO_MANY_REQUESTS => InvocationOutcome::RateLimited,
        StatusCode::FORBIDDEN => InvocationOutcome::AuthInvalid,
        other => InvocationOutcome::HttpError {
            status: other.as_u16(),
            body,
        },
    }
}

fn extract_text(body: &str) -> Option<String> {
    let parsed: GenerateContentResponse = serde_json::from_str(body).ok()?;
    parsed
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
}

fn log_outcome(model: &str, outcome: &InvocationOutcome) {
    match outcome {
        InvocationOutcome::Success(text) => {
            info!(model, chars = text.len(), "Gemini response received");
        }
        InvocationOutcome::ParseFailure(raw) => {
            warn!(model, body = %truncate(raw), "unexpected JSON structure from Gemini");
        }
        InvocationOutcome::RateLimited => {
            warn!(model, status = 429, "Gemini quota exceeded");
        }
        InvocationOutcome::AuthInvalid => {
            error!(model, status = 403, "Gemini rejected the API key as invalid or leaked");
        }
        InvocationOutcome::HttpError { status, body } => {
            warn!(model, status, body = %truncate(body), "Gemini request returned an error status");
        }
        InvocationOutcome::TransportError(cause) => {
            error!(model, error = %cause, "Gemini request failed");
        }
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(400).collect()
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}
