//! Resilient generation pipeline shared by the interpreter and lab services.
//!
//! prompt -> fallback walk over candidate models -> greeting strip ->
//! optional translation -> greeting + body.

pub mod assemble;
pub mod fallback;
pub mod prompt;
pub mod sanitize;
pub mod translate;

use std::sync::Arc;

use tracing::info;

use crate::{metrics::AppMetrics, models::GenerationRequest};

use self::{
    assemble::FinalResponse,
    fallback::FallbackOrchestrator,
    translate::{Localized, Translator},
};

/// Turns a validated request into the patient-facing answer. Never fails:
/// backend and translation errors are folded into the returned text.
pub struct HealthResponder {
    orchestrator: FallbackOrchestrator,
    translator: Arc<dyn Translator>,
    metrics: Arc<AppMetrics>,
}

impl HealthResponder {
    pub fn new(
        orchestrator: FallbackOrchestrator,
        translator: Arc<dyn Translator>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            orchestrator,
            translator,
            metrics,
        }
    }

    pub async fn respond(&self, request: &GenerationRequest) -> FinalResponse {
        info!(
            mode = request.mode.as_str(),
            language = request.language.name(),
            candidates = self.orchestrator.candidates().len(),
            "generating health response"
        );

        let prompt = prompt::build(request.mode, &request.content);
        let generation = self.orchestrator.run(&prompt).await;
        let body = sanitize::strip_greetings(&generation.text);

        let body = match translate::localize(self.translator.as_ref(), body, &request.language).await
        {
            Localized::Degraded(text) => {
                self.metrics.observe_translation_failure();
                text
            }
            other => other.into_text(),
        };

        FinalResponse::new(request.username.as_deref(), body)
    }
}

/// Summarizes text extracted from lab documents.
pub struct LabSummarizer {
    orchestrator: FallbackOrchestrator,
}

impl LabSummarizer {
    pub fn new(orchestrator: FallbackOrchestrator) -> Self {
        Self { orchestrator }
    }

    pub async fn summarize(&self, text: &str) -> String {
        let generation = self.orchestrator.run(&prompt::lab_summary(text)).await;
        generation.text
    }
}
