use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    backend::{GenerativeBackend, InvocationOutcome},
    metrics::AppMetrics,
};

/// Fixed texts served when no real generation is available.
#[derive(Debug, Clone)]
pub struct FallbackMessages {
    pub quota_placeholder: String,
    pub credential_diagnostic: String,
    pub connectivity_failure: String,
}

impl FallbackMessages {
    pub fn interpreter() -> Self {
        Self {
            quota_placeholder: "**[Simulated Analysis]**\n\n\
                **Findings:**\n\
                The uploaded image appears to be a standard radiological view. Visualized structures show normal alignment. No obvious acute fractures, dislocations, or severe soft tissue abnormalities are detected in this simulated check.\n\n\
                **Assessment:**\n\
                Appears within normal limits (Simulated).\n\n\
                **Suggested Specialist:**\n\
                Orthopedist or General Physician if pain persists.\n\n\
                **Home Care Tips:**\n\
                1. 🧊 **Ice**: Apply cold packs for 15-20 mins if swelling exists.\n\
                2. 😴 **Rest**: Avoid straining the affected area.\n\
                3. 💊 **Hydration**: Drink plenty of water to aid recovery.\n\n\
                *(Note: This is a placeholder because the AI service usage limit was reached.)*"
                .to_owned(),
            credential_diagnostic: "**[System Error: Invalid API Key]**\n\n\
                The AI provider rejected the configured API key, most likely because it was reported as **leaked** (publicly exposed).\n\n\
                **How to Fix:**\n\
                1. Generate a **new** key in Google AI Studio (https://aistudio.google.com/).\n\
                2. Put it into `API_KEY=...` in the server `.env` file.\n\
                3. Restart the server."
                .to_owned(),
            connectivity_failure: "Sorry, I'm having trouble connecting to the AI service right now. Please check your internet connection."
                .to_owned(),
        }
    }

    pub fn lab() -> Self {
        Self {
            quota_placeholder: "**[Simulated Summary]**\n\
                This report appears to show values within standard reference ranges. \
                No critical abnormalities detected in this simulated check.\n\
                *(Real AI analysis is temporarily unavailable due to quota limits.)*"
                .to_owned(),
            credential_diagnostic: "**[System Error]** Your API Key is invalid or leaked. Please update it in the server .env file."
                .to_owned(),
            connectivity_failure: "[AI Service Error] The summary service could not be reached. Please try again later."
                .to_owned(),
        }
    }
}

/// Which terminal path produced the final text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Generated { model: String },
    QuotaPlaceholder,
    CredentialDiagnostic,
    Exhausted,
}

impl GenerationResult {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Generated { .. } => "generated",
            Self::QuotaPlaceholder => "quota_placeholder",
            Self::CredentialDiagnostic => "credential_diagnostic",
            Self::Exhausted => "exhausted",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    pub result: GenerationResult,
    pub attempts: usize,
}

/// Walks an ordered candidate list until a terminal outcome or exhaustion.
///
/// Rate limiting and credential rejection stop the walk immediately because
/// they apply to the shared key, not to one model. Parse, HTTP and transport
/// failures move on to the next candidate.
pub struct FallbackOrchestrator {
    service: &'static str,
    backend: Arc<dyn GenerativeBackend>,
    candidates: Vec<String>,
    messages: FallbackMessages,
    metrics: Arc<AppMetrics>,
}

impl FallbackOrchestrator {
    pub fn new(
        service: &'static str,
        backend: Arc<dyn GenerativeBackend>,
        candidates: Vec<String>,
        messages: FallbackMessages,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        assert!(
            !candidates.is_empty(),
            "at least one backend candidate must be configured"
        );

        Self {
            service,
            backend,
            candidates,
            messages,
            metrics,
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub async fn run(&self, prompt: &str) -> Generation {
        for (index, model) in self.candidates.iter().enumerate() {
            let attempt = index + 1;
            debug!(
                service = self.service,
                backend = self.backend.name(),
                model = %model,
                attempt,
                "invoking backend candidate"
            );
            let outcome = self.backend.generate(model, prompt).await;
            self.metrics.observe_attempt(model, outcome.kind());

            match outcome {
                InvocationOutcome::Success(text) => {
                    return self.finish(
                        text,
                        GenerationResult::Generated {
                            model: model.clone(),
                        },
                        attempt,
                    );
                }
                InvocationOutcome::RateLimited => {
                    warn!(service = self.service, model = %model, "quota exhausted, serving synthetic placeholder");
                    return self.finish(
                        self.messages.quota_placeholder.clone(),
                        GenerationResult::QuotaPlaceholder,
                        attempt,
                    );
                }
                InvocationOutcome::AuthInvalid => {
                    warn!(service = self.service, model = %model, "credential rejected, serving key rotation notice");
                    return self.finish(
                        self.messages.credential_diagnostic.clone(),
                        GenerationResult::CredentialDiagnostic,
                        attempt,
                    );
                }
                other => {
                    debug!(
                        service = self.service,
                        model = %model,
                        outcome = other.kind(),
                        "candidate failed, trying next"
                    );
                }
            }
        }

        warn!(
            service = self.service,
            attempts = self.candidates.len(),
            "all backend candidates failed"
        );
        self.finish(
            self.messages.connectivity_failure.clone(),
            GenerationResult::Exhausted,
            self.candidates.len(),
        )
    }

    fn finish(&self, text: String, result: GenerationResult, attempts: usize) -> Generation {
        self.metrics.observe_generation(self.service, result.label());
        info!(
            service = self.service,
            result = result.label(),
            attempts,
            "generation finished"
        );
        Generation {
            text,
            result,
            attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::ScriptedBackend;

    fn models(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    fn orchestrator(backend: Arc<ScriptedBackend>, candidates: &[&str]) -> FallbackOrchestrator {
        FallbackOrchestrator::new(
            "interpreter",
            backend,
            models(candidates),
            FallbackMessages::interpreter(),
            Arc::new(AppMetrics::new()),
        )
    }

    #[tokio::test]
    async fn first_success_is_returned_after_one_call() {
        let backend = Arc::new(ScriptedBackend::new([InvocationOutcome::Success(
            "Looks normal.".to_owned(),
        )]));
        let generation = orchestrator(backend.clone(), &["flash", "pro"])
            .run("prompt")
            .await;

        assert_eq!(generation.text, "Looks normal.");
        assert_eq!(
            generation.result,
            GenerationResult::Generated {
                model: "flash".to_owned()
            }
        );
        assert_eq!(backend.call_count().await, 1);
    }

    #[tokio::test]
    async fn rate_limit_stops_with_placeholder() {
        let backend = Arc::new(ScriptedBackend::always(InvocationOutcome::RateLimited));
        let generation = orchestrator(backend.clone(), &["flash", "pro", "lite"])
            .run("prompt")
            .await;

        assert_eq!(
            generation.text,
            FallbackMessages::interpreter().quota_placeholder
        );
        assert_eq!(generation.result, GenerationResult::QuotaPlaceholder);
        assert_eq!(backend.calls().await, vec!["flash".to_owned()]);
    }

    #[tokio::test]
    async fn invalid_credential_stops_with_diagnostic() {
        let backend = Arc::new(ScriptedBackend::new([
            InvocationOutcome::AuthInvalid,
            InvocationOutcome::Success("unreachable".to_owned()),
        ]));
        let generation = orchestrator(backend.clone(), &["flash", "pro"])
            .run("prompt")
            .await;

        assert_eq!(
            generation.text,
            FallbackMessages::interpreter().credential_diagnostic
        );
        assert_eq!(generation.attempts, 1);
        assert_eq!(backend.call_count().await, 1);
    }

    #[tokio::test]
    async fn transport_error_falls_through_to_next_candidate() {
        let backend = Arc::new(ScriptedBackend::new([
            InvocationOutcome::TransportError("timed out".to_owned()),
            InvocationOutcome::Success("X".to_owned()),
        ]));
        let generation = orchestrator(backend.clone(), &["flash", "pro"])
            .run("prompt")
            .await;

        assert_eq!(generation.text, "X");
        assert_eq!(
            backend.calls().await,
            vec!["flash".to_owned(), "pro".to_owned()]
        );
    }

    #[tokio::test]
    async fn parse_failure_then_rate_limit_serves_placeholder() {
        let backend = Arc::new(ScriptedBackend::new([
            InvocationOutcome::ParseFailure("{}".to_owned()),
            InvocationOutcome::RateLimited,
        ]));
        let generation = orchestrator(backend.clone(), &["flash", "pro", "lite"])
            .run("prompt")
            .await;

        assert_eq!(generation.result, GenerationResult::QuotaPlaceholder);
        assert_eq!(backend.call_count().await, 2);
    }

    #[tokio::test]
    async fn all_http_errors_exhaust_every_candidate_once() {
        let backend = Arc::new(ScriptedBackend::always(InvocationOutcome::HttpError {
            status: 500,
            body: "internal".to_owned(),
        }));
        let generation = orchestrator(backend.clone(), &["flash", "pro", "lite"])
            .run("prompt")
            .await;

        assert_eq!(
            generation.text,
            FallbackMessages::interpreter().connectivity_failure
        );
        assert_eq!(generation.result, GenerationResult::Exhausted);
        assert_eq!(
            backend.calls().await,
            vec!["flash".to_owned(), "pro".to_owned(), "lite".to_owned()]
        );
    }

    #[test]
    #[should_panic(expected = "at least one backend candidate")]
    fn empty_candidate_list_is_rejected() {
        let _ = orchestrator(Arc::new(ScriptedBackend::default()), &[]);
    }
}
