use std::sync::Arc;

use crate::{
    backend::{gemini::GeminiAdapter, GenerativeBackend},
    config::GenerationConfig,
    extract::{PlainTextExtractor, TextExtractor},
    metrics::AppMetrics,
    pipeline::{
        fallback::{FallbackMessages, FallbackOrchestrator},
        translate::{GoogleTranslator, Translator},
        HealthResponder, LabSummarizer,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub responder: Arc<HealthResponder>,
    pub summarizer: Arc<LabSummarizer>,
    pub extractor: Arc<dyn TextExtractor>,
    pub metrics: Arc<AppMetrics>,
}

impl AppState {
    pub fn new(config: &GenerationConfig) -> Result<Self, String> {
        let backend: Arc<dyn GenerativeBackend> = Arc::new(GeminiAdapter::new(config)?);
        let translator: Arc<dyn Translator> = Arc::new(GoogleTranslator::new(
            &config.translate_base_url,
            config.translate_timeout,
        )?);
        Ok(Self::from_parts(
            config,
            backend,
            translator,
            Arc::new(PlainTextExtractor),
        ))
    }

    pub fn from_parts(
        config: &GenerationConfig,
        backend: Arc<dyn GenerativeBackend>,
        translator: Arc<dyn Translator>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        let metrics = Arc::new(AppMetrics::new());
        let interpreter = FallbackOrchestrator::new(
            "interpreter",
            backend.clone(),
            config.interpreter_models.clone(),
            FallbackMessages::interpreter(),
            metrics.clone(),
        );
        let lab = FallbackOrchestrator::new(
            "lab",
            backend,
            config.lab_models.clone(),
            FallbackMessages::lab(),
            metrics.clone(),
        );

        Self {
            responder: Arc::new(HealthResponder::new(
                interpreter,
                translator,
                metrics.clone(),
            )),
            summarizer: Arc::new(LabSummarizer::new(lab)),
            extractor,
            metrics,
        }
    }

    pub fn new_for_tests<B, T>(backend: Arc<B>, translator: Arc<T>) -> Self
    where
        B: GenerativeBackend + 'static,
        T: Translator + 'static,
    {
        Self::from_parts(
            &GenerationConfig::default(),
            backend,
            translator,
            Arc::new(PlainTextExtractor),
        )
    }
}
