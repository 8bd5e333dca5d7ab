use std::time::Duration;

use prometheus::{
    opts, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct AppMetrics {
    registry: Registry,
    request_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    backend_attempts_total: IntCounterVec,
    generation_results_total: IntCounterVec,
    translation_failures_total: IntCounter,
}

impl AppMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let request_total = IntCounterVec::new(
            opts!(
                "mediscope_http_requests_total",
                "Total HTTP requests processed"
            ),
            &["path", "method", "status"],
        )
        .expect("valid request_total metric");

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "mediscope_http_request_duration_seconds",
                "HTTP request latency in seconds",
            ),
            &["path", "method"],
        )
        .expect("valid request_duration_seconds metric");

        let backend_attempts_total = IntCounterVec::new(
            opts!(
                "mediscope_backend_attempts_total",
                "Backend generation attempts by model and outcome"
            ),
            &["model", "outcome"],
        )
        .expect("valid backend_attempts_total metric");

        let generation_results_total = IntCounterVec::new(
            opts!(
                "mediscope_generation_results_total",
                "Final generation result by service"
            ),
            &["service", "result"],
        )
        .expect("valid generation_results_total metric");

        let translation_failures_total = IntCounter::new(
            "mediscope_translation_failures_total",
            "Translations that fell back to the original text",
        )
        .expect("valid translation_failures_total metric");

        registry
            .register(Box::new(request_total.clone()))
            .expect("register request_total");
        registry
            .register(Box::new(request_duration_seconds.clone()))
            .expect("register request_duration_seconds");
        registry
            .register(Box::new(backend_attempts_total.clone()))
            .expect("register backend_attempts_total");
        registry
            .register(Box::new(generation_results_total.clone()))
            .expect("register generation_results_total");
        registry
            .register(Box::new(translation_failures_total.clone()))
            .expect("register translation_failures_total");

        Self {
            registry,
            request_total,
            request_duration_seconds,
            backend_attempts_total,
            generation_results_total,
            translation_failures_total,
        }
    }

    pub fn observe_request(&self, path: &str, method: &str, status: u16, duration: Duration) {
        let status_label = status.to_string();
        self.request_total
            .with_label_values(&[path, method, &status_label])
            .inc();
        self.request_duration_seconds
            .with_label_values(&[path, method])
            .observe(duration.as_secs_f64());
    }

    pub fn observe_attempt(&self, model: &str, outcome: &str) {
        self.backend_attempts_total
            .with_label_values(&[model, outcome])
            .inc();
    }

    pub fn observe_generation(&self, service: &str, result: &str) {
        self.generation_results_total
            .with_label_values(&[service, result])
            .inc();
    }

    pub fn observe_translation_failure(&self) {
        self.translation_failures_total.inc();
    }

    pub fn render(&self) -> Result<String, String> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        encoder
            .encode(&families, &mut buffer)
            .map_err(|error| error.to_string())?;
        String::from_utf8(buffer).map_err(|error| error.to_string())
    }
}

impl Default for AppMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_attempt_counters() {
        let metrics = AppMetrics::new();
        metrics.observe_attempt("gemini-flash-latest", "rate_limited");
        metrics.observe_generation("interpreter", "quota_placeholder");

        let rendered = metrics.render().expect("metrics should render");
        assert!(rendered.contains("mediscope_backend_attempts_total"));
        assert!(rendered.contains("outcome=\"rate_limited\""));
        assert!(rendered.contains("result=\"quota_placeholder\""));
    }
}
