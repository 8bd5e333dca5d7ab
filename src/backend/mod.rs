pub mod gemini;
pub mod mock;

use async_trait::async_trait;

/// A remote text-generation service addressed by model identifier.
///
/// Implementations perform exactly one call per `generate` and never retry;
/// fallback across models is the caller's concern.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    fn name(&self) -> &str;
    async fn generate(&self, model: &str, prompt: &str) -> InvocationOutcome;
}

/// Classified result of one backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    Success(String),
    /// 200 response whose body did not match the expected shape.
    ParseFailure(String),
    RateLimited,
    AuthInvalid,
    HttpError { status: u16, body: String },
    TransportError(String),
}

impl InvocationOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::ParseFailure(_) => "parse_failure",
            Self::RateLimited => "rate_limited",
            Self::AuthInvalid => "auth_invalid",
            Self::HttpError { .. } => "http_error",
            Self::TransportError(_) => "transport_error",
        }
    }

    /// Quota and credential failures affect every candidate under the same
    /// key, so they end the fallback walk along with success.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::RateLimited | Self::AuthInvalid)
    }
}
