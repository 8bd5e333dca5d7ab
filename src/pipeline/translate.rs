use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::Language;

pub const DEFAULT_LANGUAGE_CODE: &str = "en";
pub const TRANSLATION_FAILED_NOTE: &str =
    "\n\n(Note: Translation to your selected language failed.)";

const LANGUAGE_CODES: &[(&str, &str)] = &[("english", "en"), ("telugu", "te"), ("hindi", "hi")];

/// Looks up the target code for a language name. Unknown names fall back to
/// [`DEFAULT_LANGUAGE_CODE`].
pub fn language_code(name: &str) -> &'static str {
    let name = name.trim();
    LANGUAGE_CODES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
        .unwrap_or(DEFAULT_LANGUAGE_CODE)
}

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation request failed: {0}")]
    Transport(String),
    #[error("translation service returned status {0}")]
    Status(u16),
    #[error("unexpected translation payload: {0}")]
    Payload(String),
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: &str) -> Result<String, TranslationError>;
}

/// Client for the public Google translate endpoint (`client=gtx`).
#[derive(Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleTranslator {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| format!("failed to build translation HTTP client: {error}"))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target: &str) -> Result<String, TranslationError> {
        let response = self
            .client
            .post(format!("{}/translate_a/single", self.base_url))
            .query(&[("client", "gtx"), ("sl", "auto"), ("tl", target), ("dt", "t")])
            .form(&[("q", text)])
            .send()
            .await
            .map_err(|error| TranslationError::Transport(error.to_string()))?;

        if !response.status().is_success() {
            return Err(TranslationError::Status(response.status().as_u16()));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|error| TranslationError::Payload(error.to_string()))?;
        join_segments(&payload)
    }
}

/// The gtx payload nests translated segments as `[[["<translated>", "<source>", ...], ...], ...]`.
fn join_segments(payload: &Value) -> Result<String, TranslationError> {
    let segments = payload
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::Payload("missing segment list".to_owned()))?;

    let translated = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect::<String>();
    if translated.is_empty() {
        return Err(TranslationError::Payload("no translated segments".to_owned()));
    }
    Ok(translated)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Localized {
    Untouched(String),
    Translated(String),
    /// Translation failed; original text with the failure note appended.
    Degraded(String),
}

impl Localized {
    pub fn into_text(self) -> String {
        match self {
            Self::Untouched(text) | Self::Translated(text) | Self::Degraded(text) => text,
        }
    }
}

pub async fn localize(translator: &dyn Translator, text: String, language: &Language) -> Localized {
    if language.is_default() {
        return Localized::Untouched(text);
    }

    let target = language_code(language.name());
    match translator.translate(&text, target).await {
        Ok(translated) => {
            debug!(language = language.name(), code = target, "response translated");
            Localized::Translated(translated)
        }
        Err(error) => {
            warn!(language = language.name(), code = target, error = %error, "translation failed, keeping original text");
            Localized::Degraded(format!("{text}{TRANSLATION_FAILED_NOTE}"))
        }
    }
}
