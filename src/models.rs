use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const NO_DIAGNOSTIC_DATA: &str = "No diagnostic data provided.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Report,
    Chat,
}

impl ResponseMode {
    /// Anything other than `chat` is treated as a report.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("chat") {
            Self::Chat
        } else {
            Self::Report
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::Chat => "chat",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    English,
    Telugu,
    Hindi,
    Other(String),
}

impl Language {
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_lowercase();
        match normalized.as_str() {
            "english" => Self::English,
            "telugu" => Self::Telugu,
            "hindi" => Self::Hindi,
            _ => Self::Other(normalized),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::English => "english",
            Self::Telugu => "telugu",
            Self::Hindi => "hindi",
            Self::Other(name) => name,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::English)
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub username: Option<String>,
    pub content: String,
    pub mode: ResponseMode,
    pub language: Language,
}

/// Body of `POST /interpret`, accepted either as JSON or as form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterpretRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    /// `None` only when the field is absent; an explicit `null` is kept.
    #[serde(default, deserialize_with = "present_value")]
    pub predictions: Option<Value>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl InterpretRequest {
    pub fn into_generation(self) -> Result<GenerationRequest, String> {
        let mode = ResponseMode::parse(self.kind.as_deref().unwrap_or("report"));
        let content = match mode {
            ResponseMode::Chat => {
                let query = self.query.unwrap_or_default();
                if query.trim().is_empty() {
                    return Err("Missing 'query' for chat type".to_owned());
                }
                query
            }
            ResponseMode::Report => report_content(self.predictions),
        };

        Ok(GenerationRequest {
            username: Some(self.username.unwrap_or_else(|| "Patient".to_owned())),
            content,
            mode,
            language: Language::parse(self.language.as_deref().unwrap_or("english")),
        })
    }
}

/// Predictions may arrive as an inline JSON value or as a string holding JSON.
/// Valid JSON is re-rendered with two-space indentation; anything else is
/// passed through as-is.
pub fn report_content(predictions: Option<Value>) -> String {
    match predictions {
        None => pretty(&Value::Object(Default::default())),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(&raw) {
            Ok(parsed) => pretty(&parsed),
            Err(_) if raw.is_empty() => NO_DIAGNOSTIC_DATA.to_owned(),
            Err(_) => raw,
        },
        Some(other) => pretty(&other),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InterpretResponse {
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileDiagnostic {
    Success { text_length: usize },
    Failed { error: String },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParseResponse {
    pub message: String,
    pub diagnostics: BTreeMap<String, FileDiagnostic>,
    pub summary: String,
}
