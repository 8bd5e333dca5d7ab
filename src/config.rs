use std::{env, time::Duration};

use tracing::error;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TRANSLATE_BASE_URL: &str = "https://translate.googleapis.com";
pub const DEFAULT_INTERPRETER_MODELS: &[&str] = &["gemini-flash-latest", "gemini-pro-latest"];
pub const DEFAULT_LAB_MODELS: &[&str] = &["gemini-flash-latest"];

/// Immutable settings shared by every request handler. Built once at startup.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    pub base_url: String,
    pub interpreter_models: Vec<String>,
    pub lab_models: Vec<String>,
    pub timeout: Duration,
    pub translate_base_url: String,
    pub translate_timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_owned(),
            interpreter_models: to_owned_list(DEFAULT_INTERPRETER_MODELS),
            lab_models: to_owned_list(DEFAULT_LAB_MODELS),
            timeout: Duration::from_secs(30),
            translate_base_url: DEFAULT_TRANSLATE_BASE_URL.to_owned(),
            translate_timeout: Duration::from_secs(15),
        }
    }
}

impl GenerationConfig {
    pub fn from_env() -> Self {
        let api_key = env::var("API_KEY").unwrap_or_default().trim().to_owned();
        if api_key.is_empty() {
            error!("API_KEY is not set; generation requests will fail over to fallback messages");
        }

        Self {
            api_key,
            base_url: read_url("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            interpreter_models: parse_model_list(
                &env::var("GEMINI_MODELS").unwrap_or_default(),
                DEFAULT_INTERPRETER_MODELS,
            ),
            lab_models: parse_model_list(
                &env::var("LAB_MODELS").unwrap_or_default(),
                DEFAULT_LAB_MODELS,
            ),
            timeout: Duration::from_secs(read_u64("GEMINI_TIMEOUT_SECS", 30)),
            translate_base_url: read_url("TRANSLATE_BASE_URL", DEFAULT_TRANSLATE_BASE_URL),
            translate_timeout: Duration::from_secs(read_u64("TRANSLATE_TIMEOUT_SECS", 15)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Interpreter,
    Lab,
}

impl ServiceKind {
    pub fn from_env() -> Result<Self, String> {
        match env::var("MEDISCOPE_SERVICE") {
            Ok(value) if !value.trim().is_empty() => Self::parse(&value),
            _ => Ok(Self::Interpreter),
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "interpreter" => Ok(Self::Interpreter),
            "lab" => Ok(Self::Lab),
            other => Err(format!("unknown service '{other}', expected interpreter or lab")),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Interpreter => "interpreter",
            Self::Lab => "lab",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Self::Interpreter => 5002,
            Self::Lab => 5001,
        }
    }

    pub fn port_from_env(&self) -> u16 {
        env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or_else(|| self.default_port())
    }
}

/// Splits a comma-separated candidate list. An empty result falls back to
/// `defaults` so the candidate list is never empty.
pub fn parse_model_list(raw: &str, defaults: &[&str]) -> Vec<String> {
    let models = raw
        .split(',')
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .map(ToOwned::to_owned)
        .collect::<Vec<_>>();
    if models.is_empty() {
        to_owned_list(defaults)
    } else {
        models
    }
}

fn to_owned_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

fn read_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

fn read_url(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
        .trim()
        .trim_end_matches('/')
        .to_owned()
}
