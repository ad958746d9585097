use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The providers a prompt can be dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    Claude,
    DeepSeek,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::OpenAi,
        ProviderKind::Claude,
        ProviderKind::DeepSeek,
    ];

    /// Exact, case-sensitive match on the name a client sends.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "openai" => Some(ProviderKind::OpenAi),
            "claude" => Some(ProviderKind::Claude),
            "deepseek" => Some(ProviderKind::DeepSeek),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Claude => "claude",
            ProviderKind::DeepSeek => "deepseek",
        }
    }

    pub fn known_models(self) -> &'static [&'static str] {
        match self {
            ProviderKind::OpenAi => &[
                "gpt-4o",
                "gpt-4o-mini",
                "gpt-4-turbo",
                "gpt-4",
                "gpt-3.5-turbo",
                "gpt-3.5-turbo-16k",
            ],
            ProviderKind::Claude => &[
                "claude-sonnet-4-20250514",
                "claude-opus-4-20250514",
                "claude-3-5-sonnet-20241022",
                "claude-3-opus-20240229",
                "claude-3-sonnet-20240229",
                "claude-3-haiku-20240307",
            ],
            ProviderKind::DeepSeek => &["deepseek-chat", "deepseek-coder"],
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiRequest {
    pub name: String,
    pub string: String,
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

impl AiRequest {
    /// The body must be a JSON object. Missing fields default to `"Unknown"`
    /// and `""`; non-string values are kept as their JSON text, so a
    /// non-string `name` never matches a provider.
    pub fn from_json(body: &[u8]) -> Result<Self, RequestError> {
        let value = serde_json::from_slice::<Value>(body)?;
        let Value::Object(fields) = value else {
            return Err(RequestError::NotAnObject(json_kind(&value)));
        };

        Ok(Self {
            name: field_text(fields.get("name")).unwrap_or_else(|| "Unknown".to_owned()),
            string: field_text(fields.get("string")).unwrap_or_default(),
        })
    }
}

fn field_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiReply {
    pub reply: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsRequest {
    #[serde(default)]
    pub provider: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsReply {
    pub models: Vec<String>,
}
