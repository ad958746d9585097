use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ModelProvider, ModelRequest, ProviderError, ProviderSettings};

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    settings: ProviderSettings,
}

impl OpenAiProvider {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }
}

// Shared with other OpenAI-compatible chat completion APIs.
#[derive(Debug, Serialize)]
pub(super) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(super) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatChoiceMessage {
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    pub(super) fn into_content(self) -> Result<String, ProviderError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Unexpected("model returned no choices".to_owned()))?;

        choice
            .message
            .content
            .ok_or_else(|| ProviderError::Unexpected("model returned an empty message".to_owned()))
    }
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn label(&self) -> &'static str {
        "OpenAI"
    }

    async fn complete(&self, request: ModelRequest) -> Result<String, ProviderError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential("openai"))?;

        let payload = ChatCompletionRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: None,
        };

        let response = self
            .client
            .post(self.settings.endpoint("/v1/chat/completions"))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatCompletionResponse>()
            .await?;

        response.into_content()
    }
}
