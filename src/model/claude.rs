use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ModelProvider, ModelRequest, ProviderError, ProviderSettings};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct ClaudeProvider {
    client: Client,
    settings: ProviderSettings,
}

impl ClaudeProvider {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl ModelProvider for ClaudeProvider {
    fn label(&self) -> &'static str {
        "Claude"
    }

    async fn complete(&self, request: ModelRequest) -> Result<String, ProviderError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential("claude"))?;

        let payload = MessagesRequest {
            model: &self.settings.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .client
            .post(self.settings.endpoint("/v1/messages"))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json::<MessagesResponse>()
            .await?;

        response
            .content
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Format("response contained no content blocks".to_owned()))?
            .text
            .ok_or_else(|| ProviderError::Format("first content block has no text".to_owned()))
    }
}
