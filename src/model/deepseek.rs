use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::warn;

use super::{
    ModelProvider, ModelRequest, ProviderError, ProviderSettings,
    openai::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage},
};

pub const DEFAULT_DEEPSEEK_TIMEOUT: Duration = Duration::from_secs(30);

/// DeepSeek speaks the OpenAI chat completion dialect but is the only
/// provider called with a request timeout.
#[derive(Debug, Clone)]
pub struct DeepSeekProvider {
    client: Client,
    settings: ProviderSettings,
}

impl DeepSeekProvider {
    pub fn new(settings: ProviderSettings, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build DeepSeek HTTP client")?;

        Ok(Self { client, settings })
    }
}

#[async_trait]
impl ModelProvider for DeepSeekProvider {
    fn label(&self) -> &'static str {
        "DeepSeek"
    }

    async fn complete(&self, request: ModelRequest) -> Result<String, ProviderError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential("deepseek"))?;

        let payload = ChatCompletionRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: Some(false),
        };

        let body = self
            .client
            .post(self.settings.endpoint("/v1/chat/completions"))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        let response = serde_json::from_value::<ChatCompletionResponse>(body).map_err(|error| {
            warn!(?error, "unexpected DeepSeek response shape");
            ProviderError::Format(error.to_string())
        })?;

        response.into_content()
    }

    fn describe_error(&self, error: &ProviderError) -> String {
        match error {
            ProviderError::Request(_) | ProviderError::MissingCredential(_) => {
                format!("DeepSeek API request error: {error}")
            }
            ProviderError::Format(_) => format!("DeepSeek response format error: {error}"),
            ProviderError::Unexpected(_) => format!("DeepSeek unexpected error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::model::{ModelProvider, ModelRequest, ProviderError, ProviderSettings};

    use super::{DEFAULT_DEEPSEEK_TIMEOUT, DeepSeekProvider};

    fn provider(base_url: &str, timeout: Duration) -> DeepSeekProvider {
        DeepSeekProvider::new(
            ProviderSettings {
                api_key: Some("ds-test".to_owned()),
                base_url: base_url.to_owned(),
                model: "deepseek-chat".to_owned(),
            },
            timeout,
        )
        .expect("client should build")
    }

    #[tokio::test]
    async fn sends_non_streaming_request_and_returns_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer ds-test"))
            .and(body_partial_json(json!({
                "model": "deepseek-chat",
                "stream": false,
                "max_tokens": 200,
                "messages": [{"role": "user", "content": "2+2?"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "4"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = provider(&server.uri(), DEFAULT_DEEPSEEK_TIMEOUT)
            .complete(ModelRequest::new("2+2?"))
            .await
            .expect("completion should succeed");

        assert_eq!(reply, "4");
    }

    #[tokio::test]
    async fn server_error_is_an_api_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = provider(&server.uri(), DEFAULT_DEEPSEEK_TIMEOUT);
        let error = provider
            .complete(ModelRequest::new("hi"))
            .await
            .expect_err("503 should fail");

        assert!(
            provider
                .describe_error(&error)
                .starts_with("DeepSeek API request error: ")
        );
    }

    #[tokio::test]
    async fn missing_choices_is_a_format_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "x"})))
            .mount(&server)
            .await;

        let provider = provider(&server.uri(), DEFAULT_DEEPSEEK_TIMEOUT);
        let error = provider
            .complete(ModelRequest::new("hi"))
            .await
            .expect_err("missing choices should fail");

        assert!(matches!(error, ProviderError::Format(_)));
        let text = provider.describe_error(&error);
        assert!(text.starts_with("DeepSeek response format error: "));
        assert!(text.contains("choices"));
    }

    #[tokio::test]
    async fn null_content_is_an_unexpected_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": null}}]
            })))
            .mount(&server)
            .await;

        let provider = provider(&server.uri(), DEFAULT_DEEPSEEK_TIMEOUT);
        let error = provider
            .complete(ModelRequest::new("hi"))
            .await
            .expect_err("null content should fail");

        assert_eq!(
            provider.describe_error(&error),
            "DeepSeek unexpected error: model returned an empty message"
        );
    }

    #[tokio::test]
    async fn empty_choices_is_an_unexpected_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let provider = provider(&server.uri(), DEFAULT_DEEPSEEK_TIMEOUT);
        let error = provider
            .complete(ModelRequest::new("hi"))
            .await
            .expect_err("empty choices should fail");

        assert_eq!(
            provider.describe_error(&error),
            "DeepSeek unexpected error: model returned no choices"
        );
    }

    #[tokio::test]
    async fn slow_response_hits_the_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": [{"message": {"content": "late"}}]}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let provider = provider(&server.uri(), Duration::from_millis(50));
        let error = provider
            .complete(ModelRequest::new("hi"))
            .await
            .expect_err("request should time out");

        match &error {
            ProviderError::Request(inner) => assert!(inner.is_timeout()),
            other => panic!("expected request error, got {other:?}"),
        }
    }
}
