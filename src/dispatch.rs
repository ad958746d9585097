use std::{collections::HashMap, sync::Arc, time::Instant};

use tracing::{debug, info, warn};

use crate::{
    config::{AppConfig, ProviderEndpoint},
    credentials::CredentialStore,
    model::{
        ClaudeProvider, DeepSeekProvider, MockModelProvider, ModelProvider, ModelRequest,
        OpenAiProvider, ProviderSettings,
    },
    types::ProviderKind,
};

pub const UNKNOWN_PROVIDER_REPLY: &str = "Prompt error";

/// Routes a prompt to the provider named in the request.
#[derive(Default)]
pub struct PromptDispatcher {
    providers: HashMap<ProviderKind, Arc<dyn ModelProvider>>,
}

impl PromptDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, kind: ProviderKind, provider: Arc<dyn ModelProvider>) -> Self {
        self.providers.insert(kind, provider);
        self
    }

    /// Registers every supported provider. A provider without a credential
    /// is still registered and reports the missing key when called.
    pub fn from_credentials(
        credentials: &CredentialStore,
        config: &AppConfig,
    ) -> anyhow::Result<Self> {
        let settings = |kind: ProviderKind, endpoint: &ProviderEndpoint| {
            let api_key = credentials.api_key(kind.as_str()).map(str::to_owned);
            if api_key.is_none() {
                warn!(provider = %kind, "no API key configured; requests to this provider will fail");
            }
            ProviderSettings {
                api_key,
                base_url: endpoint.base_url.clone(),
                model: endpoint.model.clone(),
            }
        };

        let openai = OpenAiProvider::new(settings(ProviderKind::OpenAi, &config.openai));
        let claude = ClaudeProvider::new(settings(ProviderKind::Claude, &config.claude));
        let deepseek = DeepSeekProvider::new(
            settings(ProviderKind::DeepSeek, &config.deepseek),
            config.deepseek_timeout,
        )?;

        Ok(Self::new()
            .with_provider(ProviderKind::OpenAi, Arc::new(openai))
            .with_provider(ProviderKind::Claude, Arc::new(claude))
            .with_provider(ProviderKind::DeepSeek, Arc::new(deepseek)))
    }

    /// Every provider answers with the mock echo, so local runs make no API calls.
    pub fn mock() -> Self {
        ProviderKind::ALL
            .into_iter()
            .fold(Self::new(), |dispatcher, kind| {
                dispatcher.with_provider(kind, Arc::new(MockModelProvider))
            })
    }

    pub fn providers(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.providers.contains_key(kind))
            .collect()
    }

    /// Always yields text: the completion, a rendered provider failure, or
    /// [`UNKNOWN_PROVIDER_REPLY`].
    pub async fn process_prompt(&self, name: &str, prompt: &str) -> String {
        let Some((kind, provider)) = ProviderKind::from_name(name)
            .and_then(|kind| self.providers.get(&kind).map(|provider| (kind, provider)))
        else {
            info!(provider = %name, "prompt for unknown provider");
            return UNKNOWN_PROVIDER_REPLY.to_owned();
        };

        info!(provider = %kind, prompt_chars = prompt.chars().count(), "dispatching prompt");
        debug!(provider = %kind, prompt = %prompt, "prompt text");

        let started = Instant::now();
        match provider.complete(ModelRequest::new(prompt)).await {
            Ok(reply) => {
                info!(
                    provider = %kind,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "provider replied"
                );
                reply
            }
            Err(error) => {
                warn!(provider = %kind, ?error, "provider call failed");
                provider.describe_error(&error)
            }
        }
    }
}
