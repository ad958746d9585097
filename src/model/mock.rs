use async_trait::async_trait;

use super::{ModelProvider, ModelRequest, ProviderError};

#[derive(Debug, Default)]
pub struct MockModelProvider;

#[async_trait]
impl ModelProvider for MockModelProvider {
    fn label(&self) -> &'static str {
        "Mock"
    }

    async fn complete(&self, request: ModelRequest) -> Result<String, ProviderError> {
        Ok(format!("aira mock reply: {}", request.prompt))
    }
}
