use async_trait::async_trait;
use std::sync::Arc;

use super::connection::ApiConnectionError;
use super::endpoints::{ChatCompletionRequest, ChatMessage, Provider};

/// Prompt in, raw reply text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage], model: &str) -> Result<String, ApiConnectionError>;
}

#[async_trait]
impl TextGenerator for Provider {
    async fn generate(&self, messages: &[ChatMessage], model: &str) -> Result<String, ApiConnectionError> {
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            temperature: Some(0.2),
            max_tokens: Some(4096),
        };
        let response = self.call_chat_completion(request).await?;
        response
            .first_content()
            .map(str::to_string)
            .ok_or(ApiConnectionError::EmptyChoices)
    }
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate(&self, messages: &[ChatMessage], model: &str) -> Result<String, ApiConnectionError> {
        (**self).generate(messages, model).await
    }
}
