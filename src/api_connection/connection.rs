use dotenv::dotenv;
use reqwest::Client;
use std::env;
use thiserror::Error;
use tracing::debug;

use super::endpoints::{
    AvailableModel, ChatCompletionRequest, ChatCompletionResponse, Provider, AVAILABLE_MODELS,
    OLLAMA_BASE_URL, OPENROUTER_CHAT_URL,
};

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("API key not found in environment: {0}")]
    MissingApiKey(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    #[error("API response contained no choices")]
    EmptyChoices,
}

impl Provider {
    pub fn openrouter(api_key_env_var_name: &str) -> Self {
        dotenv().ok();
        Self::OpenRouter {
            api_key: api_key_env_var_name.to_string(),
        }
    }

    /// `api_key_env_var_name` is optional: local servers usually need no key.
    pub fn openai_compatible(base_url: &str, api_key_env_var_name: Option<&str>) -> Self {
        Self::OpenAiCompatible {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key_env_var_name.map(str::to_string),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenRouter { .. } => "openrouter",
            Provider::OpenAiCompatible { .. } => "openai-compatible",
        }
    }

    pub fn get_available_models(&self) -> Vec<AvailableModel> {
        let source = match self {
            Provider::OpenRouter { .. } => "openrouter",
            Provider::OpenAiCompatible { .. } => "ollama",
        };
        AVAILABLE_MODELS
            .iter()
            .filter(|m| m.model_source == source)
            .cloned()
            .collect()
    }

    fn endpoint(&self) -> String {
        match self {
            Provider::OpenRouter { .. } => OPENROUTER_CHAT_URL.to_string(),
            Provider::OpenAiCompatible { base_url, .. } => format!("{}/chat/completions", base_url),
        }
    }

    fn resolve_api_key(&self) -> Result<Option<String>, ApiConnectionError> {
        match self {
            Provider::OpenRouter {
                api_key: api_key_env_var_name,
            } => {
                dotenv().ok();
                env::var(api_key_env_var_name)
                    .map(Some)
                    .map_err(|_| ApiConnectionError::MissingApiKey(api_key_env_var_name.clone()))
            }
            Provider::OpenAiCompatible { api_key, .. } => Ok(api_key
                .as_ref()
                .and_then(|name| env::var(name).ok())
                .filter(|key| !key.is_empty())),
        }
    }

    pub async fn call_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiConnectionError> {
        let api_key = self.resolve_api_key()?;
        let url = self.endpoint();
        let client = Client::new();

        let mut builder = client
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some(key) = api_key {
            builder = builder.bearer_auth(key);
        }
        if let Provider::OpenRouter { .. } = self {
            let site_url = env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
            let app_name = env::var("APP_NAME").unwrap_or_else(|_| "MenuOptim".to_string());
            builder = builder.header("HTTP-Referer", site_url).header("X-Title", app_name);
        }

        debug!(provider = self.name(), %url, model = %request.model, messages = request.messages.len(), "sending chat completion request");
        let response = builder.json(&request).send().await?;

        if response.status().is_success() {
            let chat_response = response.json::<ChatCompletionResponse>().await?;
            Ok(chat_response)
        } else {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            Err(ApiConnectionError::ApiError { status, error_body })
        }
    }
}
