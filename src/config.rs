use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::api_connection::endpoints::{Provider, OLLAMA_BASE_URL};
use crate::menu_generator::{GenerationSettings, DEFAULT_CANDIDATES, DEFAULT_MODEL, DEFAULT_TIMEOUT, MENU_QUERY};
use crate::search::DEFAULT_VECTOR_DIMENSION;

pub const CATALOG_PATH_ENV: &str = "MENU_CATALOG_PATH";
pub const PROVIDER_ENV: &str = "MENU_LLM_PROVIDER";
pub const BASE_URL_ENV: &str = "MENU_LLM_BASE_URL";
pub const MODEL_ENV: &str = "MENU_LLM_MODEL";
pub const API_KEY_ENV_NAME_ENV: &str = "MENU_LLM_API_KEY_ENV";
pub const TIMEOUT_ENV: &str = "MENU_LLM_TIMEOUT_SECS";
pub const VECTOR_DIM_ENV: &str = "MENU_VECTOR_DIM";
pub const CANDIDATES_ENV: &str = "MENU_CANDIDATES";

const DEFAULT_CATALOG_PATH: &str = "data/recipes.json";
const DEFAULT_API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    Ollama,
    Openrouter,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" | "local" => Ok(ProviderKind::Ollama),
            "openrouter" => Ok(ProviderKind::Openrouter),
            other => Err(anyhow!("Unknown LLM provider '{}' (expected 'ollama' or 'openrouter')", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_path: PathBuf,
    pub provider: ProviderKind,
    pub base_url: String,
    /// `None` picks the provider's first listed model.
    pub model: Option<String>,
    pub api_key_env_var: String,
    pub timeout: Duration,
    pub vector_dimension: usize,
    pub candidates: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            provider: ProviderKind::Ollama,
            base_url: OLLAMA_BASE_URL.to_string(),
            model: None,
            api_key_env_var: DEFAULT_API_KEY_ENV_VAR.to_string(),
            timeout: DEFAULT_TIMEOUT,
            vector_dimension: DEFAULT_VECTOR_DIMENSION,
            candidates: DEFAULT_CANDIDATES,
        }
    }
}

fn parse_env<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow!("Invalid value '{}' for {}: {}", raw, name, e)),
        _ => Ok(None),
    }
}

impl AppConfig {
    /// Defaults overridden by environment variables (after loading `.env`).
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let mut config = Self::default();

        if let Some(path) = parse_env::<PathBuf>(CATALOG_PATH_ENV)? {
            config.catalog_path = path;
        }
        if let Some(provider) = parse_env::<ProviderKind>(PROVIDER_ENV)? {
            config.provider = provider;
        }
        if let Some(base_url) = parse_env::<String>(BASE_URL_ENV)? {
            config.base_url = base_url;
        }
        if let Some(model) = parse_env::<String>(MODEL_ENV)? {
            config.model = Some(model);
        }
        if let Some(name) = parse_env::<String>(API_KEY_ENV_NAME_ENV)? {
            config.api_key_env_var = name;
        }
        if let Some(secs) = parse_env::<u64>(TIMEOUT_ENV)? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(dim) = parse_env::<usize>(VECTOR_DIM_ENV)? {
            config.vector_dimension = dim;
        }
        if let Some(candidates) = parse_env::<usize>(CANDIDATES_ENV)? {
            config.candidates = candidates;
        }

        config.validate().context("Invalid menu configuration")?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.vector_dimension == 0 {
            return Err(anyhow!("{} must be at least 1", VECTOR_DIM_ENV));
        }
        if self.timeout.is_zero() {
            return Err(anyhow!("{} must be at least 1 second", TIMEOUT_ENV));
        }
        Ok(())
    }

    pub fn provider(&self) -> Provider {
        match self.provider {
            ProviderKind::Ollama => Provider::openai_compatible(&self.base_url, None),
            ProviderKind::Openrouter => Provider::openrouter(&self.api_key_env_var),
        }
    }

    pub fn model_name(&self) -> String {
        self.model.clone().unwrap_or_else(|| {
            self.provider()
                .get_available_models()
                .first()
                .map(|m| m.model_name.to_string())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string())
        })
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            model: self.model_name(),
            timeout: self.timeout,
            candidates: self.candidates,
            query: MENU_QUERY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_parsing() {
        assert_eq!("Ollama".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        assert_eq!(" openrouter ".parse::<ProviderKind>().unwrap(), ProviderKind::Openrouter);
        assert!("gemini".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.vector_dimension, 128);
        assert_eq!(config.generation_settings().candidates, 20);
        assert!(matches!(config.provider(), Provider::OpenAiCompatible { .. }));
    }

    #[test]
    fn malformed_numeric_env_is_an_error() {
        // Unique name so parallel tests do not race on it.
        let name = "MENU_TEST_ONLY_BAD_NUMBER";
        env::set_var(name, "twelve");
        assert!(parse_env::<u64>(name).is_err());
        env::set_var(name, "  ");
        assert!(parse_env::<u64>(name).unwrap().is_none());
        env::remove_var(name);
    }

    #[test]
    fn default_model_follows_provider() {
        let mut config = AppConfig::default();
        assert_eq!(config.model_name(), "hetg/llama3-nutrition");

        config.provider = ProviderKind::Openrouter;
        assert_eq!(config.generation_settings().model, "qwen/qwen3-32b");

        config.model = Some("mistral".to_string());
        assert_eq!(config.model_name(), "mistral");
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let config = AppConfig {
            vector_dimension: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
