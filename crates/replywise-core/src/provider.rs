use std::sync::Arc;

use reqwest::Client;

use crate::ai::{ollama, openai, GatewayClient, OllamaClient, OpenAIClient, ReplyGenerator};
use crate::config::Config;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gateway,
    OpenAI,
    Ollama,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gateway => "gateway",
            Provider::OpenAI => "openai",
            Provider::Ollama => "ollama",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gateway" => Some(Provider::Gateway),
            "openai" => Some(Provider::OpenAI),
            "ollama" => Some(Provider::Ollama),
            _ => None,
        }
    }

    pub fn all() -> Vec<Provider> {
        vec![Provider::Gateway, Provider::OpenAI, Provider::Ollama]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Gateway => "Reply function (hosted)",
            Provider::OpenAI => "Chat completions (OpenAI-compatible)",
            Provider::Ollama => "Ollama (Local)",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gateway => "google/gemini-2.5-flash",
            Provider::OpenAI => "gpt-4o-mini",
            Provider::Ollama => "llama3.2:latest",
        }
    }
}

/// Build the reply generator selected by the config
pub fn build_generator(config: &Config) -> Result<Arc<dyn ReplyGenerator>, ConfigError> {
    let provider = config.provider()?;

    let client = match config.request_timeout() {
        Some(timeout) => Client::builder().timeout(timeout).build()?,
        None => Client::new(),
    };

    let generator: Arc<dyn ReplyGenerator> = match provider {
        Provider::Gateway => {
            let url = config.gateway_url.as_deref().ok_or(ConfigError::MissingSetting {
                provider: Provider::Gateway.as_str(),
                setting: "gateway_url",
            })?;
            Arc::new(
                GatewayClient::new(url, config.gateway_key.as_deref()).with_http_client(client),
            )
        }
        Provider::OpenAI => {
            let api_key = config
                .openai_api_key
                .as_deref()
                .ok_or(ConfigError::MissingSetting {
                    provider: Provider::OpenAI.as_str(),
                    setting: "openai_api_key",
                })?;
            let base_url = config
                .openai_base_url
                .as_deref()
                .unwrap_or(openai::DEFAULT_BASE_URL);
            Arc::new(
                OpenAIClient::new(base_url, api_key, &config.model_for(provider))
                    .with_http_client(client),
            )
        }
        Provider::Ollama => {
            let url = config.ollama_url.as_deref().unwrap_or(ollama::DEFAULT_URL);
            Arc::new(OllamaClient::new(url, &config.model_for(provider)).with_http_client(client))
        }
    };

    tracing::info!(provider = provider.as_str(), "reply generator ready");
    Ok(generator)
}
