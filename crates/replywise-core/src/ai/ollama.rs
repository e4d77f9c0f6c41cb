use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{check_status, non_empty, ReplyGenerator, ReplyRequest};
use crate::error::GenerateError;
use crate::prompt::build_transcript;
use crate::state::ChatMessage;

pub const DEFAULT_URL: &str = "http://localhost:11434";

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: Option<OllamaMessage>,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

#[derive(Deserialize)]
struct OllamaModelsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Models pulled into the local Ollama install
    pub async fn list_models(&self) -> Result<Vec<String>, GenerateError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        check_status(status, &body)?;

        let models_response: OllamaModelsResponse =
            serde_json::from_str(&body).map_err(|e| GenerateError::Transport(e.to_string()))?;
        Ok(models_response
            .models
            .into_iter()
            .map(|model| model.name)
            .collect())
    }

    fn build_request(&self, request: &ReplyRequest) -> OllamaRequest {
        OllamaRequest {
            model: self.model.clone(),
            messages: build_transcript(request),
            stream: false,
        }
    }
}

fn parse_reply(body: &str) -> Result<String, GenerateError> {
    let response: OllamaResponse =
        serde_json::from_str(body).map_err(|_| GenerateError::EmptyResponse)?;
    non_empty(response.message.map(|m| m.content))
}

#[async_trait]
impl ReplyGenerator for OllamaClient {
    async fn generate(&self, request: &ReplyRequest) -> Result<String, GenerateError> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&self.build_request(request))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        if let Err(err) = check_status(status, &body) {
            tracing::warn!(status, model = %self.model, "ollama request failed, is `ollama serve` running?");
            return Err(err);
        }

        parse_reply(&body)
    }
}
