use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{check_status, non_empty, ReplyGenerator, ReplyRequest};
use crate::error::GenerateError;
use crate::prompt::build_transcript;
use crate::state::ChatMessage;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

/// Any OpenAI-compatible chat completions endpoint, including AI gateways
#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAIClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn build_request(&self, request: &ReplyRequest) -> OpenAIRequest {
        OpenAIRequest {
            model: self.model.clone(),
            messages: build_transcript(request),
        }
    }
}

fn parse_reply(body: &str) -> Result<String, GenerateError> {
    let response: OpenAIResponse =
        serde_json::from_str(body).map_err(|_| GenerateError::EmptyResponse)?;
    non_empty(
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content),
    )
}

#[async_trait]
impl ReplyGenerator for OpenAIClient {
    async fn generate(&self, request: &ReplyRequest) -> Result<String, GenerateError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.build_request(request))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        if let Err(err) = check_status(status, &body) {
            tracing::warn!(status, model = %self.model, "chat completions error");
            return Err(err);
        }

        parse_reply(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{GoalContext, HistoryEntry, RoleContext};
    use crate::model::{MessageKind, MessageLength, Tone};

    #[test]
    fn test_request_body() {
        let client = OpenAIClient::new("https://gateway.example/v1/", "key", "gpt-4o-mini");
        assert_eq!(client.base_url, "https://gateway.example/v1");

        let request = ReplyRequest {
            messages: vec![HistoryEntry {
                content: "hello".to_string(),
                kind: MessageKind::Received,
            }],
            role: RoleContext {
                name: "Manager".to_string(),
                description: "Decisive".to_string(),
                tone: Tone::Professional,
                message_length: MessageLength::Concise,
            },
            goal: GoalContext {
                label: "Clarify".to_string(),
                description: "Get clear information".to_string(),
            },
            refinement_instruction: None,
        };

        let json = serde_json::to_value(client.build_request(&request)).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hello");
    }

    #[test]
    fn test_parse_reply() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": " Sounds good! "}}]}"#;
        assert_eq!(parse_reply(body), Ok("Sounds good!".to_string()));
    }

    #[test]
    fn test_parse_reply_empty_choices() {
        assert_eq!(parse_reply(r#"{"choices": []}"#), Err(GenerateError::EmptyResponse));
        assert_eq!(
            parse_reply(r#"{"choices": [{"message": {"content": null}}]}"#),
            Err(GenerateError::EmptyResponse)
        );
    }
}
