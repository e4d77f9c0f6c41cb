//! Reply generation backends.
//!
//! Every backend takes the same [`ReplyRequest`] and answers with plain
//! reply text or a [`GenerateError`]. Status handling is shared so all
//! backends report rate limits and quota problems the same way.

pub mod gateway;
pub mod ollama;
pub mod openai;

pub use gateway::GatewayClient;
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerateError;
use crate::model::{Goal, Message, MessageKind, MessageLength, Role, Tone};

/// One message of conversation history as sent upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleContext {
    pub name: String,
    pub description: String,
    pub tone: Tone,
    pub message_length: MessageLength,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalContext {
    pub label: String,
    pub description: String,
}

/// Everything a backend needs to draft one reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub messages: Vec<HistoryEntry>,
    pub role: RoleContext,
    pub goal: GoalContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refinement_instruction: Option<String>,
}

impl ReplyRequest {
    pub fn new(messages: &[Message], role: &Role, goal: &Goal, instruction: Option<&str>) -> Self {
        Self {
            messages: messages
                .iter()
                .map(|m| HistoryEntry {
                    content: m.content.clone(),
                    kind: m.kind,
                })
                .collect(),
            role: RoleContext {
                name: role.name.clone(),
                description: role.description.clone(),
                tone: role.tone,
                message_length: role.message_length,
            },
            goal: GoalContext {
                label: goal.label.clone(),
                description: goal.description.clone(),
            },
            refinement_instruction: instruction.map(str::to_string),
        }
    }
}

#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, request: &ReplyRequest) -> Result<String, GenerateError>;
}

/// Map a non-success status to the error taxonomy
pub(crate) fn check_status(status: u16, body: &str) -> Result<(), GenerateError> {
    match status {
        200..=299 => Ok(()),
        429 => Err(GenerateError::RateLimited),
        402 => Err(GenerateError::QuotaExhausted),
        _ => Err(GenerateError::Service {
            status,
            message: error_message(body),
        }),
    }
}

/// Pull a readable message out of an error body.
/// Understands `{"error": "..."}` and `{"error": {"message": "..."}}`.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let error = &value["error"];
        if let Some(msg) = error.as_str() {
            return msg.to_string();
        }
        if let Some(msg) = error["message"].as_str() {
            return msg.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Failed to generate reply".to_string()
    } else {
        trimmed.chars().take(300).collect()
    }
}

/// Trim the reply, treating blank text as no reply at all
pub(crate) fn non_empty(reply: Option<String>) -> Result<String, GenerateError> {
    match reply.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(GenerateError::EmptyResponse),
    }
}
