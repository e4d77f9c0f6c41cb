//! Roles, goals and conversation messages.
//!
//! Field names serialize in camelCase so these types can be sent to the
//! hosted reply function as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Formal,
    Casual,
    Friendly,
    Professional,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Formal => "formal",
            Tone::Casual => "casual",
            Tone::Friendly => "friendly",
            Tone::Professional => "professional",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "formal" => Some(Tone::Formal),
            "casual" => Some(Tone::Casual),
            "friendly" => Some(Tone::Friendly),
            "professional" => Some(Tone::Professional),
            _ => None,
        }
    }

    pub fn all() -> Vec<Tone> {
        vec![Tone::Formal, Tone::Casual, Tone::Friendly, Tone::Professional]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Tone::Formal => "Formal",
            Tone::Casual => "Casual",
            Tone::Friendly => "Friendly",
            Tone::Professional => "Professional",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLength {
    Concise,
    Moderate,
    Detailed,
}

impl MessageLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageLength::Concise => "concise",
            MessageLength::Moderate => "moderate",
            MessageLength::Detailed => "detailed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "concise" => Some(MessageLength::Concise),
            "moderate" => Some(MessageLength::Moderate),
            "detailed" => Some(MessageLength::Detailed),
            _ => None,
        }
    }

    pub fn all() -> Vec<MessageLength> {
        vec![
            MessageLength::Concise,
            MessageLength::Moderate,
            MessageLength::Detailed,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MessageLength::Concise => "Concise",
            MessageLength::Moderate => "Moderate",
            MessageLength::Detailed => "Detailed",
        }
    }

    /// How the length preference is phrased to the model
    pub fn guidance(&self) -> &'static str {
        match self {
            MessageLength::Concise => "keep it brief and to the point",
            MessageLength::Moderate => "use a balanced, moderate length",
            MessageLength::Detailed => "be thorough and comprehensive",
        }
    }
}

/// A communication persona the user writes as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tone: Tone,
    pub message_length: MessageLength,
    /// Opaque icon token, resolved by the front end
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

/// What the user wants to achieve in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub label: String,
    pub description: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Text the other party sent, pasted in by the user
    Received,
    /// A drafted reply produced by the generator
    Suggested,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn is_suggestion(&self) -> bool {
        self.kind == MessageKind::Suggested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_camel_case() {
        let role = Role {
            id: "r".to_string(),
            name: "Freelancer".to_string(),
            description: "d".to_string(),
            tone: Tone::Professional,
            message_length: MessageLength::Moderate,
            icon: "💼".to_string(),
            is_favorite: None,
        };
        let json = serde_json::to_value(&role).unwrap();
        assert_eq!(json["messageLength"], "moderate");
        assert_eq!(json["tone"], "professional");
        assert!(json.get("isFavorite").is_none());
    }

    #[test]
    fn test_tone_from_str_is_case_insensitive() {
        assert_eq!(Tone::from_str("Friendly"), Some(Tone::Friendly));
        assert_eq!(Tone::from_str("loud"), None);
        assert_eq!(MessageLength::from_str("DETAILED"), Some(MessageLength::Detailed));
    }

    #[test]
    fn test_message_kind_uses_type_field() {
        let msg = Message {
            id: "1".to_string(),
            content: "hi".to_string(),
            kind: MessageKind::Received,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "received");
    }
}
