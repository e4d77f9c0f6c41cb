//! Error taxonomy shared by the core and every front end.

use thiserror::Error;

/// Problems caught locally, before anything is sent over the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Paste a message first")]
    EmptyMessage,

    #[error("Type an instruction first")]
    EmptyInstruction,

    #[error("There is no conversation to refine yet")]
    NoMessages,

    #[error("Select a role first")]
    NoRoleSelected,

    #[error("Set a goal first")]
    NoGoalSelected,

    #[error("A reply is already being drafted")]
    AlreadyGenerating,

    #[error("{0} cannot be empty")]
    EmptyField(&'static str),
}

/// Failures reported by a [`crate::ReplyGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("Rate limit exceeded. Please try again in a moment.")]
    RateLimited,

    #[error("AI credits exhausted. Please add credits to continue.")]
    QuotaExhausted,

    #[error("Reply service error {status}: {message}")]
    Service { status: u16, message: String },

    #[error("No reply was generated")]
    EmptyResponse,

    #[error("Could not reach the reply service: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for GenerateError {
    fn from(err: reqwest::Error) -> Self {
        GenerateError::Transport(err.to_string())
    }
}

/// Everything a conversation operation can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Generate(#[from] GenerateError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("{provider} needs `{setting}` to be configured")]
    MissingSetting {
        provider: &'static str,
        setting: &'static str,
    },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
