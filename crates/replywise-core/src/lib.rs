pub mod ai;
pub mod config;
pub mod conversation;
pub mod defaults;
pub mod draft;
pub mod error;
pub mod model;
pub mod prompt;
pub mod provider;
pub mod state;
pub mod store;

// Re-export main types for convenience
pub use ai::{GatewayClient, OllamaClient, OpenAIClient, ReplyGenerator, ReplyRequest};
pub use config::Config;
pub use conversation::{Completion, Conversation, GenerationKind, PendingGeneration, Phase, QUICK_REFINEMENTS};
pub use draft::{GoalDraft, RoleDraft};
pub use error::{ConfigError, GenerateError, ReplyError, ValidationError};
pub use model::{Goal, Message, MessageKind, MessageLength, Role, Tone};
pub use provider::{build_generator, Provider};
pub use state::{ChatMessage, ChatRole};
pub use store::{Collection, Entity, Library};
