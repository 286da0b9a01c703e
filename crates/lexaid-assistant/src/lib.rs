//! LexAid assistant - Gemini-backed chat for the legal-services backend
//!
//! The [`ModelResolver`] answers free-text questions through a remote
//! generative model, falling back across candidate model ids when the
//! preferred one has been retired or renamed.

pub mod config;
pub mod error;
pub mod fallback;
pub mod handler;
pub mod models;
pub mod provider;
pub mod providers;
pub mod resolver;

// Re-export commonly used types
pub use config::{AssistantConfig, ConfigurationManager, DEFAULT_MODEL};
pub use error::ProviderError;
pub use fallback::{discovery_order, sort_by_priority, static_candidates, PRIORITY_MODELS};
pub use handler::{handle_chat, ChatQuery, ChatReply};
pub use models::{DiscoveredModel, FinishReason, Generation, TokenUsage};
pub use provider::GenerativeProvider;
pub use providers::GeminiClient;
pub use resolver::{
    AttemptOutcome, ModelResolver, ResolverState, EMPTY_QUERY_MESSAGE, NO_RESPONSE_MESSAGE,
};
