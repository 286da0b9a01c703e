//! Data models shared by providers and the resolver

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Generation method names that mean a model can produce text
const TEXT_GENERATION_METHODS: &[&str] = &["generateContent", "generate_content"];

/// A model reported by the provider's listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredModel {
    /// Model identifier without the `models/` prefix
    pub id: String,
    /// Generation methods the provider advertises for the model
    pub capabilities: HashSet<String>,
}

impl DiscoveredModel {
    /// Create a discovered model from an id and its advertised methods
    pub fn new<I, S>(id: impl Into<String>, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            capabilities: capabilities.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether the model can be used for text generation
    pub fn supports_text_generation(&self) -> bool {
        TEXT_GENERATION_METHODS
            .iter()
            .any(|method| self.capabilities.contains(*method))
    }
}

/// Reason for generation finish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    /// Model finished normally
    Stop,
    /// Maximum tokens reached
    Length,
    /// Output was blocked by safety filters
    Safety,
    /// Model encountered an error
    Error,
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: usize,
    /// Number of tokens in the completion
    pub completion_tokens: usize,
    /// Total tokens used
    pub total_tokens: usize,
}

/// A successful generation from one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    /// Model that produced the text
    pub model: String,
    /// Generated text, possibly empty
    pub text: String,
    /// Reason for completion
    pub finish_reason: FinishReason,
    /// Token usage, when reported
    pub usage: Option<TokenUsage>,
}

impl Generation {
    /// Create a generation with only model and text set
    pub fn text(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            text: text.into(),
            finish_reason: FinishReason::Stop,
            usage: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_text_generation_camel_case() {
        let model = DiscoveredModel::new("gemini-1.5-flash-002", ["generateContent", "countTokens"]);
        assert!(model.supports_text_generation());
    }

    #[test]
    fn test_supports_text_generation_snake_case() {
        let model = DiscoveredModel::new("gemini-1.5-pro", ["generate_content"]);
        assert!(model.supports_text_generation());
    }

    #[test]
    fn test_embedding_model_not_text_capable() {
        let model = DiscoveredModel::new("text-embedding-004", ["embedContent"]);
        assert!(!model.supports_text_generation());
    }
}
