//! Chat request/response payloads for the HTTP layer
//!
//! Resolver failures are still `{"response": ...}`; only malformed requests
//! produce the `{"error", "detail"}` shape.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::resolver::ModelResolver;

/// Chat request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatQuery {
    /// The user's question
    pub query: String,
}

/// Chat response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatReply {
    /// Text to show the user
    Response { response: String },
    /// Handler-level failure
    Error { error: String, detail: String },
}

impl ChatReply {
    /// Build a successful reply
    pub fn response(text: impl Into<String>) -> Self {
        ChatReply::Response {
            response: text.into(),
        }
    }

    /// Build an error reply
    pub fn error(error: impl Into<String>, detail: impl Into<String>) -> Self {
        ChatReply::Error {
            error: error.into(),
            detail: detail.into(),
        }
    }

    /// Whether this is a handler-level error
    pub fn is_error(&self) -> bool {
        matches!(self, ChatReply::Error { .. })
    }

    /// Text a client should display
    pub fn text(&self) -> &str {
        match self {
            ChatReply::Response { response } => response,
            ChatReply::Error { error, .. } => error,
        }
    }
}

/// Parse a JSON chat request and answer it
pub async fn handle_chat(resolver: &ModelResolver, body: &str) -> ChatReply {
    let request: ChatQuery = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected malformed chat request: {}", e);
            return ChatReply::error("Invalid chat request", e.to_string());
        }
    };

    ChatReply::response(resolver.respond(&request.query).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_serialization() {
        let json = serde_json::to_value(ChatReply::response("hello")).unwrap();
        assert_eq!(json, serde_json::json!({"response": "hello"}));
    }

    #[test]
    fn test_error_serialization() {
        let json = serde_json::to_value(ChatReply::error("Invalid chat request", "missing field")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"error": "Invalid chat request", "detail": "missing field"})
        );
    }

    #[test]
    fn test_reply_round_trips_by_shape() {
        let reply: ChatReply =
            serde_json::from_str(r#"{"error": "boom", "detail": "bad"}"#).unwrap();
        assert!(reply.is_error());
        assert_eq!(reply.text(), "boom");
    }
}
