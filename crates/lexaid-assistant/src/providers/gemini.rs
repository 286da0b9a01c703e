//! Google Gemini provider implementation
//!
//! Talks to the Generative Language REST API: `generateContent` for text and
//! the model listing endpoint for discovery.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::{
    config::{AssistantConfig, DEFAULT_BASE_URL},
    error::ProviderError,
    models::{DiscoveredModel, FinishReason, Generation, TokenUsage},
    provider::GenerativeProvider,
};

/// Header carrying the credential, keeps the key out of request URLs
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Listing page size requested from the API
const LIST_PAGE_SIZE: &str = "1000";

/// Upper bound on listing pages followed in one discovery pass
const MAX_LIST_PAGES: usize = 10;

/// Message returned for every call when no credential is configured
pub const MISSING_API_KEY_MESSAGE: &str = "Gemini API key not set on server.";

/// Google Gemini provider implementation
pub struct GeminiClient {
    api_key: Option<String>,
    client: Arc<Client>,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client against the public endpoint
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_client_and_base_url(
            Arc::new(Client::new()),
            api_key,
            DEFAULT_BASE_URL.to_string(),
        )
    }

    /// Create a Gemini client from assistant configuration
    pub fn from_config(config: &AssistantConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(format!("LexAid/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ProviderError::ConfigError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self::with_client_and_base_url(
            Arc::new(client),
            config.api_key.clone(),
            config.base_url.clone(),
        ))
    }

    /// Create a Gemini client with a custom base URL
    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self::with_client_and_base_url(Arc::new(Client::new()), api_key, base_url.into())
    }

    /// Create a Gemini client with a custom HTTP client and base URL
    pub fn with_client_and_base_url(
        client: Arc<Client>,
        api_key: Option<String>,
        base_url: String,
    ) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Whether a credential is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ProviderError::ConfigError(MISSING_API_KEY_MESSAGE.to_string()))
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.base_url)
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/{}:generateContent", self.models_url(), model)
    }

    /// Convert a Gemini API response into a generation
    fn convert_response(response: GeminiGenerateResponse, model: &str) -> Generation {
        let candidate = response.candidates.first();

        let text = candidate
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default();

        let blocked = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_ref())
            .is_some();

        let finish_reason = match candidate.and_then(|c| c.finish_reason.as_deref()) {
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST")
            | Some("PROHIBITED_CONTENT") | Some("SPII") => FinishReason::Safety,
            Some("OTHER") => FinishReason::Error,
            None if blocked => FinishReason::Safety,
            _ => FinishReason::Stop,
        };

        let usage = response.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Generation {
            model: model.to_string(),
            text,
            finish_reason,
            usage,
        }
    }

    /// Map a non-success status into a provider error
    ///
    /// `model` is `None` for the listing endpoint. A 403 is only a credential
    /// failure when the body blames the key; otherwise the key just lacks
    /// access to that one model.
    fn error_for_status(status: StatusCode, body: &str, model: Option<&str>) -> ProviderError {
        let lowered = body.to_lowercase();
        let key_rejected = body.contains("API_KEY_") || lowered.contains("api key");
        let unsupported = lowered.contains("not supported") || lowered.contains("not found");

        match (status.as_u16(), model) {
            (401, _) => ProviderError::AuthError,
            (400 | 403, _) if key_rejected => ProviderError::AuthError,
            (404, Some(model)) => ProviderError::ModelNotAvailable(model.to_string()),
            (404, None) => ProviderError::NotFound("Gemini model listing".to_string()),
            (400, Some(model)) if unsupported => {
                ProviderError::ModelNotAvailable(model.to_string())
            }
            (429, _) => ProviderError::RateLimited(60),
            _ => ProviderError::ProviderError(format!("Gemini API error: {}", status)),
        }
    }
}

/// Strip the `models/` resource prefix from an identifier
pub fn short_model_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

#[async_trait]
impl GenerativeProvider for GeminiClient {
    fn id(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<Generation, ProviderError> {
        let api_key = self.api_key()?;
        let model = short_model_id(model.trim());
        if model.is_empty() {
            return Err(ProviderError::InvalidModel(model.to_string()));
        }

        let request = GeminiGenerateRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        debug!("Sending generateContent request to Gemini for model: {}", model);

        let response = self
            .client
            .post(self.generate_url(model))
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let err = ProviderError::from(e);
                error!("Gemini API request failed: {}", err);
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error for {} ({}): {}", model, status, error_text);
            return Err(Self::error_for_status(status, &error_text, Some(model)));
        }

        let gemini_response: GeminiGenerateResponse = response.json().await?;
        let generation = Self::convert_response(gemini_response, model);

        if let Some(usage) = &generation.usage {
            debug!(
                "Gemini {} used {} prompt + {} completion tokens",
                model, usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(generation)
    }

    async fn list_models(&self) -> Result<Vec<DiscoveredModel>, ProviderError> {
        let api_key = self.api_key()?;
        let mut discovered = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_LIST_PAGES {
            debug!("Listing Gemini models (page token: {:?})", page_token);

            let mut request = self
                .client
                .get(self.models_url())
                .header(API_KEY_HEADER, api_key)
                .query(&[("pageSize", LIST_PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await.map_err(|e| {
                let err = ProviderError::from(e);
                warn!("Gemini model listing failed: {}", err);
                err
            })?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                error!("Gemini model listing error ({}): {}", status, error_text);
                return Err(Self::error_for_status(status, &error_text, None));
            }

            let page: GeminiListResponse = response.json().await?;
            discovered.extend(page.models.into_iter().filter_map(|entry| {
                let id = short_model_id(entry.name.trim());
                if id.is_empty() {
                    None
                } else {
                    Some(DiscoveredModel::new(id, entry.supported_generation_methods))
                }
            }));

            page_token = page.next_page_token.filter(|token| !token.is_empty());
            if page_token.is_none() {
                break;
            }
        }

        debug!("Gemini listing returned {} models", discovered.len());
        Ok(discovered)
    }
}

/// Gemini API request format
#[derive(Debug, Serialize)]
struct GeminiGenerateRequest {
    contents: Vec<GeminiContent>,
}

/// Gemini API content format
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// Gemini API part format; non-text parts carry no `text`
#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

/// Gemini API response format
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerateResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
    #[serde(default)]
    total_token_count: usize,
}

/// Model listing page
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiListResponse {
    #[serde(default)]
    models: Vec<GeminiModelEntry>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModelEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}
