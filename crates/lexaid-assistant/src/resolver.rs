//! Model resolver
//!
//! Turns a user query into generated text while working around retired or
//! renamed model identifiers. Each call tries, in order:
//! 1. the active model (or the configured default on a cold start)
//! 2. the static candidate list
//! 3. models discovered through the provider's listing endpoint
//!
//! Failures never escape as errors: every outcome is rendered as text for the
//! chat handler to forward.

use std::{
    fmt,
    sync::{Arc, RwLock},
};

use tracing::{debug, info, warn};

use crate::{
    config::AssistantConfig,
    error::ProviderError,
    fallback::{discovery_order, static_candidates},
    models::Generation,
    provider::GenerativeProvider,
    providers::GeminiClient,
};

/// Returned for blank queries
pub const EMPTY_QUERY_MESSAGE: &str = "Please provide a non-empty query.";

/// Returned when the model replies with no text
pub const NO_RESPONSE_MESSAGE: &str = "No response generated.";

/// Shared "last known good" model, reused across calls
///
/// Updates are last-writer-wins; the lock is never held across a request.
#[derive(Debug, Default)]
pub struct ResolverState {
    active: RwLock<Option<String>>,
}

impl ResolverState {
    /// Create an empty state with no active model
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently active model, if any request has succeeded
    pub fn active_model(&self) -> Option<String> {
        match self.active.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Record a successful model, returning true when it replaced another
    fn set_active(&self, model: &str) -> bool {
        let mut guard = match self.active.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if guard.as_deref() == Some(model) {
            return false;
        }
        *guard = Some(model.to_string());
        true
    }
}

/// Classified result of one generation attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// The model produced a reply
    Success(Generation),
    /// The model id is unknown or unsupported
    ModelUnavailable(String),
    /// Any other soft failure (network, quota, server error)
    Failed(String),
    /// Credential or configuration problem; no other model can succeed
    Fatal(String),
}

impl From<Result<Generation, ProviderError>> for AttemptOutcome {
    fn from(result: Result<Generation, ProviderError>) -> Self {
        match result {
            Ok(generation) => AttemptOutcome::Success(generation),
            Err(err) if err.is_fatal() => AttemptOutcome::Fatal(match err {
                ProviderError::ConfigError(message) => message,
                ProviderError::AuthError => {
                    "Gemini API key was rejected by the provider.".to_string()
                }
                other => other.to_string(),
            }),
            Err(err) if err.is_model_unavailable() => {
                AttemptOutcome::ModelUnavailable(err.to_string())
            }
            Err(err) => AttemptOutcome::Failed(err.to_string()),
        }
    }
}

/// Where in the fallback sequence an attempt happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Preferred,
    Fallback,
    Discovery,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Preferred => "preferred model",
            Phase::Fallback => "fallback",
            Phase::Discovery => "discovery",
        };
        f.write_str(label)
    }
}

/// Final result of one resolution pass
#[derive(Debug)]
enum Resolution {
    Reply(Generation),
    Fatal(String),
    Exhausted(Vec<String>),
}

/// Resolves a working model and returns its reply
pub struct ModelResolver {
    provider: Arc<dyn GenerativeProvider>,
    config: AssistantConfig,
    state: Arc<ResolverState>,
}

impl ModelResolver {
    /// Create a resolver with its own empty state
    pub fn new(provider: Arc<dyn GenerativeProvider>, config: AssistantConfig) -> Self {
        Self::with_state(provider, config, Arc::new(ResolverState::new()))
    }

    /// Create a resolver sharing an existing state
    pub fn with_state(
        provider: Arc<dyn GenerativeProvider>,
        config: AssistantConfig,
        state: Arc<ResolverState>,
    ) -> Self {
        Self {
            provider,
            config,
            state,
        }
    }

    /// Create a resolver backed by the Gemini REST client
    pub fn from_config(config: AssistantConfig) -> Result<Self, ProviderError> {
        let client = GeminiClient::from_config(&config)?;
        if !client.has_api_key() {
            warn!("Gemini API key not configured; requests will report a configuration error");
        }
        Ok(Self::new(Arc::new(client), config))
    }

    /// Currently active model, if any
    pub fn active_model(&self) -> Option<String> {
        self.state.active_model()
    }

    /// Effective configuration
    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Answer a user query, always returning displayable text
    pub async fn respond(&self, query: &str) -> String {
        let query = query.trim();
        if query.is_empty() {
            return EMPTY_QUERY_MESSAGE.to_string();
        }

        match self.resolve(query).await {
            Resolution::Reply(generation) => {
                let text = generation.text.trim();
                if text.is_empty() {
                    NO_RESPONSE_MESSAGE.to_string()
                } else {
                    text.to_string()
                }
            }
            Resolution::Fatal(reason) => format!("Configuration error: {}", reason),
            Resolution::Exhausted(attempts) => exhausted_message(&attempts),
        }
    }

    /// Text-generation models the provider currently offers, in attempt order
    pub async fn discover(&self) -> Result<Vec<String>, ProviderError> {
        let models = self.provider.list_models().await?;
        Ok(discovery_order(&models))
    }

    async fn resolve(&self, prompt: &str) -> Resolution {
        let mut attempts: Vec<String> = Vec::new();

        let preferred = self
            .state
            .active_model()
            .unwrap_or_else(|| self.config.default_model().to_string());
        if let Some(resolution) = self
            .try_candidate(&preferred, prompt, Phase::Preferred, &mut attempts)
            .await
        {
            return resolution;
        }

        for candidate in static_candidates(self.config.model_override.as_deref()) {
            if attempts.contains(&candidate) {
                continue;
            }
            if let Some(resolution) = self
                .try_candidate(&candidate, prompt, Phase::Fallback, &mut attempts)
                .await
            {
                return resolution;
            }
        }

        let discovered = match self.discover().await {
            Ok(discovered) => discovered,
            Err(e) => {
                warn!("Failed to list Gemini models: {}", e);
                Vec::new()
            }
        };
        debug!("Discovery offered {} text-generation models", discovered.len());

        for candidate in discovered {
            if attempts.contains(&candidate) {
                continue;
            }
            if let Some(resolution) = self
                .try_candidate(&candidate, prompt, Phase::Discovery, &mut attempts)
                .await
            {
                return resolution;
            }
        }

        Resolution::Exhausted(attempts)
    }

    /// Attempt one model; `None` means move on to the next candidate
    async fn try_candidate(
        &self,
        model: &str,
        prompt: &str,
        phase: Phase,
        attempts: &mut Vec<String>,
    ) -> Option<Resolution> {
        attempts.push(model.to_string());

        match AttemptOutcome::from(self.provider.generate(model, prompt).await) {
            AttemptOutcome::Success(generation) => {
                if self.state.set_active(model) {
                    info!("Gemini model switched to {} after {}", model, phase);
                }
                Some(Resolution::Reply(generation))
            }
            AttemptOutcome::Fatal(reason) => {
                warn!("Gemini request aborted on {}: {}", model, reason);
                Some(Resolution::Fatal(reason))
            }
            AttemptOutcome::ModelUnavailable(reason) => {
                warn!("Gemini model {} not found ({}): {}", model, phase, reason);
                None
            }
            AttemptOutcome::Failed(reason) => {
                warn!("Gemini model {} failed ({}): {}", model, phase, reason);
                None
            }
        }
    }
}

/// Terminal message listing every attempted model
fn exhausted_message(attempts: &[String]) -> String {
    let tried = if attempts.is_empty() {
        "<none>".to_string()
    } else {
        attempts.join(", ")
    };

    format!(
        "No compatible Gemini model was found for generateContent. Tried: {}. \
         Set GEMINI_MODEL to a supported id such as gemini-1.5-flash-002 or gemini-1.5-pro-002.",
        tried
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_starts_empty() {
        let state = ResolverState::new();
        assert!(state.active_model().is_none());
    }

    #[test]
    fn test_state_reports_changes_only() {
        let state = ResolverState::new();
        assert!(state.set_active("gemini-1.5-flash-002"));
        assert!(!state.set_active("gemini-1.5-flash-002"));
        assert!(state.set_active("gemini-1.0-pro"));
        assert_eq!(state.active_model().as_deref(), Some("gemini-1.0-pro"));
    }

    #[test]
    fn test_outcome_classification() {
        assert!(matches!(
            AttemptOutcome::from(Err(ProviderError::ModelNotAvailable("m".into()))),
            AttemptOutcome::ModelUnavailable(_)
        ));
        assert!(matches!(
            AttemptOutcome::from(Err(ProviderError::RateLimited(60))),
            AttemptOutcome::Failed(_)
        ));
        assert_eq!(
            AttemptOutcome::from(Err(ProviderError::ConfigError("no key".into()))),
            AttemptOutcome::Fatal("no key".to_string())
        );
        assert_eq!(
            AttemptOutcome::from(Err(ProviderError::AuthError)),
            AttemptOutcome::Fatal("Gemini API key was rejected by the provider.".to_string())
        );
    }

    #[test]
    fn test_outcome_fatal_matches_error_classification() {
        let errors = [
            ProviderError::AuthError,
            ProviderError::ConfigError("no key".into()),
            ProviderError::NotFound("listing".into()),
            ProviderError::RateLimited(60),
            ProviderError::NetworkError("reset".into()),
            ProviderError::ProviderError("Gemini API error: 403 Forbidden".into()),
            ProviderError::ModelNotAvailable("m".into()),
        ];

        for err in errors {
            let fatal = err.is_fatal();
            let outcome = AttemptOutcome::from(Err(err.clone()));
            assert_eq!(
                matches!(outcome, AttemptOutcome::Fatal(_)),
                fatal,
                "{:?}",
                err
            );
        }
    }

    #[test]
    fn test_exhausted_message_lists_attempts() {
        let message = exhausted_message(&["a".to_string(), "b".to_string()]);
        assert!(message.contains("Tried: a, b."));
        assert!(message.contains("GEMINI_MODEL"));
    }

    #[test]
    fn test_exhausted_message_without_attempts() {
        assert!(exhausted_message(&[]).contains("Tried: <none>."));
    }
}
