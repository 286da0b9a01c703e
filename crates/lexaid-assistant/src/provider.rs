//! Provider trait

use async_trait::async_trait;

use crate::{
    error::ProviderError,
    models::{DiscoveredModel, Generation},
};

/// Core trait for a remote generative-language service
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Get the provider's unique identifier
    fn id(&self) -> &str;

    /// Generate text for a single prompt with the given model
    async fn generate(&self, model: &str, prompt: &str) -> Result<Generation, ProviderError>;

    /// List the models the provider currently offers
    async fn list_models(&self) -> Result<Vec<DiscoveredModel>, ProviderError>;
}
