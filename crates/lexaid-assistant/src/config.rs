//! Configuration management for the assistant
//!
//! Settings are layered with the following precedence (highest wins):
//! 1. Environment variables
//! 2. Project config (`./.lexaid/config.yaml`)
//! 3. Global config (`~/.lexaid/config.yaml`)
//! 4. Built-in defaults

use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::error::ProviderError;

/// Model used when no override is configured
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-002";

/// Public Gemini REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Per-request timeout applied by the HTTP client
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variables checked for the credential, in order
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Environment variable overriding the preferred model
pub const MODEL_ENV_VAR: &str = "GEMINI_MODEL";

/// Environment variable overriding the API base URL
pub const BASE_URL_ENV_VAR: &str = "GEMINI_BASE_URL";

/// Environment variable overriding the request timeout
pub const TIMEOUT_ENV_VAR: &str = "LEXAID_TIMEOUT_SECS";

/// Effective assistant configuration
#[derive(Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    /// Provider credential
    pub api_key: Option<String>,
    /// Preferred model, tried before the built-in candidate list
    pub model_override: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model_override: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AssistantConfig {
    /// Create a config with just a credential set
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: non_blank(api_key.into()),
            ..Default::default()
        }
    }

    /// Set the preferred model
    pub fn with_model_override(mut self, model: impl Into<String>) -> Self {
        self.model_override = non_blank(model.into());
        self
    }

    /// Set the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Model tried first on a cold start
    pub fn default_model(&self) -> &str {
        self.model_override.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// Whether a credential is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model_override", &self.model_override)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// On-disk config layer; every field is optional so files can be merged
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

/// Configuration manager for loading and validating assistant configuration
pub struct ConfigurationManager {
    config: AssistantConfig,
}

impl ConfigurationManager {
    /// Create a new configuration manager with default settings
    pub fn new() -> Self {
        Self {
            config: AssistantConfig::default(),
        }
    }

    /// Load configuration from files and the process environment
    pub fn load_with_precedence(&mut self) -> Result<(), ProviderError> {
        if let Some(global_config_path) = Self::get_global_config_path() {
            self.merge_from_file(&global_config_path)?;
        }

        self.merge_from_file(&Self::get_project_config_path())?;
        self.load_from_env()?;
        self.validate()
    }

    /// Get the global configuration path
    pub fn get_global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".lexaid").join("config.yaml"))
    }

    /// Get the project configuration path
    pub fn get_project_config_path() -> PathBuf {
        PathBuf::from("./.lexaid/config.yaml")
    }

    /// Apply environment variables on top of the current configuration
    pub fn load_from_env(&mut self) -> Result<(), ProviderError> {
        self.apply_env(|name| std::env::var(name).ok())
    }

    /// Apply environment-style overrides using the given lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).and_then(non_blank);

        if let Some(api_key) = API_KEY_ENV_VARS.iter().find_map(|name| lookup(*name)) {
            self.config.api_key = Some(api_key);
        }

        if let Some(model) = lookup(MODEL_ENV_VAR) {
            self.config.model_override = Some(model);
        }

        if let Some(base_url) = lookup(BASE_URL_ENV_VAR) {
            self.config.base_url = base_url;
        }

        if let Some(timeout) = lookup(TIMEOUT_ENV_VAR) {
            self.config.timeout_secs = timeout.trim().parse().map_err(|_| {
                ProviderError::ConfigError(format!(
                    "Invalid {} value '{}': expected whole seconds",
                    TIMEOUT_ENV_VAR, timeout
                ))
            })?;
        }

        Ok(())
    }

    /// Merge configuration from a YAML file (missing files are skipped)
    pub fn merge_from_file(&mut self, path: &Path) -> Result<(), ProviderError> {
        if !path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        let file: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(&content)?
        };

        if let Some(api_key) = file.api_key.and_then(non_blank) {
            self.config.api_key = Some(api_key);
        }
        if let Some(model) = file.model.and_then(non_blank) {
            self.config.model_override = Some(model);
        }
        if let Some(base_url) = file.base_url.and_then(non_blank) {
            self.config.base_url = base_url;
        }
        if let Some(timeout_secs) = file.timeout_secs {
            self.config.timeout_secs = timeout_secs;
        }

        Ok(())
    }

    /// Validate the current configuration
    ///
    /// A missing credential is not an error here; the resolver reports it per request.
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.config.base_url.trim().is_empty() {
            return Err(ProviderError::ConfigError(
                "Base URL must not be empty".to_string(),
            ));
        }

        if self.config.timeout_secs == 0 {
            return Err(ProviderError::ConfigError(
                "Invalid timeout: must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the current configuration
    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Get mutable configuration
    pub fn config_mut(&mut self) -> &mut AssistantConfig {
        &mut self.config
    }

    /// Consume the manager and return the configuration
    pub fn into_config(self) -> AssistantConfig {
        self.config
    }
}

impl Default for ConfigurationManager {
    fn default() -> Self {
        Self::new()
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AssistantConfig::default();
        assert!(!config.has_api_key());
        assert_eq!(config.default_model(), DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_gemini_key_preferred_over_google_key() {
        let mut manager = ConfigurationManager::new();
        manager
            .apply_env(env_from(&[
                ("GEMINI_API_KEY", "gemini-key"),
                ("GOOGLE_API_KEY", "google-key"),
            ]))
            .unwrap();
        assert_eq!(manager.config().api_key.as_deref(), Some("gemini-key"));
    }

    #[test]
    fn test_google_key_used_when_gemini_key_blank() {
        let mut manager = ConfigurationManager::new();
        manager
            .apply_env(env_from(&[
                ("GEMINI_API_KEY", "   "),
                ("GOOGLE_API_KEY", "google-key"),
            ]))
            .unwrap();
        assert_eq!(manager.config().api_key.as_deref(), Some("google-key"));
    }

    #[test]
    fn test_model_override_from_env() {
        let mut manager = ConfigurationManager::new();
        manager
            .apply_env(env_from(&[("GEMINI_MODEL", "gemini-1.5-pro-002")]))
            .unwrap();
        assert_eq!(manager.config().default_model(), "gemini-1.5-pro-002");
    }

    #[test]
    fn test_invalid_timeout_is_config_error() {
        let mut manager = ConfigurationManager::new();
        let result = manager.apply_env(env_from(&[("LEXAID_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(ProviderError::ConfigError(_))));
    }

    #[test]
    fn test_file_then_env_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api_key: file-key\nmodel: gemini-1.0-pro\ntimeout_secs: 12"
        )
        .unwrap();

        let mut manager = ConfigurationManager::new();
        manager.merge_from_file(file.path()).unwrap();
        assert_eq!(manager.config().api_key.as_deref(), Some("file-key"));
        assert_eq!(manager.config().timeout_secs, 12);

        manager
            .apply_env(env_from(&[("GEMINI_MODEL", "gemini-1.5-flash-8b")]))
            .unwrap();
        assert_eq!(manager.config().default_model(), "gemini-1.5-flash-8b");
        assert_eq!(manager.config().api_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let mut manager = ConfigurationManager::new();
        let result = manager.merge_from_file(Path::new("/nonexistent/lexaid/config.yaml"));
        assert!(result.is_ok());
        assert_eq!(manager.config(), &AssistantConfig::default());
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs: [not, a, number]").unwrap();

        let mut manager = ConfigurationManager::new();
        let result = manager.merge_from_file(file.path());
        assert!(matches!(result, Err(ProviderError::ConfigError(_))));
    }

    #[test]
    fn test_zero_timeout_fails_validation() {
        let mut manager = ConfigurationManager::new();
        manager.config_mut().timeout_secs = 0;
        assert!(manager.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = AssistantConfig::with_api_key("super-secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
