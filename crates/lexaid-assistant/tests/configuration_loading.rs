//! Configuration loading from the real process environment

use lexaid_assistant::{ConfigurationManager, DEFAULT_MODEL};

const VARS: &[&str] = &[
    "GEMINI_API_KEY",
    "GOOGLE_API_KEY",
    "GEMINI_MODEL",
    "GEMINI_BASE_URL",
    "LEXAID_TIMEOUT_SECS",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial_test::serial]
fn test_load_from_env_reads_gemini_variables() {
    clear_env();
    std::env::set_var("GOOGLE_API_KEY", "google-key");
    std::env::set_var("GEMINI_MODEL", "gemini-1.5-pro-002");
    std::env::set_var("LEXAID_TIMEOUT_SECS", "45");

    let mut manager = ConfigurationManager::new();
    manager.load_from_env().unwrap();
    clear_env();

    let config = manager.config();
    assert_eq!(config.api_key.as_deref(), Some("google-key"));
    assert_eq!(config.default_model(), "gemini-1.5-pro-002");
    assert_eq!(config.timeout_secs, 45);
}

#[test]
#[serial_test::serial]
fn test_load_from_env_without_variables_keeps_defaults() {
    clear_env();

    let mut manager = ConfigurationManager::new();
    manager.load_from_env().unwrap();

    let config = manager.config();
    assert!(!config.has_api_key());
    assert_eq!(config.default_model(), DEFAULT_MODEL);
}

#[test]
#[serial_test::serial]
fn test_blank_model_variable_is_ignored() {
    clear_env();
    std::env::set_var("GEMINI_MODEL", "   ");

    let mut manager = ConfigurationManager::new();
    manager.load_from_env().unwrap();
    clear_env();

    assert!(manager.config().model_override.is_none());
}
