// Command routing and dispatch

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lexaid_assistant::{AssistantConfig, ChatReply, ConfigurationManager, ModelResolver};

/// LexAid - legal chat assistant backed by Gemini
#[derive(Parser, Debug)]
#[command(name = "lexaid")]
#[command(bin_name = "lexaid")]
#[command(about = "Ask the LexAid legal assistant a question")]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Preferred Gemini model (overrides GEMINI_MODEL)
    #[arg(long, global = true, value_name = "ID")]
    pub model: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Ask a question and print the reply
    #[command(about = "Ask a question and print the chat reply")]
    Ask {
        /// Question text
        #[arg(value_name = "QUERY", num_args = 1.., trailing_var_arg = true)]
        query: Vec<String>,

        /// Print the reply text instead of the JSON payload
        #[arg(long)]
        plain: bool,
    },

    /// List models available for text generation
    #[command(about = "List Gemini models that support text generation, in fallback order")]
    Models,

    /// Show the effective configuration
    #[command(about = "Show the effective configuration (API key redacted)")]
    Config,
}

/// Command router
pub struct CommandRouter;

impl CommandRouter {
    /// Execute a parsed command
    pub async fn execute(cli: Cli) -> Result<()> {
        let mut manager = ConfigurationManager::new();
        manager
            .load_with_precedence()
            .context("Failed to load configuration")?;
        if let Some(model) = cli.model.as_deref().map(str::trim) {
            if !model.is_empty() {
                manager.config_mut().model_override = Some(model.to_string());
            }
        }
        let config = manager.into_config();

        match cli.command {
            Commands::Ask { query, plain } => {
                let resolver = ModelResolver::from_config(config)?;
                let reply = ChatReply::response(resolver.respond(&query.join(" ")).await);
                if plain {
                    println!("{}", reply.text());
                } else {
                    println!("{}", serde_json::to_string_pretty(&reply)?);
                }
            }
            Commands::Models => {
                let resolver = ModelResolver::from_config(config)?;
                let models = resolver
                    .discover()
                    .await
                    .context("Failed to list Gemini models")?;
                if models.is_empty() {
                    println!("No text-generation models reported.");
                }
                for model in models {
                    println!("{}", model);
                }
            }
            Commands::Config => {
                println!("{}", render_config(&config));
            }
        }

        Ok(())
    }
}

/// Human-readable configuration summary; never includes the key itself
fn render_config(config: &AssistantConfig) -> String {
    format!(
        "{:#?}\napi key: {}\ndefault model: {}",
        config,
        if config.has_api_key() { "set" } else { "not set" },
        config.default_model()
    )
}
