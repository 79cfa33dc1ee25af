//! Config command - show the effective configuration

use clap::Args;
use reviewbot_core::{Config, Secrets};

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Create a secrets template at ~/.config/reviewbot/secrets.toml
    #[arg(long)]
    pub init_secrets: bool,
}

impl ConfigArgs {
    /// Create the secrets template; needs no loaded configuration
    pub fn create_secrets_template(&self) -> anyhow::Result<()> {
        let path = Secrets::create_template()?;
        println!("Created secrets template at {}", path.display());
        println!("Edit it and add a token with models:read permission.");
        Ok(())
    }

    /// Print the effective configuration
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        println!("reviewbot Configuration");
        println!("=======================");
        println!();
        println!("Inference Settings:");
        println!("  endpoint: {}", config.inference.endpoint);
        println!("  model: {}", config.inference.model);
        println!("  api_version: {}", config.inference.api_version);
        println!("  timeout: {:?}", config.inference.timeout);
        println!("  token_env: {}", config.inference.token_env);
        println!();
        println!("Review Settings:");
        println!(
            "  instructions: {}",
            if config.review.instructions.is_some() {
                "(custom)"
            } else {
                "(built-in)"
            }
        );
        println!("  artifact_path: {}", config.review.artifact_path.display());
        println!();

        if let Some(path) = Config::default_config_path() {
            println!("Config file: {}", path.display());
            if path.exists() {
                println!("  (exists)");
            } else {
                println!("  (not found - using defaults)");
            }
        }

        let token_found = Secrets::load()
            .ok()
            .and_then(|s| s.inference_credential(&config.inference.token_env).ok())
            .is_some();
        println!(
            "Inference token: {}",
            if token_found { "found" } else { "missing" }
        );

        Ok(())
    }
}
