//! Run the bot service
//!
//! Loads (or creates) the operator configuration, resolves the bot token,
//! wires the gateway, inspector and gate together, and enters the long-poll
//! event loop until the process is stopped.

use super::config::{default_config_path, PorteiroConfig};
use porteiro::telegram::{BotApiClient, GateConfig, MembershipGate, ProfileInspector};
use std::path::PathBuf;
use tracing::info;

/// Environment variable that overrides the configured bot token.
const TOKEN_ENV_VAR: &str = "PORTEIRO_BOT_TOKEN";

pub async fn execute(config_path: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    // Load or create configuration
    let config = if config_path.exists() {
        PorteiroConfig::load(&config_path)?
    } else {
        eprintln!(
            "No config file found. Creating default configuration at {}",
            config_path.display()
        );
        PorteiroConfig::create_default(&config_path)?;
        PorteiroConfig::load(&config_path)?
    };

    init_logging(&config);

    let token = resolve_token(&config)?;
    let restriction_duration = config.restriction_duration()?;

    let gateway = BotApiClient::new(&token, &config.telegram.api_url);
    let gate_config = GateConfig {
        support_contact: config.gate.support_contact.clone(),
        restriction_duration,
    };
    let gate = MembershipGate::new(gateway, ProfileInspector::new(), gate_config);

    info!(
        "porteiro gate running (long polling, support contact @{})",
        config.gate.support_contact
    );

    gate.run().await?;
    Ok(())
}

/// Resolve the bot token: environment variable wins over the config file.
fn resolve_token(config: &PorteiroConfig) -> Result<String, String> {
    if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
        if !token.trim().is_empty() {
            return Ok(token.trim().to_string());
        }
    }

    if !config.telegram.token.trim().is_empty() {
        return Ok(config.telegram.token.trim().to_string());
    }

    Err(format!(
        "Bot token not configured. Set telegram.token in the config file or \
         export {}.",
        TOKEN_ENV_VAR
    ))
}

fn init_logging(config: &PorteiroConfig) {
    use tracing_subscriber::EnvFilter;

    // RUST_LOG wins over the config file level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::config::{GateSection, LoggingConfig, TelegramConfig};

    fn config_with_token(token: &str) -> PorteiroConfig {
        PorteiroConfig {
            telegram: TelegramConfig {
                token: token.to_string(),
                api_url: "https://api.telegram.org".to_string(),
            },
            gate: GateSection::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_resolve_token_from_config() {
        std::env::remove_var(TOKEN_ENV_VAR);
        let config = config_with_token("123:abc");
        assert_eq!(resolve_token(&config).unwrap(), "123:abc");
    }

    #[test]
    fn test_resolve_token_missing_errors() {
        std::env::remove_var(TOKEN_ENV_VAR);
        let config = config_with_token("");
        let err = resolve_token(&config).unwrap_err();
        assert!(err.contains(TOKEN_ENV_VAR));
    }
}
