//! Porteiro configuration file handling
//!
//! Provides default configuration generation and loading for the bot.
//! Configuration files are TOML format, stored under the platform config
//! directory by default.
//!
//! The bot token can be kept out of the file entirely and supplied via the
//! `PORTEIRO_BOT_TOKEN` environment variable instead (container-native).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Default restriction duration string (effectively indefinite)
const DEFAULT_RESTRICTION: &str = "9999999s";

/// Porteiro bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PorteiroConfig {
    /// Telegram connection settings
    pub telegram: TelegramConfig,

    /// Gate behavior settings
    #[serde(default)]
    pub gate: GateSection,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telegram-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from @BotFather. May be empty when supplied via the
    /// PORTEIRO_BOT_TOKEN environment variable.
    #[serde(default)]
    pub token: String,

    /// Bot API base URL (overridable for local Bot API servers)
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

/// Gate behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSection {
    /// Support handle used verbatim in user-facing text (no leading @)
    #[serde(default = "default_support_contact")]
    pub support_contact: String,

    /// How long a failed member stays muted before Telegram would
    /// auto-expire the restriction. Human-readable (e.g. "90 days").
    #[serde(default = "default_restriction_duration")]
    pub restriction_duration: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_support_contact() -> String {
    "support".to_string()
}

fn default_restriction_duration() -> String {
    DEFAULT_RESTRICTION.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for GateSection {
    fn default() -> Self {
        Self {
            support_contact: default_support_contact(),
            restriction_duration: default_restriction_duration(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl PorteiroConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: PorteiroConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Parse the configured restriction duration.
    pub fn restriction_duration(&self) -> Result<Duration, String> {
        humantime::parse_duration(&self.gate.restriction_duration).map_err(|e| {
            format!(
                "Invalid restriction_duration '{}': {}",
                self.gate.restriction_duration, e
            )
        })
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml() -> String {
        format!(
            r#"# Porteiro Bot Configuration
#
# A Telegram bot that gates group membership on profile completeness:
# members without a visible photo or a letter-bearing name are muted until
# they fix their profile and press the re-verification button.

[telegram]
# Bot token from @BotFather. Leave empty to supply it via the
# PORTEIRO_BOT_TOKEN environment variable instead.
token = ""

# Bot API base URL (change only for a local Bot API server)
api_url = "https://api.telegram.org"

[gate]
# Support handle shown in notices and failure pop-ups (no leading @)
support_contact = "support"

# How long a failed member stays muted before Telegram would auto-expire
# the restriction. Human-readable, e.g. "90 days". The default is
# effectively indefinite; members are expected to unlock themselves via
# the re-verification button, not by waiting out the mute.
restriction_duration = "{restriction}"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (optional, logs to stderr if not specified)
# file = "/var/log/porteiro/porteiro.log"
"#,
            restriction = DEFAULT_RESTRICTION
        )
    }

    /// Create and save a default configuration file
    pub fn create_default(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = Self::generate_default_toml();

        // Create parent directory if needed
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(config_path, contents).map_err(|e| {
            format!(
                "Failed to write config file '{}': {}",
                config_path.display(),
                e
            )
        })?;

        Ok(())
    }
}

/// Get the default config file path
///
/// e.g. ~/.config/porteiro/config.toml
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("porteiro")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        PorteiroConfig::create_default(&config_path).unwrap();
        assert!(config_path.exists());

        // Verify it can be loaded and carries the defaults
        let config = PorteiroConfig::load(&config_path).unwrap();
        assert_eq!(config.telegram.api_url, "https://api.telegram.org");
        assert_eq!(config.gate.support_contact, "support");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_config_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        // Write minimal config (only required fields)
        let minimal_config = r#"
[telegram]
token = "123:abc"
"#;
        fs::write(&config_path, minimal_config).unwrap();

        let config = PorteiroConfig::load(&config_path).unwrap();

        // Verify defaults are applied
        assert_eq!(config.telegram.token, "123:abc");
        assert_eq!(config.telegram.api_url, "https://api.telegram.org");
        assert_eq!(config.gate.restriction_duration, "9999999s");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_restriction_duration_parses_humantime() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let contents = r#"
[telegram]
token = "123:abc"

[gate]
restriction_duration = "90 days"
"#;
        fs::write(&config_path, contents).unwrap();

        let config = PorteiroConfig::load(&config_path).unwrap();
        assert_eq!(
            config.restriction_duration().unwrap(),
            Duration::from_secs(90 * 86400)
        );
    }

    #[test]
    fn test_default_restriction_duration_parses() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        PorteiroConfig::create_default(&config_path).unwrap();

        let config = PorteiroConfig::load(&config_path).unwrap();
        assert_eq!(
            config.restriction_duration().unwrap(),
            Duration::from_secs(9_999_999)
        );
    }

    #[test]
    fn test_invalid_restriction_duration_errors() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let contents = r#"
[telegram]
token = "123:abc"

[gate]
restriction_duration = "whenever"
"#;
        fs::write(&config_path, contents).unwrap();

        let config = PorteiroConfig::load(&config_path).unwrap();
        assert!(config.restriction_duration().is_err());
    }

    #[test]
    fn test_generate_default_toml_mentions_env_token() {
        let toml = PorteiroConfig::generate_default_toml();
        assert!(toml.contains("PORTEIRO_BOT_TOKEN"));
        assert!(toml.contains("support_contact = \"support\""));
    }
}
