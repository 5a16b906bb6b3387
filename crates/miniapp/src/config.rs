//! Mini-app configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `AI_API_KEY` - API key for the AI generation service
//! - `TELEGRAM_BOT_TOKEN` - Bot token for operator notifications
//! - `OWNER_CHAT_ID` - Chat ID that receives wholesale notifications
//!
//! ## Optional
//! - `BAZAAR_DATABASE_URL` - `SQLite` URL (default: sqlite://bazaar.db?mode=rwc,
//!   falls back to generic `DATABASE_URL` first)
//! - `BAZAAR_HOST` - Bind address (default: 127.0.0.1)
//! - `BAZAAR_PORT` - Listen port (default: 8080)
//! - `BAZAAR_WEBAPP_DIR` - Directory with the mini-app page assets (default: webapp)
//! - `AI_MODEL` - Model ID (default: claude-3-5-haiku-latest)
//! - `AI_TIMEOUT_SECS` - Outbound generation request timeout (default: 60)
//! - `AI_MAX_CATALOG_ITEMS` - Catalog items included in the prompt (default: 100)
//! - `DELIVERY_BASE_COST` - Flat delivery fee (default: 300)
//! - `FREE_DELIVERY_THRESHOLD` - Order total granting free delivery (default: 5000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

use bazaar_core::ChatId;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Mini-app application configuration.
#[derive(Debug, Clone)]
pub struct MiniAppConfig {
    /// `SQLite` database connection URL
    pub database_url: String,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory containing index.html and static page assets
    pub webapp_dir: PathBuf,
    /// AI generation service configuration
    pub assistant: AssistantConfig,
    /// Chat-platform Bot API configuration
    pub telegram: TelegramConfig,
    /// Delivery cost configuration
    pub delivery: DeliveryConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// AI generation service configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AssistantConfig {
    /// API key for the generation service
    pub api_key: SecretString,
    /// Model ID (e.g., claude-3-5-haiku-latest)
    pub model: String,
    /// Outbound request timeout in seconds.
    ///
    /// The generation call can hang for an unbounded time otherwise; this is
    /// the only cancellation point for a stuck chat request.
    pub timeout_secs: u64,
    /// Maximum number of catalog items included in the prompt
    pub max_catalog_items: usize,
}

impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_catalog_items", &self.max_catalog_items)
            .finish()
    }
}

/// Chat-platform Bot API configuration.
///
/// Implements `Debug` manually to redact the bot token.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token for the platform Bot API
    pub bot_token: SecretString,
    /// Chat that receives operator notifications (wholesale requests)
    pub owner_chat_id: ChatId,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"[REDACTED]")
            .field("owner_chat_id", &self.owner_chat_id)
            .finish()
    }
}

/// Delivery cost configuration.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryConfig {
    /// Flat delivery fee added below the free-delivery threshold
    pub base_cost: f64,
    /// Order total at or above which delivery is free
    pub free_threshold: f64,
}

impl MiniAppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("BAZAAR_DATABASE_URL");
        let host = get_env_or_default("BAZAAR_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BAZAAR_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("BAZAAR_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("BAZAAR_PORT".to_string(), e.to_string()))?;
        let webapp_dir = PathBuf::from(get_env_or_default("BAZAAR_WEBAPP_DIR", "webapp"));

        let assistant = AssistantConfig::from_env()?;
        let telegram = TelegramConfig::from_env()?;
        let delivery = DeliveryConfig::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_parsed_or_default("SENTRY_SAMPLE_RATE", 1.0)?;
        let sentry_traces_sample_rate = get_parsed_or_default("SENTRY_TRACES_SAMPLE_RATE", 0.0)?;

        Ok(Self {
            database_url,
            host,
            port,
            webapp_dir,
            assistant,
            telegram,
            delivery,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AssistantConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_validated_secret("AI_API_KEY")?,
            model: get_env_or_default("AI_MODEL", "claude-3-5-haiku-latest"),
            timeout_secs: get_parsed_or_default("AI_TIMEOUT_SECS", 60)?,
            max_catalog_items: get_parsed_or_default("AI_MAX_CATALOG_ITEMS", 100)?,
        })
    }
}

impl TelegramConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let owner_chat_id = get_required_env("OWNER_CHAT_ID")?
            .parse::<i64>()
            .map_err(|e| ConfigError::InvalidEnvVar("OWNER_CHAT_ID".to_string(), e.to_string()))?;

        Ok(Self {
            bot_token: get_validated_secret("TELEGRAM_BOT_TOKEN")?,
            owner_chat_id: ChatId::new(owner_chat_id),
        })
    }
}

impl DeliveryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_cost: get_parsed_or_default("DELIVERY_BASE_COST", 300.0)?,
            free_threshold: get_parsed_or_default("FREE_DELIVERY_THRESHOLD", 5000.0)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> String {
    // Try primary key first (e.g., BAZAAR_DATABASE_URL)
    if let Ok(value) = std::env::var(primary_key) {
        return value;
    }
    // Fallback to generic DATABASE_URL
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return value;
    }
    // SQLite file next to the binary; created on first run
    "sqlite://bazaar.db?mode=rwc".to_string()
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable parsed into `T`, or the default when unset.
fn get_parsed_or_default<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real tokens and API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the real credential."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> MiniAppConfig {
        MiniAppConfig {
            database_url: "sqlite::memory:".to_string(),
            host: "127.0.0.1".parse().unwrap(),
            port: 8080,
            webapp_dir: PathBuf::from("webapp"),
            assistant: AssistantConfig {
                api_key: SecretString::from("k"),
                model: "claude-3-5-haiku-latest".to_string(),
                timeout_secs: 60,
                max_catalog_items: 100,
            },
            telegram: TelegramConfig {
                bot_token: SecretString::from("t"),
                owner_chat_id: ChatId::new(1),
            },
            delivery: DeliveryConfig {
                base_cost: 300.0,
                free_threshold: 5000.0,
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_assistant_config_debug_redacts_key() {
        let config = test_config();
        let debug_output = format!("{:?}", config.assistant);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(debug_output.contains("claude-3-5-haiku-latest"));
    }

    #[test]
    fn test_telegram_config_debug_redacts_token() {
        let config = TelegramConfig {
            bot_token: SecretString::from("123456:very-secret-token"),
            owner_chat_id: ChatId::new(42),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("very-secret-token"));
        assert!(debug_output.contains("42"));
    }
}
