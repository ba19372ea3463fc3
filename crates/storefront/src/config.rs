//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `AIAXCART_BASE_URL` - Public URL of the shop (`https://` enables secure cookies)
//! - `AIAXCART_SESSION_SECRET` - Session secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `AIAXCART_DATABASE_URL` - `SQLite` URL, falls back to `DATABASE_URL`
//!   (default: `sqlite:aiaxcart.db?mode=rwc`)
//! - `AIAXCART_HOST` - Bind address (default: 127.0.0.1)
//! - `AIAXCART_PORT` - Listen port (default: 3000)
//! - `AIAXCART_SHOP_NAME` - Shop display name (default: Aiaxcart Premium Shop)
//! - `AIAXCART_CURRENCY` - ISO 4217 currency code (default: PHP)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0 to 1.0 (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use aiaxcart_core::CurrencyCode;

const DEFAULT_DATABASE_URL: &str = "sqlite:aiaxcart.db?mode=rwc";
const DEFAULT_SHOP_NAME: &str = "Aiaxcart Premium Shop";
const MIN_SESSION_SECRET_LENGTH: usize = 32;
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

/// Server configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `SQLite` connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the shop
    pub base_url: String,
    /// Session secret
    pub session_secret: SecretString,
    /// Shop display settings
    pub shop: ShopConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Shop-facing settings shown to customers.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// Display name.
    pub name: String,
    /// Currency every price is quoted in.
    pub currency: CurrencyCode,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SHOP_NAME.to_owned(),
            currency: CurrencyCode::default(),
        }
    }
}

impl StorefrontConfig {
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

        let database_url = get_database_url("AIAXCART_DATABASE_URL");
        let host = get_env_or_default("AIAXCART_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("AIAXCART_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("AIAXCART_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("AIAXCART_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("AIAXCART_BASE_URL")?;
        let session_secret = get_validated_secret("AIAXCART_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "AIAXCART_SESSION_SECRET")?;

        let shop = ShopConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            shop,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_sample_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl ShopConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let currency = get_env_or_default("AIAXCART_CURRENCY", "PHP")
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("AIAXCART_CURRENCY".to_string(), e))?;

        Ok(Self {
            name: get_env_or_default("AIAXCART_SHOP_NAME", DEFAULT_SHOP_NAME),
            currency,
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

/// Get database URL with fallback to generic `DATABASE_URL`, then the local file.
fn get_database_url(primary_key: &str) -> SecretString {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_or_else(
            |_| SecretString::from(DEFAULT_DATABASE_URL),
            SecretString::from,
        )
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a Sentry sample rate in `[0.0, 1.0]`.
fn get_sample_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
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
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
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

    fn config(base_url: &str) -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: base_url.to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            shop: ShopConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_rejects_placeholders() {
        for candidate in ["your-session-key-here", "changeme123", "my-secret-value"] {
            let err = validate_secret_strength(candidate, "TEST_VAR").unwrap_err();
            assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
        }
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("abababababababababababababababab", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_validate_session_secret_length() {
        assert!(validate_session_secret(&SecretString::from("short"), "TEST_SESSION").is_err());
        assert!(validate_session_secret(&SecretString::from("a".repeat(32)), "TEST_SESSION").is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let addr = config("http://localhost:3000").socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure_follows_scheme() {
        assert!(!config("http://localhost:3000").is_secure());
        assert!(config("https://shop.aiaxcart.ph").is_secure());
    }

    #[test]
    fn test_shop_defaults() {
        let shop = ShopConfig::default();
        assert_eq!(shop.name, "Aiaxcart Premium Shop");
        assert_eq!(shop.currency, CurrencyCode::PHP);
    }
}
