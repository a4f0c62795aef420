//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `IDENTITY_API_KEY` - Identity Toolkit (Firebase) web API key
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_CATALOG_PATH` - Catalog JSON file (default: bundled catalog)
//! - `STOREFRONT_STATE_DIR` - Directory for shopper state (default: in memory)
//! - `IDENTITY_BASE_URL` - Identity Toolkit base URL
//!   (default: <https://identitytoolkit.googleapis.com/v1>)
//! - `IDENTITY_REQUIRE_EMAIL_VERIFICATION` - Refuse sessions to unverified
//!   accounts (default: false)
//! - `CLAUDE_API_KEY` - Anthropic API key; recommendations are disabled without it
//! - `CLAUDE_MODEL` - Model for recommendations (default: claude-sonnet-4-20250514)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";

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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Catalog file; the bundled catalog is used when unset
    pub catalog_path: Option<PathBuf>,
    /// Root directory for per-shopper state; state is kept in memory when unset
    pub state_dir: Option<PathBuf>,
    /// Identity provider configuration
    pub identity: IdentityConfig,
    /// Claude API configuration, if recommendations are enabled
    pub claude: Option<ClaudeConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Identity provider configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct IdentityConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub require_email_verification: bool,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field(
                "require_email_verification",
                &self.require_email_verification,
            )
            .finish()
    }
}

/// Claude API configuration.
#[derive(Clone)]
pub struct ClaudeConfig {
    pub api_key: SecretString,
    pub model: String,
}

impl std::fmt::Debug for ClaudeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
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
        Self::from_source(&|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`StorefrontConfig::from_env`].
    pub fn from_source(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = get_env_or_default(env, "STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default(env, "STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env(env, "STOREFRONT_BASE_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            host,
            port,
            base_url,
            catalog_path: get_optional_env(env, "STOREFRONT_CATALOG_PATH").map(PathBuf::from),
            state_dir: get_optional_env(env, "STOREFRONT_STATE_DIR").map(PathBuf::from),
            identity: IdentityConfig::from_source(env)?,
            claude: ClaudeConfig::from_source(env)?,
            sentry_dsn: get_optional_env(env, "SENTRY_DSN"),
            sentry_environment: get_optional_env(env, "SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl IdentityConfig {
    fn from_source(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_validated_secret(env, "IDENTITY_API_KEY")?,
            base_url: get_env_or_default(env, "IDENTITY_BASE_URL", DEFAULT_IDENTITY_BASE_URL),
            require_email_verification: get_bool(env, "IDENTITY_REQUIRE_EMAIL_VERIFICATION")?,
        })
    }
}

impl ClaudeConfig {
    fn from_source(env: &dyn Fn(&str) -> Option<String>) -> Result<Option<Self>, ConfigError> {
        let Some(api_key) = get_optional_env(env, "CLAUDE_API_KEY") else {
            return Ok(None);
        };
        validate_secret_strength(&api_key, "CLAUDE_API_KEY")?;
        Ok(Some(Self {
            api_key: SecretString::from(api_key),
            model: get_env_or_default(env, "CLAUDE_MODEL", DEFAULT_CLAUDE_MODEL),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(
    env: &dyn Fn(&str) -> Option<String>,
    key: &str,
) -> Result<String, ConfigError> {
    get_optional_env(env, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key).filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(
    env: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> String {
    get_optional_env(env, key).unwrap_or_else(|| default.to_string())
}

/// Parse a boolean flag (`true`/`false`/`1`/`0`), defaulting to false.
fn get_bool(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<bool, ConfigError> {
    match get_optional_env(env, key).as_deref().map(str::trim) {
        None => Ok(false),
        Some("1" | "true" | "TRUE" | "True") => Ok(true),
        Some("0" | "false" | "FALSE" | "False") => Ok(false),
        Some(other) => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected true or false, got '{other}'"),
        )),
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

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the provider."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(
    env: &dyn Fn(&str) -> Option<String>,
    key: &str,
) -> Result<SecretString, ConfigError> {
    let value = get_required_env(env, key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    const API_KEY: &str = "AIzaSyD4f9Qk2Lm7Xw1Pz8Rb3Tn6Vc0Hj5Ge";

    fn source(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("STOREFRONT_BASE_URL", "http://localhost:3000"),
            ("IDENTITY_API_KEY", API_KEY),
        ]
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength(API_KEY, "TEST_VAR").is_ok());
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = StorefrontConfig::from_source(&source(&minimal())).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.identity.base_url, DEFAULT_IDENTITY_BASE_URL);
        assert!(!config.identity.require_email_verification);
        assert!(config.catalog_path.is_none());
        assert!(config.state_dir.is_none());
        assert!(config.claude.is_none());
    }

    #[test]
    fn test_missing_base_url() {
        let vars = [("IDENTITY_API_KEY", API_KEY)];
        let result = StorefrontConfig::from_source(&source(&vars));
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(key)) if key == "STOREFRONT_BASE_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = minimal();
        vars.push(("STOREFRONT_PORT", "eighty"));
        let result = StorefrontConfig::from_source(&source(&vars));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_placeholder_identity_key_rejected() {
        let vars = [
            ("STOREFRONT_BASE_URL", "http://localhost:3000"),
            ("IDENTITY_API_KEY", "your-firebase-key"),
        ];
        assert!(matches!(
            StorefrontConfig::from_source(&source(&vars)),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_claude_and_flags() {
        let mut vars = minimal();
        vars.push(("CLAUDE_API_KEY", "sk-ant-REDACTED"));
        vars.push(("IDENTITY_REQUIRE_EMAIL_VERIFICATION", "true"));
        vars.push(("STOREFRONT_STATE_DIR", "/var/lib/satchel"));

        let config = StorefrontConfig::from_source(&source(&vars)).unwrap();
        let claude = config.claude.unwrap();
        assert_eq!(claude.model, DEFAULT_CLAUDE_MODEL);
        assert!(claude.api_key.expose_secret().starts_with("sk-ant-"));
        assert!(config.identity.require_email_verification);
        assert_eq!(config.state_dir.unwrap(), PathBuf::from("/var/lib/satchel"));
    }

    #[test]
    fn test_invalid_bool_flag() {
        let mut vars = minimal();
        vars.push(("IDENTITY_REQUIRE_EMAIL_VERIFICATION", "sometimes"));
        assert!(matches!(
            StorefrontConfig::from_source(&source(&vars)),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = StorefrontConfig::from_source(&source(&minimal())).unwrap();
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(API_KEY));
    }
}
