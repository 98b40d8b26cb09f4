//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Default gateway endpoint used before a resume URL is known
pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// Version/encoding query appended to the resume URL handed out in READY
pub const GATEWAY_QUERY: &str = "/?v=10&encoding=json";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: GatewayConfig,
    pub credentials: CredentialsConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Gateway connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Endpoint for the first connection (and any connection without a resume URL)
    #[serde(default = "default_gateway_url")]
    pub url: String,
    /// Fixed backoff before a resume attempt or an identify retry, in milliseconds
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Largest inbound message the transport accepts, in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    #[serde(default)]
    pub identify: IdentifyConfig,
}

impl GatewayConfig {
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Point the client at a different endpoint
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn with_reconnect_delay_ms(mut self, delay_ms: u64) -> Self {
        self.reconnect_delay_ms = delay_ms;
        self
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_message_size: default_max_message_size(),
            identify: IdentifyConfig::default(),
        }
    }
}

/// Values sent in every Identify request
#[derive(Debug, Clone, Deserialize)]
pub struct IdentifyConfig {
    #[serde(default = "default_capabilities")]
    pub capabilities: u64,
    #[serde(default = "default_large_threshold")]
    pub large_threshold: u32,
    #[serde(default = "default_browser")]
    pub browser: String,
    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default = "default_os")]
    pub os: String,
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            capabilities: default_capabilities(),
            large_threshold: default_large_threshold(),
            browser: default_browser(),
            device: default_device(),
            os: default_os(),
        }
    }
}

/// Credentials as supplied by the environment
///
/// All fields are optional here; the client decides whether they are sufficient.
#[derive(Clone, Default, Deserialize)]
pub struct CredentialsConfig {
    pub token: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// Default value functions
fn default_app_name() -> String {
    "gateway-client".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_gateway_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    1000
}

fn default_max_message_size() -> usize {
    10_485_760 // 10 MiB
}

fn default_capabilities() -> u64 {
    65
}

fn default_large_threshold() -> u32 {
    100
}

fn default_browser() -> String {
    "Discord Client".to_string()
}

fn default_device() -> String {
    "ktor".to_string()
}

fn default_os() -> String {
    "Windows".to_string()
}

/// Parse an optional variable, falling back to `default` when unset
fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: fn() -> T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparsable value
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparsable value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = match lookup("APP_ENV") {
            Some(raw) => Environment::parse(&raw).ok_or(ConfigError::InvalidValue("APP_ENV", raw))?,
            None => default_env(),
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            gateway: GatewayConfig {
                url: non_empty(lookup("GATEWAY_URL")).unwrap_or_else(default_gateway_url),
                reconnect_delay_ms: parse_or(
                    &lookup,
                    "GATEWAY_RECONNECT_DELAY_MS",
                    default_reconnect_delay_ms,
                )?,
                max_message_size: parse_or(
                    &lookup,
                    "GATEWAY_MAX_MESSAGE_SIZE",
                    default_max_message_size,
                )?,
                identify: IdentifyConfig {
                    capabilities: parse_or(&lookup, "GATEWAY_CAPABILITIES", default_capabilities)?,
                    large_threshold: parse_or(
                        &lookup,
                        "GATEWAY_LARGE_THRESHOLD",
                        default_large_threshold,
                    )?,
                    browser: lookup("GATEWAY_CLIENT_BROWSER").unwrap_or_else(default_browser),
                    device: lookup("GATEWAY_CLIENT_DEVICE").unwrap_or_else(default_device),
                    os: lookup("GATEWAY_CLIENT_OS").unwrap_or_else(default_os),
                },
            },
            credentials: CredentialsConfig {
                token: non_empty(lookup("DISCORD_TOKEN")),
                email: non_empty(lookup("DISCORD_EMAIL")),
                password: non_empty(lookup("DISCORD_PASSWORD")),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
