//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, CredentialsConfig, Environment, GatewayConfig,
    IdentifyConfig, DEFAULT_GATEWAY_URL, GATEWAY_QUERY,
};
