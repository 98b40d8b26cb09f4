//! # gateway-common
//!
//! Shared utilities for the gateway client: configuration loading and telemetry.

pub mod config;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{
    AppConfig, AppSettings, ConfigError, CredentialsConfig, Environment, GatewayConfig,
    IdentifyConfig, DEFAULT_GATEWAY_URL, GATEWAY_QUERY,
};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
