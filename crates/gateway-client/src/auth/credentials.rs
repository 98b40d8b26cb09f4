//! Configured credentials

use super::exchange::CredentialExchange;
use super::mfa::MfaCodeProvider;
use crate::error::{ClientError, ClientResult};
use gateway_common::CredentialsConfig;

/// How the client authenticates
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Ready-made gateway token
    Token(String),
    /// Account login, exchanged for a token
    Login { email: String, password: String },
}

impl Credentials {
    /// Pick a token if configured, otherwise an email/password pair
    pub fn from_config(config: &CredentialsConfig) -> ClientResult<Self> {
        if let Some(token) = &config.token {
            return Ok(Self::Token(token.clone()));
        }
        match (&config.email, &config.password) {
            (Some(email), Some(password)) => Ok(Self::Login {
                email: email.clone(),
                password: password.clone(),
            }),
            _ => Err(ClientError::MissingCredentials),
        }
    }

    /// The gateway token; empty when the exchange was rejected
    pub async fn resolve(self, exchange: &CredentialExchange, mfa: &dyn MfaCodeProvider) -> String {
        match self {
            Self::Token(token) => token,
            Self::Login { email, password } => {
                match exchange.login(&email, &password, mfa).await {
                    Ok(token) => token,
                    Err(e) => {
                        tracing::warn!(error = %e, "Credential exchange failed");
                        String::new()
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Credentials::Token([redacted])"),
            Self::Login { email, .. } => f
                .debug_struct("Credentials::Login")
                .field("email", email)
                .field("password", &"[redacted]")
                .finish(),
        }
    }
}
