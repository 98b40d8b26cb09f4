//! Account authentication
//!
//! Turns configured credentials into the token sent in Identify.

mod credentials;
mod exchange;
mod mfa;

pub use credentials::Credentials;
pub use exchange::{CredentialExchange, DISCORD_API_BASE};
pub use mfa::{MfaCodeProvider, NoMfa, StaticMfaCode, StdinMfaPrompt};

use thiserror::Error;

/// Credential exchange errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Login rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Second factor required but no code was provided")]
    MfaCodeUnavailable,

    #[error("Response did not contain a token")]
    NoToken,
}

/// Auth result type
pub type AuthResult<T> = Result<T, AuthError>;
