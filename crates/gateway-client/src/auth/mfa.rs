//! Second-factor code sources

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Supplies a TOTP code when login asks for one
#[async_trait]
pub trait MfaCodeProvider: Send + Sync {
    /// `None` when no code can be obtained
    async fn mfa_code(&self) -> Option<String>;
}

/// Prompts on stderr and reads one line from stdin
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinMfaPrompt;

#[async_trait]
impl MfaCodeProvider for StdinMfaPrompt {
    async fn mfa_code(&self) -> Option<String> {
        let mut stderr = tokio::io::stderr();
        if let Err(e) = stderr.write_all(b"Need 2fa code to continue: ").await {
            tracing::debug!(error = %e, "Could not write MFA prompt");
        }
        let _ = stderr.flush().await;

        let mut line = String::new();
        match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()).filter(|code| !code.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read MFA code");
                None
            }
        }
    }
}

/// Fixed code, for automation
#[derive(Debug, Clone)]
pub struct StaticMfaCode(pub String);

#[async_trait]
impl MfaCodeProvider for StaticMfaCode {
    async fn mfa_code(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Never supplies a code
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMfa;

#[async_trait]
impl MfaCodeProvider for NoMfa {
    async fn mfa_code(&self) -> Option<String> {
        None
    }
}
