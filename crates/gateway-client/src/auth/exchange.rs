//! Email/password to token exchange

use super::mfa::MfaCodeProvider;
use super::{AuthError, AuthResult};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Production API root
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v9";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct MfaRequest<'a> {
    ticket: &'a str,
    code: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    ticket: Option<String>,
}

/// Exchanges account credentials for a gateway token over the HTTP API
#[derive(Debug, Clone)]
pub struct CredentialExchange {
    http: reqwest::Client,
    base_url: String,
}

impl Default for CredentialExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialExchange {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(DISCORD_API_BASE)
    }

    /// Exchange against another API root, e.g. a local test server
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Log in, answering an MFA challenge through `mfa` when the account requires one
    #[tracing::instrument(skip_all)]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        mfa: &dyn MfaCodeProvider,
    ) -> AuthResult<String> {
        let login = self
            .post(
                "/auth/login",
                &LoginRequest { email, password },
            )
            .await?;

        if let Some(token) = login.token.filter(|t| !t.is_empty()) {
            tracing::info!("Login succeeded");
            return Ok(token);
        }

        let ticket = login.ticket.ok_or(AuthError::NoToken)?;
        tracing::info!("Login requires a second factor");

        let code = mfa.mfa_code().await.ok_or(AuthError::MfaCodeUnavailable)?;
        let verified = self
            .post(
                "/auth/mfa/totp",
                &MfaRequest {
                    ticket: &ticket,
                    code: code.trim(),
                },
            )
            .await?;

        verified
            .token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::NoToken)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> AuthResult<LoginResponse> {
        let url = format!("{}{path}", self.base_url);
        let resp = self.http.post(&url).json(body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }
}
