//! Authorization-code exchange against the platform's OAuth token endpoint.

use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::models::OAuthConfig;

/// Errors from building an authorization URL or exchanging a code.
#[derive(Error, Debug)]
pub enum OAuthError {
    /// No client id configured
    #[error("OAuth client id is not configured")]
    MissingClientId,

    /// The token endpoint rejected the code
    #[error("Token endpoint returned {0}: {1}")]
    Rejected(StatusCode, String),

    /// The token response carried no access token
    #[error("Token response has no access token")]
    MissingToken,

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// Token endpoint response.
///
/// The endpoint also returns refresh-token fields for confidential clients;
/// only the access token is used.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub membership_id: Option<String>,
}

/// Public OAuth client.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: Client,
    client_id: String,
    authorize_url: String,
    token_url: String,
}

impl OAuthClient {
    pub fn new(config: &OAuthConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            client_id: config.client_id.clone(),
            authorize_url: config.authorize_url.clone(),
            token_url: config.token_url.clone(),
        })
    }

    /// URL a player opens to grant access, with an optional opaque `state`.
    pub fn authorize_url(&self, state: Option<&str>) -> Result<String, OAuthError> {
        if self.client_id.is_empty() {
            return Err(OAuthError::MissingClientId);
        }

        let mut params = vec![("client_id", self.client_id.as_str()), ("response_type", "code")];
        if let Some(state) = state {
            params.push(("state", state));
        }

        let query = params
            .iter()
            .map(|(key, value)| format!("{key}={}", encode_component(value)))
            .collect::<Vec<_>>()
            .join("&");
        Ok(format!("{}?{query}", self.authorize_url))
    }

    /// Exchange an authorization code for an access token.
    #[instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        if self.client_id.is_empty() {
            return Err(OAuthError::MissingClientId);
        }

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::Rejected(status, body));
        }

        let token: TokenResponse = response.json().await?;
        debug!(
            token_type = token.token_type.as_deref().unwrap_or("unknown"),
            expires_in = token.expires_in,
            "Exchanged authorization code"
        );
        token
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(OAuthError::MissingToken)
    }
}

/// Percent-encode a query component (RFC 3986 unreserved set kept as is).
fn encode_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}
