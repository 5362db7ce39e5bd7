//! `auth-url`: link players open to grant access.

use anyhow::Result;
use serde::Serialize;

use crate::adapters::oauth::OAuthClient;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::OAuthConfig;

#[derive(Debug, Serialize)]
pub struct AuthUrlOutput {
    pub url: String,
}

impl CommandOutput for AuthUrlOutput {
    fn to_human(&self) -> String {
        self.url.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Needs only the OAuth client id, not the API key.
pub fn execute(config: &OAuthConfig, state: Option<&str>, json_mode: bool) -> Result<()> {
    let url = OAuthClient::new(config)?.authorize_url(state)?;
    output(&AuthUrlOutput { url }, json_mode);
    Ok(())
}
