//! Discord REST client backing the guild directory port.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::models::{DiscordMember, DiscordRole};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::DiscordConfig;
use crate::domain::ports::{GuildDirectory, GuildMember, GuildRole};

/// Largest page the member listing endpoint serves.
const MEMBER_PAGE_LIMIT: usize = 1000;

/// HTTP client for one Discord guild.
///
/// All methods map HTTP and network errors to
/// [`DomainError::ExternalService`] with the status and body in the message.
#[derive(Debug, Clone)]
pub struct DiscordClient {
    http: Client,
    api_base: String,
    guild_id: String,
}

impl DiscordClient {
    pub fn new(config: &DiscordConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bot {}", config.token))
            .context("Bot token is not a valid header value")?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("clearkeeper/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            guild_id: config.guild_id.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/guilds/{}/{}", self.api_base, self.guild_id, path);
        debug!(%method, %url, "Discord request");
        self.http.request(method, url)
    }

    async fn send(request: RequestBuilder, operation: &str) -> DomainResult<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            DomainError::ExternalService(format!("Discord {operation} request failed: {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::ExternalService(format!(
                "Discord {operation} returned {status}: {body}"
            )));
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(request: RequestBuilder, operation: &str) -> DomainResult<T> {
        Self::send(request, operation)
            .await?
            .json::<T>()
            .await
            .map_err(|e| DomainError::ExternalService(format!("Discord {operation} parse failed: {e}")))
    }
}

#[async_trait]
impl GuildDirectory for DiscordClient {
    /// Pages through the member list by `after` cursor until a short page.
    #[instrument(skip(self), fields(guild = %self.guild_id))]
    async fn members(&self) -> DomainResult<Vec<GuildMember>> {
        let mut members: Vec<GuildMember> = Vec::new();
        let mut after = "0".to_string();

        loop {
            let page: Vec<DiscordMember> = Self::json(
                self.request(Method::GET, "members")
                    .query(&[("limit", MEMBER_PAGE_LIMIT.to_string()), ("after", after.clone())]),
                "list_members",
            )
            .await?;

            let page_len = page.len();
            let Some(last) = page.last() else {
                break;
            };
            after.clone_from(&last.user.id);
            members.extend(page.into_iter().map(GuildMember::from));

            if page_len < MEMBER_PAGE_LIMIT {
                break;
            }
        }

        debug!(count = members.len(), "Listed guild members");
        Ok(members)
    }

    #[instrument(skip(self), fields(guild = %self.guild_id))]
    async fn roles(&self) -> DomainResult<Vec<GuildRole>> {
        let roles: Vec<DiscordRole> = Self::json(self.request(Method::GET, "roles"), "list_roles").await?;
        Ok(roles.into_iter().map(GuildRole::from).collect())
    }

    #[instrument(skip(self))]
    async fn add_role(&self, user_id: &str, role_id: &str) -> DomainResult<()> {
        Self::send(
            self.request(Method::PUT, &format!("members/{user_id}/roles/{role_id}")),
            "add_role",
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_role(&self, user_id: &str, role_id: &str) -> DomainResult<()> {
        Self::send(
            self.request(Method::DELETE, &format!("members/{user_id}/roles/{role_id}")),
            "remove_role",
        )
        .await?;
        Ok(())
    }
}
