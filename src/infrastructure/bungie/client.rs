use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::errors::BungieApiError;
use super::retry::RetryPolicy;
use super::types::{
    AccountStatsResponse, ActivityDefinitionResponse, ActivityHistoryResponse, Envelope,
    GlobalNameSearchRequest, PostGameCarnageReport, ProfileResponse, UserMembershipData,
    UserSearchResponse,
};
use crate::domain::models::{
    ActivityDefinition, ActivityMode, ActivityPage, CharacterId, Config, MembershipRef,
    ValidationRecord,
};
use crate::domain::ports::{CurrentUserMemberships, SearchPage, StatsService};

/// Configuration for the Bungie.net HTTP client
#[derive(Debug, Clone)]
pub struct BungieClientConfig {
    /// Application API key sent as `X-API-Key`
    pub api_key: String,

    /// Platform base URL, e.g. `https://www.bungie.net/Platform`
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Total attempts per call
    pub max_attempts: u32,

    /// Fixed delay between attempts in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for BungieClientConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl BungieClientConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_key: config.bungie.api_key.clone(),
            base_url: config.bungie.base_url.clone(),
            timeout_secs: config.bungie.timeout_secs,
            max_attempts: config.retry.max_attempts,
            retry_delay_ms: config.retry.retry_delay_ms,
        }
    }
}

/// HTTP client for the Bungie.net platform API
///
/// Every call goes through the bounded [`RetryPolicy`]; failures surface as
/// `None` on the [`StatsService`] methods.
#[derive(Debug, Clone)]
pub struct BungieClient {
    /// Reusable HTTP client with the API key as a default header
    http_client: ReqwestClient,

    /// Base URL without a trailing slash
    base_url: String,

    retry_policy: RetryPolicy,
}

impl BungieClient {
    /// Create a new client
    ///
    /// # Returns
    /// * `Ok(BungieClient)` - Successfully created client
    /// * `Err(anyhow::Error)` - The API key is not a valid header value or
    ///   the HTTP client could not be built
    pub fn new(config: BungieClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut api_key =
            HeaderValue::from_str(&config.api_key).context("API key is not a valid header value")?;
        api_key.set_sensitive(true);
        headers.insert("X-API-Key", api_key);

        let http_client = ReqwestClient::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry_policy: RetryPolicy::new(
                config.max_attempts,
                Duration::from_millis(config.retry_delay_ms),
            ),
        })
    }

    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and unwrap the platform envelope
    ///
    /// The body is read as text first so that a non-JSON error page turns
    /// into a status error rather than a decode error.
    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, BungieApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(BungieApiError::from_status(status, body));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        envelope.into_result()
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BungieApiError> {
        debug!(path, "GET");
        Self::send(self.http_client.get(self.url(path))).await
    }
}

#[async_trait]
impl StatsService for BungieClient {
    #[instrument(skip(self))]
    async fn search_by_global_name(&self, name: &str, page: u32) -> Option<SearchPage> {
        let path = format!("User/Search/GlobalName/{page}/");
        let body = GlobalNameSearchRequest {
            display_name_prefix: name,
        };

        self.retry_policy
            .execute("search_by_global_name", || {
                Self::send::<UserSearchResponse>(self.http_client.post(self.url(&path)).json(&body))
            })
            .await
            .map(SearchPage::from)
    }

    #[instrument(skip_all)]
    async fn memberships_for_current_user(&self, access_token: &str) -> Option<CurrentUserMemberships> {
        self.retry_policy
            .execute("memberships_for_current_user", || {
                Self::send::<UserMembershipData>(
                    self.http_client
                        .get(self.url("User/GetMembershipsForCurrentUser/"))
                        .bearer_auth(access_token),
                )
            })
            .await
            .map(CurrentUserMemberships::from)
    }

    #[instrument(skip(self, membership), fields(membership = %membership))]
    async fn last_played(&self, membership: &MembershipRef) -> Option<DateTime<Utc>> {
        let path = format!(
            "Destiny2/{}/Profile/{}/?components=100",
            membership.membership_type.code(),
            membership.membership_id
        );

        self.retry_policy
            .execute("last_played", || self.get::<ProfileResponse>(&path))
            .await
            .and_then(|profile| profile.date_last_played())
    }

    #[instrument(skip(self, membership), fields(membership = %membership))]
    async fn characters(&self, membership: &MembershipRef) -> Option<Vec<CharacterId>> {
        let path = format!(
            "Destiny2/{}/Account/{}/Stats/",
            membership.membership_type.code(),
            membership.membership_id
        );

        self.retry_policy
            .execute("characters", || self.get::<AccountStatsResponse>(&path))
            .await
            .map(AccountStatsResponse::character_ids)
    }

    #[instrument(skip(self, membership, character), fields(membership = %membership, character = %character))]
    async fn activity_page(
        &self,
        membership: &MembershipRef,
        character: &CharacterId,
        mode: ActivityMode,
        page: u32,
        count: u32,
    ) -> Option<ActivityPage> {
        let path = format!(
            "Destiny2/{}/Account/{}/Character/{}/Stats/Activities/?page={page}&mode={}&count={count}",
            membership.membership_type.code(),
            membership.membership_id,
            character,
            mode.code(),
        );

        self.retry_policy
            .execute("activity_page", || self.get::<ActivityHistoryResponse>(&path))
            .await
            .map(ActivityPage::from)
    }

    #[instrument(skip(self))]
    async fn activity_definition(&self, director_activity_hash: u32) -> Option<ActivityDefinition> {
        let path = format!("Destiny2/Manifest/DestinyActivityDefinition/{director_activity_hash}/");

        self.retry_policy
            .execute("activity_definition", || {
                self.get::<ActivityDefinitionResponse>(&path)
            })
            .await
            .map(|definition| definition.into_definition(director_activity_hash))
    }

    #[instrument(skip(self))]
    async fn carnage_report(&self, instance_id: &str) -> Option<ValidationRecord> {
        let path = format!("Destiny2/Stats/PostGameCarnageReport/{instance_id}/");

        self.retry_policy
            .execute("carnage_report", || self.get::<PostGameCarnageReport>(&path))
            .await
            .map(|report| report.into_validation(instance_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_defaults() {
        let config = BungieClientConfig::default();
        assert_eq!(config.base_url, "https://www.bungie.net/Platform");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_delay_ms, 1000);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_url_joining() {
        let client = BungieClient::new(BungieClientConfig {
            api_key: "key".to_string(),
            base_url: "http://localhost:1234/Platform/".to_string(),
            ..BungieClientConfig::default()
        })
        .unwrap();

        assert_eq!(
            client.url("/Destiny2/Stats/PostGameCarnageReport/1/"),
            "http://localhost:1234/Platform/Destiny2/Stats/PostGameCarnageReport/1/"
        );
    }

    #[test]
    fn test_rejects_invalid_api_key_header() {
        let result = BungieClient::new(BungieClientConfig {
            api_key: "bad\nkey".to_string(),
            ..BungieClientConfig::default()
        });
        assert!(result.is_err());
    }
}
