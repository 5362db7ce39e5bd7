//! Service wiring shared by the commands.

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::adapters::discord::DiscordClient;
use crate::adapters::oauth::OAuthClient;
use crate::domain::models::{Config, DisplayIdentity, MembershipRef, Resolution};
use crate::domain::ports::{GuildDirectory, StatsService};
use crate::infrastructure::bungie::{BungieClient, BungieClientConfig};
use crate::services::{
    AchievementClassifier, ActivityPaginator, AggregationEngine, IdentityResolver,
    MemberSyncService,
};

/// Loaded configuration plus the stats client every command needs.
pub struct AppContext {
    pub config: Config,
    stats: Arc<dyn StatsService>,
}

impl AppContext {
    /// Build the stats client; fails when no API key is configured.
    pub fn new(config: Config) -> Result<Self> {
        if config.bungie.api_key.trim().is_empty() {
            bail!("Bungie API key is not configured (set bungie.api_key or CLEARKEEPER_BUNGIE__API_KEY)");
        }
        let client = BungieClient::new(BungieClientConfig::from_config(&config))
            .context("Failed to create Bungie client")?;

        Ok(Self {
            config,
            stats: Arc::new(client),
        })
    }

    /// Use an already-built stats service.
    pub fn with_stats(config: Config, stats: Arc<dyn StatsService>) -> Self {
        Self { config, stats }
    }

    pub fn stats(&self) -> Arc<dyn StatsService> {
        Arc::clone(&self.stats)
    }

    /// Discord client for the configured guild.
    pub fn guild(&self) -> Result<Arc<dyn GuildDirectory>> {
        let discord = &self.config.discord;
        if discord.token.trim().is_empty() {
            bail!("Discord bot token is not configured (set discord.token or CLEARKEEPER_DISCORD__TOKEN)");
        }
        if discord.guild_id.trim().is_empty() {
            bail!("Discord guild id is not configured (set discord.guild_id or CLEARKEEPER_DISCORD__GUILD_ID)");
        }
        let client = DiscordClient::new(discord).context("Failed to create Discord client")?;
        Ok(Arc::new(client))
    }

    pub fn oauth(&self) -> Result<OAuthClient> {
        OAuthClient::new(&self.config.oauth)
    }

    fn paginator(&self) -> ActivityPaginator {
        ActivityPaginator::new(
            self.stats(),
            self.config.pagination.page_size,
            self.config.pagination.max_activity_pages,
        )
    }

    pub fn resolver(&self) -> IdentityResolver {
        IdentityResolver::new(self.stats(), self.config.pagination.max_search_pages)
    }

    pub fn classifier(&self) -> AchievementClassifier {
        AchievementClassifier::new(self.stats(), self.paginator())
    }

    pub fn aggregation(&self) -> AggregationEngine {
        AggregationEngine::new(self.paginator())
    }

    pub fn member_sync(&self, guild: Arc<dyn GuildDirectory>) -> MemberSyncService {
        MemberSyncService::new(self.stats(), guild, &self.config)
    }

    /// Resolve a Bungie name or fail with a readable error.
    pub async fn require_membership(&self, bungie_id: &str) -> Result<(DisplayIdentity, MembershipRef)> {
        let identity: DisplayIdentity = bungie_id
            .parse()
            .with_context(|| format!("'{bungie_id}' is not a Bungie name like Guardian#1234"))?;

        match self.resolver().resolve(&identity).await {
            Resolution::Found(membership) => Ok((identity, membership)),
            Resolution::NotFound => bail!("No player found for {identity}"),
            Resolution::Exhausted { pages_searched } => {
                bail!("No exact match for {identity} within {pages_searched} search pages")
            }
        }
    }
}
