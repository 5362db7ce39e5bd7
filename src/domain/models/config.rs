use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::role_mapping::RoleMapping;

/// Main configuration structure for clearkeeper
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Stats service connection
    #[serde(default)]
    pub bungie: BungieConfig,

    /// Retry policy for stats service calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Page sizes and page caps
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Chat platform connection
    #[serde(default)]
    pub discord: DiscordConfig,

    /// OAuth callback listener
    #[serde(default)]
    pub oauth: OAuthConfig,

    /// Periodic reconciliation
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Badge-to-role tables
    #[serde(default)]
    pub roles: RolesConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Stats service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BungieConfig {
    /// API key sent as `X-API-Key` on every request
    #[serde(default)]
    pub api_key: String,

    /// Platform base URL
    #[serde(default = "default_bungie_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_bungie_base_url() -> String {
    "https://www.bungie.net/Platform".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for BungieConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_bungie_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Total attempts per call, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Pagination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PaginationConfig {
    /// Activities requested per history page (service maximum is 250)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Hard cap on name-search pages per resolution
    #[serde(default = "default_max_search_pages")]
    pub max_search_pages: u32,

    /// Hard cap on history pages per character and mode
    #[serde(default = "default_max_activity_pages")]
    pub max_activity_pages: u32,
}

const fn default_page_size() -> u32 {
    250
}

const fn default_max_search_pages() -> u32 {
    50
}

const fn default_max_activity_pages() -> u32 {
    200
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_search_pages: default_max_search_pages(),
            max_activity_pages: default_max_activity_pages(),
        }
    }
}

/// Chat platform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DiscordConfig {
    /// Bot token
    #[serde(default)]
    pub token: String,

    /// Guild whose members are reconciled
    #[serde(default)]
    pub guild_id: String,

    /// REST API base URL
    #[serde(default = "default_discord_api_base")]
    pub api_base: String,
}

fn default_discord_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            guild_id: String::new(),
            api_base: default_discord_api_base(),
        }
    }
}

/// OAuth configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OAuthConfig {
    /// Whether `run` starts the callback listener
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Application client id
    #[serde(default)]
    pub client_id: String,

    /// Authorization page players are sent to
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,

    /// Code-for-token exchange endpoint
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Listener bind address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

const fn default_true() -> bool {
    true
}

fn default_authorize_url() -> String {
    "https://www.bungie.net/en/OAuth/Authorize".to_string()
}

fn default_token_url() -> String {
    "https://www.bungie.net/platform/app/oauth/token/".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            client_id: String::new(),
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            listen_addr: default_listen_addr(),
        }
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerConfig {
    /// Seconds between reconciliation passes
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Run a pass immediately on startup
    #[serde(default = "default_true")]
    pub run_on_startup: bool,

    /// Nicknames that are never reconciled
    #[serde(default)]
    pub excluded_members: Vec<String>,
}

const fn default_interval_secs() -> u64 {
    3600
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            run_on_startup: default_true(),
            excluded_members: Vec::new(),
        }
    }
}

/// Role tables and auxiliary roles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RolesConfig {
    /// Solo dungeon badge table
    #[serde(default = "RoleMapping::default_dungeon")]
    pub dungeon: RoleMapping,

    /// Lowman raid badge table
    #[serde(default = "RoleMapping::default_raid")]
    pub raid: RoleMapping,

    /// Recent-activity role
    #[serde(default)]
    pub activity: ActivityRoleConfig,

    /// Roles added to every member with a resolvable identity
    #[serde(default)]
    pub always: Vec<String>,
}

impl Default for RolesConfig {
    fn default() -> Self {
        Self {
            dungeon: RoleMapping::default_dungeon(),
            raid: RoleMapping::default_raid(),
            activity: ActivityRoleConfig::default(),
            always: Vec::new(),
        }
    }
}

/// Recent-activity role configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ActivityRoleConfig {
    /// Role name; `None` disables the role
    #[serde(default = "default_activity_role")]
    pub role: Option<String>,

    /// Members who played within this many days hold the role
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

#[allow(clippy::unnecessary_wraps)]
fn default_activity_role() -> Option<String> {
    Some("Active".to_string())
}

const fn default_window_days() -> u32 {
    14
}

impl Default for ActivityRoleConfig {
    fn default() -> Self {
        Self {
            role: default_activity_role(),
            window_days: default_window_days(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
