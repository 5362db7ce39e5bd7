//! Domain models for identities, activities, clears, role tables and configuration.

pub mod activity;
pub mod clear;
pub mod config;
pub mod membership;
pub mod role_mapping;
pub mod stats;

pub use activity::{ActivityDefinition, ActivityMode, ActivityPage, RawActivityRecord, ValidationRecord};
pub use clear::{suppress_superseded_solo, ClassifiedClear, ClearBucket, ClearKind, ClearSummary};
pub use config::{
    ActivityRoleConfig, BungieConfig, Config, DiscordConfig, LoggingConfig, OAuthConfig,
    PaginationConfig, RetryConfig, RolesConfig, SchedulerConfig,
};
pub use membership::{CharacterId, DisplayIdentity, MembershipRef, MembershipType, Resolution};
pub use role_mapping::{RoleDecision, RoleMapping, RoleMappingEntry};
pub use stats::ActivityTotals;
