//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - StatsService: read-only queries against the gameplay-statistics service
//! - GuildDirectory: guild members, roles and role mutations
//!
//! In-memory implementations of both ports live alongside them.

pub mod guild_directory;
pub mod in_memory_guild;
pub mod in_memory_stats;
pub mod stats_service;

pub use guild_directory::{GuildDirectory, GuildMember, GuildRole};
pub use in_memory_guild::{InMemoryGuild, RoleMutation};
pub use in_memory_stats::InMemoryStatsService;
pub use stats_service::{CurrentUserMemberships, SearchCandidate, SearchPage, StatsService};
