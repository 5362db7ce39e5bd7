//! Clearkeeper - badge roles for solo and lowman clears
//!
//! Clearkeeper reads a player's activity history from the Bungie.net stats
//! API, classifies validated solo dungeon and lowman raid clears, and keeps a
//! Discord guild's roles in step with them.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and the port traits
//! - **Service Layer** (`services`): resolution, pagination, classification,
//!   aggregation, reconciliation and scheduling
//! - **Infrastructure Layer** (`infrastructure`): Bungie client, configuration, logging
//! - **Adapters** (`adapters`): Discord guild directory and the OAuth callback
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use clearkeeper::services::IdentityResolver;
//!
//! let resolver = IdentityResolver::new(stats, 50);
//! let resolution = resolver.resolve_str("Guardian#1234").await;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    ClassifiedClear, Config, DisplayIdentity, LoggingConfig, MembershipRef, Resolution,
    RetryConfig, RoleDecision, RoleMapping,
};
pub use domain::ports::{GuildDirectory, StatsService};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{IdentityResolver, MemberSyncService, ReconciliationScheduler, RoleReconciler};
