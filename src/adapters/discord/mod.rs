//! Discord guild adapter.
//!
//! Implements the [`GuildDirectory`](crate::domain::ports::GuildDirectory)
//! port over the Discord REST API.

pub mod client;
pub mod models;

pub use client::DiscordClient;
pub use models::{DiscordMember, DiscordRole, DiscordUser};
