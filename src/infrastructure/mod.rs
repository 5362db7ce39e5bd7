//! Infrastructure layer module
//!
//! This module contains infrastructure adapters and external integrations:
//! - Bungie.net platform API client with bounded retry
//! - Configuration management
//! - Logging infrastructure
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod bungie;
pub mod config;
pub mod logging;
