//! Domain layer for the clearkeeper reconciliation engine
//!
//! This module contains the core models, errors and the ports that
//! infrastructure adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
