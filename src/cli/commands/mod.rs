//! CLI command implementations.

pub mod auth;
pub mod clears;
pub mod resolve;
pub mod run;
pub mod stats;
pub mod sync;
