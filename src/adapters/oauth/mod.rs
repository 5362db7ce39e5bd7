//! OAuth authorization-code flow.
//!
//! - `exchange`: authorization URL builder and code-for-token exchange
//! - `server`: axum callback listener forwarding tokens on a channel

pub mod exchange;
pub mod server;

pub use exchange::{OAuthClient, OAuthError, TokenResponse};
pub use server::{CallbackParams, OAuthServer};
