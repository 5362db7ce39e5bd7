//! Adapters for the outer surfaces: the chat guild and the OAuth callback.

pub mod discord;
pub mod oauth;
