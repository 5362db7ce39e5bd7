pub mod client;
pub mod errors;
pub mod retry;
pub mod types;

pub use client::{BungieClient, BungieClientConfig};
pub use errors::BungieApiError;
pub use retry::RetryPolicy;
