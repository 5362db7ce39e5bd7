//! OAuth callback listener.
//!
//! Serves `GET /auth/callback` for the platform's redirect and `GET /health`.
//! Exchanged access tokens are forwarded on an mpsc channel; the listener
//! holds no other state shared with reconciliation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::exchange::OAuthClient;
use crate::infrastructure::logging::SecretScrubber;

/// Query parameters of the platform redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

struct AppState {
    client: OAuthClient,
    tokens: mpsc::Sender<String>,
    scrubber: Option<SecretScrubber>,
}

/// Callback server.
pub struct OAuthServer {
    listen_addr: String,
    client: OAuthClient,
    tokens: mpsc::Sender<String>,
}

impl OAuthServer {
    pub fn new(listen_addr: impl Into<String>, client: OAuthClient, tokens: mpsc::Sender<String>) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            client,
            tokens,
        }
    }

    /// Build the router.
    pub fn build_router(self) -> Router {
        let scrubber = match SecretScrubber::new() {
            Ok(scrubber) => Some(scrubber),
            Err(err) => {
                warn!(error = %err, "Secret scrubber unavailable; callback queries will not be logged");
                None
            }
        };
        let state = Arc::new(AppState {
            client: self.client,
            tokens: self.tokens,
            scrubber,
        });

        Router::new()
            .route("/auth/callback", get(auth_callback))
            .route("/health", get(health_check))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = self.listen_addr.parse()?;
        let router = self.build_router();

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "OAuth callback listener started");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

// Handler functions

async fn health_check() -> &'static str {
    "OK"
}

async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, &'static str) {
    if let Some(scrubber) = &state.scrubber {
        let raw = format!(
            "code={}&state={}",
            params.code.as_deref().unwrap_or_default(),
            params.state.as_deref().unwrap_or_default()
        );
        info!(query = %scrubber.scrub(&raw), "OAuth callback received");
    }

    let Some(code) = params.code.filter(|code| !code.is_empty()) else {
        warn!("OAuth callback without a code");
        return (StatusCode::BAD_REQUEST, "Missing authorization code");
    };

    let token = match state.client.exchange_code(&code).await {
        Ok(token) => token,
        Err(err) => {
            error!(error = %err, "Authorization code exchange failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Authorization failed");
        }
    };

    if state.tokens.send(token).await.is_err() {
        warn!("Token consumer has shut down; dropping token");
    }
    (StatusCode::OK, "You can close this page!")
}
