//! `run`: scheduler plus OAuth listener until Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use crate::adapters::oauth::OAuthServer;
use crate::cli::context::AppContext;
use crate::services::{IdentityResolver, ReconciliationScheduler};

/// Tokens waiting for resolution before the listener applies backpressure.
const TOKEN_CHANNEL_CAPACITY: usize = 16;

pub async fn execute(ctx: &AppContext) -> Result<()> {
    let guild = ctx.guild()?;
    let sync = Arc::new(ctx.member_sync(Arc::clone(&guild)));

    let scheduler = ReconciliationScheduler::new(Arc::clone(&sync), guild, &ctx.config.scheduler);
    let handle = scheduler.handle();
    let scheduler_task = tokio::spawn(scheduler.run());

    let (stop_listener, listener_stopped) = oneshot::channel::<()>();
    if ctx.config.oauth.enabled {
        let (token_tx, token_rx) = mpsc::channel(TOKEN_CHANNEL_CAPACITY);
        tokio::spawn(consume_tokens(sync.resolver().clone(), token_rx));

        let server = OAuthServer::new(ctx.config.oauth.listen_addr.clone(), ctx.oauth()?, token_tx);
        tokio::spawn(async move {
            let shutdown = async move {
                let _ = listener_stopped.await;
            };
            if let Err(err) = server.serve_with_shutdown(shutdown).await {
                error!(error = %err, "OAuth callback listener failed");
            }
        });
    } else {
        info!("OAuth callback listener disabled");
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Shutdown requested");

    handle.stop();
    let _ = stop_listener.send(());
    // In-flight reconciliation is abandoned.
    scheduler_task.abort();

    let status = handle.status().await;
    info!(
        passes = status.total_passes,
        failed = status.failed_passes,
        "Clearkeeper stopped"
    );
    Ok(())
}

/// Resolve each authorized player's membership as tokens arrive.
async fn consume_tokens(resolver: IdentityResolver, mut tokens: mpsc::Receiver<String>) {
    while let Some(token) = tokens.recv().await {
        match resolver.resolve_from_token(&token).await {
            Some(membership) => info!(membership = %membership, "Player authorized"),
            None => warn!("Could not resolve a membership for the authorized player"),
        }
    }
}
