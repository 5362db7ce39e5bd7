//! Clearkeeper CLI entry point.

use anyhow::Result;
use clap::Parser;

use clearkeeper::cli::commands::{auth, clears, resolve, run, stats, sync};
use clearkeeper::cli::{handle_error, AppContext, Cli, Commands};
use clearkeeper::domain::models::ClearKind;
use clearkeeper::infrastructure::config::ConfigLoader;
use clearkeeper::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = dispatch(cli).await {
        handle_error(err, json);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&LogConfig::from_config(&config.logging).verbose(cli.verbose))?;

    if let Commands::AuthUrl { state } = &cli.command {
        return auth::execute(&config.oauth, state.as_deref(), cli.json);
    }

    let ctx = AppContext::new(config)?;
    match cli.command {
        Commands::Run => run::execute(&ctx).await,
        Commands::Sync { nickname } => sync::execute(&ctx, &nickname, cli.json).await,
        Commands::Resolve { bungie_id } => resolve::execute(&ctx, &bungie_id, cli.json).await,
        Commands::Dungeons { bungie_id } => {
            clears::execute(&ctx, &bungie_id, ClearKind::SoloDungeon, cli.json).await
        }
        Commands::Raids { bungie_id } => {
            clears::execute(&ctx, &bungie_id, ClearKind::LowmanRaid, cli.json).await
        }
        Commands::Stats { bungie_id, mode } => stats::execute(&ctx, &bungie_id, mode, cli.json).await,
        Commands::AuthUrl { state } => auth::execute(&ctx.config.oauth, state.as_deref(), cli.json),
    }
}
