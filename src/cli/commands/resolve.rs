//! `resolve`: Bungie name to membership.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{create_spinner, output, CommandOutput};
use crate::domain::models::{DisplayIdentity, Resolution};

#[derive(Debug, Serialize)]
pub struct ResolveOutput {
    pub identity: String,
    pub resolution: Resolution,
}

impl CommandOutput for ResolveOutput {
    fn to_human(&self) -> String {
        match &self.resolution {
            Resolution::Found(membership) => format!(
                "{}\n  Membership ID:   {}\n  Membership type: {}",
                self.identity, membership.membership_id, membership.membership_type
            ),
            Resolution::NotFound => format!("No player found for {}", self.identity),
            Resolution::Exhausted { pages_searched } => format!(
                "No exact match for {} within {pages_searched} search pages",
                self.identity
            ),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(ctx: &AppContext, bungie_id: &str, json_mode: bool) -> Result<()> {
    let identity: DisplayIdentity = bungie_id
        .parse()
        .with_context(|| format!("'{bungie_id}' is not a Bungie name like Guardian#1234"))?;

    let spinner = create_spinner(format!("Searching for {identity}"), json_mode);
    let resolution = ctx.resolver().resolve(&identity).await;
    spinner.finish_and_clear();

    output(
        &ResolveOutput {
            identity: identity.to_string(),
            resolution,
        },
        json_mode,
    );
    Ok(())
}
