//! `sync`: reconcile one guild member now.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{create_spinner, output, CommandOutput};
use crate::services::MemberOutcome;

#[derive(Debug, Serialize)]
pub struct SyncOutput {
    pub nickname: String,
    pub user_id: String,
    pub outcome: MemberOutcome,
}

impl CommandOutput for SyncOutput {
    fn to_human(&self) -> String {
        match &self.outcome {
            MemberOutcome::Skipped { reason } => format!("Skipped {}: {reason}", self.nickname),
            MemberOutcome::Unresolved { .. } => {
                format!("Could not resolve {}; roles left untouched", self.nickname)
            }
            MemberOutcome::Incomplete { membership } => {
                format!(
                    "Activity history for {} ({membership}) is incomplete; roles left untouched",
                    self.nickname
                )
            }
            MemberOutcome::Reconciled { membership, report } => {
                let mut lines = vec![format!("Reconciled {} ({membership})", self.nickname)];
                let sections = [
                    ("Added", &report.added),
                    ("Removed", &report.removed),
                    ("Missing guild roles", &report.missing_roles),
                    ("Failed", &report.failed),
                ];
                for (label, roles) in sections {
                    if !roles.is_empty() {
                        lines.push(format!("  {label}: {}", roles.join(", ")));
                    }
                }
                if report.is_noop() {
                    lines.push("  No changes".to_string());
                }
                lines.join("\n")
            }
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(ctx: &AppContext, nickname: &str, json_mode: bool) -> Result<()> {
    let guild = ctx.guild()?;
    let members = guild.members().await.context("Failed to list guild members")?;
    let roles = guild.roles().await.context("Failed to list guild roles")?;

    let mut member = members
        .into_iter()
        .find(|member| member.nickname.as_deref() == Some(nickname))
        .with_context(|| format!("No guild member has the nickname '{nickname}'"))?;

    let spinner = create_spinner(format!("Reconciling {nickname}"), json_mode);
    let outcome = ctx.member_sync(guild).sync_member(&mut member, &roles).await;
    spinner.finish_and_clear();

    output(
        &SyncOutput {
            nickname: nickname.to_string(),
            user_id: member.user_id,
            outcome,
        },
        json_mode,
    );
    Ok(())
}
