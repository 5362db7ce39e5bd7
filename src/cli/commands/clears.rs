//! `dungeons` and `raids`: validated clears with per-activity counts.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{create_spinner, list_table, output, CommandOutput};
use crate::domain::models::{ClassifiedClear, ClearKind, ClearSummary, MembershipRef};

#[derive(Debug, Serialize)]
pub struct ClearsOutput {
    pub identity: String,
    pub membership: MembershipRef,
    pub kind: ClearKind,
    pub summary: ClearSummary,
    pub clears: Vec<ClassifiedClear>,
}

impl CommandOutput for ClearsOutput {
    fn to_human(&self) -> String {
        let what = match self.kind {
            ClearKind::SoloDungeon => "solo dungeon",
            ClearKind::LowmanRaid => "lowman raid",
        };
        if self.summary.counts.is_empty() {
            return format!("No {what} clears found for {}.", self.identity);
        }

        let mut table = list_table(&["Activity", "Clears"]);
        for (name, count) in &self.summary.counts {
            table.add_row(vec![name.clone(), count.to_string()]);
        }

        format!(
            "{} {what} clears for {}:\n{table}",
            self.summary.total(),
            self.identity
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(ctx: &AppContext, bungie_id: &str, kind: ClearKind, json_mode: bool) -> Result<()> {
    let (identity, membership) = ctx.require_membership(bungie_id).await?;

    let spinner = create_spinner(format!("Classifying {} history", kind.mode()), json_mode);
    let classifier = ctx.classifier();
    let clears = match kind {
        ClearKind::SoloDungeon => classifier.solo_dungeon_clears(&membership).await,
        ClearKind::LowmanRaid => classifier.lowman_raid_clears(&membership).await,
    };
    spinner.finish_and_clear();
    let clears = clears.with_context(|| format!("Activity history for {identity} is unavailable right now"))?;

    output(
        &ClearsOutput {
            identity: identity.to_string(),
            membership,
            kind,
            summary: ClearSummary::from_clears(&clears),
            clears,
        },
        json_mode,
    );
    Ok(())
}
