//! `stats`: aggregate totals over one activity mode.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{create_spinner, output, CommandOutput};
use crate::domain::models::{ActivityMode, ActivityTotals};

#[derive(Debug, Serialize)]
pub struct StatsOutput {
    pub identity: String,
    pub totals: ActivityTotals,
    pub efficiency: Option<f64>,
    pub time_played: String,
}

impl CommandOutput for StatsOutput {
    fn to_human(&self) -> String {
        let efficiency = self
            .efficiency
            .map_or_else(|| "n/a".to_string(), |value| format!("{value:.2}"));

        [
            format!("{} stats for {}:", self.totals.mode, self.identity),
            format!("  Activities:          {}", self.totals.activities),
            format!("  Kills + assists:     {}", self.totals.total_kills_assists),
            format!("  Deaths:              {}", self.totals.total_deaths),
            format!("  Efficiency:          {efficiency}"),
            format!("  Most kills in game:  {}", self.totals.most_kills_per_game),
            format!("  Time played:         {}", self.time_played),
        ]
        .join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(ctx: &AppContext, bungie_id: &str, mode: u32, json_mode: bool) -> Result<()> {
    let (identity, membership) = ctx.require_membership(bungie_id).await?;
    let mode = ActivityMode::from(mode);

    let spinner = create_spinner(format!("Aggregating {mode} history"), json_mode);
    let totals = ctx.aggregation().aggregate(&membership, mode).await;
    spinner.finish_and_clear();
    let totals = totals.with_context(|| format!("Activity history for {identity} is unavailable right now"))?;

    output(
        &StatsOutput {
            identity: identity.to_string(),
            efficiency: totals.efficiency(),
            time_played: totals.time_played_hms(),
            totals,
        },
        json_mode,
    );
    Ok(())
}
