//! Cumulative statistics over a mode's full activity history.

use tracing::{info, instrument, warn};

use super::activity_paginator::ActivityPaginator;
use crate::domain::models::{ActivityMode, ActivityTotals, MembershipRef};

/// Streams every activity of a mode into running totals.
///
/// No validation fetches are made; every record counts. A failed character
/// listing or page fetch yields `None` instead of partial totals.
#[derive(Clone)]
pub struct AggregationEngine {
    paginator: ActivityPaginator,
}

impl AggregationEngine {
    pub const fn new(paginator: ActivityPaginator) -> Self {
        Self { paginator }
    }

    #[instrument(skip(self), fields(membership = %membership))]
    pub async fn aggregate(&self, membership: &MembershipRef, mode: ActivityMode) -> Option<ActivityTotals> {
        let mut totals = ActivityTotals::new(mode);

        for character in self.paginator.characters(membership).await? {
            let mut pages = self.paginator.pages(membership, &character, mode);
            while let Some(page) = pages.next_page().await {
                for record in &page.records {
                    totals.record(record);
                }
            }
            if pages.failed() {
                warn!(character = %character, "Activity history incomplete; discarding totals");
                return None;
            }
        }

        info!(activities = totals.activities, "Aggregated activity totals");
        Some(totals)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::domain::models::RawActivityRecord;
    use crate::domain::ports::InMemoryStatsService;

    fn match_record(kills: u32, deaths: u32, seconds: u64, completed: bool) -> RawActivityRecord {
        RawActivityRecord {
            instance_id: format!("{kills}-{deaths}"),
            director_activity_hash: 7,
            period: Utc::now(),
            completed,
            player_count: 12,
            deaths,
            opponents_defeated: kills,
            time_played_seconds: seconds,
        }
    }

    #[tokio::test]
    async fn test_aggregates_every_page_of_every_character() {
        let membership = MembershipRef::new("111", 3);
        let stats = Arc::new(
            InMemoryStatsService::new()
                .with_characters(&membership, &["c1", "c2"])
                .with_history(
                    "c1",
                    ActivityMode::TeamScorched,
                    vec![
                        vec![match_record(20, 4, 600, true)].into(),
                        vec![match_record(35, 7, 720, false)].into(),
                    ],
                )
                .with_history(
                    "c2",
                    ActivityMode::TeamScorched,
                    vec![vec![match_record(5, 9, 300, true)].into()],
                ),
        );
        let engine = AggregationEngine::new(ActivityPaginator::new(stats.clone(), 250, 200));

        let totals = engine.aggregate(&membership, ActivityMode::TeamScorched).await.unwrap();

        assert_eq!(totals.activities, 3);
        assert_eq!(totals.total_kills_assists, 60);
        assert_eq!(totals.total_deaths, 20);
        assert_eq!(totals.total_time_played, 1620);
        assert_eq!(totals.most_kills_per_game, 35);
        assert!((totals.efficiency().unwrap() - 3.0).abs() < 1e-9);
        assert_eq!(totals.time_played_hms(), "0:27:00");
        assert_eq!(stats.report_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_history_yields_zero_totals() {
        let membership = MembershipRef::new("111", 3);
        let stats = Arc::new(InMemoryStatsService::new().with_characters(&membership, &["c1"]));
        let engine = AggregationEngine::new(ActivityPaginator::new(stats, 250, 200));

        let totals = engine.aggregate(&membership, ActivityMode::Raid).await.unwrap();

        assert_eq!(totals, ActivityTotals::new(ActivityMode::Raid));
        assert!(totals.efficiency().is_none());
    }

    #[tokio::test]
    async fn test_failed_page_discards_partial_totals() {
        let membership = MembershipRef::new("111", 3);
        let stats = Arc::new(InMemoryStatsService::new().with_characters(&membership, &["c1"]));
        stats.fail_pages(true);
        let engine = AggregationEngine::new(ActivityPaginator::new(stats, 250, 200));

        assert!(engine.aggregate(&membership, ActivityMode::Raid).await.is_none());
    }
}
