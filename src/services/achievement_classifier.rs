//! Turns activity history into validated solo and lowman clears.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::activity_paginator::ActivityPaginator;
use crate::domain::models::{
    suppress_superseded_solo, ClassifiedClear, ClearKind, MembershipRef, RawActivityRecord,
};
use crate::domain::ports::StatsService;

/// Classifies activity records into clears.
///
/// A candidate record costs one carnage-report fetch, plus one definition
/// lookup the first time its activity hash is seen. Definition names are
/// cached for the life of the classifier.
pub struct AchievementClassifier {
    stats: Arc<dyn StatsService>,
    paginator: ActivityPaginator,
    definitions: Mutex<HashMap<u32, String>>,
}

impl AchievementClassifier {
    pub fn new(stats: Arc<dyn StatsService>, paginator: ActivityPaginator) -> Self {
        Self {
            stats,
            paginator,
            definitions: Mutex::new(HashMap::new()),
        }
    }

    /// Validated solo dungeon clears over every character.
    ///
    /// A `Solo` clear is dropped when the same dungeon also has an `SF` clear.
    /// `None` when the history could not be read in full.
    #[instrument(skip(self), fields(membership = %membership))]
    pub async fn solo_dungeon_clears(&self, membership: &MembershipRef) -> Option<Vec<ClassifiedClear>> {
        let clears = self.collect(membership, ClearKind::SoloDungeon).await?;
        Some(suppress_superseded_solo(clears))
    }

    /// Validated lowman raid clears over every character.
    ///
    /// `None` when the history could not be read in full.
    #[instrument(skip(self), fields(membership = %membership))]
    pub async fn lowman_raid_clears(&self, membership: &MembershipRef) -> Option<Vec<ClassifiedClear>> {
        self.collect(membership, ClearKind::LowmanRaid).await
    }

    async fn collect(&self, membership: &MembershipRef, kind: ClearKind) -> Option<Vec<ClassifiedClear>> {
        let mut clears = Vec::new();

        for character in self.paginator.characters(membership).await? {
            let mut pages = self.paginator.pages(membership, &character, kind.mode());
            while let Some(page) = pages.next_page().await {
                for record in &page.records {
                    if let Some(clear) = self.classify_record(kind, record).await {
                        clears.push(clear);
                    }
                }
            }
            if pages.failed() {
                warn!(?kind, character = %character, "Activity history incomplete; no clears this pass");
                return None;
            }
        }

        info!(?kind, clears = clears.len(), "Classified clears");
        Some(clears)
    }

    /// Classify one record.
    ///
    /// Non-candidates return immediately without any lookup. Candidates are
    /// rejected when the carnage report is unavailable or shows a checkpoint
    /// resume, and when the activity name cannot be resolved.
    pub async fn classify_record(
        &self,
        kind: ClearKind,
        record: &RawActivityRecord,
    ) -> Option<ClassifiedClear> {
        if !kind.is_candidate(record) {
            return None;
        }
        let bucket = kind.bucket_for(record)?;

        let Some(report) = self.stats.carnage_report(&record.instance_id).await else {
            debug!(instance_id = %record.instance_id, "Carnage report unavailable; rejecting");
            return None;
        };
        if !report.started_from_beginning {
            debug!(instance_id = %record.instance_id, "Started from checkpoint; rejecting");
            return None;
        }

        let Some(name) = self.activity_name(record.director_activity_hash).await else {
            debug!(
                hash = record.director_activity_hash,
                "Activity definition unavailable; rejecting"
            );
            return None;
        };

        Some(ClassifiedClear::new(kind, bucket, name, record))
    }

    async fn activity_name(&self, hash: u32) -> Option<String> {
        if let Some(name) = self.definitions.lock().await.get(&hash) {
            return Some(name.clone());
        }

        let definition = self.stats.activity_definition(hash).await?;
        self.definitions
            .lock()
            .await
            .insert(hash, definition.name.clone());
        Some(definition.name)
    }
}
