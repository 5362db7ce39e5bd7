//! Forward-only iteration over a character's activity history.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::models::{ActivityMode, ActivityPage, CharacterId, MembershipRef};
use crate::domain::ports::StatsService;

/// Why a page sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationOutcome {
    /// The service returned an empty page or no activities field.
    Completed,
    /// A page fetch failed after retries.
    Failed,
    /// The page cap was reached.
    Exhausted,
}

/// Builds page sequences for (membership, character, mode) triples.
#[derive(Clone)]
pub struct ActivityPaginator {
    stats: Arc<dyn StatsService>,
    page_size: u32,
    max_pages: u32,
}

impl ActivityPaginator {
    pub fn new(stats: Arc<dyn StatsService>, page_size: u32, max_pages: u32) -> Self {
        Self {
            stats,
            page_size,
            max_pages,
        }
    }

    /// Every character of a membership, or `None` when the listing fails.
    pub async fn characters(&self, membership: &MembershipRef) -> Option<Vec<CharacterId>> {
        let Some(characters) = self.stats.characters(membership).await else {
            warn!(membership = %membership, "Character listing failed");
            return None;
        };
        debug!(membership = %membership, count = characters.len(), "Listed characters");
        Some(characters)
    }

    /// A fresh page sequence starting at page 0.
    pub fn pages(
        &self,
        membership: &MembershipRef,
        character: &CharacterId,
        mode: ActivityMode,
    ) -> ActivityPages {
        ActivityPages {
            stats: Arc::clone(&self.stats),
            membership: membership.clone(),
            character: character.clone(),
            mode,
            page_size: self.page_size,
            max_pages: self.max_pages,
            next_page: 0,
            outcome: None,
        }
    }
}

/// One page sequence.
///
/// ```ignore
/// let mut pages = paginator.pages(&membership, &character, ActivityMode::Dungeon);
/// while let Some(page) = pages.next_page().await {
///     // fully process page N before asking for page N + 1
/// }
/// ```
pub struct ActivityPages {
    stats: Arc<dyn StatsService>,
    membership: MembershipRef,
    character: CharacterId,
    mode: ActivityMode,
    page_size: u32,
    max_pages: u32,
    next_page: u32,
    outcome: Option<PaginationOutcome>,
}

impl ActivityPages {
    /// Fetch the next non-empty page, or `None` once the sequence has ended.
    pub async fn next_page(&mut self) -> Option<ActivityPage> {
        if self.outcome.is_some() {
            return None;
        }

        if self.next_page >= self.max_pages {
            warn!(
                membership = %self.membership,
                character = %self.character,
                mode = %self.mode,
                max_pages = self.max_pages,
                "Activity page cap reached"
            );
            self.outcome = Some(PaginationOutcome::Exhausted);
            return None;
        }

        let page_number = self.next_page;
        let fetched = self
            .stats
            .activity_page(
                &self.membership,
                &self.character,
                self.mode,
                page_number,
                self.page_size,
            )
            .await;

        match fetched {
            None => {
                warn!(
                    character = %self.character,
                    mode = %self.mode,
                    page = page_number,
                    "Activity page fetch failed; ending history early"
                );
                self.outcome = Some(PaginationOutcome::Failed);
                None
            }
            Some(page) if page.is_end() => {
                debug!(character = %self.character, mode = %self.mode, pages = page_number, "End of history");
                self.outcome = Some(PaginationOutcome::Completed);
                None
            }
            Some(page) => {
                self.next_page += 1;
                Some(page)
            }
        }
    }

    /// How the sequence ended; `None` while pages remain.
    pub const fn outcome(&self) -> Option<PaginationOutcome> {
        self.outcome
    }

    /// Whether the sequence stopped on a failed fetch rather than at the end of history.
    pub fn failed(&self) -> bool {
        self.outcome == Some(PaginationOutcome::Failed)
    }

    /// Number of non-empty pages returned so far.
    pub const fn pages_fetched(&self) -> u32 {
        self.next_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::RawActivityRecord;
    use crate::domain::ports::InMemoryStatsService;
    use chrono::Utc;

    fn record(id: &str) -> RawActivityRecord {
        RawActivityRecord {
            instance_id: id.to_string(),
            director_activity_hash: 1,
            period: Utc::now(),
            completed: true,
            player_count: 1,
            deaths: 0,
            opponents_defeated: 10,
            time_played_seconds: 600,
        }
    }

    fn membership() -> MembershipRef {
        MembershipRef::new("111", 2)
    }

    #[tokio::test]
    async fn test_iterates_until_empty_page() {
        let stats = Arc::new(InMemoryStatsService::new().with_history(
            "c1",
            ActivityMode::Dungeon,
            vec![
                vec![record("1"), record("2")].into(),
                vec![record("3")].into(),
            ],
        ));
        let paginator = ActivityPaginator::new(stats.clone(), 250, 200);
        let mut pages = paginator.pages(&membership(), &CharacterId::from("c1"), ActivityMode::Dungeon);

        let mut seen = Vec::new();
        while let Some(page) = pages.next_page().await {
            seen.extend(page.records.into_iter().map(|r| r.instance_id));
        }

        assert_eq!(seen, vec!["1", "2", "3"]);
        assert_eq!(pages.outcome(), Some(PaginationOutcome::Completed));
        assert_eq!(pages.pages_fetched(), 2);
        // Two data pages plus the terminating empty page
        assert_eq!(stats.page_calls(), 3);
        assert!(pages.next_page().await.is_none());
        assert_eq!(stats.page_calls(), 3);
    }

    #[tokio::test]
    async fn test_page_with_only_malformed_records_does_not_end_history() {
        let stats = Arc::new(InMemoryStatsService::new().with_history(
            "c1",
            ActivityMode::Raid,
            vec![ActivityPage::new(Vec::new(), 4), vec![record("5")].into()],
        ));
        let paginator = ActivityPaginator::new(stats, 250, 200);
        let mut pages = paginator.pages(&membership(), &CharacterId::from("c1"), ActivityMode::Raid);

        assert!(pages.next_page().await.unwrap().records.is_empty());
        assert_eq!(pages.next_page().await.unwrap().records.len(), 1);
        assert!(pages.next_page().await.is_none());
        assert_eq!(pages.outcome(), Some(PaginationOutcome::Completed));
    }

    #[tokio::test]
    async fn test_failed_fetch_ends_sequence() {
        let stats = Arc::new(InMemoryStatsService::new());
        stats.fail_all(true);
        let paginator = ActivityPaginator::new(stats.clone(), 250, 200);
        let mut pages = paginator.pages(&membership(), &CharacterId::from("c1"), ActivityMode::Raid);

        assert!(pages.next_page().await.is_none());
        assert_eq!(pages.outcome(), Some(PaginationOutcome::Failed));
        assert!(pages.failed());
        assert_eq!(stats.page_calls(), 1);
    }

    #[tokio::test]
    async fn test_page_cap_exhausts() {
        let stats = Arc::new(InMemoryStatsService::new().with_endless_history(
            "c1",
            ActivityMode::Dungeon,
            vec![record("1")].into(),
        ));
        let paginator = ActivityPaginator::new(stats.clone(), 250, 3);
        let mut pages = paginator.pages(&membership(), &CharacterId::from("c1"), ActivityMode::Dungeon);

        let mut count = 0;
        while pages.next_page().await.is_some() {
            count += 1;
        }

        assert_eq!(count, 3);
        assert_eq!(pages.outcome(), Some(PaginationOutcome::Exhausted));
        assert_eq!(stats.page_calls(), 3);
    }

    #[tokio::test]
    async fn test_failed_character_listing_is_not_an_empty_one() {
        let stats = Arc::new(InMemoryStatsService::new().with_characters(&membership(), &["c1", "c2"]));
        let paginator = ActivityPaginator::new(stats.clone(), 250, 200);

        assert_eq!(paginator.characters(&membership()).await.unwrap().len(), 2);
        assert_eq!(
            paginator.characters(&MembershipRef::new("999", 2)).await,
            Some(Vec::new())
        );

        stats.fail_all(true);
        assert!(paginator.characters(&membership()).await.is_none());
    }
}
