//! In-memory stats service.
//!
//! Serves canned search pages, characters and activity history. Used by the
//! service unit tests and the end-to-end reconciliation scenarios.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::stats_service::{CurrentUserMemberships, SearchPage, StatsService};
use crate::domain::models::{
    ActivityDefinition, ActivityMode, ActivityPage, CharacterId, MembershipRef, ValidationRecord,
};

/// Canned stats service that counts the calls it receives.
///
/// Unknown keys behave like an empty upstream: an empty search page, an end
/// page of history, or `None` for lookups.
#[derive(Debug, Default)]
pub struct InMemoryStatsService {
    search_pages: HashMap<String, Vec<SearchPage>>,
    endless_search: HashMap<String, SearchPage>,
    token_memberships: HashMap<String, CurrentUserMemberships>,
    last_played: HashMap<String, DateTime<Utc>>,
    characters: HashMap<String, Vec<CharacterId>>,
    history: HashMap<(String, u32), Vec<ActivityPage>>,
    endless_history: HashMap<(String, u32), ActivityPage>,
    definitions: HashMap<u32, String>,
    reports: HashMap<String, bool>,
    fail_all: AtomicBool,
    fail_characters: AtomicBool,
    fail_pages: AtomicBool,
    search_calls: AtomicUsize,
    page_calls: AtomicUsize,
    definition_calls: AtomicUsize,
    report_calls: AtomicUsize,
}

impl InMemoryStatsService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search pages for a name, served from page 0 upward.
    #[must_use]
    pub fn with_search_pages(mut self, name: &str, pages: Vec<SearchPage>) -> Self {
        self.search_pages.insert(name.to_string(), pages);
        self
    }

    /// Serve the same page for every page index of a name search.
    #[must_use]
    pub fn with_endless_search(mut self, name: &str, page: SearchPage) -> Self {
        self.endless_search.insert(name.to_string(), page);
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: &str, memberships: CurrentUserMemberships) -> Self {
        self.token_memberships.insert(token.to_string(), memberships);
        self
    }

    #[must_use]
    pub fn with_last_played(mut self, membership: &MembershipRef, at: DateTime<Utc>) -> Self {
        self.last_played.insert(membership.membership_id.clone(), at);
        self
    }

    #[must_use]
    pub fn with_characters(mut self, membership: &MembershipRef, characters: &[&str]) -> Self {
        self.characters.insert(
            membership.membership_id.clone(),
            characters.iter().map(|id| CharacterId::from(*id)).collect(),
        );
        self
    }

    /// History pages for one character and mode, served from page 0 upward.
    #[must_use]
    pub fn with_history(mut self, character: &str, mode: ActivityMode, pages: Vec<ActivityPage>) -> Self {
        self.history.insert((character.to_string(), mode.code()), pages);
        self
    }

    /// Serve the same non-empty page for every page index.
    #[must_use]
    pub fn with_endless_history(mut self, character: &str, mode: ActivityMode, page: ActivityPage) -> Self {
        self.endless_history.insert((character.to_string(), mode.code()), page);
        self
    }

    #[must_use]
    pub fn with_definition(mut self, hash: u32, name: &str) -> Self {
        self.definitions.insert(hash, name.to_string());
        self
    }

    #[must_use]
    pub fn with_report(mut self, instance_id: &str, started_from_beginning: bool) -> Self {
        self.reports.insert(instance_id.to_string(), started_from_beginning);
        self
    }

    /// Make every call fail as if retries were exhausted.
    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Fail only character listings; search and lookups keep working.
    pub fn fail_characters(&self, fail: bool) {
        self.fail_characters.store(fail, Ordering::SeqCst);
    }

    /// Fail only activity history pages.
    pub fn fail_pages(&self, fail: bool) {
        self.fail_pages.store(fail, Ordering::SeqCst);
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn definition_calls(&self) -> usize {
        self.definition_calls.load(Ordering::SeqCst)
    }

    pub fn report_calls(&self) -> usize {
        self.report_calls.load(Ordering::SeqCst)
    }

    fn failing(&self) -> bool {
        self.fail_all.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatsService for InMemoryStatsService {
    async fn search_by_global_name(&self, name: &str, page: u32) -> Option<SearchPage> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing() {
            return None;
        }
        if let Some(endless) = self.endless_search.get(name) {
            return Some(endless.clone());
        }
        Some(
            self.search_pages
                .get(name)
                .and_then(|pages| pages.get(page as usize))
                .cloned()
                .unwrap_or_default(),
        )
    }

    async fn memberships_for_current_user(&self, access_token: &str) -> Option<CurrentUserMemberships> {
        if self.failing() {
            return None;
        }
        self.token_memberships.get(access_token).cloned()
    }

    async fn last_played(&self, membership: &MembershipRef) -> Option<DateTime<Utc>> {
        if self.failing() {
            return None;
        }
        self.last_played.get(&membership.membership_id).copied()
    }

    async fn characters(&self, membership: &MembershipRef) -> Option<Vec<CharacterId>> {
        if self.failing() || self.fail_characters.load(Ordering::SeqCst) {
            return None;
        }
        Some(
            self.characters
                .get(&membership.membership_id)
                .cloned()
                .unwrap_or_default(),
        )
    }

    async fn activity_page(
        &self,
        _membership: &MembershipRef,
        character: &CharacterId,
        mode: ActivityMode,
        page: u32,
        _count: u32,
    ) -> Option<ActivityPage> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing() || self.fail_pages.load(Ordering::SeqCst) {
            return None;
        }
        let key = (character.as_str().to_string(), mode.code());
        if let Some(endless) = self.endless_history.get(&key) {
            return Some(endless.clone());
        }
        Some(
            self.history
                .get(&key)
                .and_then(|pages| pages.get(page as usize))
                .cloned()
                .unwrap_or_else(ActivityPage::end),
        )
    }

    async fn activity_definition(&self, director_activity_hash: u32) -> Option<ActivityDefinition> {
        self.definition_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing() {
            return None;
        }
        self.definitions
            .get(&director_activity_hash)
            .map(|name| ActivityDefinition {
                hash: director_activity_hash,
                name: name.clone(),
            })
    }

    async fn carnage_report(&self, instance_id: &str) -> Option<ValidationRecord> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing() {
            return None;
        }
        self.reports
            .get(instance_id)
            .map(|started_from_beginning| ValidationRecord {
                instance_id: instance_id.to_string(),
                started_from_beginning: *started_from_beginning,
            })
    }
}
