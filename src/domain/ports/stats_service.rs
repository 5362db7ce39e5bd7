//! Port for the external gameplay-statistics service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::models::{
    ActivityDefinition, ActivityMode, ActivityPage, CharacterId, MembershipRef, ValidationRecord,
};

/// One membership returned by the display-name search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCandidate {
    pub display_name: String,
    /// Discriminator as reported by the service, when present.
    pub code: Option<u32>,
    pub membership: MembershipRef,
}

/// One page of display-name search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Number of user results on the page (each may own several memberships).
    pub result_count: usize,
    /// Memberships of every user result, flattened.
    pub candidates: Vec<SearchCandidate>,
    pub has_more: bool,
}

impl SearchPage {
    /// A page where every user result owns exactly one membership.
    pub fn new(candidates: Vec<SearchCandidate>, has_more: bool) -> Self {
        Self {
            result_count: candidates.len(),
            candidates,
            has_more,
        }
    }

    /// No user results at all.
    pub const fn is_empty(&self) -> bool {
        self.result_count == 0
    }
}

impl SearchCandidate {
    pub fn new(display_name: &str, code: u32, membership: MembershipRef) -> Self {
        Self {
            display_name: display_name.to_string(),
            code: Some(code),
            membership,
        }
    }
}

/// Memberships linked to the account behind an OAuth access token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentUserMemberships {
    pub primary_membership_id: Option<String>,
    pub memberships: Vec<MembershipRef>,
}

impl CurrentUserMemberships {
    /// The primary membership, or the only one when no primary is set.
    pub fn primary(&self) -> Option<&MembershipRef> {
        match &self.primary_membership_id {
            Some(primary) => self
                .memberships
                .iter()
                .find(|membership| &membership.membership_id == primary),
            None if self.memberships.len() == 1 => self.memberships.first(),
            None => None,
        }
    }
}

/// Read-only queries against the stats service.
///
/// Every method returns `None` when the call failed after the client's
/// bounded retries. Callers treat `None` exactly like "no data".
#[async_trait]
pub trait StatsService: Send + Sync {
    /// Search players by display-name prefix.
    async fn search_by_global_name(&self, name: &str, page: u32) -> Option<SearchPage>;

    /// Memberships of the user who granted `access_token`.
    async fn memberships_for_current_user(&self, access_token: &str) -> Option<CurrentUserMemberships>;

    /// When the membership last played.
    async fn last_played(&self, membership: &MembershipRef) -> Option<DateTime<Utc>>;

    /// Characters owned by the membership, including deleted ones.
    async fn characters(&self, membership: &MembershipRef) -> Option<Vec<CharacterId>>;

    /// One page of a character's activity history.
    async fn activity_page(
        &self,
        membership: &MembershipRef,
        character: &CharacterId,
        mode: ActivityMode,
        page: u32,
        count: u32,
    ) -> Option<ActivityPage>;

    /// Display name of an activity type.
    async fn activity_definition(&self, director_activity_hash: u32) -> Option<ActivityDefinition>;

    /// Post-game report of one play-through.
    async fn carnage_report(&self, instance_id: &str) -> Option<ValidationRecord>;
}
