//! Maps `name#code` identities to platform memberships.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::domain::models::{DisplayIdentity, MembershipRef, Resolution};
use crate::domain::ports::StatsService;

/// Resolves display identities through the paginated global-name search.
///
/// Pages are requested from 0 upward. Resolution stops at the first
/// membership whose discriminator equals the target, at an empty page, or at
/// a page that reports no further results. Reaching the page cap yields
/// [`Resolution::Exhausted`].
#[derive(Clone)]
pub struct IdentityResolver {
    stats: Arc<dyn StatsService>,
    max_search_pages: u32,
}

impl IdentityResolver {
    pub fn new(stats: Arc<dyn StatsService>, max_search_pages: u32) -> Self {
        Self {
            stats,
            max_search_pages,
        }
    }

    #[instrument(skip(self), fields(identity = %identity))]
    pub async fn resolve(&self, identity: &DisplayIdentity) -> Resolution {
        for page in 0..self.max_search_pages {
            let Some(results) = self.stats.search_by_global_name(&identity.name, page).await else {
                warn!(page, "Name search failed; treating identity as not found");
                return Resolution::NotFound;
            };

            let matched = results
                .candidates
                .iter()
                .find(|candidate| candidate.code.is_some_and(|code| identity.matches_code(code)));
            if let Some(candidate) = matched {
                info!(page, membership = %candidate.membership, "Resolved identity");
                return Resolution::Found(candidate.membership.clone());
            }

            if results.is_empty() {
                debug!(page, "Empty search page");
                return Resolution::NotFound;
            }
            if !results.has_more {
                debug!(page, "Search reported no further pages");
                return Resolution::NotFound;
            }
        }

        warn!(
            pages_searched = self.max_search_pages,
            "Search page cap reached without a discriminator match"
        );
        Resolution::Exhausted {
            pages_searched: self.max_search_pages,
        }
    }

    /// Parse and resolve a raw `name#code` string.
    ///
    /// Strings without a numeric discriminator resolve to `NotFound` without
    /// any search call.
    pub async fn resolve_str(&self, raw: &str) -> Resolution {
        match raw.parse::<DisplayIdentity>() {
            Ok(identity) => self.resolve(&identity).await,
            Err(err) => {
                debug!(raw, error = %err, "Not a resolvable identity");
                Resolution::NotFound
            }
        }
    }

    /// Primary membership of the account that granted an OAuth access token.
    ///
    /// Falls back to the first linked membership when no primary is set.
    #[instrument(skip_all)]
    pub async fn resolve_from_token(&self, access_token: &str) -> Option<MembershipRef> {
        let memberships = self.stats.memberships_for_current_user(access_token).await?;
        let membership = memberships
            .primary()
            .or_else(|| memberships.memberships.first())
            .cloned();

        match &membership {
            Some(membership) => info!(membership = %membership, "Resolved membership from token"),
            None => warn!("Token grants access to an account without Destiny memberships"),
        }
        membership
    }
}
