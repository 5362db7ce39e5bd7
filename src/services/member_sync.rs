//! Full reconciliation of one guild member.
//!
//! Nickname → identity → clears → role decisions → mutations.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::achievement_classifier::AchievementClassifier;
use super::activity_paginator::ActivityPaginator;
use super::identity_resolver::IdentityResolver;
use super::role_reconciler::{ReconcileReport, RoleReconciler};
use crate::domain::models::{
    Config, DisplayIdentity, MembershipRef, Resolution, RoleDecision, RolesConfig,
};
use crate::domain::ports::{GuildDirectory, GuildMember, GuildRole, StatsService};

/// Result of reconciling one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MemberOutcome {
    /// The nickname is missing or carries no `#code`.
    Skipped { reason: String },
    /// The identity did not resolve; no roles were touched.
    Unresolved { resolution: Resolution },
    /// Activity history could not be read in full; no roles were touched.
    Incomplete { membership: MembershipRef },
    Reconciled {
        membership: MembershipRef,
        report: ReconcileReport,
    },
}

impl MemberOutcome {
    pub fn report(&self) -> Option<&ReconcileReport> {
        match self {
            Self::Reconciled { report, .. } => Some(report),
            Self::Skipped { .. } | Self::Unresolved { .. } | Self::Incomplete { .. } => None,
        }
    }
}

/// Wires resolver, classifier and reconciler together for one member.
pub struct MemberSyncService {
    stats: Arc<dyn StatsService>,
    resolver: IdentityResolver,
    classifier: AchievementClassifier,
    reconciler: RoleReconciler,
    roles: RolesConfig,
}

impl MemberSyncService {
    pub fn new(
        stats: Arc<dyn StatsService>,
        guild: Arc<dyn GuildDirectory>,
        config: &Config,
    ) -> Self {
        let paginator = ActivityPaginator::new(
            Arc::clone(&stats),
            config.pagination.page_size,
            config.pagination.max_activity_pages,
        );
        Self {
            resolver: IdentityResolver::new(Arc::clone(&stats), config.pagination.max_search_pages),
            classifier: AchievementClassifier::new(Arc::clone(&stats), paginator),
            reconciler: RoleReconciler::new(guild),
            roles: config.roles.clone(),
            stats,
        }
    }

    pub const fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    pub const fn classifier(&self) -> &AchievementClassifier {
        &self.classifier
    }

    /// Every role decision for a resolved membership.
    ///
    /// One decision per dungeon and raid table entry, the activity role when
    /// configured and the profile is available, and a present decision for
    /// each always-granted role. `None` when either history is incomplete,
    /// since absent clears would then read as lost badges.
    #[instrument(skip(self), fields(membership = %membership))]
    pub async fn desired_roles(&self, membership: &MembershipRef) -> Option<Vec<RoleDecision>> {
        let dungeon_clears = self.classifier.solo_dungeon_clears(membership).await?;
        let raid_clears = self.classifier.lowman_raid_clears(membership).await?;

        let mut decisions = self.roles.dungeon.decide(&dungeon_clears);
        decisions.extend(self.roles.raid.decide(&raid_clears));

        if let Some(decision) = self.activity_decision(membership).await {
            decisions.push(decision);
        }

        decisions.extend(self.roles.always.iter().map(RoleDecision::present));
        Some(decisions)
    }

    async fn activity_decision(&self, membership: &MembershipRef) -> Option<RoleDecision> {
        let role = self.roles.activity.role.as_deref()?;

        let Some(last_played) = self.stats.last_played(membership).await else {
            warn!(role, "Profile unavailable; leaving activity role untouched");
            return None;
        };

        let window = ChronoDuration::days(i64::from(self.roles.activity.window_days));
        let recent = Utc::now().signed_duration_since(last_played) < window;
        debug!(%last_played, recent, "Checked last played");
        Some(RoleDecision {
            role: role.to_string(),
            present: recent,
        })
    }

    /// Reconcile one member against the guild's current role list.
    #[instrument(skip_all, fields(member = %member.display_name()))]
    pub async fn sync_member(&self, member: &mut GuildMember, roles: &[GuildRole]) -> MemberOutcome {
        let Some(nickname) = member.nickname.clone() else {
            warn!("Member has no nickname; skipping");
            return MemberOutcome::Skipped {
                reason: "no nickname".to_string(),
            };
        };

        let identity = match nickname.parse::<DisplayIdentity>() {
            Ok(identity) => identity,
            Err(err) => {
                warn!(error = %err, "Nickname is not a name#code identity; skipping");
                return MemberOutcome::Skipped {
                    reason: err.to_string(),
                };
            }
        };

        let membership = match self.resolver.resolve(&identity).await {
            Resolution::Found(membership) => membership,
            resolution => {
                warn!(?resolution, "Identity did not resolve; skipping");
                return MemberOutcome::Unresolved { resolution };
            }
        };

        let Some(decisions) = self.desired_roles(&membership).await else {
            warn!(membership = %membership, "Activity history incomplete; leaving roles untouched");
            return MemberOutcome::Incomplete { membership };
        };
        let report = self.reconciler.reconcile(member, roles, &decisions).await;
        info!(
            added = report.added.len(),
            removed = report.removed.len(),
            failed = report.failed.len(),
            "Member reconciled"
        );

        MemberOutcome::Reconciled { membership, report }
    }
}
