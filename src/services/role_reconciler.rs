//! Converges a member's guild roles toward a set of role decisions.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::domain::models::RoleDecision;
use crate::domain::ports::{GuildDirectory, GuildMember, GuildRole};

/// What a reconciliation did, by role name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub unchanged: Vec<String>,
    /// Decisions naming a role the guild does not define.
    pub missing_roles: Vec<String>,
    /// Mutations the guild rejected.
    pub failed: Vec<String>,
}

impl ReconcileReport {
    pub fn mutations(&self) -> usize {
        self.added.len() + self.removed.len()
    }

    pub fn is_noop(&self) -> bool {
        self.mutations() == 0
    }
}

/// Collapse decisions that name the same role: present wins.
///
/// Keeps first-seen order so that mutations are issued deterministically.
pub fn merge_decisions(decisions: impl IntoIterator<Item = RoleDecision>) -> Vec<RoleDecision> {
    let mut merged: Vec<RoleDecision> = Vec::new();
    for decision in decisions {
        match merged.iter_mut().find(|existing| existing.role == decision.role) {
            Some(existing) => existing.present |= decision.present,
            None => merged.push(decision),
        }
    }
    merged
}

/// Issues idempotent add/remove calls against the guild.
#[derive(Clone)]
pub struct RoleReconciler {
    guild: Arc<dyn GuildDirectory>,
}

impl RoleReconciler {
    pub fn new(guild: Arc<dyn GuildDirectory>) -> Self {
        Self { guild }
    }

    /// Apply one decision per role.
    ///
    /// Roles are looked up by exact display name. A role already held is
    /// never added and a role not held is never removed. `member` is updated
    /// after every successful mutation, so a second call with the same
    /// decisions issues no mutations. A failed mutation is logged and the
    /// remaining decisions still run.
    #[instrument(skip_all, fields(member = %member.display_name()))]
    pub async fn reconcile(
        &self,
        member: &mut GuildMember,
        roles: &[GuildRole],
        decisions: &[RoleDecision],
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for decision in merge_decisions(decisions.iter().cloned()) {
            let Some(role) = roles.iter().find(|role| role.name == decision.role) else {
                warn!(role = %decision.role, "Guild has no role with this name; skipping");
                report.missing_roles.push(decision.role);
                continue;
            };

            let held = member.has_role(&role.id);
            match (decision.present, held) {
                (true, false) => match self.guild.add_role(&member.user_id, &role.id).await {
                    Ok(()) => {
                        info!(role = %role.name, "Added role");
                        member.role_ids.insert(role.id.clone());
                        report.added.push(decision.role);
                    }
                    Err(err) => {
                        warn!(role = %role.name, error = %err, "Failed to add role");
                        report.failed.push(decision.role);
                    }
                },
                (false, true) => match self.guild.remove_role(&member.user_id, &role.id).await {
                    Ok(()) => {
                        info!(role = %role.name, "Removed role");
                        member.role_ids.remove(&role.id);
                        report.removed.push(decision.role);
                    }
                    Err(err) => {
                        warn!(role = %role.name, error = %err, "Failed to remove role");
                        report.failed.push(decision.role);
                    }
                },
                _ => {
                    debug!(role = %role.name, present = decision.present, "Role already in desired state");
                    report.unchanged.push(decision.role);
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{InMemoryGuild, RoleMutation};

    fn roles() -> Vec<GuildRole> {
        vec![
            GuildRole::new("r-sf", "SF Duality"),
            GuildRole::new("r-solo", "Solo Duality"),
            GuildRole::new("r-lw", "Trio LW"),
        ]
    }

    fn setup(held: &[&str]) -> (Arc<InMemoryGuild>, RoleReconciler, GuildMember) {
        let member = GuildMember::new("u1", Some("Guardian#1234")).with_roles(held.iter().copied());
        let guild = Arc::new(InMemoryGuild::new(roles()).with_member(member.clone()));
        let reconciler = RoleReconciler::new(guild.clone());
        (guild, reconciler, member)
    }

    #[test]
    fn test_merge_decisions_present_wins() {
        let merged = merge_decisions([
            RoleDecision::absent("A"),
            RoleDecision::present("B"),
            RoleDecision::present("A"),
            RoleDecision::absent("B"),
        ]);
        assert_eq!(merged, vec![RoleDecision::present("A"), RoleDecision::present("B")]);
    }

    #[tokio::test]
    async fn test_all_four_combinations() {
        // held: SF (keep), Solo (remove). not held: Trio LW (add).
        let (guild, reconciler, mut member) = setup(&["r-sf", "r-solo"]);
        let decisions = vec![
            RoleDecision::present("SF Duality"),
            RoleDecision::absent("Solo Duality"),
            RoleDecision::present("Trio LW"),
        ];

        let report = reconciler.reconcile(&mut member, &roles(), &decisions).await;

        assert_eq!(report.added, vec!["Trio LW"]);
        assert_eq!(report.removed, vec!["Solo Duality"]);
        assert_eq!(report.unchanged, vec!["SF Duality"]);
        assert_eq!(
            guild.mutations().await,
            vec![
                RoleMutation::Remove {
                    user_id: "u1".to_string(),
                    role_id: "r-solo".to_string()
                },
                RoleMutation::Add {
                    user_id: "u1".to_string(),
                    role_id: "r-lw".to_string()
                },
            ]
        );
        assert!(member.has_role("r-lw"));
        assert!(!member.has_role("r-solo"));
    }

    #[tokio::test]
    async fn test_absent_and_not_held_is_noop() {
        let (guild, reconciler, mut member) = setup(&[]);

        let report = reconciler
            .reconcile(&mut member, &roles(), &[RoleDecision::absent("Solo Duality")])
            .await;

        assert!(report.is_noop());
        assert_eq!(report.unchanged, vec!["Solo Duality"]);
        assert!(guild.mutations().await.is_empty());
    }

    #[tokio::test]
    async fn test_second_pass_is_idempotent() {
        let (guild, reconciler, mut member) = setup(&["r-solo"]);
        let decisions = vec![
            RoleDecision::present("SF Duality"),
            RoleDecision::absent("Solo Duality"),
        ];

        let first = reconciler.reconcile(&mut member, &roles(), &decisions).await;
        assert_eq!(first.mutations(), 2);
        guild.clear_mutations().await;

        let second = reconciler.reconcile(&mut member, &roles(), &decisions).await;
        assert!(second.is_noop());
        assert!(guild.mutations().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_role_is_skipped() {
        let (guild, reconciler, mut member) = setup(&[]);
        let decisions = vec![
            RoleDecision::present("SF Prophecy"),
            RoleDecision::present("SF Duality"),
        ];

        let report = reconciler.reconcile(&mut member, &roles(), &decisions).await;

        assert_eq!(report.missing_roles, vec!["SF Prophecy"]);
        assert_eq!(report.added, vec!["SF Duality"]);
        assert_eq!(guild.mutations().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_mutation_does_not_abort_remaining() {
        let member = GuildMember::new("u1", Some("Guardian#1234"));
        let guild = Arc::new(
            InMemoryGuild::new(roles())
                .with_member(member.clone())
                .with_failing_role("r-sf"),
        );
        let reconciler = RoleReconciler::new(guild.clone());
        let mut member = member;

        let report = reconciler
            .reconcile(
                &mut member,
                &roles(),
                &[RoleDecision::present("SF Duality"), RoleDecision::present("Trio LW")],
            )
            .await;

        assert_eq!(report.failed, vec!["SF Duality"]);
        assert_eq!(report.added, vec!["Trio LW"]);
        assert!(!member.has_role("r-sf"));
    }
}
