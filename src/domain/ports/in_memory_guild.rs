//! In-memory guild directory that records every role mutation.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::guild_directory::{GuildDirectory, GuildMember, GuildRole};
use crate::domain::errors::{DomainError, DomainResult};

/// A role mutation issued against the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleMutation {
    Add { user_id: String, role_id: String },
    Remove { user_id: String, role_id: String },
}

#[derive(Debug, Default)]
pub struct InMemoryGuild {
    members: Mutex<Vec<GuildMember>>,
    roles: Vec<GuildRole>,
    mutations: Mutex<Vec<RoleMutation>>,
    failing_roles: HashSet<String>,
    unavailable: AtomicBool,
}

impl InMemoryGuild {
    pub fn new(roles: Vec<GuildRole>) -> Self {
        Self {
            roles,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_member(mut self, member: GuildMember) -> Self {
        self.members.get_mut().push(member);
        self
    }

    /// Mutations of this role id fail.
    #[must_use]
    pub fn with_failing_role(mut self, role_id: &str) -> Self {
        self.failing_roles.insert(role_id.to_string());
        self
    }

    /// Make member and role listing fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> DomainResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::ExternalService("guild unavailable".to_string()));
        }
        Ok(())
    }

    pub async fn mutations(&self) -> Vec<RoleMutation> {
        self.mutations.lock().await.clone()
    }

    pub async fn clear_mutations(&self) {
        self.mutations.lock().await.clear();
    }

    pub async fn member(&self, user_id: &str) -> Option<GuildMember> {
        self.members
            .lock()
            .await
            .iter()
            .find(|member| member.user_id == user_id)
            .cloned()
    }

    /// Role names currently held by a member.
    pub async fn role_names(&self, user_id: &str) -> HashSet<String> {
        let Some(member) = self.member(user_id).await else {
            return HashSet::new();
        };
        self.roles
            .iter()
            .filter(|role| member.role_ids.contains(&role.id))
            .map(|role| role.name.clone())
            .collect()
    }

    fn check_role(&self, role_id: &str) -> DomainResult<()> {
        if self.failing_roles.contains(role_id) {
            return Err(DomainError::ExternalService(format!(
                "role mutation rejected for role {role_id}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl GuildDirectory for InMemoryGuild {
    async fn members(&self) -> DomainResult<Vec<GuildMember>> {
        self.check_available()?;
        Ok(self.members.lock().await.clone())
    }

    async fn roles(&self) -> DomainResult<Vec<GuildRole>> {
        self.check_available()?;
        Ok(self.roles.clone())
    }

    async fn add_role(&self, user_id: &str, role_id: &str) -> DomainResult<()> {
        self.check_role(role_id)?;
        let mut members = self.members.lock().await;
        let member = members
            .iter_mut()
            .find(|member| member.user_id == user_id)
            .ok_or_else(|| DomainError::MemberNotFound(user_id.to_string()))?;
        member.role_ids.insert(role_id.to_string());
        self.mutations.lock().await.push(RoleMutation::Add {
            user_id: user_id.to_string(),
            role_id: role_id.to_string(),
        });
        Ok(())
    }

    async fn remove_role(&self, user_id: &str, role_id: &str) -> DomainResult<()> {
        self.check_role(role_id)?;
        let mut members = self.members.lock().await;
        let member = members
            .iter_mut()
            .find(|member| member.user_id == user_id)
            .ok_or_else(|| DomainError::MemberNotFound(user_id.to_string()))?;
        member.role_ids.remove(role_id);
        self.mutations.lock().await.push(RoleMutation::Remove {
            user_id: user_id.to_string(),
            role_id: role_id.to_string(),
        });
        Ok(())
    }
}
