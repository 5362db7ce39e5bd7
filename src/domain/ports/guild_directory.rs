//! Port for the chat guild whose roles mirror player badges.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::errors::DomainResult;

/// A guild member as seen at the start of their reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildMember {
    pub user_id: String,
    pub username: String,
    pub nickname: Option<String>,
    pub role_ids: HashSet<String>,
}

impl GuildMember {
    pub fn new(user_id: impl Into<String>, nickname: Option<&str>) -> Self {
        let user_id = user_id.into();
        Self {
            username: user_id.clone(),
            user_id,
            nickname: nickname.map(str::to_string),
            role_ids: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with_roles<'a>(mut self, role_ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.role_ids = role_ids.into_iter().map(str::to_string).collect();
        self
    }

    pub fn has_role(&self, role_id: &str) -> bool {
        self.role_ids.contains(role_id)
    }

    /// Name used in log lines.
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.username)
    }
}

/// A role defined in the guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildRole {
    pub id: String,
    pub name: String,
}

impl GuildRole {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Guild membership and role mutations.
#[async_trait]
pub trait GuildDirectory: Send + Sync {
    /// Every current guild member.
    async fn members(&self) -> DomainResult<Vec<GuildMember>>;

    /// Every role defined in the guild.
    async fn roles(&self) -> DomainResult<Vec<GuildRole>>;

    /// Grant a role to a member.
    async fn add_role(&self, user_id: &str, role_id: &str) -> DomainResult<()>;

    /// Revoke a role from a member.
    async fn remove_role(&self, user_id: &str, role_id: &str) -> DomainResult<()>;
}
