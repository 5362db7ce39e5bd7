//! Discord REST v10 payloads.
//!
//! Only the fields the guild directory reads are modelled; everything else
//! in the payload is ignored.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::ports::{GuildMember, GuildRole};

/// A guild member object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordMember {
    pub user: DiscordUser,
    /// Guild nickname, absent or null when unset.
    #[serde(default)]
    pub nick: Option<String>,
    /// Role snowflakes held by the member.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The user behind a guild member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    #[serde(default)]
    pub username: String,
}

/// A guild role object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordRole {
    pub id: String,
    pub name: String,
}

impl From<DiscordMember> for GuildMember {
    fn from(member: DiscordMember) -> Self {
        Self {
            user_id: member.user.id,
            username: member.user.username,
            nickname: member.nick,
            role_ids: member.roles.into_iter().collect::<HashSet<_>>(),
        }
    }
}

impl From<DiscordRole> for GuildRole {
    fn from(role: DiscordRole) -> Self {
        Self::new(role.id, role.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_without_nick() {
        let json = r#"{"user": {"id": "42", "username": "guardian"}, "roles": ["1", "2"], "joined_at": "2023-01-01T00:00:00Z"}"#;
        let member: GuildMember = serde_json::from_str::<DiscordMember>(json).unwrap().into();

        assert_eq!(member.user_id, "42");
        assert!(member.nickname.is_none());
        assert_eq!(member.display_name(), "guardian");
        assert!(member.has_role("2"));
    }

    #[test]
    fn test_member_with_null_nick() {
        let json = r#"{"user": {"id": "42", "username": "guardian"}, "nick": null, "roles": []}"#;
        let member: DiscordMember = serde_json::from_str(json).unwrap();

        assert!(member.nick.is_none());
    }
}
