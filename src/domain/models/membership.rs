//! Player identity models.
//!
//! A guild member is known by a human-entered `name#code` display identity.
//! The stats service knows the same player by a stable
//! (membership id, membership type) pair. The types here carry both sides
//! of that mapping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Platform that owns a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum MembershipType {
    None,
    Xbox,
    Psn,
    Steam,
    Blizzard,
    Stadia,
    Epic,
    BungieNext,
    Other(i32),
}

impl MembershipType {
    /// Numeric value used in stats service paths.
    pub const fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Xbox => 1,
            Self::Psn => 2,
            Self::Steam => 3,
            Self::Blizzard => 4,
            Self::Stadia => 5,
            Self::Epic => 6,
            Self::BungieNext => 254,
            Self::Other(code) => code,
        }
    }
}

impl From<i32> for MembershipType {
    fn from(code: i32) -> Self {
        match code {
            0 => Self::None,
            1 => Self::Xbox,
            2 => Self::Psn,
            3 => Self::Steam,
            4 => Self::Blizzard,
            5 => Self::Stadia,
            6 => Self::Epic,
            254 => Self::BungieNext,
            other => Self::Other(other),
        }
    }
}

impl From<MembershipType> for i32 {
    fn from(value: MembershipType) -> Self {
        value.code()
    }
}

impl fmt::Display for MembershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Stable reference to a player account on the stats service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MembershipRef {
    pub membership_id: String,
    pub membership_type: MembershipType,
}

impl MembershipRef {
    pub fn new(membership_id: impl Into<String>, membership_type: impl Into<MembershipType>) -> Self {
        Self {
            membership_id: membership_id.into(),
            membership_type: membership_type.into(),
        }
    }
}

impl fmt::Display for MembershipRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.membership_type, self.membership_id)
    }
}

/// A `name#code` identifier as typed by a player into their guild nickname.
///
/// The name part is matched fuzzily by the search endpoint; the numeric
/// code is the discriminator that disambiguates prefix matches, and only
/// an exact integer match on it is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DisplayIdentity {
    pub name: String,
    pub code: u32,
}

impl DisplayIdentity {
    /// Whether `candidate` (a discriminator as reported by the service)
    /// identifies the same player.
    pub const fn matches_code(&self, candidate: u32) -> bool {
        self.code == candidate
    }
}

impl FromStr for DisplayIdentity {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (name, code) = raw
            .trim()
            .rsplit_once('#')
            .ok_or_else(|| DomainError::InvalidIdentity(format!("'{raw}' has no #code discriminator")))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidIdentity(format!("'{raw}' has an empty name")));
        }

        let code = code
            .trim()
            .parse::<u32>()
            .map_err(|_| DomainError::InvalidIdentity(format!("'{raw}' has a non-numeric discriminator")))?;

        Ok(Self {
            name: name.to_string(),
            code,
        })
    }
}

impl fmt::Display for DisplayIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{:04}", self.name, self.code)
    }
}

/// Opaque identifier of one character owned by a membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(pub String);

impl CharacterId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CharacterId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of resolving a display identity to a membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    /// A search result carried the exact discriminator.
    Found(MembershipRef),
    /// The search ran out of results without a match.
    NotFound,
    /// The page cap was reached while the service still reported more pages.
    Exhausted { pages_searched: u32 },
}

impl Resolution {
    pub const fn membership(&self) -> Option<&MembershipRef> {
        match self {
            Self::Found(membership) => Some(membership),
            Self::NotFound | Self::Exhausted { .. } => None,
        }
    }

    pub fn into_membership(self) -> Option<MembershipRef> {
        match self {
            Self::Found(membership) => Some(membership),
            Self::NotFound | Self::Exhausted { .. } => None,
        }
    }
}
