//! Badge-to-role naming tables.
//!
//! A mapping entry turns one badge (a classified clear name such as
//! `Trio Last Wish`) into one guild role name. Lookup is an exact string
//! match with no fallback. An entry can instead pin the director activity
//! hashes it accepts; it then matches clears by (bucket, hash) and the badge
//! text only supplies the bucket, so upstream display-name changes do not
//! break the join.

use serde::{Deserialize, Serialize};

use super::clear::{ClassifiedClear, ClearBucket};

/// One badge → role entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMappingEntry {
    /// Classified clear name, e.g. `SF Duality: Standard`.
    pub badge: String,
    /// Guild role display name.
    pub role: String,
    /// Director activity hashes that earn this badge. Empty means the badge
    /// is matched by name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activity_hashes: Vec<u32>,
}

impl RoleMappingEntry {
    pub fn new(badge: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            badge: badge.into(),
            role: role.into(),
            activity_hashes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_activity_hashes(mut self, hashes: impl IntoIterator<Item = u32>) -> Self {
        self.activity_hashes = hashes.into_iter().collect();
        self
    }

    /// Whether a single clear earns this entry's badge.
    pub fn is_earned_by(&self, clear: &ClassifiedClear) -> bool {
        if self.activity_hashes.is_empty() {
            return clear.activity_name == self.badge;
        }
        match ClearBucket::split_name(&self.badge) {
            Some((bucket, _)) => {
                clear.bucket == bucket && self.activity_hashes.contains(&clear.director_activity_hash)
            }
            None => false,
        }
    }
}

/// Desired state of one guild role after a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleDecision {
    pub role: String,
    pub present: bool,
}

impl RoleDecision {
    pub fn present(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            present: true,
        }
    }

    pub fn absent(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            present: false,
        }
    }
}

/// A naming table for one game mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleMapping {
    pub entries: Vec<RoleMappingEntry>,
}

impl RoleMapping {
    pub const fn new(entries: Vec<RoleMappingEntry>) -> Self {
        Self { entries }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(badge, role)| RoleMappingEntry::new(badge, role))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One decision per entry: present if any clear earns it, absent otherwise.
    pub fn decide(&self, clears: &[ClassifiedClear]) -> Vec<RoleDecision> {
        self.entries
            .iter()
            .map(|entry| RoleDecision {
                role: entry.role.clone(),
                present: clears.iter().any(|clear| entry.is_earned_by(clear)),
            })
            .collect()
    }

    /// Check that every entry is well formed.
    pub fn validate(&self) -> Result<(), String> {
        for entry in &self.entries {
            if entry.role.trim().is_empty() {
                return Err(format!("badge '{}' maps to an empty role name", entry.badge));
            }
            if ClearBucket::split_name(&entry.badge).is_none() {
                return Err(format!(
                    "badge '{}' must start with SF, Solo, Duo or Trio followed by the activity name",
                    entry.badge
                ));
            }
        }
        Ok(())
    }

    /// Deployed dungeon table.
    pub fn default_dungeon() -> Self {
        Self::from_pairs([
            ("Solo Warlord's Ruin: Standard", "Solo Warlords"),
            ("Solo Ghosts of the Deep: Standard", "Solo GotD"),
            ("Solo Spire of the Watcher: Standard", "Solo SotW"),
            ("Solo Duality: Standard", "Solo Duality"),
            ("Solo Grasp of Avarice: Standard", "Solo GoA"),
            ("Solo Prophecy", "Solo Prophecy"),
            ("Solo Pit of Heresy: Standard", "Solo PoH"),
            ("Solo The Shattered Throne", "Solo Shattered Throne"),
            ("SF Warlord's Ruin: Standard", "SF Warlords"),
            ("SF Ghosts of the Deep: Standard", "SF GotD"),
            ("SF Spire of the Watcher: Standard", "SF SotW"),
            ("SF Duality: Standard", "SF Duality"),
            ("SF Grasp of Avarice: Standard", "SF GoA"),
            ("SF Prophecy", "SF Prophecy"),
            ("SF Pit of Heresy: Standard", "SF PoH"),
            ("SF The Shattered Throne", "SF Shattered Throne"),
        ])
    }

    /// Deployed raid table.
    pub fn default_raid() -> Self {
        Self::from_pairs([
            ("Trio Last Wish", "Trio LW"),
            ("Trio Garden of Salvation", "Trio GoS"),
            ("Trio Deep Stone Crypt", "Trio DSC"),
            ("Duo Deep Stone Crypt", "Duo DSC"),
            ("Trio Vault of Glass: Standard", "Trio VoG"),
            ("Trio Vault of Glass: Master", "Trio VoG: Master"),
            ("Duo Vault of Glass: Standard", "Duo VoG"),
            ("Duo Vault of Glass: Master", "Duo VoG: Master"),
            ("Solo Vault of Glass: Standard", "Solo VoG"),
            ("Solo Vault of Glass: Master", "Solo VoG: Master"),
            ("Trio Vow of the Disciple: Standard", "Trio VotD"),
            ("Trio Vow of the Disciple: Master", "Trio VotD: Master"),
            ("Trio King's Fall: Standard", "Trio KF"),
            ("Trio King's Fall: Master", "Trio KF: Master"),
            ("Duo King's Fall: Standard", "Duo KF"),
            ("Duo King's Fall: Master", "Duo KF: Master"),
            ("Trio Root of Nightmares: Standard", "Trio RoN"),
            ("Trio Root of Nightmares: Master", "Trio RoN: Master"),
            ("Duo Root of Nightmares: Standard", "Duo RoN"),
            ("Duo Root of Nightmares: Master", "Duo RoN: Master"),
            ("Solo Root of Nightmares: Standard", "Solo RoN"),
            ("Solo Root of Nightmares: Master", "Solo RoN: Master"),
            ("Trio Crota's End: Standard", "Trio CE"),
            ("Trio Crota's End: Master", "Trio CE: Master"),
            ("Duo Crota's End: Standard", "Duo CE"),
            ("Duo Crota's End: Master", "Duo CE: Master"),
        ])
    }
}
