//! Activity history models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity-mode filter applied to a character's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum ActivityMode {
    Raid,
    Dungeon,
    TeamScorched,
    Other(u32),
}

impl ActivityMode {
    /// Numeric mode value understood by the activity-history endpoint.
    pub const fn code(self) -> u32 {
        match self {
            Self::Raid => 4,
            Self::TeamScorched => 62,
            Self::Dungeon => 82,
            Self::Other(code) => code,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Raid => "raid",
            Self::Dungeon => "dungeon",
            Self::TeamScorched => "team scorched",
            Self::Other(_) => "activity",
        }
    }
}

impl From<u32> for ActivityMode {
    fn from(code: u32) -> Self {
        match code {
            4 => Self::Raid,
            62 => Self::TeamScorched,
            82 => Self::Dungeon,
            other => Self::Other(other),
        }
    }
}

impl From<ActivityMode> for u32 {
    fn from(mode: ActivityMode) -> Self {
        mode.code()
    }
}

impl fmt::Display for ActivityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(code) => write!(f, "mode {code}"),
            known => f.write_str(known.label()),
        }
    }
}

/// One entry of a character's activity history.
///
/// Records are validated when they are built from the wire format; a page
/// entry missing its instance id, completion flag, or player count never
/// becomes a `RawActivityRecord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawActivityRecord {
    /// Identifier of this specific play-through.
    pub instance_id: String,
    /// Identifier of the activity type.
    pub director_activity_hash: u32,
    pub period: DateTime<Utc>,
    pub completed: bool,
    pub player_count: u32,
    pub deaths: u32,
    /// Kills plus assists.
    pub opponents_defeated: u32,
    pub time_played_seconds: u64,
}

/// One page of activity history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityPage {
    /// Records that passed ingestion validation.
    pub records: Vec<RawActivityRecord>,
    /// Number of entries the service returned before validation. Zero means
    /// the page was empty or had no activities field at all.
    pub raw_len: usize,
}

impl ActivityPage {
    pub const fn new(records: Vec<RawActivityRecord>, raw_len: usize) -> Self {
        Self { records, raw_len }
    }

    /// The sentinel page that ends pagination.
    pub const fn end() -> Self {
        Self {
            records: Vec::new(),
            raw_len: 0,
        }
    }

    pub const fn is_end(&self) -> bool {
        self.raw_len == 0
    }
}

impl From<Vec<RawActivityRecord>> for ActivityPage {
    fn from(records: Vec<RawActivityRecord>) -> Self {
        let raw_len = records.len();
        Self { records, raw_len }
    }
}

/// Human-readable name of an activity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDefinition {
    pub hash: u32,
    pub name: String,
}

/// Post-game report of one play-through, used to reject checkpoint resumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub instance_id: String,
    pub started_from_beginning: bool,
}
