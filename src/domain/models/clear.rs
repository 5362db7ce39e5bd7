//! Classified clears: activities that count toward a badge.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::activity::{ActivityMode, RawActivityRecord};

/// Which classification rule produced a clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearKind {
    /// Completed dungeon with exactly one participant.
    SoloDungeon,
    /// Completed raid with three or fewer participants.
    LowmanRaid,
}

impl ClearKind {
    /// Activity history filter that yields this kind's candidates.
    pub const fn mode(self) -> ActivityMode {
        match self {
            Self::SoloDungeon => ActivityMode::Dungeon,
            Self::LowmanRaid => ActivityMode::Raid,
        }
    }

    /// Whether a record is a candidate for this kind, before validation.
    pub const fn is_candidate(self, record: &RawActivityRecord) -> bool {
        if !record.completed {
            return false;
        }
        match self {
            Self::SoloDungeon => record.player_count == 1,
            Self::LowmanRaid => record.player_count >= 1 && record.player_count <= 3,
        }
    }

    /// Participant bucket for a validated candidate.
    pub const fn bucket_for(self, record: &RawActivityRecord) -> Option<ClearBucket> {
        match self {
            Self::SoloDungeon => Some(if record.deaths == 0 {
                ClearBucket::Flawless
            } else {
                ClearBucket::Solo
            }),
            Self::LowmanRaid => match record.player_count {
                1 => Some(ClearBucket::Solo),
                2 => Some(ClearBucket::Duo),
                3 => Some(ClearBucket::Trio),
                _ => None,
            },
        }
    }
}

/// Name prefix of a classified clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClearBucket {
    #[serde(rename = "SF")]
    Flawless,
    Solo,
    Duo,
    Trio,
}

impl ClearBucket {
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Flawless => "SF",
            Self::Solo => "Solo",
            Self::Duo => "Duo",
            Self::Trio => "Trio",
        }
    }

    /// Split a classified name into its bucket and base activity name.
    pub fn split_name(name: &str) -> Option<(Self, &str)> {
        let (prefix, base) = name.split_once(' ')?;
        let bucket = match prefix {
            "SF" => Self::Flawless,
            "Solo" => Self::Solo,
            "Duo" => Self::Duo,
            "Trio" => Self::Trio,
            _ => return None,
        };
        let base = base.trim();
        if base.is_empty() {
            return None;
        }
        Some((bucket, base))
    }
}

impl fmt::Display for ClearBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A validated solo or lowman clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedClear {
    /// Prefixed name, e.g. `SF Duality: Standard`.
    pub activity_name: String,
    /// Unprefixed activity display name.
    pub base_name: String,
    pub bucket: ClearBucket,
    pub kind: ClearKind,
    pub deaths: u32,
    pub player_count: u32,
    pub period: DateTime<Utc>,
    pub director_activity_hash: u32,
    pub instance_id: String,
}

impl ClassifiedClear {
    pub fn new(
        kind: ClearKind,
        bucket: ClearBucket,
        base_name: impl Into<String>,
        record: &RawActivityRecord,
    ) -> Self {
        let base_name = base_name.into();
        Self {
            activity_name: format!("{} {}", bucket.prefix(), base_name),
            base_name,
            bucket,
            kind,
            deaths: record.deaths,
            player_count: record.player_count,
            period: record.period,
            director_activity_hash: record.director_activity_hash,
            instance_id: record.instance_id.clone(),
        }
    }
}

/// Drop `Solo` dungeon clears of activities that also have an `SF` clear.
///
/// A flawless clear supersedes a non-flawless one for role purposes. Must
/// run over the full set of clears (all pages, all characters).
pub fn suppress_superseded_solo(clears: Vec<ClassifiedClear>) -> Vec<ClassifiedClear> {
    let flawless: HashSet<String> = clears
        .iter()
        .filter(|clear| clear.kind == ClearKind::SoloDungeon && clear.bucket == ClearBucket::Flawless)
        .map(|clear| clear.base_name.clone())
        .collect();

    clears
        .into_iter()
        .filter(|clear| {
            !(clear.kind == ClearKind::SoloDungeon
                && clear.bucket == ClearBucket::Solo
                && flawless.contains(&clear.base_name))
        })
        .collect()
}

/// Number of clears per classified name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClearSummary {
    pub counts: BTreeMap<String, usize>,
}

impl ClearSummary {
    pub fn from_clears(clears: &[ClassifiedClear]) -> Self {
        let mut counts = BTreeMap::new();
        for clear in clears {
            *counts.entry(clear.activity_name.clone()).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(player_count: u32, deaths: u32, completed: bool) -> RawActivityRecord {
        RawActivityRecord {
            instance_id: "9000".to_string(),
            director_activity_hash: 2_823_159_265,
            period: Utc::now(),
            completed,
            player_count,
            deaths,
            opponents_defeated: 120,
            time_played_seconds: 1800,
        }
    }

    #[test]
    fn test_candidate_predicates() {
        assert!(ClearKind::SoloDungeon.is_candidate(&record(1, 0, true)));
        assert!(!ClearKind::SoloDungeon.is_candidate(&record(2, 0, true)));
        assert!(!ClearKind::SoloDungeon.is_candidate(&record(1, 0, false)));

        assert!(ClearKind::LowmanRaid.is_candidate(&record(3, 4, true)));
        assert!(ClearKind::LowmanRaid.is_candidate(&record(1, 0, true)));
        assert!(!ClearKind::LowmanRaid.is_candidate(&record(4, 0, true)));
        assert!(!ClearKind::LowmanRaid.is_candidate(&record(2, 0, false)));
    }

    #[test]
    fn test_buckets() {
        assert_eq!(ClearKind::SoloDungeon.bucket_for(&record(1, 0, true)), Some(ClearBucket::Flawless));
        assert_eq!(ClearKind::SoloDungeon.bucket_for(&record(1, 3, true)), Some(ClearBucket::Solo));
        assert_eq!(ClearKind::LowmanRaid.bucket_for(&record(3, 0, true)), Some(ClearBucket::Trio));
        assert_eq!(ClearKind::LowmanRaid.bucket_for(&record(2, 0, true)), Some(ClearBucket::Duo));
        assert_eq!(ClearKind::LowmanRaid.bucket_for(&record(1, 9, true)), Some(ClearBucket::Solo));
    }

    #[test]
    fn test_activity_name_prefix() {
        let clear = ClassifiedClear::new(
            ClearKind::SoloDungeon,
            ClearBucket::Flawless,
            "Duality: Standard",
            &record(1, 0, true),
        );
        assert_eq!(clear.activity_name, "SF Duality: Standard");
        assert_eq!(clear.base_name, "Duality: Standard");
    }

    #[test]
    fn test_split_name() {
        assert_eq!(
            ClearBucket::split_name("Trio Last Wish"),
            Some((ClearBucket::Trio, "Last Wish"))
        );
        assert_eq!(
            ClearBucket::split_name("SF Duality: Standard"),
            Some((ClearBucket::Flawless, "Duality: Standard"))
        );
        assert_eq!(ClearBucket::split_name("Quad Last Wish"), None);
        assert_eq!(ClearBucket::split_name("Solo"), None);
    }

    #[test]
    fn test_flawless_supersedes_solo() {
        let sf = ClassifiedClear::new(ClearKind::SoloDungeon, ClearBucket::Flawless, "Duality: Standard", &record(1, 0, true));
        let solo = ClassifiedClear::new(ClearKind::SoloDungeon, ClearBucket::Solo, "Duality: Standard", &record(1, 3, true));
        let other = ClassifiedClear::new(ClearKind::SoloDungeon, ClearBucket::Solo, "Prophecy", &record(1, 2, true));

        let kept = suppress_superseded_solo(vec![solo, sf, other]);
        let names: Vec<_> = kept.iter().map(|c| c.activity_name.as_str()).collect();
        assert_eq!(names, vec!["SF Duality: Standard", "Solo Prophecy"]);
    }

    #[test]
    fn test_raid_solo_clears_are_not_suppressed() {
        let raid_solo = ClassifiedClear::new(ClearKind::LowmanRaid, ClearBucket::Solo, "Duality: Standard", &record(1, 0, true));
        let sf = ClassifiedClear::new(ClearKind::SoloDungeon, ClearBucket::Flawless, "Duality: Standard", &record(1, 0, true));

        let kept = suppress_superseded_solo(vec![raid_solo, sf]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_summary_counts() {
        let a = ClassifiedClear::new(ClearKind::LowmanRaid, ClearBucket::Trio, "Last Wish", &record(3, 0, true));
        let b = a.clone();
        let c = ClassifiedClear::new(ClearKind::LowmanRaid, ClearBucket::Duo, "Crota's End: Standard", &record(2, 0, true));

        let summary = ClearSummary::from_clears(&[a, b, c]);
        assert_eq!(summary.counts.get("Trio Last Wish"), Some(&2));
        assert_eq!(summary.counts.get("Duo Crota's End: Standard"), Some(&1));
        assert_eq!(summary.total(), 3);
    }
}
