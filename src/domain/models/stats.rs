//! Cumulative activity statistics.

use serde::Serialize;

use super::activity::{ActivityMode, RawActivityRecord};

/// Running totals over every activity of one mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityTotals {
    pub mode: ActivityMode,
    pub activities: u64,
    pub total_kills_assists: u64,
    pub total_time_played: u64,
    pub total_deaths: u64,
    pub most_kills_per_game: u32,
}

impl ActivityTotals {
    pub const fn new(mode: ActivityMode) -> Self {
        Self {
            mode,
            activities: 0,
            total_kills_assists: 0,
            total_time_played: 0,
            total_deaths: 0,
            most_kills_per_game: 0,
        }
    }

    pub fn record(&mut self, activity: &RawActivityRecord) {
        self.activities += 1;
        self.total_kills_assists += u64::from(activity.opponents_defeated);
        self.total_time_played += activity.time_played_seconds;
        self.total_deaths += u64::from(activity.deaths);
        self.most_kills_per_game = self.most_kills_per_game.max(activity.opponents_defeated);
    }

    /// Kills and assists per death; `None` without any deaths.
    #[allow(clippy::cast_precision_loss)]
    pub fn efficiency(&self) -> Option<f64> {
        if self.total_deaths == 0 {
            return None;
        }
        Some(self.total_kills_assists as f64 / self.total_deaths as f64)
    }

    /// Total time played as `H:MM:SS`; hours are not wrapped at a day.
    pub fn time_played_hms(&self) -> String {
        let hours = self.total_time_played / 3600;
        let minutes = (self.total_time_played % 3600) / 60;
        let seconds = self.total_time_played % 60;
        format!("{hours}:{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn activity(kills: u32, deaths: u32, seconds: u64) -> RawActivityRecord {
        RawActivityRecord {
            instance_id: "1".to_string(),
            director_activity_hash: 1,
            period: Utc::now(),
            completed: true,
            player_count: 6,
            deaths,
            opponents_defeated: kills,
            time_played_seconds: seconds,
        }
    }

    #[test]
    fn test_record_accumulates() {
        let mut totals = ActivityTotals::new(ActivityMode::TeamScorched);
        totals.record(&activity(30, 5, 600));
        totals.record(&activity(45, 10, 700));
        totals.record(&activity(12, 0, 300));

        assert_eq!(totals.activities, 3);
        assert_eq!(totals.total_kills_assists, 87);
        assert_eq!(totals.total_deaths, 15);
        assert_eq!(totals.total_time_played, 1600);
        assert_eq!(totals.most_kills_per_game, 45);
        assert!((totals.efficiency().unwrap() - 5.8).abs() < 1e-9);
    }

    #[test]
    fn test_efficiency_without_deaths() {
        let mut totals = ActivityTotals::new(ActivityMode::TeamScorched);
        totals.record(&activity(10, 0, 60));
        assert!(totals.efficiency().is_none());
    }

    #[test]
    fn test_time_played_hms() {
        let mut totals = ActivityTotals::new(ActivityMode::TeamScorched);
        assert_eq!(totals.time_played_hms(), "0:00:00");
        totals.total_time_played = 90_061;
        assert_eq!(totals.time_played_hms(), "25:01:01");
    }
}
