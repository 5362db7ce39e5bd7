//! Wire shapes of the Bungie.net platform API and their domain conversions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::BungieApiError;
use crate::domain::models::{
    ActivityDefinition, ActivityPage, CharacterId, MembershipRef, RawActivityRecord,
    ValidationRecord,
};
use crate::domain::ports::{CurrentUserMemberships, SearchCandidate, SearchPage};

/// Platform error code for success.
pub const SUCCESS_CODE: i32 = 1;

/// Envelope wrapped around every platform response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope<T> {
    pub response: Option<T>,
    #[serde(default)]
    pub error_code: i32,
    #[serde(default)]
    pub error_status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub throttle_seconds: u32,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, treating any error code other than success as a failure.
    pub fn into_result(self) -> Result<T, BungieApiError> {
        if self.error_code != SUCCESS_CODE {
            return Err(BungieApiError::Platform {
                code: self.error_code,
                status: self.error_status,
                message: self.message,
                throttle_seconds: self.throttle_seconds,
            });
        }
        self.response.ok_or(BungieApiError::MissingResponse)
    }
}

/// Request body of the global-name search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalNameSearchRequest<'a> {
    pub display_name_prefix: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchResponse {
    #[serde(default)]
    pub search_results: Vec<UserSearchResult>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchResult {
    #[serde(default)]
    pub bungie_global_display_name: String,
    #[serde(default)]
    pub bungie_global_display_name_code: Option<u32>,
    #[serde(default)]
    pub destiny_memberships: Vec<UserInfoCard>,
}

/// A platform membership as reported by user endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoCard {
    pub membership_id: String,
    pub membership_type: i32,
    #[serde(default)]
    pub bungie_global_display_name: Option<String>,
    #[serde(default)]
    pub bungie_global_display_name_code: Option<u32>,
}

impl From<UserSearchResponse> for SearchPage {
    fn from(response: UserSearchResponse) -> Self {
        let result_count = response.search_results.len();
        let candidates = response
            .search_results
            .into_iter()
            .flat_map(|user| {
                let user_name = user.bungie_global_display_name;
                let user_code = user.bungie_global_display_name_code;
                user.destiny_memberships.into_iter().map(move |card| SearchCandidate {
                    display_name: card
                        .bungie_global_display_name
                        .unwrap_or_else(|| user_name.clone()),
                    code: card.bungie_global_display_name_code.or(user_code),
                    membership: MembershipRef::new(card.membership_id, card.membership_type),
                })
            })
            .collect();
        Self {
            result_count,
            candidates,
            has_more: response.has_more,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMembershipData {
    #[serde(default)]
    pub destiny_memberships: Vec<UserInfoCard>,
    #[serde(default)]
    pub primary_membership_id: Option<String>,
}

impl From<UserMembershipData> for CurrentUserMemberships {
    fn from(data: UserMembershipData) -> Self {
        Self {
            primary_membership_id: data.primary_membership_id,
            memberships: data
                .destiny_memberships
                .into_iter()
                .map(|card| MembershipRef::new(card.membership_id, card.membership_type))
                .collect(),
        }
    }
}

/// Profile response restricted to the `Profiles` component (100).
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub profile: Option<ComponentResponse<ProfileComponent>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentResponse<T> {
    pub data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileComponent {
    pub date_last_played: DateTime<Utc>,
}

impl ProfileResponse {
    pub fn date_last_played(&self) -> Option<DateTime<Utc>> {
        self.profile
            .as_ref()
            .and_then(|component| component.data.as_ref())
            .map(|data| data.date_last_played)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountStatsResponse {
    #[serde(default)]
    pub characters: Vec<AccountCharacter>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCharacter {
    pub character_id: String,
}

impl AccountStatsResponse {
    pub fn character_ids(self) -> Vec<CharacterId> {
        self.characters
            .into_iter()
            .map(|character| CharacterId(character.character_id))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityHistoryResponse {
    #[serde(default)]
    pub activities: Option<Vec<HistoricalActivity>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalActivity {
    #[serde(default)]
    pub period: Option<DateTime<Utc>>,
    #[serde(default)]
    pub activity_details: Option<ActivityDetails>,
    #[serde(default)]
    pub values: HashMap<String, StatValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetails {
    #[serde(default)]
    pub director_activity_hash: u32,
    #[serde(default)]
    pub instance_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatValue {
    pub basic: BasicValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BasicValue {
    pub value: f64,
}

impl HistoricalActivity {
    fn stat(&self, key: &str) -> Option<f64> {
        self.values.get(key).map(|stat| stat.basic.value)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn count(&self, key: &str) -> u32 {
        self.stat(key).map_or(0, |value| value.max(0.0) as u32)
    }

    /// Convert to a domain record, or `None` when a required field is missing.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn into_record(self) -> Option<RawActivityRecord> {
        let details = self.activity_details.as_ref()?;
        let instance_id = details.instance_id.clone()?;
        let completed = self.stat("completed")?;
        let player_count = self.stat("playerCount")?;

        Some(RawActivityRecord {
            director_activity_hash: details.director_activity_hash,
            period: self.period.unwrap_or_default(),
            completed: completed >= 1.0,
            player_count: player_count.max(0.0) as u32,
            deaths: self.count("deaths"),
            opponents_defeated: self.count("opponentsDefeated"),
            time_played_seconds: u64::from(self.count("timePlayedSeconds")),
            instance_id,
        })
    }
}

impl From<ActivityHistoryResponse> for ActivityPage {
    fn from(response: ActivityHistoryResponse) -> Self {
        let Some(activities) = response.activities else {
            return Self::end();
        };
        let raw_len = activities.len();
        let records = activities
            .into_iter()
            .enumerate()
            .filter_map(|(index, activity)| {
                let record = activity.into_record();
                if record.is_none() {
                    debug!(index, "Dropping activity record with missing required fields");
                }
                record
            })
            .collect();
        Self::new(records, raw_len)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostGameCarnageReport {
    #[serde(default)]
    pub activity_was_started_from_beginning: Option<bool>,
}

impl PostGameCarnageReport {
    /// Only an explicit `false` marks a checkpoint resume; reports that
    /// predate the flag count as started from the beginning.
    pub fn into_validation(self, instance_id: &str) -> ValidationRecord {
        ValidationRecord {
            instance_id: instance_id.to_string(),
            started_from_beginning: self.activity_was_started_from_beginning != Some(false),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDefinitionResponse {
    #[serde(default)]
    pub hash: Option<u32>,
    pub display_properties: DisplayProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayProperties {
    #[serde(default)]
    pub name: String,
}

impl ActivityDefinitionResponse {
    pub fn into_definition(self, requested_hash: u32) -> ActivityDefinition {
        ActivityDefinition {
            hash: self.hash.unwrap_or(requested_hash),
            name: self.display_properties.name,
        }
    }
}
