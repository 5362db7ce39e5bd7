mod common;

use chrono::{TimeZone, Utc};
use clearkeeper::domain::models::{ActivityMode, CharacterId, MembershipRef};
use clearkeeper::domain::ports::StatsService;
use serde_json::json;
use wiremock::matchers::{bearer_token, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{activity_json, bungie_client, envelope, error_envelope};

fn membership() -> MembershipRef {
    MembershipRef::new("4611686018400000000", 2)
}

#[tokio::test]
async fn test_search_sends_api_key_and_prefix() {
    common::setup_test_logging();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Platform/User/Search/GlobalName/0/"))
        .and(header("X-API-Key", "test-api-key"))
        .and(body_json(json!({ "displayNamePrefix": "Guardian" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "searchResults": [{
                "bungieGlobalDisplayName": "Guardian",
                "bungieGlobalDisplayNameCode": 1234,
                "bungieNetMembershipId": "99",
                "destinyMemberships": [
                    { "membershipId": "111", "membershipType": 2, "displayName": "Guardian" },
                    { "membershipId": "222", "membershipType": 3, "displayName": "Guardian" }
                ]
            }],
            "page": 0,
            "hasMore": true
        }))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = bungie_client(&mock_server.uri(), 3);
    let page = client.search_by_global_name("Guardian", 0).await.unwrap();

    assert_eq!(page.result_count, 1);
    assert!(page.has_more);
    assert_eq!(page.candidates.len(), 2);
    assert_eq!(page.candidates[0].code, Some(1234));
    assert_eq!(page.candidates[0].membership, MembershipRef::new("111", 2));
}

#[tokio::test]
async fn test_always_failing_call_makes_exactly_max_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Platform/Destiny2/Stats/PostGameCarnageReport/77/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = bungie_client(&mock_server.uri(), 3);

    assert!(client.carnage_report("77").await.is_none());
}

#[tokio::test]
async fn test_platform_error_code_is_retried_then_suppressed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Platform/Destiny2/Manifest/DestinyActivityDefinition/5/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(error_envelope(5, "SystemDisabled")))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = bungie_client(&mock_server.uri(), 2);

    assert!(client.activity_definition(5).await.is_none());
}

#[tokio::test]
async fn test_undecodable_body_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Platform/Destiny2/2/Account/4611686018400000000/Stats/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = bungie_client(&mock_server.uri(), 3);

    assert!(client.characters(&membership()).await.is_none());
}

#[tokio::test]
async fn test_recovers_after_transient_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Platform/Destiny2/Stats/PostGameCarnageReport/900/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Platform/Destiny2/Stats/PostGameCarnageReport/900/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "period": "2024-03-01T18:00:00Z",
            "activityWasStartedFromBeginning": true,
            "entries": []
        }))))
        .mount(&mock_server)
        .await;

    let client = bungie_client(&mock_server.uri(), 3);
    let report = client.carnage_report("900").await.unwrap();

    assert_eq!(report.instance_id, "900");
    assert!(report.started_from_beginning);
}

#[tokio::test]
async fn test_carnage_report_only_explicit_false_means_checkpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Platform/Destiny2/Stats/PostGameCarnageReport/901/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({ "entries": [] }))))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Platform/Destiny2/Stats/PostGameCarnageReport/902/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "activityWasStartedFromBeginning": false,
            "entries": []
        }))))
        .mount(&mock_server)
        .await;

    let client = bungie_client(&mock_server.uri(), 1);

    assert!(client.carnage_report("901").await.unwrap().started_from_beginning);
    assert!(!client.carnage_report("902").await.unwrap().started_from_beginning);
}

#[tokio::test]
async fn test_activity_page_query_and_malformed_records() {
    let mock_server = MockServer::start().await;

    let mut malformed = activity_json("3", 7, true, 1, 0);
    malformed["activityDetails"]
        .as_object_mut()
        .unwrap()
        .remove("instanceId");

    Mock::given(method("GET"))
        .and(path(
            "/Platform/Destiny2/2/Account/4611686018400000000/Character/c1/Stats/Activities/",
        ))
        .and(query_param("page", "0"))
        .and(query_param("mode", "82"))
        .and(query_param("count", "250"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "activities": [
                activity_json("1", 7, true, 1, 0),
                activity_json("2", 7, false, 1, 3),
                malformed
            ]
        }))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = bungie_client(&mock_server.uri(), 1);
    let page = client
        .activity_page(&membership(), &CharacterId::from("c1"), ActivityMode::Dungeon, 0, 250)
        .await
        .unwrap();

    assert_eq!(page.raw_len, 3);
    assert_eq!(page.records.len(), 2);
    assert!(!page.is_end());
    assert_eq!(page.records[0].instance_id, "1");
    assert!(page.records[0].completed);
    assert_eq!(page.records[1].deaths, 3);
    assert!(!page.records[1].completed);
}

#[tokio::test]
async fn test_missing_activities_field_ends_history() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(
            "/Platform/Destiny2/2/Account/4611686018400000000/Character/c1/Stats/Activities/",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({}))))
        .mount(&mock_server)
        .await;

    let client = bungie_client(&mock_server.uri(), 1);
    let page = client
        .activity_page(&membership(), &CharacterId::from("c1"), ActivityMode::Raid, 4, 250)
        .await
        .unwrap();

    assert!(page.is_end());
}

#[tokio::test]
async fn test_characters_include_deleted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Platform/Destiny2/2/Account/4611686018400000000/Stats/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "mergedDeletedCharacters": {},
            "mergedAllCharacters": {},
            "characters": [
                { "characterId": "c1", "deleted": false },
                { "characterId": "c2", "deleted": true }
            ]
        }))))
        .mount(&mock_server)
        .await;

    let client = bungie_client(&mock_server.uri(), 1);
    let characters = client.characters(&membership()).await.unwrap();

    assert_eq!(characters, vec![CharacterId::from("c1"), CharacterId::from("c2")]);
}

#[tokio::test]
async fn test_activity_definition_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Platform/Destiny2/Manifest/DestinyActivityDefinition/2823159265/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "hash": 2_823_159_265_u32,
            "displayProperties": { "name": "Duality: Standard", "description": "" }
        }))))
        .mount(&mock_server)
        .await;

    let client = bungie_client(&mock_server.uri(), 1);
    let definition = client.activity_definition(2_823_159_265).await.unwrap();

    assert_eq!(definition.name, "Duality: Standard");
}

#[tokio::test]
async fn test_last_played_from_profile_component() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Platform/Destiny2/2/Profile/4611686018400000000/"))
        .and(query_param("components", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "profile": {
                "data": {
                    "userInfo": { "membershipId": "4611686018400000000", "membershipType": 2 },
                    "dateLastPlayed": "2024-03-01T18:00:00Z",
                    "characterIds": ["c1"]
                },
                "privacy": 1
            }
        }))))
        .mount(&mock_server)
        .await;

    let client = bungie_client(&mock_server.uri(), 1);
    let last_played = client.last_played(&membership()).await.unwrap();

    assert_eq!(last_played, Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap());
}

#[tokio::test]
async fn test_memberships_for_current_user_uses_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Platform/User/GetMembershipsForCurrentUser/"))
        .and(bearer_token("player-token"))
        .and(header("X-API-Key", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "destinyMemberships": [
                { "membershipId": "111", "membershipType": 3 },
                { "membershipId": "222", "membershipType": 2 }
            ],
            "primaryMembershipId": "222",
            "bungieNetUser": { "membershipId": "99" }
        }))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = bungie_client(&mock_server.uri(), 1);
    let memberships = client.memberships_for_current_user("player-token").await.unwrap();

    assert_eq!(memberships.primary(), Some(&MembershipRef::new("222", 2)));
}
