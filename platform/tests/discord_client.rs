//! `DiscordClient` request/response handling against a local mock server.

use senatus_platform::{ChatPlatform, DiscordClient, OutgoingMessage, PlatformError};
use senatus_types::{ChannelId, CommunityId, PlatformUserId, RoleColor, RoleId, RoleSpec};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> DiscordClient {
    DiscordClient::new(server.uri(), "secret-token", "777")
}

#[tokio::test]
async fn lists_roles_with_bot_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/guilds/100/roles"))
        .and(header("Authorization", "Bot secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "100", "name": "@everyone", "color": 0, "position": 0},
            {"id": "5", "name": "Senator", "color": 255, "position": 2}
        ])))
        .mount(&server)
        .await;

    let roles = client(&server).roles(&CommunityId::new("100")).await.unwrap();
    assert_eq!(roles.len(), 2);
    assert_eq!(roles[1].name, "Senator");
    assert_eq!(roles[1].color, RoleColor::new(255));
}

#[tokio::test]
async fn create_role_sends_name_and_color() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/guilds/100/roles"))
        .and(body_json(serde_json::json!({
            "name": "Green Party", "color": 0x1f8b4c, "mentionable": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(
            {"id": "9", "name": "Green Party", "color": 0x1f8b4c, "position": 1}
        )))
        .mount(&server)
        .await;

    let spec = RoleSpec::named("Green Party").with_color(RoleColor::new(0x1f8b4c));
    let role = client(&server)
        .create_role(&CommunityId::new("100"), &spec)
        .await
        .unwrap();
    assert_eq!(role.id, RoleId::new("9"));
}

#[tokio::test]
async fn unknown_member_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/guilds/100/members/42"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!(
            {"message": "Unknown Member", "code": 10007}
        )))
        .mount(&server)
        .await;

    let roles = client(&server)
        .member_roles(&CommunityId::new("100"), &PlatformUserId::new("42"))
        .await
        .unwrap();
    assert!(roles.is_none());
}

#[tokio::test]
async fn member_roles_are_returned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/guilds/100/members/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(
            {"user": {"id": "42"}, "roles": ["5", "6"]}
        )))
        .mount(&server)
        .await;

    let roles = client(&server)
        .member_roles(&CommunityId::new("100"), &PlatformUserId::new("42"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(roles, vec![RoleId::new("5"), RoleId::new("6")]);
}

#[tokio::test]
async fn position_above_ceiling_is_forbidden() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/guilds/100/roles"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!(
            {"message": "Missing Permissions", "code": 50013}
        )))
        .mount(&server)
        .await;

    let err = client(&server)
        .set_role_position(&CommunityId::new("100"), &RoleId::new("9"), 12)
        .await
        .unwrap_err();
    assert!(matches!(err, PlatformError::Forbidden(_)));
}

#[tokio::test]
async fn grant_and_revoke_use_member_role_routes() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/guilds/100/members/42/roles/9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/guilds/100/members/42/roles/9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let c = client(&server);
    let guild = CommunityId::new("100");
    let user = PlatformUserId::new("42");
    c.add_member_role(&guild, &user, &RoleId::new("9")).await.unwrap();
    c.remove_member_role(&guild, &user, &RoleId::new("9")).await.unwrap();
}

#[tokio::test]
async fn rate_limit_is_retried_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/5/messages"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!(
            {"message": "You are being rate limited.", "retry_after": 0.01, "global": false}
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/channels/5/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "1"})))
        .mount(&server)
        .await;

    client(&server)
        .send_message(&ChannelId::new("5"), &OutgoingMessage::text("hi"))
        .await
        .unwrap();
}

#[tokio::test]
async fn edits_original_interaction_reply() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/webhooks/777/tok/messages/@original"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "1"})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .edit_interaction_reply("tok", &OutgoingMessage::text("done"))
        .await
        .unwrap();
}

#[tokio::test]
async fn overwrite_guild_commands() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/applications/777/guilds/100/commands"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "1", "name": "verify"}, {"id": "2", "name": "whoami"}
        ])))
        .mount(&server)
        .await;

    let count = client(&server)
        .overwrite_commands(
            Some(&CommunityId::new("100")),
            &serde_json::json!([{"name": "verify"}, {"name": "whoami"}]),
        )
        .await
        .unwrap();
    assert_eq!(count, 2);
}
